//! Text and annotation queries over leaf content.

use linea_primitives::{AnnotationSet, Offset, Range, Token, words};

use super::Document;

impl Document {
	/// Returns the characters of the leaves covered by `range`.
	pub fn get_text(&self, range: Range) -> String {
		self.slice(range)
			.iter()
			.filter_map(Token::as_leaf)
			.map(|leaf| leaf.ch)
			.collect()
	}

	/// Returns the run of consecutive leaves around the position `offset`.
	pub fn leaf_run(&self, offset: Offset) -> Range {
		let offset = offset.min(self.len());
		let mut start = offset;
		while start > 0 && self.data[start - 1].is_leaf() {
			start -= 1;
		}
		let mut end = offset;
		while end < self.len() && self.data[end].is_leaf() {
			end += 1;
		}
		Range::new(start, end)
	}

	/// Returns the word around `offset`, following Unicode word boundaries
	/// within the surrounding leaf run.
	pub fn nearest_word_range(&self, offset: Offset) -> Range {
		let run = self.leaf_run(offset);
		let chars: Vec<char> = self.data[run.to_std()]
			.iter()
			.filter_map(Token::as_leaf)
			.map(|leaf| leaf.ch)
			.collect();
		let (start, end) = words::nearest_word_range(&chars, offset.min(self.len()) - run.start());
		Range::new(run.start() + start, run.start() + end)
	}

	/// Returns the annotations of the leaf at `offset`, empty for markers.
	pub fn annotations_at(&self, offset: Offset) -> AnnotationSet {
		match self.data.get(offset) {
			Some(Token::Leaf(leaf)) => leaf.annotations.clone(),
			_ => AnnotationSet::new(),
		}
	}

	/// Returns the annotations covering `range`.
	///
	/// With `all`, every annotation present on any covered leaf; otherwise only
	/// those present on every covered leaf. A range covering no leaves yields
	/// the annotations content inserted at its start would continue.
	pub fn annotations_from_range(&self, range: Range, all: bool) -> AnnotationSet {
		let range = range.normalized().clamp(0, self.len());
		let mut leaves = self.slice(range).iter().filter_map(Token::as_leaf);
		let Some(first) = leaves.next() else {
			return self.insertion_annotations(range.start());
		};
		let mut result = first.annotations.clone();
		for leaf in leaves {
			if all {
				result.extend_from(&leaf.annotations);
			} else {
				result = result.intersection(&leaf.annotations);
				if result.is_empty() {
					break;
				}
			}
		}
		result
	}

	/// Returns the annotations of the leaf before `offset`, which content
	/// inserted at `offset` takes on.
	pub fn insertion_annotations(&self, offset: Offset) -> AnnotationSet {
		match offset.checked_sub(1) {
			Some(before) => self.annotations_at(before),
			None => AnnotationSet::new(),
		}
	}

	/// Grows `range` over neighbouring leaves carrying an annotation named
	/// `name`.
	///
	/// Returns `None` when no leaf in the grown range carries one.
	pub fn annotated_range(&self, range: Range, name: &str) -> Option<Range> {
		let range = range.normalized().clamp(0, self.len());
		let has = |offset: Offset| self.annotations_at(offset).has_annotation_with_name(name);

		let mut start = range.start();
		while start > 0 && has(start - 1) {
			start -= 1;
		}
		let mut end = range.end();
		while end < self.len() && has(end) {
			end += 1;
		}

		(start..end).any(has).then(|| Range::new(start, end))
	}
}
