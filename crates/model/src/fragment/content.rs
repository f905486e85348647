//! Content edits: text, annotations, attributes and branch types.

use linea_primitives::token::text_to_tokens;
use linea_primitives::{Annotation, AnnotationMethod, Attributes, NameFilter, Range, Token, Transaction};
use tracing::trace;

use super::SurfaceFragment;
use crate::error::FragmentError;
use crate::transaction::{
	new_from_annotation, new_from_attribute_changes, new_from_content_branch_conversion, new_from_insertion,
	new_from_removal,
};

/// Content to insert through a fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
	/// Linear data, inserted as given.
	Tokens(Vec<Token>),
	/// Plain text, one unannotated leaf per character.
	Text(String),
}

impl Content {
	/// Converts to linear data.
	pub fn into_tokens(self) -> Vec<Token> {
		match self {
			Content::Tokens(tokens) => tokens,
			Content::Text(text) => text_to_tokens(&text),
		}
	}
}

impl From<Vec<Token>> for Content {
	fn from(tokens: Vec<Token>) -> Self {
		Content::Tokens(tokens)
	}
}

impl From<String> for Content {
	fn from(text: String) -> Self {
		Content::Text(text)
	}
}

impl From<&str> for Content {
	fn from(text: &str) -> Self {
		Content::Text(text.to_string())
	}
}

impl SurfaceFragment {
	/// Removes the content in range, leaving the fragment collapsed at its
	/// start.
	///
	/// Nodes only partly inside the range keep their markers.
	pub fn remove_content(&mut self) -> Result<&mut Self, FragmentError> {
		self.edit(|state, range| {
			let tx = new_from_removal(&state.document, range);
			Ok(Some((tx, Some(Range::point(range.start())))))
		})
	}

	/// Replaces the range with `content`, leaving the fragment collapsed after
	/// it.
	///
	/// With `annotate`, inserted leaves receive the annotations an insertion
	/// at the start of the range would.
	pub fn insert_content(&mut self, content: impl Into<Content>, annotate: bool) -> Result<&mut Self, FragmentError> {
		let content = content.into();
		if self.range().is_some_and(|range| !range.is_collapsed()) {
			self.remove_content()?;
		}
		self.edit(|state, range| {
			let start = range.start();
			let mut tokens = content.into_tokens();
			if annotate {
				let annotations = state.insertion_annotations_at(start);
				for leaf in tokens.iter_mut().filter_map(Token::as_leaf_mut) {
					leaf.annotations.extend_from(&annotations);
				}
			}
			let end = start + tokens.len();
			let tx = new_from_insertion(&state.document, start, tokens);
			Ok(Some((tx, Some(Range::point(end)))))
		})
	}

	/// Sets or clears `annotation` on the leaves in range.
	///
	/// On a collapsed range this changes the annotations the next insertion
	/// at the selection receives instead. An auto-selecting fragment moves the
	/// selection to its offset first; otherwise a collapsed range away from
	/// the selection is left alone.
	pub fn annotate_content(
		&mut self,
		method: AnnotationMethod,
		annotation: &Annotation,
	) -> Result<&mut Self, FragmentError> {
		let Some((surface, key)) = self.context()? else {
			return Ok(self);
		};
		{
			let mut state = surface.borrow_mut();
			let collapsed = state.fragments.get(key).filter(|range| range.is_collapsed()).copied();
			if let Some(range) = collapsed {
				if self.auto_select {
					state.set_selection(range);
				} else if range.start() != state.selection.start() {
					trace!(offset = range.start(), "fragment.annotate: away from selection");
					return Ok(self);
				}
				let mut annotations = state.insertion_annotations_at(range.start());
				match method {
					AnnotationMethod::Set => {
						annotations.push(annotation.clone());
					}
					AnnotationMethod::Clear => {
						annotations.remove(annotation);
					}
				}
				trace!(name = %annotation.name, ?method, "fragment.annotate: insertion");
				state.insertion_annotations = Some(annotations);
				return Ok(self);
			}
		}
		self.edit(|state, range| {
			let tx = new_from_annotation(&state.document, range, method, annotation);
			Ok(Some((tx, None)))
		})
	}

	/// Clears every annotation named like `annotation` if the whole range
	/// carries one, and sets `annotation` otherwise.
	pub fn toggle_annotation(&mut self, annotation: &Annotation) -> Result<&mut Self, FragmentError> {
		let name = annotation.name.as_str();
		if !self.get_annotations(false).has_annotation_with_name(name) {
			return self.annotate_content(AnnotationMethod::Set, annotation);
		}
		for existing in self.get_annotations(true).get_annotations_by_name(name).iter() {
			self.annotate_content(AnnotationMethod::Clear, existing)?;
		}
		Ok(self)
	}

	/// Clears the annotations in range, or only those passing `filter`.
	pub fn clear_all_annotations(&mut self, filter: Option<NameFilter>) -> Result<&mut Self, FragmentError> {
		let mut annotations = self.get_annotations(true);
		if let Some(filter) = filter {
			annotations = annotations.get_annotations_by_name(filter);
		}
		for annotation in annotations.iter() {
			self.annotate_content(AnnotationMethod::Clear, annotation)?;
		}
		Ok(self)
	}

	/// Changes attributes of the nodes opened in range and of the node
	/// containing its start, optionally only those of type `kind`.
	///
	/// A `null` value removes the attribute.
	pub fn change_attributes(&mut self, changes: &Attributes, kind: Option<&str>) -> Result<&mut Self, FragmentError> {
		self.edit(|state, range| {
			let doc = &state.document;
			let range = range.normalized();
			let mut targets: Vec<usize> = doc.parent_of(range.start()).map(|node| node.open).into_iter().collect();
			targets.extend((range.start()..range.end()).filter(|&offset| doc.token(offset).is_some_and(Token::is_open)));
			targets.retain(|&offset| kind.is_none_or(|kind| doc.token(offset).and_then(Token::kind) == Some(kind)));
			targets.sort_unstable();
			targets.dedup();

			let tx = targets
				.iter()
				.map(|&offset| new_from_attribute_changes(doc, offset, changes))
				.reduce(Transaction::compose);
			Ok(tx.map(|tx| (tx, None)))
		})
	}

	/// Converts every content branch in range to type `kind` with
	/// `attributes`.
	pub fn convert_nodes(&mut self, kind: &str, attributes: &Attributes) -> Result<&mut Self, FragmentError> {
		self.edit(|state, range| {
			let tx = new_from_content_branch_conversion(&state.document, range, kind, attributes);
			Ok(Some((tx, None)))
		})
	}
}
