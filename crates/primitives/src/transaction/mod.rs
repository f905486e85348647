//! Transactions over the linear document.
//!
//! A [`Transaction`] is a sequence of [`Operation`]s walked in lockstep with
//! the source document: retains copy tokens, removes skip them, inserts emit
//! new ones. Removals carry the removed tokens so every transaction can be
//! reversed without consulting the document it was built against.

mod compose;
mod types;


use serde_json::Value;
pub use types::{AnnotationBias, AnnotationMethod, Bias, Operation};

use crate::annotation::Annotation;
use crate::range::{Offset, Range};
use crate::token::Token;

/// An ordered list of operations transforming a document of length
/// [`Transaction::len`] into one of length [`Transaction::len_after`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Transaction {
	ops: Vec<Operation>,
	len: usize,
	len_after: usize,
}

impl Transaction {
	/// Creates an empty transaction.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the length of the source document (before changes).
	pub fn len(&self) -> usize {
		self.len
	}

	/// Returns the length of the document after applying changes.
	pub fn len_after(&self) -> usize {
		self.len_after
	}

	/// Returns true if this transaction contains no operations.
	pub fn is_empty(&self) -> bool {
		self.ops.is_empty()
	}

	/// Returns true if applying this transaction changes nothing.
	pub fn is_noop(&self) -> bool {
		self.ops.iter().all(|op| match op {
			Operation::Retain(_) => true,
			Operation::Attribute { from, to, .. } => from == to,
			_ => false,
		})
	}

	/// Returns a slice of all operations in this transaction.
	pub fn operations(&self) -> &[Operation] {
		&self.ops
	}

	/// Adds a retain operation, preserving N tokens from the source.
	///
	/// Consecutive retain operations are merged.
	pub fn retain(&mut self, n: usize) {
		if n == 0 {
			return;
		}

		self.len += n;
		self.len_after += n;

		if let Some(Operation::Retain(count)) = self.ops.last_mut() {
			*count += n;
		} else {
			self.ops.push(Operation::Retain(n));
		}
	}

	/// Retains everything up to `offset` of the source document.
	pub fn retain_to(&mut self, offset: Offset) {
		debug_assert!(offset >= self.len, "cannot retain backwards to {offset} from {}", self.len);
		self.retain(offset.saturating_sub(self.len));
	}

	/// Adds a remove operation for the given source tokens.
	///
	/// Consecutive removals are merged.
	pub fn remove(&mut self, tokens: Vec<Token>) {
		if tokens.is_empty() {
			return;
		}

		self.len += tokens.len();

		if let Some(Operation::Remove(prev)) = self.ops.last_mut() {
			prev.extend(tokens);
		} else {
			self.ops.push(Operation::Remove(tokens));
		}
	}

	/// Adds an insert operation at the current position.
	///
	/// Inserts merge with an adjacent insert, and are placed before a trailing
	/// removal so that a replacement always reads insert-then-remove.
	pub fn insert(&mut self, tokens: Vec<Token>) {
		if tokens.is_empty() {
			return;
		}

		self.len_after += tokens.len();

		match self.ops.as_mut_slice() {
			[.., Operation::Insert(prev)] | [.., Operation::Insert(prev), Operation::Remove(_)] => {
				prev.extend(tokens);
			}
			[.., last @ Operation::Remove(_)] => {
				let removal = std::mem::replace(last, Operation::Insert(tokens));
				self.ops.push(removal);
			}
			_ => {
				self.ops.push(Operation::Insert(tokens));
			}
		}
	}

	/// Adds an annotation span marker.
	pub fn annotate(&mut self, method: AnnotationMethod, bias: AnnotationBias, annotation: Annotation) {
		self.ops.push(Operation::Annotate {
			method,
			bias,
			annotation,
		});
	}

	/// Adds an attribute change for the open marker at the current position.
	pub fn attribute(&mut self, key: impl Into<String>, from: Option<Value>, to: Option<Value>) {
		self.ops.push(Operation::Attribute {
			key: key.into(),
			from,
			to,
		});
	}

	/// Appends an operation through the merging push methods.
	pub fn push(&mut self, op: Operation) {
		match op {
			Operation::Retain(n) => self.retain(n),
			Operation::Insert(tokens) => self.insert(tokens),
			Operation::Remove(tokens) => self.remove(tokens),
			Operation::Annotate {
				method,
				bias,
				annotation,
			} => self.annotate(method, bias, annotation),
			Operation::Attribute { key, from, to } => self.attribute(key, from, to),
		}
	}

	/// Maps an offset through this transaction using the specified bias.
	///
	/// Offsets inside a removed span collapse to the removal's output position.
	pub fn translate_offset(&self, offset: Offset, bias: Bias) -> Offset {
		let mut old_pos = 0;
		let mut new_pos = 0;

		for op in &self.ops {
			if old_pos > offset {
				break;
			}

			match op {
				Operation::Retain(n) => {
					if old_pos + n > offset {
						return new_pos + (offset - old_pos);
					}
					old_pos += n;
					new_pos += n;
				}
				Operation::Remove(tokens) => {
					if old_pos + tokens.len() > offset {
						return new_pos;
					}
					old_pos += tokens.len();
				}
				Operation::Insert(tokens) => {
					if old_pos == offset && bias == Bias::Left {
						// Offset is exactly at insert point, stay before
					} else {
						new_pos += tokens.len();
					}
				}
				Operation::Annotate { .. } | Operation::Attribute { .. } => {}
			}
		}

		new_pos + offset.saturating_sub(old_pos)
	}

	/// Maps a range through this transaction, preserving its direction.
	///
	/// The start maps with [`Bias::Left`] and the end with [`Bias::Right`], so
	/// content inserted exactly at either boundary ends up inside the range.
	pub fn translate_range(&self, range: Range) -> Range {
		let start = self.translate_offset(range.start(), Bias::Left);
		let end = self.translate_offset(range.end(), Bias::Right);
		Range::new(start, end).with_direction(range.direction())
	}

	/// Returns the transaction undoing this one.
	pub fn reversed(&self) -> Transaction {
		let mut result = Transaction::new();
		for op in &self.ops {
			match op {
				Operation::Retain(n) => result.retain(*n),
				Operation::Insert(tokens) => result.remove(tokens.clone()),
				Operation::Remove(tokens) => result.insert(tokens.clone()),
				Operation::Annotate {
					method,
					bias,
					annotation,
				} => result.annotate(method.inverse(), *bias, annotation.clone()),
				Operation::Attribute { key, from, to } => result.attribute(key.clone(), to.clone(), from.clone()),
			}
		}
		debug_assert_eq!(result.len, self.len_after);
		debug_assert_eq!(result.len_after, self.len);
		result
	}

	/// Returns the changed regions of the output document, as ranges over it.
	///
	/// Insertions produce their output span and removals a collapsed range at
	/// their output position. Attribute changes cover the marker they target;
	/// annotation spans cover the output between their start and stop.
	pub fn modified_ranges(&self) -> Vec<Range> {
		let mut ranges: Vec<Range> = Vec::new();
		let mut new_pos = 0;
		let mut open_spans: Vec<Offset> = Vec::new();

		for op in &self.ops {
			match op {
				Operation::Retain(n) => new_pos += n,
				Operation::Insert(tokens) => {
					push_merged(&mut ranges, Range::new(new_pos, new_pos + tokens.len()));
					new_pos += tokens.len();
				}
				Operation::Remove(_) => push_merged(&mut ranges, Range::point(new_pos)),
				Operation::Attribute { .. } => push_merged(&mut ranges, Range::new(new_pos, new_pos + 1)),
				Operation::Annotate { bias, .. } => match bias {
					AnnotationBias::Start => open_spans.push(new_pos),
					AnnotationBias::Stop => {
						if let Some(start) = open_spans.pop() {
							push_merged(&mut ranges, Range::new(start, new_pos));
						}
					}
				},
			}
		}
		ranges.sort_by_key(Range::start);
		let mut merged: Vec<Range> = Vec::with_capacity(ranges.len());
		for range in ranges {
			push_merged(&mut merged, range);
		}
		merged
	}
}

fn push_merged(ranges: &mut Vec<Range>, range: Range) {
	match ranges.last_mut() {
		Some(last) if last.end() >= range.start() => *last = last.expand(&range),
		_ => ranges.push(range),
	}
}
