use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::annotation::Annotation;
use crate::token::Token;

/// Bias determines how offsets at change boundaries are mapped.
///
/// When mapping an offset through a transaction, bias determines whether the
/// offset moves with insertions or stays before them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bias {
	/// Offset stays before insertions at the same location.
	Left,
	/// Offset moves after insertions at the same location.
	Right,
}

/// Whether an annotation span adds or removes its annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationMethod {
	/// Add the annotation to covered leaves.
	Set,
	/// Remove the annotation from covered leaves.
	Clear,
}

impl AnnotationMethod {
	/// Returns the method undoing this one.
	pub fn inverse(self) -> Self {
		match self {
			AnnotationMethod::Set => AnnotationMethod::Clear,
			AnnotationMethod::Clear => AnnotationMethod::Set,
		}
	}
}

/// Which end of an annotation span a marker opens or closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationBias {
	/// Span begins here.
	Start,
	/// Span ends here.
	Stop,
}

/// A single operation in a transaction.
///
/// `Retain` and `Remove` consume source tokens; `Insert` produces output
/// tokens. `Annotate` and `Attribute` are zero-length and consume nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
	/// Keep the next N tokens of the source document.
	Retain(usize),
	/// Insert tokens at the current position.
	Insert(Vec<Token>),
	/// Remove the next tokens of the source document, which must match these.
	Remove(Vec<Token>),
	/// Start or stop an annotation span over retained leaves.
	Annotate {
		/// Set or clear.
		method: AnnotationMethod,
		/// Start or stop of the span.
		bias: AnnotationBias,
		/// The annotation being set or cleared.
		annotation: Annotation,
	},
	/// Change one attribute of the open marker at the current position.
	Attribute {
		/// Attribute key.
		key: String,
		/// Previous value, `None` if unset.
		from: Option<Value>,
		/// New value, `None` to unset.
		to: Option<Value>,
	},
}

impl Operation {
	/// Number of source tokens consumed.
	pub fn input_len(&self) -> usize {
		match self {
			Operation::Retain(n) => *n,
			Operation::Remove(tokens) => tokens.len(),
			_ => 0,
		}
	}

	/// Number of output tokens produced.
	pub fn output_len(&self) -> usize {
		match self {
			Operation::Retain(n) => *n,
			Operation::Insert(tokens) => tokens.len(),
			_ => 0,
		}
	}

	/// Returns true for `Annotate` and `Attribute`.
	pub fn is_zero_length(&self) -> bool {
		matches!(self, Operation::Annotate { .. } | Operation::Attribute { .. })
	}

	/// Splits off the first `n` tokens of a retain, insert or remove.
	///
	/// `self` keeps the remainder.
	pub(super) fn split_front(&mut self, n: usize) -> Operation {
		match self {
			Operation::Retain(count) => {
				debug_assert!(n <= *count);
				*count -= n;
				Operation::Retain(n)
			}
			Operation::Insert(tokens) => Operation::Insert(tokens.drain(..n).collect()),
			Operation::Remove(tokens) => Operation::Remove(tokens.drain(..n).collect()),
			other => {
				debug_assert!(n == 0, "cannot split a zero-length operation");
				other.clone()
			}
		}
	}

	/// Returns true once every token of a retain, insert or remove was split off.
	pub(super) fn is_spent(&self) -> bool {
		match self {
			Operation::Retain(n) => *n == 0,
			Operation::Insert(tokens) | Operation::Remove(tokens) => tokens.is_empty(),
			_ => false,
		}
	}
}
