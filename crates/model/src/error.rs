//! Error types for transaction application and structural edits.

use linea_primitives::Unbalanced;
use thiserror::Error;

/// Errors occurring while applying a transaction to a document.
///
/// Application is all-or-nothing: on any of these the document is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
	/// The transaction was built for a document of a different length.
	#[error("transaction covers {actual} tokens but the document has {expected}")]
	StructuralMismatch { expected: usize, actual: usize },
	/// A removed token does not match the document at that offset.
	#[error("removal at offset {offset} does not match the document")]
	StaleRemoval { offset: usize },
	/// An attribute change targets something other than an open marker.
	#[error("attribute change at offset {offset} does not target an open marker")]
	AttributeTarget { offset: usize },
	/// An annotation span stops without starting, or never stops.
	#[error("unbalanced annotation span for '{name}'")]
	UnbalancedAnnotation { name: String },
	/// The result would contain unmatched markers.
	#[error("transaction result is unbalanced: {0}")]
	Unbalanced(#[from] Unbalanced),
}

/// Errors occurring while building wrap and unwrap transactions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WrapError {
	/// More levels were requested for unwrapping than surround the range.
	#[error("cannot unwrap by greater depth ({requested}) than the range is covered ({available})")]
	UnwrapDepth { requested: usize, available: usize },
	/// An element to unwrap does not match the document.
	#[error("element to unwrap at offset {offset} is '{found}', expected '{expected}'")]
	UnwrapMismatch {
		offset: usize,
		expected: String,
		found: String,
	},
	/// Leaf content sits directly in the range where each node is rewrapped.
	#[error("cannot wrap or unwrap bare content at offset {offset}")]
	BareContent { offset: usize },
	/// The range does not cover whole nodes.
	#[error("range {start}..{end} does not cover whole nodes")]
	UnbalancedRange { start: usize, end: usize },
}

/// Errors surfaced by fragment operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FragmentError {
	/// Applying the built transaction failed.
	#[error(transparent)]
	Transaction(#[from] TransactionError),
	/// Building a structural transaction failed.
	#[error(transparent)]
	Wrap(#[from] WrapError),
	/// The surface the fragment belongs to no longer exists.
	#[error("fragment's surface was dropped")]
	Detached,
}
