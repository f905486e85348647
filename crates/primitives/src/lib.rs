//! Core types for linear rich documents: tokens, ranges, annotations, node rules and transactions.

/// Annotations attached to leaf content.
pub mod annotation;
/// Linear offset ranges.
pub mod range;
/// Node compatibility table.
pub mod schema;
/// Tokens of the linear document representation.
pub mod token;
/// Retain/insert/remove transactions and offset translation.
pub mod transaction;
/// Unicode word boundary helpers.
pub mod words;

pub use annotation::{Annotation, AnnotationSet, NameFilter};
pub use range::{Direction, Offset, Range};
pub use schema::{DOCUMENT_KIND, NodeCategory, NodeRules, Schema};
pub use token::{Attributes, Changed, Element, Internal, Leaf, Token, Unbalanced};
pub use transaction::{AnnotationBias, AnnotationMethod, Bias, Operation, Transaction};
