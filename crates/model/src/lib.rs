//! Linear document model: documents, transaction builders, editing surfaces
//! and the fragments that address them.
//!
//! A [`Document`] holds a flat sequence of [`Token`]s. Edits are expressed
//! as [`Transaction`]s built by the functions in [`transaction`] and applied
//! atomically. A [`Surface`] adds a selection and undo history, and hands out
//! [`SurfaceFragment`]s whose ranges follow every change.

pub mod document;
pub mod error;
pub mod fragment;
pub mod surface;
pub mod transaction;

pub use document::{Child, Document, NodeRef, Patch};
pub use error::{FragmentError, TransactionError, WrapError};
pub use fragment::{Content, ExpandUnit, SurfaceFragment};
pub use linea_primitives::{
	Annotation, AnnotationMethod, AnnotationSet, Attributes, Element, NameFilter, Range, Schema, Token, Transaction,
};
pub use surface::Surface;
