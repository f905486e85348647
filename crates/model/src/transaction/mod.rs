//! Transaction builders.
//!
//! Every builder reads the current [`Document`] and returns a
//! [`Transaction`] covering its whole length. Builders never mutate; the
//! result is submitted through [`Surface::change`](crate::Surface::change)
//! or applied directly with [`Document::apply_transaction`].

mod style;
mod wrap;

#[cfg(test)]
mod tests;

use linea_primitives::{Offset, Range, Token, Transaction};
pub use style::{new_from_annotation, new_from_attribute_changes, new_from_content_branch_conversion};
use tracing::trace;
pub use wrap::new_from_wrap;

use crate::document::Document;

/// Builds a transaction inserting `data` at `offset`.
pub fn new_from_insertion(doc: &Document, offset: Offset, data: Vec<Token>) -> Transaction {
	let offset = offset.min(doc.len());
	let mut tx = Transaction::new();
	tx.retain_to(offset);
	tx.insert(data);
	tx.retain_to(doc.len());
	tx
}

/// Builds a transaction removing the content of `range`.
///
/// Leaves and nodes lying entirely inside the range are removed. Markers of
/// nodes that are only partly covered stay, so the partly covered nodes are
/// emptied rather than broken.
pub fn new_from_removal(doc: &Document, range: Range) -> Transaction {
	new_from_replacement(doc, range, Vec::new())
}

/// Builds a transaction removing the content of `range` as
/// [`new_from_removal`] does and inserting `data` at its start.
pub fn new_from_replacement(doc: &Document, range: Range, data: Vec<Token>) -> Transaction {
	let range = range.normalized().clamp(0, doc.len());
	let mut tx = Transaction::new();
	tx.retain_to(range.start());
	tx.insert(data);

	let mut kept = 0;
	for offset in range.start()..range.end() {
		let removable = match doc.matching_marker(offset) {
			Some(partner) => range.start() <= partner && partner < range.end(),
			None => true,
		};
		if removable {
			if let Some(token) = doc.token(offset) {
				tx.retain_to(offset);
				tx.remove(vec![token.clone()]);
			}
		} else {
			kept += 1;
		}
	}
	tx.retain_to(doc.len());

	trace!(start = range.start(), end = range.end(), kept, "transaction.replacement");
	tx
}
