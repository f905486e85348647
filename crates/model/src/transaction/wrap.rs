//! Structural rewrites: unwrapping and wrapping marker pairs.

use linea_primitives::token::closers_for;
use linea_primitives::{Element, Range, Token, Transaction};
use tracing::trace;

use crate::document::{Document, NodeRef};
use crate::error::WrapError;

/// Builds a transaction that unwraps and wraps `range` in one step.
///
/// * `unwrap_outer`: elements surrounding the range to remove, outermost
///   first. Their openers must sit immediately before the range and their
///   closers immediately after it.
/// * `wrap_outer`: elements to wrap around the whole range, outermost first.
/// * `unwrap_each`: elements to remove from each top-level node in the range,
///   outermost first.
/// * `wrap_each`: elements to wrap around each top-level node in the range.
///
/// Removing and adding markers in a single transaction never materializes
/// the intermediate state, which may itself be invalid.
pub fn new_from_wrap(
	doc: &Document,
	range: Range,
	unwrap_outer: &[Element],
	wrap_outer: &[Element],
	unwrap_each: &[Element],
	wrap_each: &[Element],
) -> Result<Transaction, WrapError> {
	let range = range.normalized().clamp(0, doc.len());
	let (start, end) = (range.start(), range.end());

	let depth = unwrap_outer.len();
	let available = outer_depth(doc, range);
	if depth > available {
		return Err(WrapError::UnwrapDepth {
			requested: depth,
			available,
		});
	}
	for (i, expected) in unwrap_outer.iter().enumerate() {
		check_kind(doc, start - depth + i, expected)?;
	}

	let each = !unwrap_each.is_empty() || !wrap_each.is_empty();
	let nodes = if each { top_level_nodes(doc, range)? } else { Vec::new() };
	if each && range.len() < unwrap_each.len() * 2 {
		return Err(WrapError::UnwrapDepth {
			requested: unwrap_each.len(),
			available: range.len() / 2,
		});
	}
	for &node in &nodes {
		check_each(doc, node, unwrap_each)?;
	}

	let wrap_outer: Vec<Element> = wrap_outer.iter().map(Element::fresh).collect();
	let wrap_each: Vec<Element> = wrap_each.iter().map(Element::fresh).collect();
	let m = unwrap_each.len();

	let mut tx = Transaction::new();
	tx.retain_to(start - depth);
	tx.remove(doc.get_data(Some(Range::new(start - depth, start))));
	tx.insert(wrap_outer.iter().cloned().map(Token::Open).collect());
	for node in &nodes {
		tx.retain_to(node.open);
		tx.remove(doc.get_data(Some(Range::new(node.open, node.open + m))));
		tx.insert(wrap_each.iter().cloned().map(Token::Open).collect());
		tx.retain_to(node.close + 1 - m);
		tx.remove(doc.get_data(Some(Range::new(node.close + 1 - m, node.close + 1))));
		tx.insert(closers_for(&wrap_each));
	}
	tx.retain_to(end);
	tx.remove(doc.get_data(Some(Range::new(end, end + depth))));
	tx.insert(closers_for(&wrap_outer));
	tx.retain_to(doc.len());

	trace!(
		start,
		end,
		unwrap_outer = depth,
		wrap_outer = wrap_outer.len(),
		unwrap_each = m,
		wrap_each = wrap_each.len(),
		nodes = nodes.len(),
		"transaction.wrap"
	);
	Ok(tx)
}

/// Counts the marker pairs that enclose `range` exactly.
fn outer_depth(doc: &Document, range: Range) -> usize {
	let mut depth = 0;
	while depth < range.start() {
		let open = range.start() - depth - 1;
		let close = range.end() + depth;
		let encloses = doc.token(open).is_some_and(Token::is_open) && doc.matching_marker(open) == Some(close);
		if !encloses {
			break;
		}
		depth += 1;
	}
	depth
}

fn check_kind(doc: &Document, offset: usize, expected: &Element) -> Result<(), WrapError> {
	let found = doc.token(offset).and_then(Token::kind).unwrap_or_default();
	if found == expected.kind {
		Ok(())
	} else {
		Err(WrapError::UnwrapMismatch {
			offset,
			expected: expected.kind.clone(),
			found: found.to_string(),
		})
	}
}

/// Returns the nodes directly inside `range`, which must consist of whole
/// nodes only.
fn top_level_nodes(doc: &Document, range: Range) -> Result<Vec<NodeRef>, WrapError> {
	let unbalanced = WrapError::UnbalancedRange {
		start: range.start(),
		end: range.end(),
	};
	let mut nodes = Vec::new();
	let mut offset = range.start();
	while offset < range.end() {
		match doc.token(offset) {
			Some(Token::Open(_)) => {}
			Some(Token::Leaf(_)) => return Err(WrapError::BareContent { offset }),
			_ => return Err(unbalanced),
		}
		let Some(node) = doc.node_at(offset).filter(|node| node.close < range.end()) else {
			return Err(unbalanced);
		};
		nodes.push(node);
		offset = node.close + 1;
	}
	Ok(nodes)
}

/// Checks that `node` is nested `unwrap.len()` levels deep in the expected
/// elements, each directly inside the previous one.
fn check_each(doc: &Document, node: NodeRef, unwrap: &[Element]) -> Result<(), WrapError> {
	for (level, expected) in unwrap.iter().enumerate() {
		let open = node.open + level;
		let nested = doc.token(open).is_some_and(Token::is_open)
			&& level <= node.close
			&& doc.matching_marker(open) == Some(node.close - level);
		if !nested {
			return Err(WrapError::UnwrapDepth {
				requested: unwrap.len(),
				available: level,
			});
		}
		check_kind(doc, open, expected)?;
	}
	Ok(())
}
