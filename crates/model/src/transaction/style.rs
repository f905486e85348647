//! Builders for annotation, attribute and content branch type changes.

use linea_primitives::{
	Annotation, AnnotationBias, AnnotationMethod, Attributes, Element, Offset, Range, Token, Transaction,
};
use tracing::trace;

use crate::document::Document;

/// Builds a transaction setting or clearing `annotation` on the leaves in
/// `range`.
///
/// Only leaves that actually change are covered: setting skips leaves that
/// already carry the annotation and clearing skips leaves that lack it.
/// Spans never cross markers.
pub fn new_from_annotation(
	doc: &Document,
	range: Range,
	method: AnnotationMethod,
	annotation: &Annotation,
) -> Transaction {
	let range = range.normalized().clamp(0, doc.len());
	let mut tx = Transaction::new();
	let mut span_open = false;
	let mut spans = 0usize;

	for offset in range.start()..range.end() {
		let needs_change = match doc.token(offset) {
			Some(Token::Leaf(leaf)) => match method {
				AnnotationMethod::Set => !leaf.annotations.contains(annotation),
				AnnotationMethod::Clear => leaf.annotations.contains(annotation),
			},
			_ => false,
		};
		if needs_change != span_open {
			tx.retain_to(offset);
			let bias = if needs_change {
				spans += 1;
				AnnotationBias::Start
			} else {
				AnnotationBias::Stop
			};
			tx.annotate(method, bias, annotation.clone());
			span_open = needs_change;
		}
	}
	if span_open {
		tx.retain_to(range.end());
		tx.annotate(method, AnnotationBias::Stop, annotation.clone());
	}
	tx.retain_to(doc.len());

	trace!(name = %annotation.name, ?method, spans, "transaction.annotation");
	tx
}

/// Builds a transaction changing attributes of the element opened at
/// `offset`.
///
/// A `null` value removes the attribute. Entries that already hold the
/// requested value are skipped; an offset without an open marker yields a
/// transaction that changes nothing.
pub fn new_from_attribute_changes(doc: &Document, offset: Offset, changes: &Attributes) -> Transaction {
	let mut tx = Transaction::new();
	if let Some(element) = doc.token(offset).and_then(Token::as_element) {
		tx.retain_to(offset);
		for (key, value) in changes {
			let from = element.attribute(key).cloned();
			let to = (!value.is_null()).then(|| value.clone());
			if from != to {
				tx.attribute(key.clone(), from, to);
			}
		}
	} else {
		trace!(offset, "transaction.attributes: no element");
	}
	tx.retain_to(doc.len());
	tx
}

/// Builds a transaction converting every content branch `range` touches to
/// an element of type `kind` with `attributes`.
///
/// Branches that already match are left alone, as is everything between the
/// markers.
pub fn new_from_content_branch_conversion(
	doc: &Document,
	range: Range,
	kind: &str,
	attributes: &Attributes,
) -> Transaction {
	let mut tx = Transaction::new();
	let mut converted = 0usize;
	for node in doc.content_branches(range) {
		let Some(element) = doc.element(node) else {
			continue;
		};
		if element.kind == kind && &element.attributes == attributes {
			continue;
		}
		let replacement = Element {
			attributes: attributes.clone(),
			..Element::new(kind)
		};
		tx.retain_to(node.open);
		tx.remove(vec![Token::Open(element.clone())]);
		tx.insert(vec![Token::Open(replacement)]);
		tx.retain_to(node.close);
		tx.remove(vec![element.closer()]);
		tx.insert(vec![Token::close(kind)]);
		converted += 1;
	}
	tx.retain_to(doc.len());

	trace!(kind, converted, "transaction.conversion");
	tx
}
