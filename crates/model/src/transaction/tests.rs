use linea_primitives::{Annotation, AnnotationMethod, Attributes, Element, Range, Token, token::text_to_tokens};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::{fixture, rstest};
use serde_json::json;

use super::*;
use crate::document::Document;
use crate::error::WrapError;

fn tokens(value: serde_json::Value) -> Vec<Token> {
	serde_json::from_value(value).expect("valid token data")
}

fn stripped(data: &[Token]) -> Vec<Token> {
	data.iter().map(Token::without_internal).collect()
}

/// `heading(ab) list(listItem(paragraph(c))) paragraph(de)`
fn sample() -> Document {
	Document::new(tokens(json!([
		{"type": "heading", "attributes": {"level": 1}},
		"a", "b",
		{"type": "/heading"},
		{"type": "list", "attributes": {"style": "bullet"}},
		{"type": "listItem"},
		{"type": "paragraph"},
		"c",
		{"type": "/paragraph"},
		{"type": "/listItem"},
		{"type": "/list"},
		{"type": "paragraph"},
		"d", "e",
		{"type": "/paragraph"},
	])))
	.expect("balanced")
}

#[fixture]
fn doc() -> Document {
	sample()
}

#[rstest]
fn insertion_marks_content(mut doc: Document) {
	let tx = new_from_insertion(&doc, 2, text_to_tokens("xy"));
	doc.apply_transaction(&tx).unwrap();
	assert_eq!(doc.get_text(Range::new(0, 6)), "axyb");
	let heading = doc.token(0).and_then(Token::as_element).unwrap();
	assert_eq!(heading.internal.changed.content, 1);
}

#[rstest]
fn removal_strips_partly_covered_nodes(mut doc: Document) {
	let tx = new_from_removal(&doc, Range::new(2, 13));
	doc.apply_transaction(&tx).unwrap();
	assert_eq!(
		stripped(&doc.get_data(None)),
		tokens(json!([
			{"type": "heading", "attributes": {"level": 1}},
			"a",
			{"type": "/heading"},
			{"type": "paragraph"},
			"e",
			{"type": "/paragraph"},
		]))
	);
}

#[rstest]
fn removal_of_backwards_range_matches_forwards(doc: Document) {
	assert_eq!(
		new_from_removal(&doc, Range::new(13, 2)),
		new_from_removal(&doc, Range::new(2, 13))
	);
}

#[rstest]
fn replacement_inserts_at_start(mut doc: Document) {
	let tx = new_from_replacement(&doc, Range::new(12, 14), text_to_tokens("xyz"));
	doc.apply_transaction(&tx).unwrap();
	assert_eq!(doc.get_text(Range::new(11, 16)), "xyz");
	assert_eq!(doc.len(), 16);
}

#[rstest]
fn wrap_each_node(mut doc: Document) {
	let wrapper = [Element::new("list").with_attribute("style", json!("number")), Element::new("listItem")];
	let tx = new_from_wrap(&doc, Range::new(11, 15), &[], &[], &[], &wrapper).unwrap();
	doc.apply_transaction(&tx).unwrap();
	assert_eq!(
		doc.get_data(Some(Range::new(11, 19))),
		tokens(json!([
			{"type": "list", "attributes": {"style": "number"}, "internal": {"changed": {"created": 1}}},
			{"type": "listItem", "internal": {"changed": {"created": 1}}},
			{"type": "paragraph"},
			"d", "e",
			{"type": "/paragraph"},
			{"type": "/listItem"},
			{"type": "/list"},
		]))
	);
}

#[rstest]
fn unwrap_outer_then_rewrap_each(mut doc: Document) {
	let list = doc.token(4).and_then(Token::as_element).cloned().unwrap();
	let item = doc.token(5).and_then(Token::as_element).cloned().unwrap();
	let tx = new_from_wrap(&doc, Range::new(6, 9), &[list, item], &[], &[], &[]).unwrap();
	doc.apply_transaction(&tx).unwrap();
	assert_eq!(
		doc.get_data(Some(Range::new(4, 7))),
		tokens(json!([{"type": "paragraph"}, "c", {"type": "/paragraph"}]))
	);
}

#[rstest]
fn wrap_rejects_too_deep_unwrap(doc: Document) {
	let outer = [Element::new("list"), Element::new("listItem"), Element::new("listItem")];
	assert_eq!(
		new_from_wrap(&doc, Range::new(6, 9), &outer, &[], &[], &[]),
		Err(WrapError::UnwrapDepth {
			requested: 3,
			available: 2
		})
	);
}

#[rstest]
fn wrap_rejects_mismatched_unwrap(doc: Document) {
	assert_eq!(
		new_from_wrap(&doc, Range::new(6, 9), &[Element::new("table")], &[], &[], &[]),
		Err(WrapError::UnwrapMismatch {
			offset: 5,
			expected: "table".to_string(),
			found: "listItem".to_string(),
		})
	);
}

#[rstest]
#[case(Range::new(1, 3), WrapError::BareContent { offset: 1 })]
#[case(Range::new(4, 9), WrapError::UnbalancedRange { start: 4, end: 9 })]
#[case(Range::new(4, 11), WrapError::UnwrapDepth { requested: 4, available: 3 })]
fn wrap_each_validates_range(doc: Document, #[case] range: Range, #[case] expected: WrapError) {
	let unwrap = [
		Element::new("list"),
		Element::new("listItem"),
		Element::new("paragraph"),
		Element::new("text"),
	];
	assert_eq!(new_from_wrap(&doc, range, &[], &[], &unwrap, &[]), Err(expected));
}

#[rstest]
fn annotation_covers_only_changing_leaves(mut doc: Document) {
	let bold = Annotation::new("textStyle/bold");
	let tx = new_from_annotation(&doc, Range::new(0, 15), AnnotationMethod::Set, &bold);
	doc.apply_transaction(&tx).unwrap();
	for offset in [1, 2, 7, 12, 13] {
		assert!(doc.annotations_at(offset).contains(&bold), "leaf at {offset}");
	}

	let again = new_from_annotation(&doc, Range::new(0, 15), AnnotationMethod::Set, &bold);
	assert!(again.is_noop());

	let clear = new_from_annotation(&doc, Range::new(12, 13), AnnotationMethod::Clear, &bold);
	doc.apply_transaction(&clear).unwrap();
	assert!(!doc.annotations_at(12).contains(&bold));
	assert!(doc.annotations_at(13).contains(&bold));
	let paragraph = doc.token(11).and_then(Token::as_element).unwrap();
	assert_eq!(paragraph.internal.changed.annotations, 2);
}

#[rstest]
fn attribute_changes_skip_unchanged_and_remove_null(mut doc: Document) {
	let changes: Attributes = [
		("level".to_string(), json!(2)),
		("style".to_string(), json!(null)),
		("id".to_string(), json!("intro")),
	]
	.into_iter()
	.collect();
	let tx = new_from_attribute_changes(&doc, 0, &changes);
	assert_eq!(tx.operations().iter().filter(|op| op.is_zero_length()).count(), 2);

	doc.apply_transaction(&tx).unwrap();
	let heading = doc.token(0).and_then(Token::as_element).unwrap();
	assert_eq!(heading.attribute("level"), Some(&json!(2)));
	assert_eq!(heading.attribute("id"), Some(&json!("intro")));
	assert_eq!(heading.internal.changed.attributes, 1);

	doc.apply_transaction(&tx.reversed()).unwrap();
	let heading = doc.token(0).and_then(Token::as_element).unwrap();
	assert_eq!(heading.attribute("level"), Some(&json!(1)));
	assert_eq!(heading.attribute("id"), None);
}

#[rstest]
fn attribute_changes_on_leaf_change_nothing(doc: Document) {
	let changes: Attributes = [("level".to_string(), json!(2))].into_iter().collect();
	assert!(new_from_attribute_changes(&doc, 1, &changes).is_noop());
}

#[rstest]
fn conversion_replaces_branch_markers(mut doc: Document) {
	let attributes: Attributes = [("level".to_string(), json!(1))].into_iter().collect();
	let tx = new_from_content_branch_conversion(&doc, Range::new(2, 13), "heading", &attributes);
	doc.apply_transaction(&tx).unwrap();
	assert_eq!(
		stripped(&doc.get_data(None)),
		tokens(json!([
			{"type": "heading", "attributes": {"level": 1}},
			"a", "b",
			{"type": "/heading"},
			{"type": "list", "attributes": {"style": "bullet"}},
			{"type": "listItem"},
			{"type": "heading", "attributes": {"level": 1}},
			"c",
			{"type": "/heading"},
			{"type": "/listItem"},
			{"type": "/list"},
			{"type": "heading", "attributes": {"level": 1}},
			"d", "e",
			{"type": "/heading"},
		]))
	);
}

proptest! {
	#[test]
	fn removal_keeps_balance_and_reverses(a in 0usize..=15, b in 0usize..=15) {
		let mut doc = sample();
		let original = doc.get_data(None);
		let tx = new_from_removal(&doc, Range::new(a, b));
		doc.apply_transaction(&tx).unwrap();
		doc.apply_transaction(&tx.reversed()).unwrap();
		prop_assert_eq!(stripped(&doc.get_data(None)), original);
	}

	#[test]
	fn replacement_translates_into_document(a in 0usize..=15, b in 0usize..=15, text in "[a-z]{0,4}") {
		let mut doc = sample();
		let tx = new_from_replacement(&doc, Range::new(a, b), text_to_tokens(&text));
		doc.apply_transaction(&tx).unwrap();
		let start = tx.translate_offset(a.min(b), linea_primitives::Bias::Left);
		prop_assert_eq!(doc.get_text(Range::new(start, start + text.len())), text);
	}
}
