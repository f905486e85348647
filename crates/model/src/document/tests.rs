use linea_primitives::{Annotation, Range, Schema, Token, Transaction, Unbalanced, token::text_to_tokens};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;

use super::{Child, Document, NodeRef};
use crate::error::TransactionError;

fn tokens(value: serde_json::Value) -> Vec<Token> {
	serde_json::from_value(value).expect("valid token data")
}

/// `paragraph(a[b]c) list(listItem(paragraph(d)) listItem(paragraph(e)))`
/// with bold on `b`.
fn sample() -> Document {
	Document::new(tokens(json!([
		{"type": "paragraph"},
		"a",
		["b", [{"name": "textStyle/bold"}]],
		["c", [{"name": "textStyle/bold"}, {"name": "textStyle/italic"}]],
		{"type": "/paragraph"},
		{"type": "list", "attributes": {"style": "bullet"}},
		{"type": "listItem"},
		{"type": "paragraph"},
		"d",
		{"type": "/paragraph"},
		{"type": "/listItem"},
		{"type": "listItem"},
		{"type": "paragraph"},
		"e",
		{"type": "/paragraph"},
		{"type": "/listItem"},
		{"type": "/list"},
	])))
	.expect("balanced")
}

fn node(open: usize, close: usize) -> NodeRef {
	NodeRef { open, close }
}

#[test]
fn new_rejects_unbalanced_data() {
	let data = tokens(json!([{"type": "paragraph"}, "a", {"type": "/heading"}]));
	assert_eq!(Document::new(data).unwrap_err(), Unbalanced { offset: 2 });
}

#[test]
fn full_data_round_trips_meta_items() {
	let full = tokens(json!([
		{"type": "comment", "attributes": {"text": "x"}},
		{"type": "/comment"},
		{"type": "paragraph"},
		"a",
		{"type": "/paragraph"},
		{"type": "alienMeta"},
		{"type": "/alienMeta"},
	]));
	let doc = Document::from_full_data(full.clone(), Schema::default()).unwrap();
	assert_eq!(doc.len(), 3);
	assert_eq!(doc.metadata_at(0).len(), 2);
	assert_eq!(doc.metadata_at(3).len(), 2);
	assert_eq!(doc.get_full_data(), full);
}

#[test]
fn removed_meta_moves_to_removal_point() {
	let full = tokens(json!([
		{"type": "paragraph"},
		"a",
		{"type": "alienMeta"},
		{"type": "/alienMeta"},
		"b",
		{"type": "/paragraph"},
	]));
	let mut doc = Document::from_full_data(full, Schema::default()).unwrap();
	let mut tx = Transaction::new();
	tx.retain(1);
	tx.remove(text_to_tokens("ab"));
	tx.retain(1);
	doc.apply_transaction(&tx).unwrap();

	assert_eq!(doc.len(), 2);
	assert_eq!(doc.metadata_at(1).len(), 2);
}

#[test]
fn apply_rejects_wrong_length() {
	let mut doc = sample();
	let mut tx = Transaction::new();
	tx.retain(3);
	assert_eq!(
		doc.apply_transaction(&tx),
		Err(TransactionError::StructuralMismatch {
			expected: 17,
			actual: 3
		})
	);
	assert_eq!(doc.version(), 0);
}

#[test]
fn apply_rejects_stale_removal_and_leaves_document() {
	let mut doc = sample();
	let before = doc.get_data(None);
	let mut tx = Transaction::new();
	tx.retain(1);
	tx.remove(text_to_tokens("z"));
	tx.retain_to(17);
	assert_eq!(doc.apply_transaction(&tx), Err(TransactionError::StaleRemoval { offset: 1 }));
	assert_eq!(doc.get_data(None), before);
}

#[test]
fn apply_rejects_unbalanced_result() {
	let mut doc = sample();
	let mut tx = Transaction::new();
	tx.remove(tokens(json!([{"type": "paragraph"}])));
	tx.retain_to(17);
	assert!(matches!(doc.apply_transaction(&tx), Err(TransactionError::Unbalanced(_))));
}

#[test]
fn apply_rejects_attribute_on_leaf() {
	let mut doc = sample();
	let mut tx = Transaction::new();
	tx.retain(1);
	tx.attribute("level", None, Some(json!(1)));
	tx.retain_to(17);
	assert_eq!(doc.apply_transaction(&tx), Err(TransactionError::AttributeTarget { offset: 1 }));
}

#[test]
fn apply_reports_patch() {
	let mut doc = sample();
	let mut tx = Transaction::new();
	tx.retain(1);
	tx.insert(text_to_tokens("xy"));
	tx.retain_to(17);
	let patch = doc.apply_transaction(&tx).unwrap();
	assert_eq!(patch.version, 1);
	assert_eq!(patch.len_before, 17);
	assert_eq!(patch.len_after, 19);
	assert_eq!(patch.changed, vec![Range::new(1, 3)]);
	assert_eq!(doc.version(), 1);
}

#[rstest]
#[case(0, None)]
#[case(1, Some(node(0, 4)))]
#[case(5, None)]
#[case(8, Some(node(7, 9)))]
#[case(11, Some(node(5, 16)))]
#[case(17, None)]
fn parent_of(#[case] offset: usize, #[case] expected: Option<NodeRef>) {
	assert_eq!(sample().parent_of(offset), expected);
}

#[test]
fn ancestors_and_common_ancestor() {
	let doc = sample();
	assert_eq!(doc.ancestors(8), vec![node(7, 9), node(6, 10), node(5, 16)]);
	assert_eq!(doc.common_ancestor(Range::new(8, 13)), Some(node(5, 16)));
	assert_eq!(doc.common_ancestor(Range::new(1, 13)), None);
}

#[test]
fn children_split_text_and_nodes() {
	let doc = sample();
	assert_eq!(doc.children(Some(node(0, 4))), vec![Child::Text(Range::new(1, 4))]);
	assert_eq!(
		doc.children(Some(node(5, 16))),
		vec![Child::Node(node(6, 10)), Child::Node(node(11, 15))]
	);
	assert_eq!(doc.child_position(node(11, 15)), Some((1, 2)));
}

#[rstest]
#[case(Range::new(8, 13), vec![node(6, 10), node(11, 15)])]
#[case(Range::new(2, 3), vec![node(0, 4)])]
#[case(Range::new(0, 17), vec![node(0, 4), node(5, 16)])]
#[case(Range::new(13, 13), vec![node(12, 14)])]
fn covered_nodes(#[case] range: Range, #[case] expected: Vec<NodeRef>) {
	assert_eq!(sample().covered_nodes(range), expected);
}

#[test]
fn content_branches_in_range() {
	let doc = sample();
	assert_eq!(doc.content_branches(Range::new(3, 9)), vec![node(0, 4), node(7, 9)]);
	assert_eq!(doc.content_branches(Range::new(4, 4)), vec![node(0, 4)]);
}

#[test]
fn text_queries() {
	let doc = sample();
	assert_eq!(doc.get_text(Range::new(0, 17)), "abcde");
	assert_eq!(doc.leaf_run(2), Range::new(1, 4));
	assert_eq!(doc.nearest_word_range(2), Range::new(1, 4));
}

#[test]
fn annotation_queries() {
	let doc = sample();
	let bold = Annotation::new("textStyle/bold");
	let italic = Annotation::new("textStyle/italic");

	let all = doc.annotations_from_range(Range::new(1, 4), true);
	assert!(all.contains(&bold) && all.contains(&italic));
	assert!(doc.annotations_from_range(Range::new(1, 4), false).is_empty());
	let common = doc.annotations_from_range(Range::new(2, 4), false);
	assert_eq!(common.get(), &[bold.clone()]);

	assert_eq!(doc.annotations_from_range(Range::point(3), true).get(), &[bold.clone()]);
	assert!(doc.insertion_annotations(0).is_empty());

	assert_eq!(doc.annotated_range(Range::point(3), "textStyle/bold"), Some(Range::new(2, 4)));
	assert_eq!(doc.annotated_range(Range::new(1, 2), "textStyle/bold"), Some(Range::new(1, 4)));
	assert_eq!(doc.annotated_range(Range::point(1), "textStyle/bold"), None);
}
