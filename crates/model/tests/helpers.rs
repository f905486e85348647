//! Shared fixtures for linea-model integration tests.

use linea_model::{Document, Element, Schema, Token};
use serde_json::{Value, json};

/// Parses linear data written as JSON.
pub fn tokens(value: Value) -> Vec<Token> {
	serde_json::from_value(value).expect("valid token data")
}

/// Builds an element from its JSON form, `{"type": ..., "attributes": ...}`.
#[allow(dead_code, reason = "test helper used by individual test files")]
pub fn element(value: Value) -> Element {
	match serde_json::from_value(value).expect("valid token") {
		Token::Open(element) => element,
		other => panic!("expected an open marker, got {other:?}"),
	}
}

/// `list(bullet) + listItem` wrapper used throughout the wrapping tests.
#[allow(dead_code, reason = "test helper used by individual test files")]
pub fn bullet_list_item() -> Vec<Element> {
	vec![
		element(json!({"type": "list", "attributes": {"style": "bullet"}})),
		element(json!({"type": "listItem"})),
	]
}

/// Data of the 61-token example document.
///
/// | offsets | content |
/// |---------|---------|
/// | 0..5    | heading `a`, bold `b`, italic `c` |
/// | 5..37   | table > section > row > cell holding `d` and two lists (`e` with a nested `f`, and `g`) |
/// | 37..43  | preformatted `h`, image, `i` |
/// | 43..55  | definition list: term `j`, definition `k` |
/// | 55..61  | paragraphs `l` and `m` |
#[allow(dead_code, reason = "test helper used by individual test files")]
pub fn example_data() -> Vec<Token> {
	let heading = json!([
		{"type": "heading", "attributes": {"level": 1}},
		"a",
		["b", [{"name": "textStyle/bold"}]],
		["c", [{"name": "textStyle/italic"}]],
		{"type": "/heading"},
	]);
	let table_open = json!([
		{"type": "table"},
		{"type": "tableSection", "attributes": {"style": "body"}},
		{"type": "tableRow"},
		{"type": "tableCell", "attributes": {"style": "data"}},
		{"type": "paragraph"},
		"d",
		{"type": "/paragraph"},
	]);
	let nested_list = json!([
		{"type": "list", "attributes": {"style": "bullet"}},
		{"type": "listItem"},
		{"type": "paragraph"},
		"e",
		{"type": "/paragraph"},
		{"type": "list", "attributes": {"style": "number"}},
		{"type": "listItem"},
		{"type": "paragraph"},
		"f",
		{"type": "/paragraph"},
		{"type": "/listItem"},
		{"type": "/list"},
		{"type": "/listItem"},
		{"type": "/list"},
	]);
	let table_close = json!([
		{"type": "list", "attributes": {"style": "number"}},
		{"type": "listItem"},
		{"type": "paragraph"},
		"g",
		{"type": "/paragraph"},
		{"type": "/listItem"},
		{"type": "/list"},
		{"type": "/tableCell"},
		{"type": "/tableRow"},
		{"type": "/tableSection"},
		{"type": "/table"},
	]);
	let preformatted = json!([
		{"type": "preformatted"},
		"h",
		{"type": "image", "attributes": {"src": "image.png", "width": null, "height": null}},
		{"type": "/image"},
		"i",
		{"type": "/preformatted"},
	]);
	let definitions = json!([
		{"type": "definitionList"},
		{"type": "definitionListItem", "attributes": {"style": "term"}},
		{"type": "paragraph"},
		"j",
		{"type": "/paragraph"},
		{"type": "/definitionListItem"},
		{"type": "definitionListItem", "attributes": {"style": "definition"}},
		{"type": "paragraph"},
		"k",
		{"type": "/paragraph"},
		{"type": "/definitionListItem"},
		{"type": "/definitionList"},
	]);
	let paragraphs = json!([
		{"type": "paragraph"},
		"l",
		{"type": "/paragraph"},
		{"type": "paragraph"},
		"m",
		{"type": "/paragraph"},
	]);
	[heading, table_open, nested_list, table_close, preformatted, definitions, paragraphs]
		.into_iter()
		.flat_map(tokens)
		.collect()
}

/// The example document with the default schema.
#[allow(dead_code, reason = "test helper used by individual test files")]
pub fn example_document() -> Document {
	Document::new(example_data()).expect("balanced example")
}

fn paragraph(text: &str) -> Vec<Value> {
	let mut data = vec![json!({"type": "paragraph"})];
	data.extend(text.chars().map(|ch| json!(ch.to_string())));
	data.push(json!({"type": "/paragraph"}));
	data
}

fn list_item(text: &str) -> Vec<Value> {
	let mut data = vec![json!({"type": "listItem"})];
	data.extend(paragraph(text));
	data.push(json!({"type": "/listItem"}));
	data
}

fn cell(text: &str) -> Vec<Value> {
	let mut data = vec![json!({"type": "tableCell", "attributes": {"style": "data"}})];
	data.extend(paragraph(text));
	data.push(json!({"type": "/tableCell"}));
	data
}

/// Full data of the isolation document, including a trailing meta item.
///
/// | offsets  | content |
/// |----------|---------|
/// | 0..32    | bullet list: "Bullet", "Item 2", "Item 3" |
/// | 32..43   | paragraph "Paragraph" |
/// | 43..79   | table row with cells "Cell 1", "Cell 2", "Cell 3" |
/// | 79..129  | bullet list: "Bullet" with a numbered list "Nested 1", "Nested 2", "Nested 3" |
#[allow(dead_code, reason = "test helper used by individual test files")]
pub fn isolation_full_data() -> Vec<Token> {
	let mut data: Vec<Value> = vec![json!({"type": "list", "attributes": {"style": "bullet"}})];
	for text in ["Bullet", "Item 2", "Item 3"] {
		data.extend(list_item(text));
	}
	data.push(json!({"type": "/list"}));
	data.extend(paragraph("Paragraph"));

	data.push(json!({"type": "table"}));
	data.push(json!({"type": "tableSection", "attributes": {"style": "body"}}));
	data.push(json!({"type": "tableRow"}));
	for text in ["Cell 1", "Cell 2", "Cell 3"] {
		data.extend(cell(text));
	}
	data.extend([json!({"type": "/tableRow"}), json!({"type": "/tableSection"}), json!({"type": "/table"})]);

	data.push(json!({"type": "list", "attributes": {"style": "bullet"}}));
	data.push(json!({"type": "listItem"}));
	data.extend(paragraph("Bullet"));
	data.push(json!({"type": "list", "attributes": {"style": "number"}}));
	for text in ["Nested 1", "Nested 2", "Nested 3"] {
		data.extend(list_item(text));
	}
	data.extend([json!({"type": "/list"}), json!({"type": "/listItem"}), json!({"type": "/list"})]);

	data.extend([json!({"type": "alienMeta"}), json!({"type": "/alienMeta"})]);
	tokens(Value::Array(data))
}

/// The isolation document with the default schema.
#[allow(dead_code, reason = "test helper used by individual test files")]
pub fn isolation_document() -> Document {
	Document::from_full_data(isolation_full_data(), Schema::default()).expect("balanced isolation data")
}
