//! Tokens of the linear document representation.
//!
//! A document is a flat sequence of [`Token`]s. Structure is expressed by
//! balanced [`Token::Open`]/[`Token::Close`] markers; content lives in
//! [`Token::Leaf`]s between them.
//!
//! The serialized form mirrors the usual linear-model JSON:
//!
//! ```text
//! "a"                                         plain leaf
//! ["b", [{"name": "textStyle/bold"}]]         annotated leaf
//! {"type": "heading", "attributes": {...}}    open marker
//! {"type": "/heading"}                        close marker
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::annotation::AnnotationSet;

/// Element attributes, in insertion order.
pub type Attributes = IndexMap<String, Value>;

/// Change counters kept on open markers by transaction application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Changed {
	/// Marker inserted by a transaction.
	#[serde(default, skip_serializing_if = "is_zero")]
	pub created: u32,
	/// Node split or re-closed by a transaction.
	#[serde(default, skip_serializing_if = "is_zero")]
	pub rebuilt: u32,
	/// Leaf content directly inside the node was inserted or removed.
	#[serde(default, skip_serializing_if = "is_zero")]
	pub content: u32,
	/// Attributes of the node changed.
	#[serde(default, skip_serializing_if = "is_zero")]
	pub attributes: u32,
	/// Annotations of leaf content directly inside the node changed.
	#[serde(default, skip_serializing_if = "is_zero")]
	pub annotations: u32,
}

fn is_zero(n: &u32) -> bool {
	*n == 0
}

impl Changed {
	/// Returns true if no counter is set.
	pub fn is_empty(&self) -> bool {
		*self == Changed::default()
	}
}

/// Bookkeeping carried by open markers. Never part of the document content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Internal {
	/// Change counters.
	#[serde(default, skip_serializing_if = "Changed::is_empty")]
	pub changed: Changed,
}

impl Internal {
	/// Returns true if no bookkeeping is recorded.
	pub fn is_empty(&self) -> bool {
		self.changed.is_empty()
	}
}

/// The payload of an open marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
	/// Element type, e.g. `paragraph`.
	pub kind: String,
	/// Element attributes.
	pub attributes: Attributes,
	/// Bookkeeping maintained by transaction application.
	pub internal: Internal,
}

impl Element {
	/// Creates an element without attributes.
	pub fn new(kind: impl Into<String>) -> Self {
		Self {
			kind: kind.into(),
			attributes: Attributes::new(),
			internal: Internal::default(),
		}
	}

	/// Builder-style attribute setter.
	pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
		self.attributes.insert(key.into(), value);
		self
	}

	/// Returns an attribute value.
	pub fn attribute(&self, key: &str) -> Option<&Value> {
		self.attributes.get(key)
	}

	/// Returns a copy without bookkeeping, suitable for inserting as a new marker.
	pub fn fresh(&self) -> Self {
		Self {
			kind: self.kind.clone(),
			attributes: self.attributes.clone(),
			internal: Internal::default(),
		}
	}

	/// Returns the close marker matching this element.
	pub fn closer(&self) -> Token {
		Token::Close(self.kind.clone())
	}
}

/// A unit of leaf content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
	/// The character.
	pub ch: char,
	/// Annotations covering the character.
	pub annotations: AnnotationSet,
}

/// One element of the linear document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawToken", into = "RawToken")]
pub enum Token {
	/// Leaf content.
	Leaf(Leaf),
	/// Open marker of a node.
	Open(Element),
	/// Close marker of a node, carrying only its type.
	Close(String),
}

impl Token {
	/// Creates a plain leaf.
	pub fn char(ch: char) -> Self {
		Token::Leaf(Leaf {
			ch,
			annotations: AnnotationSet::new(),
		})
	}

	/// Creates an annotated leaf.
	pub fn annotated(ch: char, annotations: AnnotationSet) -> Self {
		Token::Leaf(Leaf { ch, annotations })
	}

	/// Creates an open marker.
	pub fn open(element: Element) -> Self {
		Token::Open(element)
	}

	/// Creates a close marker.
	pub fn close(kind: impl Into<String>) -> Self {
		Token::Close(kind.into())
	}

	/// Returns true for leaf content.
	pub fn is_leaf(&self) -> bool {
		matches!(self, Token::Leaf(_))
	}

	/// Returns true for open markers.
	pub fn is_open(&self) -> bool {
		matches!(self, Token::Open(_))
	}

	/// Returns true for close markers.
	pub fn is_close(&self) -> bool {
		matches!(self, Token::Close(_))
	}

	/// Returns the element type of a marker.
	pub fn kind(&self) -> Option<&str> {
		match self {
			Token::Open(element) => Some(&element.kind),
			Token::Close(kind) => Some(kind),
			Token::Leaf(_) => None,
		}
	}

	/// Returns the leaf payload.
	pub fn as_leaf(&self) -> Option<&Leaf> {
		match self {
			Token::Leaf(leaf) => Some(leaf),
			_ => None,
		}
	}

	/// Returns the leaf payload mutably.
	pub fn as_leaf_mut(&mut self) -> Option<&mut Leaf> {
		match self {
			Token::Leaf(leaf) => Some(leaf),
			_ => None,
		}
	}

	/// Returns the element of an open marker.
	pub fn as_element(&self) -> Option<&Element> {
		match self {
			Token::Open(element) => Some(element),
			_ => None,
		}
	}

	/// Returns the element of an open marker mutably.
	pub fn as_element_mut(&mut self) -> Option<&mut Element> {
		match self {
			Token::Open(element) => Some(element),
			_ => None,
		}
	}

	/// Compares variant, type and character, ignoring attributes,
	/// annotations and bookkeeping.
	pub fn same_shape(&self, other: &Token) -> bool {
		match (self, other) {
			(Token::Leaf(a), Token::Leaf(b)) => a.ch == b.ch,
			(Token::Open(a), Token::Open(b)) => a.kind == b.kind,
			(Token::Close(a), Token::Close(b)) => a == b,
			_ => false,
		}
	}

	/// Returns a copy with bookkeeping cleared.
	pub fn without_internal(&self) -> Token {
		match self {
			Token::Open(element) => Token::Open(element.fresh()),
			other => other.clone(),
		}
	}
}

impl From<char> for Token {
	fn from(ch: char) -> Self {
		Token::char(ch)
	}
}

/// Converts text into plain single-character leaves.
pub fn text_to_tokens(text: &str) -> Vec<Token> {
	text.chars().map(Token::char).collect()
}

/// Returns the close markers for `openers`, innermost first.
pub fn closers_for(openers: &[Element]) -> Vec<Token> {
	openers.iter().rev().map(Element::closer).collect()
}

/// Marker balance violation found at `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unbalanced marker at offset {offset}")]
pub struct Unbalanced {
	/// Offset of the first offending token, or the data length for unclosed openers.
	pub offset: usize,
}

/// Pairs every marker with its partner.
///
/// Entry `i` holds the offset of the marker matching token `i`, or `None` for
/// leaves.
pub fn pair_markers(tokens: &[Token]) -> Result<Vec<Option<usize>>, Unbalanced> {
	let mut pairs = vec![None; tokens.len()];
	let mut stack: Vec<usize> = Vec::new();
	for (i, token) in tokens.iter().enumerate() {
		match token {
			Token::Leaf(_) => {}
			Token::Open(_) => stack.push(i),
			Token::Close(kind) => {
				let Some(open) = stack.pop() else {
					return Err(Unbalanced { offset: i });
				};
				if tokens[open].kind() != Some(kind.as_str()) {
					return Err(Unbalanced { offset: i });
				}
				pairs[open] = Some(i);
				pairs[i] = Some(open);
			}
		}
	}
	match stack.first() {
		Some(&open) => Err(Unbalanced { offset: open }),
		None => Ok(pairs),
	}
}

/// Checks that every open marker is closed by a marker of the same type.
pub fn check_balance(tokens: &[Token]) -> Result<(), Unbalanced> {
	pair_markers(tokens).map(|_| ())
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawToken {
	Char(char),
	Annotated(char, AnnotationSet),
	Marker(RawMarker),
}

#[derive(Serialize, Deserialize)]
struct RawMarker {
	#[serde(rename = "type")]
	kind: String,
	#[serde(default, skip_serializing_if = "IndexMap::is_empty")]
	attributes: Attributes,
	#[serde(default, skip_serializing_if = "Internal::is_empty")]
	internal: Internal,
}

impl TryFrom<RawToken> for Token {
	type Error = String;

	fn try_from(raw: RawToken) -> Result<Self, Self::Error> {
		Ok(match raw {
			RawToken::Char(ch) => Token::char(ch),
			RawToken::Annotated(ch, annotations) => Token::annotated(ch, annotations),
			RawToken::Marker(marker) => match marker.kind.strip_prefix('/') {
				Some("") => return Err("close marker without a type".to_string()),
				Some(kind) => Token::Close(kind.to_string()),
				None if marker.kind.is_empty() => return Err("open marker without a type".to_string()),
				None => Token::Open(Element {
					kind: marker.kind,
					attributes: marker.attributes,
					internal: marker.internal,
				}),
			},
		})
	}
}

impl From<Token> for RawToken {
	fn from(token: Token) -> Self {
		match token {
			Token::Leaf(leaf) if leaf.annotations.is_empty() => RawToken::Char(leaf.ch),
			Token::Leaf(leaf) => RawToken::Annotated(leaf.ch, leaf.annotations),
			Token::Open(element) => RawToken::Marker(RawMarker {
				kind: element.kind,
				attributes: element.attributes,
				internal: element.internal,
			}),
			Token::Close(kind) => RawToken::Marker(RawMarker {
				kind: format!("/{kind}"),
				attributes: Attributes::new(),
				internal: Internal::default(),
			}),
		}
	}
}
