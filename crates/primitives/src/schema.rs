//! Node compatibility table.
//!
//! The [`Schema`] records, per element type, which category of node it is
//! and which parent types it may be placed in. Structural operations consult
//! it instead of hard-coding type relationships.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Type of the implicit root node.
pub const DOCUMENT_KIND: &str = "document";

/// Broad classification of an element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeCategory {
	/// Holds other nodes (lists, tables, cells).
	Branch,
	/// Holds leaf content directly (paragraphs, headings).
	Content,
	/// Sits inside content alongside leaves (images).
	Inline,
	/// Kept outside the linear data (comments, unknown markup).
	Meta,
}

/// Rules for one element type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRules {
	/// Node category.
	pub category: NodeCategory,
	/// Allowed parent types, `None` for anywhere.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub parents: Option<Vec<String>>,
}

impl NodeRules {
	/// Rules for a type allowed anywhere.
	pub fn new(category: NodeCategory) -> Self {
		Self { category, parents: None }
	}

	/// Restricts the allowed parent types.
	pub fn with_parents<I, S>(mut self, parents: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.parents = Some(parents.into_iter().map(Into::into).collect());
		self
	}
}

/// Node compatibility table keyed by element type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
	nodes: IndexMap<String, NodeRules>,
}

impl Default for Schema {
	fn default() -> Self {
		use NodeCategory::*;

		let mut schema = Schema::empty();
		schema.register(DOCUMENT_KIND, NodeRules::new(Branch));
		for kind in ["paragraph", "heading", "preformatted"] {
			schema.register(kind, NodeRules::new(Content));
		}
		schema.register("title", NodeRules::new(Content).with_parents([DOCUMENT_KIND]));
		for kind in [
			"list",
			"listItem",
			"definitionList",
			"definitionListItem",
			"table",
			"tableSection",
			"tableRow",
			"tableCell",
		] {
			schema.register(kind, NodeRules::new(Branch));
		}
		schema.register("image", NodeRules::new(Inline));
		schema.register("alienMeta", NodeRules::new(Meta));
		schema.register("comment", NodeRules::new(Meta));
		schema
	}
}

impl Schema {
	/// Creates a table with no registered types.
	pub fn empty() -> Self {
		Self { nodes: IndexMap::new() }
	}

	/// Registers or replaces the rules for `kind`.
	pub fn register(&mut self, kind: impl Into<String>, rules: NodeRules) {
		self.nodes.insert(kind.into(), rules);
	}

	/// Returns the rules for `kind`.
	pub fn rules(&self, kind: &str) -> Option<&NodeRules> {
		self.nodes.get(kind)
	}

	/// Returns true if `kind` is registered.
	pub fn contains(&self, kind: &str) -> bool {
		self.nodes.contains_key(kind)
	}

	/// Iterates registered types in registration order.
	pub fn kinds(&self) -> impl Iterator<Item = &str> {
		self.nodes.keys().map(String::as_str)
	}

	/// Returns the category of `kind`.
	pub fn category(&self, kind: &str) -> Option<NodeCategory> {
		self.rules(kind).map(|rules| rules.category)
	}

	/// Returns true if `kind` holds leaf content directly.
	pub fn is_content(&self, kind: &str) -> bool {
		self.category(kind) == Some(NodeCategory::Content)
	}

	/// Returns true if `kind` is kept outside the linear data.
	pub fn is_meta(&self, kind: &str) -> bool {
		self.category(kind) == Some(NodeCategory::Meta)
	}

	/// Returns the allowed parent types of `kind`.
	///
	/// `None` when the type is unknown or may appear anywhere.
	pub fn suggested_parents(&self, kind: &str) -> Option<&[String]> {
		self.rules(kind)?.parents.as_deref()
	}

	/// Returns true if `child` may be placed inside `parent`.
	pub fn allows_parent(&self, child: &str, parent: &str) -> bool {
		match self.suggested_parents(child) {
			Some(parents) => parents.iter().any(|p| p == parent),
			None => true,
		}
	}
}
