//! Structural queries over the linear data.
//!
//! Nodes are addressed by the offsets of their markers. The document itself
//! is the implicit root and is represented by `None` wherever a parent is
//! returned.

use linea_primitives::{DOCUMENT_KIND, Element, NodeCategory, Offset, Range, Token};

use super::Document;

/// An element node located by its open and close marker offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef {
	/// Offset of the open marker.
	pub open: Offset,
	/// Offset of the close marker.
	pub close: Offset,
}

impl NodeRef {
	/// Range covering both markers.
	pub fn outer_range(&self) -> Range {
		Range::new(self.open, self.close + 1)
	}

	/// Range between the markers.
	pub fn inner_range(&self) -> Range {
		Range::new(self.open + 1, self.close)
	}
}

/// A direct child of a node: either an element or a run of leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Child {
	/// An element child.
	Node(NodeRef),
	/// Consecutive leaves.
	Text(Range),
}

impl Child {
	/// Range the child occupies in its parent.
	pub fn outer_range(&self) -> Range {
		match self {
			Child::Node(node) => node.outer_range(),
			Child::Text(range) => *range,
		}
	}

	/// Returns the element node, if this child is one.
	pub fn node(&self) -> Option<NodeRef> {
		match self {
			Child::Node(node) => Some(*node),
			Child::Text(_) => None,
		}
	}
}

impl Document {
	/// Returns the node whose open marker is at `offset`.
	pub fn node_at(&self, offset: Offset) -> Option<NodeRef> {
		match self.data.get(offset)? {
			Token::Open(_) => Some(NodeRef {
				open: offset,
				close: self.matching_marker(offset)?,
			}),
			_ => None,
		}
	}

	/// Returns the element of `node`.
	pub fn element(&self, node: NodeRef) -> Option<&Element> {
		self.data.get(node.open)?.as_element()
	}

	/// Returns the type of `node`, or of the document for `None`.
	pub fn kind_of(&self, node: Option<NodeRef>) -> &str {
		node.and_then(|node| self.element(node))
			.map(|element| element.kind.as_str())
			.unwrap_or(DOCUMENT_KIND)
	}

	/// Returns the innermost node containing the position `offset`.
	///
	/// A position belongs to a node when it lies between its markers, so the
	/// offsets of a node's own open marker and the one after its close marker
	/// belong to its parent.
	pub fn parent_of(&self, offset: Offset) -> Option<NodeRef> {
		let offset = offset.min(self.len());
		let mut depth = 0usize;
		for i in (0..offset).rev() {
			match &self.data[i] {
				Token::Close(_) => depth += 1,
				Token::Open(_) if depth == 0 => return self.node_at(i),
				Token::Open(_) => depth -= 1,
				Token::Leaf(_) => {}
			}
		}
		None
	}

	/// Returns the parent of `node`, `None` for the document.
	pub fn parent_node(&self, node: NodeRef) -> Option<NodeRef> {
		self.parent_of(node.open)
	}

	/// Returns the chain of nodes containing `offset`, innermost first.
	pub fn ancestors(&self, offset: Offset) -> Vec<NodeRef> {
		let mut chain = Vec::new();
		let mut current = self.parent_of(offset);
		while let Some(node) = current {
			chain.push(node);
			current = self.parent_node(node);
		}
		chain
	}

	/// Returns the deepest node containing both ends of `range`.
	pub fn common_ancestor(&self, range: Range) -> Option<NodeRef> {
		let end_chain = self.ancestors(range.end());
		self.ancestors(range.start())
			.into_iter()
			.find(|node| end_chain.contains(node))
	}

	/// Returns the direct children of `parent`, or of the document for `None`.
	pub fn children(&self, parent: Option<NodeRef>) -> Vec<Child> {
		let inner = match parent {
			Some(node) => node.inner_range(),
			None => Range::new(0, self.len()),
		};
		let mut children = Vec::new();
		let mut i = inner.start();
		while i < inner.end() {
			match &self.data[i] {
				Token::Open(_) => {
					let close = self.matching_marker(i).unwrap_or(inner.end() - 1);
					children.push(Child::Node(NodeRef { open: i, close }));
					i = close + 1;
				}
				Token::Leaf(_) => {
					let start = i;
					while i < inner.end() && self.data[i].is_leaf() {
						i += 1;
					}
					children.push(Child::Text(Range::new(start, i)));
				}
				Token::Close(_) => i += 1,
			}
		}
		children
	}

	/// Returns the children of the deepest common ancestor of `range` that the
	/// range touches.
	///
	/// A collapsed range touches the child it sits inside, or the text run it
	/// borders.
	pub fn covered_children(&self, range: Range) -> (Option<NodeRef>, Vec<Child>) {
		let range = range.normalized().clamp(0, self.len());
		let ancestor = self.common_ancestor(range);
		let children = self
			.children(ancestor)
			.into_iter()
			.filter(|child| {
				let outer = child.outer_range();
				if range.is_collapsed() {
					match child {
						Child::Node(_) => outer.start() < range.start() && range.start() < outer.end(),
						Child::Text(_) => outer.contains_offset(range.start()),
					}
				} else {
					outer.overlaps(&range)
				}
			})
			.collect();
		(ancestor, children)
	}

	/// Returns the element nodes `range` covers.
	///
	/// When the range lies inside a content branch, that branch is the single
	/// covered node.
	pub fn covered_nodes(&self, range: Range) -> Vec<NodeRef> {
		let (ancestor, children) = self.covered_children(range);
		if let Some(node) = ancestor
			&& self.is_content_branch(node)
		{
			return vec![node];
		}
		children.iter().filter_map(Child::node).collect()
	}

	/// Returns true if `node` holds leaf content directly.
	pub fn is_content_branch(&self, node: NodeRef) -> bool {
		self.schema.category(self.kind_of(Some(node))) == Some(NodeCategory::Content)
	}

	/// Returns every content branch `range` touches, in document order.
	pub fn content_branches(&self, range: Range) -> Vec<NodeRef> {
		let range = range.normalized().clamp(0, self.len());
		let mut branches = Vec::new();
		for (open, token) in self.data.iter().enumerate() {
			let Some(element) = token.as_element() else {
				continue;
			};
			if !self.schema.is_content(&element.kind) {
				continue;
			}
			let Some(node) = self.node_at(open) else {
				continue;
			};
			if node.open < range.end() && range.start() <= node.close {
				branches.push(node);
			}
		}
		branches
	}

	/// Returns the index of `node` among its parent's children, and the
	/// number of those children.
	pub fn child_position(&self, node: NodeRef) -> Option<(usize, usize)> {
		let siblings = self.children(self.parent_node(node));
		let index = siblings.iter().position(|child| *child == Child::Node(node))?;
		Some((index, siblings.len()))
	}
}
