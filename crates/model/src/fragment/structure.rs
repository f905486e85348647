//! Structural edits: wrapping, unwrapping and isolating nodes.

use linea_primitives::token::closers_for;
use linea_primitives::{Bias, Element, Range, Token, Transaction};
use tracing::{debug, trace};

use super::SurfaceFragment;
use crate::document::Document;
use crate::error::{FragmentError, WrapError};
use crate::transaction::{new_from_insertion, new_from_wrap};

impl SurfaceFragment {
	/// Wraps each node in range in `wrapper`, outermost first.
	pub fn wrap_nodes(&mut self, wrapper: &[Element]) -> Result<&mut Self, FragmentError> {
		self.edit(|state, range| {
			let tx = new_from_wrap(&state.document, range, &[], &[], &[], wrapper)?;
			Ok(Some((tx, None)))
		})
	}

	/// Wraps the whole range once in `wrapper`, outermost first.
	pub fn wrap_all_nodes(&mut self, wrapper: &[Element]) -> Result<&mut Self, FragmentError> {
		self.edit(|state, range| {
			let tx = new_from_wrap(&state.document, range, &[], wrapper, &[], &[])?;
			Ok(Some((tx, None)))
		})
	}

	/// Removes `outer_depth` levels of nodes around the range and
	/// `inner_depth` levels from each node inside it.
	pub fn unwrap_nodes(&mut self, outer_depth: usize, inner_depth: usize) -> Result<&mut Self, FragmentError> {
		self.edit(|state, range| {
			let doc = &state.document;
			let range = range.normalized();
			check_inner_depth(range, inner_depth)?;
			let outer = elements_before(doc, range.start(), outer_depth)?;
			let inner = elements_from(doc, range.start(), inner_depth)?;
			let tx = new_from_wrap(doc, range, &outer, &[], &inner, &[])?;
			Ok(Some((tx, None)))
		})
	}

	/// Replaces `depth` levels of each node in range with `wrapper`.
	pub fn rewrap_nodes(&mut self, depth: usize, wrapper: &[Element]) -> Result<&mut Self, FragmentError> {
		self.edit(|state, range| {
			let doc = &state.document;
			let range = range.normalized();
			check_inner_depth(range, depth)?;
			let unwrap = elements_from(doc, range.start(), depth)?;
			let tx = new_from_wrap(doc, range, &[], &[], &unwrap, wrapper)?;
			Ok(Some((tx, None)))
		})
	}

	/// Replaces the outer `depth` levels of the range, which must wrap it
	/// exactly, with `wrapper`.
	pub fn rewrap_all_nodes(&mut self, depth: usize, wrapper: &[Element]) -> Result<&mut Self, FragmentError> {
		self.edit(|state, range| {
			let doc = &state.document;
			let range = range.normalized();
			check_inner_depth(range, depth)?;
			let unwrap = elements_from(doc, range.start(), depth)?;
			let inner = Range::new(range.start() + depth, range.end() - depth);
			let tx = new_from_wrap(doc, inner, &unwrap, wrapper, &[], &[])?;
			Ok(Some((tx, None)))
		})
	}

	/// Moves the covered nodes out of ancestors that may not contain nodes of
	/// type `kind`, splitting those ancestors around them.
	///
	/// Returns a fragment over the isolated nodes. Types without parent
	/// restrictions leave the document alone; unknown types yield the null
	/// fragment.
	pub fn isolate_and_unwrap(&mut self, kind: &str) -> Result<SurfaceFragment, FragmentError> {
		let Some((surface, key)) = self.context()? else {
			return Ok(self.derive(None));
		};
		let (known, plan) = {
			let state = surface.borrow();
			let Some(range) = state.fragments.get(key).copied() else {
				return Ok(self.derive(None));
			};
			let doc = &state.document;
			(doc.schema().contains(kind), plan_isolation(doc, range, kind))
		};
		if !known {
			trace!(kind, "fragment.isolate: unknown type");
			return Ok(self.derive(None));
		}
		let Some(plan) = plan else {
			trace!(kind, "fragment.isolate: nothing to split");
			return Ok(self.derive(self.range()));
		};
		debug!(
			kind,
			depth = plan.depth,
			start_split = plan.start_split.len(),
			end_split = plan.end_split.len(),
			"fragment.isolate"
		);

		let mut target = plan.target;
		let mut end_offset = plan.end_offset;
		if !plan.start_split.is_empty() {
			let data = split_markers(&plan.start_split);
			let shift = data.len();
			let offset = plan.start_offset;
			self.edit(|state, range| {
				let tx = new_from_insertion(&state.document, offset, data);
				let next = translate_with(&tx, range, Bias::Right);
				Ok(Some((tx, Some(next))))
			})?;
			target = target.translate_by(shift as isize);
			end_offset += shift;
		}
		if !plan.end_split.is_empty() {
			let data = split_markers(&plan.end_split);
			self.edit(|state, range| {
				let tx = new_from_insertion(&state.document, end_offset, data);
				let next = translate_with(&tx, range, Bias::Left);
				Ok(Some((tx, Some(next))))
			})?;
		}

		let mut isolated = None;
		self.edit(|state, _| {
			let doc = &state.document;
			let outer = elements_before(doc, target.start(), plan.depth)?;
			let tx = new_from_wrap(doc, target, &outer, &[], &[], &[])?;
			isolated = Some(tx.translate_range(target));
			Ok(Some((tx, None)))
		})?;
		Ok(self.derive(isolated))
	}
}

/// Splits and unwrapping needed to isolate a range.
#[derive(Debug)]
struct Isolation {
	/// Outer range of the covered nodes.
	target: Range,
	/// Ancestor levels to unwrap.
	depth: usize,
	/// Ancestors to split before the nodes, outermost first.
	start_split: Vec<Element>,
	start_offset: usize,
	/// Ancestors to split after the nodes, outermost first.
	end_split: Vec<Element>,
	end_offset: usize,
}

/// Climbs from the nodes `range` covers until their parent allows `kind`.
///
/// Each ancestor passed is split where the nodes do not reach its edge; once
/// one side is split, every ancestor above it is split on that side too.
fn plan_isolation(doc: &Document, range: Range, kind: &str) -> Option<Isolation> {
	let allowed = doc.schema().suggested_parents(kind)?;
	let nodes = doc.covered_nodes(range);
	let (first, last) = (*nodes.first()?, *nodes.last()?);

	let mut plan = Isolation {
		target: Range::new(first.open, last.close + 1),
		depth: 0,
		start_split: Vec::new(),
		start_offset: first.open,
		end_split: Vec::new(),
		end_offset: last.close + 1,
	};
	let (mut start_node, mut end_node) = (first, last);
	let (mut split_start, mut split_end) = (false, false);
	loop {
		let parent = doc.parent_node(start_node);
		let parent_kind = doc.kind_of(parent);
		if allowed.iter().any(|allowed| allowed == parent_kind) {
			break;
		}
		let Some(parent) = parent else {
			break;
		};
		let (first_index, _) = doc.child_position(start_node)?;
		let (last_index, count) = doc.child_position(end_node)?;
		split_start |= first_index > 0;
		split_end |= last_index + 1 < count;

		let element = doc.element(parent)?;
		if split_start {
			plan.start_split.insert(0, element.clone());
		} else {
			plan.start_offset = parent.open;
		}
		if split_end {
			plan.end_split.insert(0, element.clone());
		} else {
			plan.end_offset = parent.close + 1;
		}
		start_node = parent;
		end_node = parent;
		plan.depth += 1;
	}
	(plan.depth > 0).then_some(plan)
}

/// Closes `ancestors` (outermost first) and reopens fresh copies of them.
fn split_markers(ancestors: &[Element]) -> Vec<Token> {
	let mut data = closers_for(ancestors);
	data.extend(ancestors.iter().map(|element| Token::Open(element.fresh())));
	data
}

fn translate_with(tx: &Transaction, range: Range, bias: Bias) -> Range {
	range.map(|offset| tx.translate_offset(offset, bias))
}

fn check_inner_depth(range: Range, depth: usize) -> Result<(), WrapError> {
	if range.len() < depth * 2 {
		return Err(WrapError::UnwrapDepth {
			requested: depth,
			available: range.len() / 2,
		});
	}
	Ok(())
}

/// Elements opened at the `depth` offsets before `offset`, outermost first.
fn elements_before(doc: &Document, offset: usize, depth: usize) -> Result<Vec<Element>, WrapError> {
	let mut elements = collect_elements(doc, (1..=depth).map(|i| offset.checked_sub(i)), depth)?;
	elements.reverse();
	Ok(elements)
}

/// Elements opened at the `depth` offsets from `offset` on, outermost first.
fn elements_from(doc: &Document, offset: usize, depth: usize) -> Result<Vec<Element>, WrapError> {
	collect_elements(doc, (0..depth).map(|i| Some(offset + i)), depth)
}

fn collect_elements(
	doc: &Document,
	offsets: impl Iterator<Item = Option<usize>>,
	requested: usize,
) -> Result<Vec<Element>, WrapError> {
	let mut elements = Vec::with_capacity(requested);
	for offset in offsets {
		let Some(element) = offset.and_then(|offset| doc.token(offset)).and_then(Token::as_element) else {
			return Err(WrapError::UnwrapDepth {
				requested,
				available: elements.len(),
			});
		};
		elements.push(element.clone());
	}
	Ok(elements)
}
