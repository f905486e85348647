//! Fragments: ranges of a surface that stay valid across edits.
//!
//! A live fragment registers its range with the surface, which translates it
//! through every applied transaction. Range derivations return new fragments
//! and leave the original untouched; edits apply to the document and move the
//! fragment (and, unless disabled, the selection) to the edited content.
//!
//! The null fragment stands in for a range that could not be determined. All
//! of its queries are empty and its edits do nothing.

mod content;
mod structure;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

pub use content::Content;
use linea_primitives::{AnnotationSet, DOCUMENT_KIND, Range, Token, Transaction};
use tracing::trace;

use crate::document::{Child, Document, NodeRef};
use crate::error::FragmentError;
use crate::surface::{Surface, SurfaceState};

/// Unit to grow a fragment's range to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpandUnit {
	/// Nearest word boundaries around each end.
	Word,
	/// The run of leaves carrying the named annotation.
	Annotation(String),
	/// The whole document.
	Root,
	/// The covered siblings, whole.
	Siblings,
	/// The nearest node of the given type around the range.
	Closest(String),
	/// The parent of the covered siblings.
	Parent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
	Live(usize),
	Null,
	Destroyed,
}

/// A range of a [`Surface`] that is kept in place as the document changes.
#[derive(Debug)]
pub struct SurfaceFragment {
	surface: Weak<RefCell<SurfaceState>>,
	slot: Slot,
	auto_select: bool,
}

impl SurfaceFragment {
	pub(crate) fn register(surface: &Surface, range: Range, auto_select: bool) -> Self {
		let key = {
			let mut state = surface.state.borrow_mut();
			let range = range.clamp(0, state.document.len());
			state.fragments.insert(range)
		};
		Self {
			surface: Rc::downgrade(&surface.state),
			slot: Slot::Live(key),
			auto_select,
		}
	}

	pub(crate) fn null(surface: Weak<RefCell<SurfaceState>>, auto_select: bool) -> Self {
		Self {
			surface,
			slot: Slot::Null,
			auto_select,
		}
	}

	/// Returns the shared state and fragment key, or `None` for a null or
	/// destroyed fragment.
	fn context(&self) -> Result<Option<(Rc<RefCell<SurfaceState>>, usize)>, FragmentError> {
		match self.slot {
			Slot::Live(key) => self
				.surface
				.upgrade()
				.map(|state| Some((state, key)))
				.ok_or(FragmentError::Detached),
			Slot::Null | Slot::Destroyed => Ok(None),
		}
	}

	/// Runs `f` with the document and the current range. Null, destroyed and
	/// detached fragments yield `None`.
	fn read<T>(&self, f: impl FnOnce(&SurfaceState, Range) -> T) -> Option<T> {
		let (surface, key) = self.context().ok()??;
		let state = surface.borrow();
		let range = state.fragments.get(key).copied()?;
		Some(f(&*state, range))
	}

	/// Returns a fragment on the same surface over `range`, or the null
	/// fragment for `None`.
	fn derive(&self, range: Option<Range>) -> SurfaceFragment {
		match (range, self.surface.upgrade()) {
			(Some(range), Some(state)) if matches!(self.slot, Slot::Live(_)) => {
				SurfaceFragment::register(&Surface { state }, range, self.auto_select)
			}
			_ => SurfaceFragment::null(self.surface.clone(), self.auto_select),
		}
	}

	/// Builds a transaction from the current state and applies it.
	///
	/// `build` returns the transaction and an optional explicit range for the
	/// fragment afterwards; without one the range is translated. Returning
	/// `None` skips the edit.
	fn edit<F>(&mut self, build: F) -> Result<&mut Self, FragmentError>
	where
		F: FnOnce(&SurfaceState, Range) -> Result<Option<(Transaction, Option<Range>)>, FragmentError>,
	{
		let Some((surface, key)) = self.context()? else {
			return Ok(self);
		};
		let mut state = surface.borrow_mut();
		let Some(range) = state.fragments.get(key).copied() else {
			return Ok(self);
		};
		let Some((tx, next)) = build(&*state, range)? else {
			return Ok(self);
		};
		commit(&mut state, key, &tx, next, self.auto_select)?;
		Ok(self)
	}

	/// Returns the current range, or `None` for a null fragment.
	pub fn range(&self) -> Option<Range> {
		self.read(|_, range| range)
	}

	/// Returns true if this is the null fragment.
	pub fn is_null(&self) -> bool {
		self.slot == Slot::Null
	}

	/// Returns true once [`destroy`](Self::destroy) has been called.
	pub fn is_destroyed(&self) -> bool {
		self.slot == Slot::Destroyed
	}

	/// Returns true if edits through this fragment move the selection.
	pub fn will_auto_select(&self) -> bool {
		self.auto_select
	}

	/// Returns the surface, if it still exists.
	pub fn surface(&self) -> Option<Surface> {
		self.surface.upgrade().map(|state| Surface { state })
	}

	/// Runs `f` with the surface's document, if the surface still exists.
	///
	/// Null and destroyed fragments still read the document they came from.
	pub fn with_document<T>(&self, f: impl FnOnce(&Document) -> T) -> Option<T> {
		let surface = self.surface.upgrade()?;
		let state = surface.borrow();
		Some(f(&state.document))
	}

	/// Stops tracking edits. Queries are empty and edits do nothing
	/// afterwards.
	pub fn destroy(&mut self) {
		self.release();
		self.slot = Slot::Destroyed;
	}

	fn release(&mut self) {
		let Slot::Live(key) = self.slot else {
			return;
		};
		let Some(surface) = self.surface.upgrade() else {
			return;
		};
		if let Ok(mut state) = surface.try_borrow_mut()
			&& state.fragments.contains(key)
		{
			state.fragments.remove(key);
		}
	}

	/// Returns the tokens in range.
	pub fn get_data(&self) -> Vec<Token> {
		self.read(|state, range| state.document.get_data(Some(range)))
			.unwrap_or_default()
	}

	/// Returns the text of the leaves in range.
	pub fn get_text(&self) -> String {
		self.read(|state, range| state.document.get_text(range)).unwrap_or_default()
	}

	/// Returns the annotations in range: those on every leaf, or on any leaf
	/// if `all` is set.
	///
	/// A collapsed range reports what an insertion there would receive.
	pub fn get_annotations(&self, all: bool) -> AnnotationSet {
		self.read(|state, range| {
			if range.is_collapsed() {
				state.insertion_annotations_at(range.start())
			} else {
				state.document.annotations_from_range(range, all)
			}
		})
		.unwrap_or_default()
	}

	/// Returns a fragment with each end of the range shifted.
	pub fn adjust_range(&self, from_delta: isize, to_delta: isize) -> SurfaceFragment {
		let range = self.range().map(|range| range.adjust(from_delta, to_delta));
		self.derive(range)
	}

	/// Returns a fragment collapsed to the start of the range.
	pub fn collapse_range(&self) -> SurfaceFragment {
		let range = self.range().map(|range| Range::point(range.start()));
		self.derive(range)
	}

	/// Returns a fragment whose range is grown to `unit`.
	///
	/// Units that do not apply, such as an unknown type for
	/// [`ExpandUnit::Closest`], yield the null fragment.
	pub fn expand_range(&self, unit: ExpandUnit) -> SurfaceFragment {
		let range = self
			.read(|state, range| expanded(&state.document, range, &unit))
			.flatten();
		if range.is_none() {
			trace!(?unit, "fragment.expand: no range");
		}
		self.derive(range)
	}
}

impl Drop for SurfaceFragment {
	fn drop(&mut self) {
		self.release();
	}
}

/// Applies `tx` to the surface and places the fragment.
fn commit(
	state: &mut SurfaceState,
	key: usize,
	tx: &Transaction,
	next: Option<Range>,
	auto_select: bool,
) -> Result<(), FragmentError> {
	let Some(current) = state.fragments.get(key).copied() else {
		return Ok(());
	};
	if tx.is_noop() {
		trace!(key, "fragment.edit: no-op");
		if let Some(range) = next {
			let len = state.document.len();
			state.fragments[key] = range.clamp(0, len);
		}
		return Ok(());
	}
	let next = next.unwrap_or_else(|| tx.translate_range(current));
	state.change(tx, auto_select.then_some(next), true)?;
	let next = next.clamp(0, state.document.len());
	state.fragments[key] = next;
	Ok(())
}

fn expanded(doc: &Document, range: Range, unit: &ExpandUnit) -> Option<Range> {
	match unit {
		ExpandUnit::Word => {
			if range.is_collapsed() {
				return Some(doc.nearest_word_range(range.start()));
			}
			let start = doc.nearest_word_range(range.start());
			let end = doc.nearest_word_range(range.end());
			Some(Range::new(start.start(), end.end()).with_direction(range.direction()))
		}
		ExpandUnit::Annotation(name) => doc.annotated_range(range, name),
		ExpandUnit::Root => Some(Range::new(0, doc.len())),
		ExpandUnit::Siblings => {
			let (_, children) = doc.covered_children(range);
			let first = children.first()?.outer_range();
			let last = children.last()?.outer_range();
			Some(first.expand(&last))
		}
		ExpandUnit::Closest(kind) => {
			if kind != DOCUMENT_KIND && !doc.schema().contains(kind) {
				return None;
			}
			let (ancestor, children) = doc.covered_children(range);
			let mut current = match children.first() {
				Some(Child::Node(node)) => Some(*node),
				_ => ancestor,
			};
			loop {
				if doc.kind_of(current) == kind {
					return Some(outer_or_root(doc, current));
				}
				current = doc.parent_node(current?);
			}
		}
		ExpandUnit::Parent => {
			let (ancestor, _) = doc.covered_children(range);
			Some(outer_or_root(doc, ancestor))
		}
	}
}

fn outer_or_root(doc: &Document, node: Option<NodeRef>) -> Range {
	node.map_or_else(|| Range::new(0, doc.len()), |node| node.outer_range())
}
