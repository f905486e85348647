//! Editing surface: a document, its selection, undo history and the live
//! fragments that follow edits.

mod history;
#[cfg(test)]
mod tests;

use std::cell::{Ref, RefCell};
use std::rc::Rc;

pub use history::{History, MAX_UNDO, UndoStep};
use linea_primitives::{AnnotationSet, Range, Transaction};
use slab::Slab;
use tracing::{debug, trace};

use crate::document::{Document, Patch};
use crate::error::TransactionError;
use crate::fragment::SurfaceFragment;

/// Shared state behind a [`Surface`] and its fragments.
#[derive(Debug)]
pub(crate) struct SurfaceState {
	pub(crate) document: Document,
	pub(crate) selection: Range,
	/// Ranges of live fragments, keyed by fragment.
	pub(crate) fragments: Slab<Range>,
	pub(crate) history: History,
	/// Explicit annotations for the next insertion at a collapsed selection.
	pub(crate) insertion_annotations: Option<AnnotationSet>,
}

impl SurfaceState {
	/// Applies `tx` and moves every live fragment and the selection through it.
	///
	/// `selection` overrides the translated selection.
	pub(crate) fn change(
		&mut self,
		tx: &Transaction,
		selection: Option<Range>,
		record: bool,
	) -> Result<Patch, TransactionError> {
		let patch = self.document.apply_transaction(tx)?;
		for (_, range) in self.fragments.iter_mut() {
			*range = tx.translate_range(*range);
		}
		let before = self.selection;
		self.selection = selection.unwrap_or_else(|| tx.translate_range(before)).clamp(0, self.document.len());
		if self.selection != before {
			self.insertion_annotations = None;
		}
		if record {
			self.history.record_transaction(tx.clone(), before, self.selection);
		}
		debug!(
			version = patch.version,
			ops = tx.operations().len(),
			len_before = patch.len_before,
			len_after = patch.len_after,
			fragments = self.fragments.len(),
			"surface.change"
		);
		Ok(patch)
	}

	/// Sets the selection, clamped to the document.
	///
	/// Moving the selection drops explicit insertion annotations.
	pub(crate) fn set_selection(&mut self, range: Range) {
		let range = range.clamp(0, self.document.len());
		if range != self.selection {
			self.insertion_annotations = None;
		}
		self.selection = range;
	}

	/// Annotations the next insertion at `offset` receives.
	///
	/// The explicit override only applies at the start of the selection.
	pub(crate) fn insertion_annotations_at(&self, offset: usize) -> AnnotationSet {
		match &self.insertion_annotations {
			Some(annotations) if offset == self.selection.start() => annotations.clone(),
			_ => self.document.insertion_annotations(offset),
		}
	}
}

/// A document being edited, with selection and history.
///
/// Cloning yields another handle to the same surface.
#[derive(Debug, Clone)]
pub struct Surface {
	pub(crate) state: Rc<RefCell<SurfaceState>>,
}

impl Surface {
	/// Creates a surface over `document` with a collapsed selection at 0.
	pub fn new(document: Document) -> Self {
		Self {
			state: Rc::new(RefCell::new(SurfaceState {
				document,
				selection: Range::point(0),
				fragments: Slab::new(),
				history: History::new(),
				insertion_annotations: None,
			})),
		}
	}

	/// Borrows the document.
	///
	/// # Panics
	///
	/// Panics if a fragment operation is in progress on this surface.
	pub fn document(&self) -> Ref<'_, Document> {
		Ref::map(self.state.borrow(), |state| &state.document)
	}

	/// Returns the current selection.
	pub fn selection(&self) -> Range {
		self.state.borrow().selection
	}

	/// Sets the selection, clamped to the document.
	pub fn set_selection(&self, range: Range) {
		self.state.borrow_mut().set_selection(range);
	}

	/// Returns a fragment over `range`, or over the selection for `None`.
	///
	/// Unless `no_auto_select` is set, the fragment moves the selection to its
	/// range after each of its edits.
	pub fn get_fragment(&self, range: Option<Range>, no_auto_select: bool) -> SurfaceFragment {
		let range = range.unwrap_or_else(|| self.selection());
		SurfaceFragment::register(self, range, !no_auto_select)
	}

	/// Returns a fragment over `range` that selects its result.
	pub fn fragment(&self, range: Range) -> SurfaceFragment {
		self.get_fragment(Some(range), false)
	}

	/// Returns the null fragment of this surface.
	pub fn null_fragment(&self) -> SurfaceFragment {
		SurfaceFragment::null(Rc::downgrade(&self.state), false)
	}

	/// Applies `tx`, moving the selection and fragments through it, and
	/// records it in history.
	pub fn change(&self, tx: &Transaction, selection: Option<Range>) -> Result<Patch, TransactionError> {
		self.state.borrow_mut().change(tx, selection, true)
	}

	/// Closes the current history step so the next change starts a new one.
	pub fn breakpoint(&self) -> bool {
		self.state.borrow_mut().history.breakpoint()
	}

	/// Undoes the most recent history step. Returns false if there was none.
	pub fn undo(&self) -> Result<bool, TransactionError> {
		let mut state = self.state.borrow_mut();
		let Some(step) = state.history.undo() else {
			return Ok(false);
		};
		let (transactions, selection) = (step.undo_transactions(), step.selection_before);
		for tx in &transactions {
			state.change(tx, Some(selection), false)?;
		}
		state.history.commit_undo();
		trace!(steps = state.history.undo_len(), "surface.undo");
		Ok(true)
	}

	/// Redoes the most recently undone step. Returns false if there was none.
	pub fn redo(&self) -> Result<bool, TransactionError> {
		let mut state = self.state.borrow_mut();
		let Some(step) = state.history.redo() else {
			return Ok(false);
		};
		let (transactions, selection) = (step.transactions.clone(), step.selection_after);
		for tx in &transactions {
			state.change(tx, Some(selection), false)?;
		}
		state.history.commit_redo();
		trace!(steps = state.history.redo_len(), "surface.redo");
		Ok(true)
	}

	/// Returns true if there is a step to undo.
	pub fn has_past_state(&self) -> bool {
		self.state.borrow().history.can_undo()
	}

	/// Returns true if there is a step to redo.
	pub fn has_future_state(&self) -> bool {
		self.state.borrow().history.can_redo()
	}

	/// Number of live fragments tracking edits.
	pub fn live_fragments(&self) -> usize {
		self.state.borrow().fragments.len()
	}

	/// Annotations the next insertion at the selection receives.
	pub fn insertion_annotations(&self) -> AnnotationSet {
		let state = self.state.borrow();
		state.insertion_annotations_at(state.selection.start())
	}

	/// Overrides the annotations for the next insertion.
	pub fn set_insertion_annotations(&self, annotations: AnnotationSet) {
		self.state.borrow_mut().insertion_annotations = Some(annotations);
	}

	/// Drops explicit insertion annotations, falling back to the document.
	pub fn clear_insertion_annotations(&self) {
		self.state.borrow_mut().insertion_annotations = None;
	}
}
