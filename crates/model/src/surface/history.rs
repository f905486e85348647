//! Transaction history for a surface.
//!
//! Consecutive transactions are grouped into one [`UndoStep`] until a
//! breakpoint closes the group. Steps store the forward transactions only;
//! undo applies their reversals in the opposite order.

use linea_primitives::{Range, Transaction};

/// Maximum undo history size.
pub const MAX_UNDO: usize = 100;

/// A group of transactions undone and redone together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoStep {
	/// Forward transactions, in application order.
	pub transactions: Vec<Transaction>,
	/// Selection before the first transaction.
	pub selection_before: Range,
	/// Selection after the last transaction.
	pub selection_after: Range,
}

impl UndoStep {
	/// Transactions that undo this step, in application order.
	pub fn undo_transactions(&self) -> Vec<Transaction> {
		self.transactions.iter().rev().map(Transaction::reversed).collect()
	}
}

/// Undo and redo stacks.
#[derive(Debug, Default)]
pub struct History {
	undo_stack: Vec<UndoStep>,
	redo_stack: Vec<UndoStep>,
	/// Whether the top undo step still accepts transactions.
	open: bool,
}

impl History {
	/// Creates an empty history.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns whether undo is available.
	pub fn can_undo(&self) -> bool {
		!self.undo_stack.is_empty()
	}

	/// Returns whether redo is available.
	pub fn can_redo(&self) -> bool {
		!self.redo_stack.is_empty()
	}

	/// Returns the undo stack length.
	pub fn undo_len(&self) -> usize {
		self.undo_stack.len()
	}

	/// Returns the redo stack length.
	pub fn redo_len(&self) -> usize {
		self.redo_stack.len()
	}

	/// Records an applied transaction.
	///
	/// Joins the open step if there is one, otherwise starts a new step.
	/// Clears the redo stack and enforces [`MAX_UNDO`] by dropping the
	/// oldest step.
	pub fn record_transaction(&mut self, tx: Transaction, selection_before: Range, selection_after: Range) {
		self.redo_stack.clear();
		match self.undo_stack.last_mut() {
			Some(step) if self.open => {
				step.transactions.push(tx);
				step.selection_after = selection_after;
			}
			_ => {
				self.undo_stack.push(UndoStep {
					transactions: vec![tx],
					selection_before,
					selection_after,
				});
				self.open = true;
				if self.undo_stack.len() > MAX_UNDO {
					self.undo_stack.remove(0);
				}
			}
		}
	}

	/// Closes the open step. Returns false if there was none.
	pub fn breakpoint(&mut self) -> bool {
		std::mem::replace(&mut self.open, false)
	}

	/// Returns the step to undo, or `None` if there is nothing to undo.
	///
	/// The caller applies [`UndoStep::undo_transactions`] and then calls
	/// [`History::commit_undo`].
	pub fn undo(&self) -> Option<&UndoStep> {
		self.undo_stack.last()
	}

	/// Moves the top step from the undo stack to the redo stack.
	pub fn commit_undo(&mut self) {
		self.open = false;
		if let Some(step) = self.undo_stack.pop() {
			self.redo_stack.push(step);
		}
	}

	/// Returns the step to redo, or `None` if there is nothing to redo.
	pub fn redo(&self) -> Option<&UndoStep> {
		self.redo_stack.last()
	}

	/// Moves the top step from the redo stack back to the undo stack.
	pub fn commit_redo(&mut self) {
		self.open = false;
		if let Some(step) = self.redo_stack.pop() {
			self.undo_stack.push(step);
		}
	}
}
