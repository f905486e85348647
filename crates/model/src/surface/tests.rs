use linea_primitives::token::text_to_tokens;
use linea_primitives::{Annotation, AnnotationSet, Range, Token};
use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};
use serde_json::json;

use super::history::{History, MAX_UNDO};
use super::Surface;
use crate::document::Document;
use crate::transaction::{new_from_insertion, new_from_removal};

/// `paragraph(abc) paragraph(d)`
#[fixture]
fn surface() -> Surface {
	let data: Vec<Token> = serde_json::from_value(json!([
		{"type": "paragraph"},
		"a", "b", ["c", [{"name": "textStyle/bold"}]],
		{"type": "/paragraph"},
		{"type": "paragraph"},
		"d",
		{"type": "/paragraph"},
	]))
	.expect("valid token data");
	Surface::new(Document::new(data).expect("balanced"))
}

fn insert(surface: &Surface, offset: usize, text: &str) {
	let tx = new_from_insertion(&surface.document(), offset, text_to_tokens(text));
	surface.change(&tx, None).unwrap();
}

#[rstest]
fn new_surface_selects_start(surface: Surface) {
	assert_eq!(surface.selection(), Range::point(0));
	assert!(!surface.has_past_state());
	assert!(!surface.has_future_state());
}

#[rstest]
fn selection_is_clamped(surface: Surface) {
	surface.set_selection(Range::new(3, 40));
	assert_eq!(surface.selection(), Range::new(3, 8));
}

#[rstest]
fn change_translates_selection(surface: Surface) {
	surface.set_selection(Range::new(2, 3));
	insert(&surface, 1, "xy");
	assert_eq!(surface.selection(), Range::new(4, 5));
	assert_eq!(surface.document().get_text(Range::new(0, 10)), "xyabcd");
}

#[rstest]
fn changes_group_until_breakpoint(surface: Surface) {
	insert(&surface, 1, "x");
	insert(&surface, 2, "y");
	assert!(surface.breakpoint());
	insert(&surface, 3, "z");

	assert!(surface.undo().unwrap());
	assert_eq!(surface.document().get_text(Range::new(0, 10)), "xyabcd");
	assert!(surface.undo().unwrap());
	assert_eq!(surface.document().get_text(Range::new(0, 10)), "abcd");
	assert!(!surface.undo().unwrap());
	assert!(surface.has_future_state());
}

#[rstest]
fn redo_restores_and_new_change_clears_it(surface: Surface) {
	surface.set_selection(Range::new(1, 4));
	let tx = new_from_removal(&surface.document(), Range::new(1, 4));
	surface.change(&tx, Some(Range::point(1))).unwrap();
	assert!(surface.undo().unwrap());
	assert_eq!(surface.selection(), Range::new(1, 4));
	assert_eq!(surface.document().get_text(Range::new(0, 8)), "abcd");

	assert!(surface.redo().unwrap());
	assert_eq!(surface.selection(), Range::point(1));
	assert_eq!(surface.document().len(), 5);

	assert!(surface.undo().unwrap());
	insert(&surface, 1, "q");
	assert!(!surface.has_future_state());
	assert!(!surface.redo().unwrap());
}

#[rstest]
fn insertion_annotations_follow_selection(surface: Surface) {
	let bold = Annotation::new("textStyle/bold");
	surface.set_selection(Range::point(4));
	assert_eq!(surface.insertion_annotations().get(), &[bold.clone()]);

	surface.set_insertion_annotations(AnnotationSet::new());
	assert!(surface.insertion_annotations().is_empty());

	surface.set_selection(Range::point(2));
	surface.set_selection(Range::point(4));
	assert_eq!(surface.insertion_annotations().get(), &[bold]);
}

#[rstest]
fn insertion_override_stays_at_selection(surface: Surface) {
	let bold = Annotation::new("textStyle/bold");
	surface.set_selection(Range::point(0));
	surface.set_insertion_annotations([bold.clone()].into_iter().collect());
	assert_eq!(surface.insertion_annotations().get(), &[bold]);

	let elsewhere = surface.get_fragment(Some(Range::point(2)), true);
	assert_eq!(elsewhere.get_annotations(false), surface.document().insertion_annotations(2));
	assert!(!elsewhere.get_annotations(false).has_annotation_with_name("textStyle/bold"));
}

#[rstest]
fn fragments_register_and_release(surface: Surface) {
	let mut first = surface.fragment(Range::new(1, 2));
	{
		let _second = surface.get_fragment(None, true);
		assert_eq!(surface.live_fragments(), 2);
	}
	assert_eq!(surface.live_fragments(), 1);
	first.destroy();
	assert_eq!(surface.live_fragments(), 0);
	assert!(first.is_destroyed());
	assert!(!first.is_null());
	assert_eq!(first.range(), None);
}

#[test]
fn history_is_capped() {
	let mut history = History::new();
	let tx = linea_primitives::Transaction::new();
	for _ in 0..MAX_UNDO + 5 {
		history.record_transaction(tx.clone(), Range::point(0), Range::point(0));
		history.breakpoint();
	}
	assert_eq!(history.undo_len(), MAX_UNDO);
}

#[test]
fn breakpoint_reports_open_step() {
	let mut history = History::new();
	assert!(!history.breakpoint());
	history.record_transaction(linea_primitives::Transaction::new(), Range::point(0), Range::point(1));
	assert!(history.breakpoint());
	assert!(!history.breakpoint());
	assert_eq!(history.undo().map(|step| step.selection_after), Some(Range::point(1)));
}
