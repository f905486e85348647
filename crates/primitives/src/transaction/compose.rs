use std::collections::VecDeque;

use super::Transaction;
use super::types::{AnnotationBias, AnnotationMethod, Operation};
use crate::annotation::Annotation;
use crate::token::Token;

impl Transaction {
	/// Composes two transactions into a single equivalent transaction.
	///
	/// Tokens inserted by `self` and touched by `other` are rewritten in
	/// place: removed ones vanish, annotated ones carry the annotation and
	/// attribute changes are folded into the inserted marker.
	///
	/// # Debug Assertions
	/// Asserts that `self.len_after == other.len` (the transactions must be compatible).
	pub fn compose(self, other: Transaction) -> Transaction {
		debug_assert_eq!(self.len_after, other.len);

		let mut result = Transaction::new();
		let mut a: VecDeque<Operation> = self.ops.into();
		let mut b: VecDeque<Operation> = other.ops.into();
		let mut active: Vec<(AnnotationMethod, Annotation)> = Vec::new();

		loop {
			// Operations of `self` that produce no output pass straight through.
			if matches!(
				a.front(),
				Some(Operation::Remove(_) | Operation::Annotate { .. } | Operation::Attribute { .. })
			) {
				if let Some(op) = a.pop_front() {
					let starts_span = matches!(
						op,
						Operation::Annotate {
							bias: AnnotationBias::Start,
							..
						}
					);
					if starts_span && !active.is_empty() {
						// Spans of `other` must follow those of `self` on shared leaves.
						reopen_after(&mut result, &active, op);
					} else {
						result.push(op);
					}
				}
				continue;
			}

			match b.front() {
				Some(Operation::Insert(_)) => {
					if let Some(op) = b.pop_front() {
						result.push(op);
					}
					continue;
				}
				Some(Operation::Annotate {
					method,
					bias,
					annotation,
				}) => {
					match bias {
						AnnotationBias::Start => active.push((*method, annotation.clone())),
						AnnotationBias::Stop => {
							if let Some(index) = active.iter().position(|(m, a)| m == method && a == annotation) {
								active.remove(index);
							}
						}
					}
					if let Some(op) = b.pop_front() {
						result.push(op);
					}
					continue;
				}
				Some(Operation::Attribute { .. }) => {
					let Some(Operation::Attribute { key, from, to }) = b.pop_front() else {
						continue;
					};
					match a.front_mut() {
						Some(Operation::Insert(tokens)) if tokens.first().is_some_and(Token::is_open) => {
							if let Some(element) = tokens[0].as_element_mut() {
								match to {
									Some(value) => {
										element.attributes.insert(key, value);
									}
									None => {
										element.attributes.shift_remove(&key);
									}
								}
							}
						}
						_ => result.attribute(key, from, to),
					}
					continue;
				}
				_ => {}
			}

			let (Some(mut a_op), Some(mut b_op)) = (a.pop_front(), b.pop_front()) else {
				debug_assert!(a.is_empty() && b.is_empty(), "composed transactions differ in length");
				break;
			};

			let len = a_op.output_len().min(b_op.input_len());
			let a_part = a_op.split_front(len);
			let b_part = b_op.split_front(len);

			match (a_part, b_part) {
				(Operation::Retain(n), Operation::Retain(_)) => result.retain(n),
				(Operation::Retain(_), Operation::Remove(tokens)) => result.remove(tokens),
				(Operation::Insert(mut tokens), Operation::Retain(_)) => {
					annotate_leaves(&mut tokens, &active);
					result.insert(tokens);
				}
				(Operation::Insert(_), Operation::Remove(_)) => {}
				_ => debug_assert!(false, "unexpected operation pair in compose"),
			}

			if !a_op.is_spent() {
				a.push_front(a_op);
			}
			if !b_op.is_spent() {
				b.push_front(b_op);
			}
		}

		result
	}
}

/// Pushes `op` with the `active` spans stopped before it and restarted after.
fn reopen_after(result: &mut Transaction, active: &[(AnnotationMethod, Annotation)], op: Operation) {
	for (method, annotation) in active.iter().rev() {
		result.annotate(*method, AnnotationBias::Stop, annotation.clone());
	}
	result.push(op);
	for (method, annotation) in active {
		result.annotate(*method, AnnotationBias::Start, annotation.clone());
	}
}

fn annotate_leaves(tokens: &mut [Token], active: &[(AnnotationMethod, Annotation)]) {
	if active.is_empty() {
		return;
	}
	for leaf in tokens.iter_mut().filter_map(Token::as_leaf_mut) {
		for (method, annotation) in active {
			match method {
				AnnotationMethod::Set => {
					leaf.annotations.push(annotation.clone());
				}
				AnnotationMethod::Clear => {
					leaf.annotations.remove(annotation);
				}
			}
		}
	}
}
