//! Transaction application.

use linea_primitives::token::pair_markers;
use linea_primitives::{
	Annotation, AnnotationBias, AnnotationMethod, Changed, Leaf, Operation, Range, Token, Transaction,
};
use serde_json::Value;
use smallvec::SmallVec;
use tracing::trace;

use super::Document;
use crate::error::TransactionError;

/// Summary of an applied transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
	/// Document version after application.
	pub version: u64,
	/// Length before application.
	pub len_before: usize,
	/// Length after application.
	pub len_after: usize,
	/// Changed regions of the new data.
	pub changed: Vec<Range>,
}

/// Output being assembled, with enough bookkeeping to pair markers afterwards.
struct Output {
	tokens: Vec<Token>,
	inserted: Vec<bool>,
	metadata: Vec<Vec<Token>>,
	/// Offsets of emitted open markers not yet closed.
	open_stack: Vec<usize>,
}

impl Output {
	fn with_capacity(len: usize) -> Self {
		Self {
			tokens: Vec::with_capacity(len),
			inserted: Vec::with_capacity(len),
			metadata: Vec::with_capacity(len + 1),
			open_stack: Vec::new(),
		}
	}

	fn emit(&mut self, token: Token, meta: Vec<Token>, inserted: bool) {
		match &token {
			Token::Open(_) => self.open_stack.push(self.tokens.len()),
			Token::Close(_) => {
				self.open_stack.pop();
			}
			Token::Leaf(_) => {}
		}
		self.tokens.push(token);
		self.inserted.push(inserted);
		self.metadata.push(meta);
	}

	/// Innermost open marker emitted so far.
	fn enclosing(&self) -> Option<usize> {
		self.open_stack.last().copied()
	}
}

/// Output offsets of open markers whose counters must be bumped.
#[derive(Default)]
struct Marks {
	content: Vec<usize>,
	attributes: Vec<usize>,
	annotations: Vec<usize>,
}

impl Document {
	/// Applies `tx`, replacing the document contents.
	///
	/// Every removed token must match the document in shape, annotation spans
	/// must be balanced, attribute changes must land on open markers and the
	/// result must be balanced. On error the document is left untouched.
	pub fn apply_transaction(&mut self, tx: &Transaction) -> Result<Patch, TransactionError> {
		if tx.len() != self.len() {
			return Err(TransactionError::StructuralMismatch {
				expected: self.len(),
				actual: tx.len(),
			});
		}

		let mut out = Output::with_capacity(tx.len_after());
		let mut carried: Vec<Token> = Vec::new();
		let mut active: SmallVec<[(AnnotationMethod, &Annotation); 4]> = SmallVec::new();
		let mut pending_attributes: Vec<(&str, Option<&Value>)> = Vec::new();
		let mut marks = Marks::default();
		let mut pos = 0;

		for op in tx.operations() {
			match op {
				Operation::Retain(n) => {
					for offset in pos..pos + n {
						let mut token = self.data[offset].clone();
						if !pending_attributes.is_empty() {
							let Some(element) = token.as_element_mut() else {
								return Err(TransactionError::AttributeTarget { offset });
							};
							for (key, to) in pending_attributes.drain(..) {
								match to {
									Some(value) => {
										element.attributes.insert(key.to_string(), value.clone());
									}
									None => {
										element.attributes.shift_remove(key);
									}
								}
							}
							marks.attributes.push(out.tokens.len());
						}
						if !active.is_empty()
							&& let Some(leaf) = token.as_leaf_mut()
							&& annotate_leaf(leaf, &active)
							&& let Some(parent) = out.enclosing()
						{
							marks.annotations.push(parent);
						}
						let mut meta = std::mem::take(&mut carried);
						meta.extend(self.metadata[offset].iter().cloned());
						out.emit(token, meta, false);
					}
					pos += n;
				}
				Operation::Insert(tokens) => {
					if has_direct_leaf(tokens)
						&& let Some(parent) = out.enclosing()
					{
						marks.content.push(parent);
					}
					for token in tokens {
						out.emit(token.clone(), std::mem::take(&mut carried), true);
					}
				}
				Operation::Remove(tokens) => {
					for (i, token) in tokens.iter().enumerate() {
						let offset = pos + i;
						if !self.data[offset].same_shape(token) {
							return Err(TransactionError::StaleRemoval { offset });
						}
						carried.extend(self.metadata[offset].iter().cloned());
					}
					if has_direct_leaf(tokens)
						&& let Some(parent) = out.enclosing()
					{
						marks.content.push(parent);
					}
					pending_attributes.clear();
					pos += tokens.len();
				}
				Operation::Annotate {
					method,
					bias,
					annotation,
				} => match bias {
					AnnotationBias::Start => active.push((*method, annotation)),
					AnnotationBias::Stop => {
						let Some(index) = active.iter().position(|(m, a)| m == method && *a == annotation) else {
							return Err(TransactionError::UnbalancedAnnotation {
								name: annotation.name.clone(),
							});
						};
						active.remove(index);
					}
				},
				Operation::Attribute { key, to, .. } => pending_attributes.push((key.as_str(), to.as_ref())),
			}
		}

		if let Some((_, annotation)) = active.first() {
			return Err(TransactionError::UnbalancedAnnotation {
				name: annotation.name.clone(),
			});
		}
		if !pending_attributes.is_empty() {
			return Err(TransactionError::AttributeTarget { offset: pos });
		}
		carried.extend(self.metadata[pos].iter().cloned());
		out.metadata.push(carried);
		debug_assert_eq!(out.tokens.len(), tx.len_after());

		let pairs = pair_markers(&out.tokens)?;
		record_changes(&mut out, &pairs, marks);

		let len_before = self.len();
		self.data = out.tokens;
		self.metadata = out.metadata;
		self.pairs = pairs;
		self.version += 1;

		trace!(version = self.version, len_before, len_after = self.len(), "document.apply");
		Ok(Patch {
			version: self.version,
			len_before,
			len_after: self.len(),
			changed: tx.modified_ranges(),
		})
	}
}

/// Applies the active annotation spans to a retained leaf. Returns true if
/// its annotations changed.
fn annotate_leaf(leaf: &mut Leaf, active: &[(AnnotationMethod, &Annotation)]) -> bool {
	let mut changed = false;
	for (method, annotation) in active {
		changed |= match method {
			AnnotationMethod::Set => leaf.annotations.push((*annotation).clone()),
			AnnotationMethod::Clear => leaf.annotations.remove(annotation),
		};
	}
	changed
}

/// Returns true if `tokens` holds a leaf outside any marker it opens.
fn has_direct_leaf(tokens: &[Token]) -> bool {
	let mut depth = 0isize;
	for token in tokens {
		match token {
			Token::Open(_) => depth += 1,
			Token::Close(_) => depth -= 1,
			Token::Leaf(_) if depth == 0 => return true,
			Token::Leaf(_) => {}
		}
	}
	false
}

/// Bumps change counters on the open markers of the output.
///
/// Inserted openers are `created`; a pair with exactly one inserted side was
/// split or re-closed and its opener is `rebuilt`. Content, attribute and
/// annotation changes count once per node and transaction, and only on
/// openers that were not inserted.
fn record_changes(out: &mut Output, pairs: &[Option<usize>], marks: Marks) {
	for open in 0..out.tokens.len() {
		let Some(close) = pairs[open].filter(|&close| close > open) else {
			continue;
		};
		let (open_inserted, close_inserted) = (out.inserted[open], out.inserted[close]);
		if let Some(element) = out.tokens[open].as_element_mut() {
			if open_inserted {
				element.internal.changed.created += 1;
			}
			if open_inserted != close_inserted {
				element.internal.changed.rebuilt += 1;
			}
		}
	}

	bump(out, marks.content, |changed| changed.content += 1);
	bump(out, marks.attributes, |changed| changed.attributes += 1);
	bump(out, marks.annotations, |changed| changed.annotations += 1);
}

fn bump(out: &mut Output, mut offsets: Vec<usize>, counter: impl Fn(&mut Changed)) {
	offsets.sort_unstable();
	offsets.dedup();
	for offset in offsets {
		if out.inserted[offset] {
			continue;
		}
		if let Some(element) = out.tokens[offset].as_element_mut() {
			counter(&mut element.internal.changed);
		}
	}
}
