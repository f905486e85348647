//! The linear document.
//!
//! A [`Document`] holds a balanced token sequence plus the meta items that
//! were lifted out of it. Meta items (elements whose type the [`Schema`]
//! classifies as meta, such as comments) do not occupy offsets; each one is
//! remembered at the offset it was found before and re-interleaved by
//! [`Document::get_full_data`].
//!
//! Documents change only through [`Document::apply_transaction`].

mod apply;
mod nodes;
mod text;

#[cfg(test)]
mod tests;

pub use apply::Patch;
use linea_primitives::token::pair_markers;
use linea_primitives::{Offset, Range, Schema, Token, Unbalanced};
pub use nodes::{Child, NodeRef};

/// An ordered, balanced token sequence with out-of-line metadata.
#[derive(Debug, Clone)]
pub struct Document {
	data: Vec<Token>,
	/// Meta items before each offset; `len() + 1` slots.
	metadata: Vec<Vec<Token>>,
	/// Partner offset of every marker, `None` for leaves.
	pairs: Vec<Option<usize>>,
	schema: Schema,
	version: u64,
}

impl Document {
	/// Creates a document with the default schema.
	pub fn new(data: Vec<Token>) -> Result<Self, Unbalanced> {
		Self::with_schema(data, Schema::default())
	}

	/// Creates a document with the given schema.
	///
	/// `data` is taken as linear data; meta elements are not lifted out.
	pub fn with_schema(data: Vec<Token>, schema: Schema) -> Result<Self, Unbalanced> {
		let pairs = pair_markers(&data)?;
		let metadata = vec![Vec::new(); data.len() + 1];
		Ok(Self {
			data,
			metadata,
			pairs,
			schema,
			version: 0,
		})
	}

	/// Creates a document from data that may contain meta items.
	///
	/// Every element the schema classifies as meta is moved, with its
	/// contents, out of the linear data into the metadata store.
	pub fn from_full_data(full: Vec<Token>, schema: Schema) -> Result<Self, Unbalanced> {
		pair_markers(&full)?;

		let mut data = Vec::with_capacity(full.len());
		let mut metadata: Vec<Vec<Token>> = vec![Vec::new()];
		let mut meta_depth = 0usize;
		for token in full {
			let is_meta = token.kind().is_some_and(|kind| schema.is_meta(kind));
			if meta_depth > 0 || is_meta {
				match &token {
					Token::Open(_) => meta_depth += 1,
					Token::Close(_) => meta_depth -= 1,
					Token::Leaf(_) => {}
				}
				if let Some(slot) = metadata.last_mut() {
					slot.push(token);
				}
			} else {
				data.push(token);
				metadata.push(Vec::new());
			}
		}

		let pairs = pair_markers(&data)?;
		Ok(Self {
			data,
			metadata,
			pairs,
			schema,
			version: 0,
		})
	}

	/// Returns the number of tokens in the linear data.
	pub fn len(&self) -> usize {
		self.data.len()
	}

	/// Returns true if the linear data is empty.
	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}

	/// Number of transactions applied so far.
	pub fn version(&self) -> u64 {
		self.version
	}

	/// Returns the node compatibility table.
	pub fn schema(&self) -> &Schema {
		&self.schema
	}

	/// Returns the token at `offset`.
	pub fn token(&self, offset: Offset) -> Option<&Token> {
		self.data.get(offset)
	}

	/// Returns the linear data covered by `range`, clamped to the document.
	pub fn slice(&self, range: Range) -> &[Token] {
		let range = range.clamp(0, self.len());
		&self.data[range.to_std()]
	}

	/// Returns a copy of the linear data, or of the part covered by `range`.
	pub fn get_data(&self, range: Option<Range>) -> Vec<Token> {
		match range {
			Some(range) => self.slice(range).to_vec(),
			None => self.data.clone(),
		}
	}

	/// Returns the linear data with meta items interleaved at their offsets.
	pub fn get_full_data(&self) -> Vec<Token> {
		let mut full = Vec::with_capacity(self.data.len() + self.metadata.iter().map(Vec::len).sum::<usize>());
		for (slot, token) in self.metadata.iter().zip(&self.data) {
			full.extend(slot.iter().cloned());
			full.push(token.clone());
		}
		if let Some(last) = self.metadata.last() {
			full.extend(last.iter().cloned());
		}
		full
	}

	/// Returns the meta items remembered before `offset`.
	pub fn metadata_at(&self, offset: Offset) -> &[Token] {
		self.metadata.get(offset).map(Vec::as_slice).unwrap_or_default()
	}

	/// Returns the offset of the marker matching the one at `offset`.
	pub fn matching_marker(&self, offset: Offset) -> Option<Offset> {
		self.pairs.get(offset).copied().flatten()
	}
}
