/// Range direction (from to to).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
	/// `to` is at or after `from`.
	Forward,
	/// `to` is before `from`.
	Backward,
}

/// A position between two tokens of the linear data.
///
/// Offset `0` is before the first token, offset `len` after the last one.
pub type Offset = usize;

/// A directional range over the linear data.
///
/// `from` is where the range was anchored and `to` where it ends. A range is
/// backwards when `to < from`; use [`Range::start`] and [`Range::end`] for the
/// ordered bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Range {
	/// The anchored end of the range.
	pub from: Offset,
	/// The moving end of the range.
	pub to: Offset,
}

impl Range {
	/// Creates a new range from `from` to `to`.
	pub fn new(from: Offset, to: Offset) -> Self {
		Self { from, to }
	}

	/// Creates a collapsed range at the given offset.
	pub fn point(offset: Offset) -> Self {
		Self::new(offset, offset)
	}

	/// Returns the smaller endpoint.
	#[inline]
	pub fn start(&self) -> Offset {
		self.from.min(self.to)
	}

	/// Returns the larger endpoint.
	#[inline]
	pub fn end(&self) -> Offset {
		self.from.max(self.to)
	}

	/// Returns the number of tokens covered.
	#[inline]
	pub fn len(&self) -> usize {
		self.end() - self.start()
	}

	/// Returns true if `from == to`.
	#[inline]
	pub fn is_collapsed(&self) -> bool {
		self.from == self.to
	}

	/// Alias of [`Range::is_collapsed`].
	#[inline]
	pub fn is_empty(&self) -> bool {
		self.is_collapsed()
	}

	/// Returns true if `from > to`.
	#[inline]
	pub fn is_backwards(&self) -> bool {
		self.from > self.to
	}

	/// Returns the direction of this range.
	#[inline]
	pub fn direction(&self) -> Direction {
		if self.is_backwards() {
			Direction::Backward
		} else {
			Direction::Forward
		}
	}

	/// Returns the forward range covering the same tokens.
	pub fn normalized(&self) -> Self {
		Self::new(self.start(), self.end())
	}

	/// Returns a new range with `from` and `to` swapped.
	pub fn flip(&self) -> Self {
		Self::new(self.to, self.from)
	}

	/// Returns a range with the specified direction, flipping if needed.
	pub fn with_direction(self, direction: Direction) -> Self {
		if self.direction() == direction {
			self
		} else {
			self.flip()
		}
	}

	/// Clamps each endpoint independently to `[min, max]`.
	///
	/// Endpoints are never reordered, so a backwards range stays backwards
	/// unless clamping collapses it.
	pub fn clamp(&self, min: Offset, max: Offset) -> Self {
		Self::new(self.from.clamp(min, max), self.to.clamp(min, max))
	}

	/// Shifts both endpoints by `delta`, saturating at zero.
	pub fn translate_by(&self, delta: isize) -> Self {
		self.adjust(delta, delta)
	}

	/// Shifts `from` by `from_delta` and `to` by `to_delta`, saturating at zero.
	pub fn adjust(&self, from_delta: isize, to_delta: isize) -> Self {
		Self::new(
			self.from.saturating_add_signed(from_delta),
			self.to.saturating_add_signed(to_delta),
		)
	}

	/// Applies a function to both endpoints.
	pub fn map(self, mut f: impl FnMut(Offset) -> Offset) -> Self {
		Self::new(f(self.from), f(self.to))
	}

	/// Returns true if the offset lies within `[start, end]`.
	pub fn contains_offset(&self, offset: Offset) -> bool {
		offset >= self.start() && offset <= self.end()
	}

	/// Returns true if `other` lies entirely within this range.
	pub fn contains_range(&self, other: &Range) -> bool {
		other.start() >= self.start() && other.end() <= self.end()
	}

	/// Returns true if the two ranges share at least one token.
	pub fn overlaps(&self, other: &Range) -> bool {
		self.start() < other.end() && other.start() < self.end()
	}

	/// Returns the smallest range covering both, keeping the direction of self.
	pub fn expand(&self, other: &Range) -> Self {
		let start = self.start().min(other.start());
		let end = self.end().max(other.end());
		Self::new(start, end).with_direction(self.direction())
	}

	/// Returns the offsets as a standard range, for slicing.
	pub fn to_std(&self) -> std::ops::Range<usize> {
		self.start()..self.end()
	}
}

impl From<std::ops::Range<usize>> for Range {
	fn from(range: std::ops::Range<usize>) -> Self {
		Self::new(range.start, range.end)
	}
}
