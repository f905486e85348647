use unicode_segmentation::UnicodeSegmentation;

/// Returns every word boundary of `text` as char indices, including `0` and
/// `text.len()`.
///
/// Boundaries follow Unicode word segmentation (UAX #29).
pub fn word_boundaries(text: &[char]) -> Vec<usize> {
	let string: String = text.iter().collect();
	let mut boundaries = vec![0];
	let mut char_idx = 0;
	for (_, segment) in string.split_word_bound_indices() {
		char_idx += segment.chars().count();
		boundaries.push(char_idx);
	}
	if boundaries.last() != Some(&text.len()) {
		boundaries.push(text.len());
	}
	boundaries
}

/// Returns whether `char_idx` is at a word boundary.
pub fn is_word_boundary(text: &[char], char_idx: usize) -> bool {
	word_boundaries(text).binary_search(&char_idx).is_ok()
}

/// Returns the closest word boundary at or before `char_idx`.
pub fn prev_word_boundary(text: &[char], char_idx: usize) -> usize {
	let boundaries = word_boundaries(text);
	match boundaries.binary_search(&char_idx) {
		Ok(i) => boundaries[i],
		Err(i) => boundaries[i.saturating_sub(1)],
	}
}

/// Returns the closest word boundary at or after `char_idx`.
///
/// If `char_idx` is at or past the end, returns `text.len()`.
pub fn next_word_boundary(text: &[char], char_idx: usize) -> usize {
	let boundaries = word_boundaries(text);
	match boundaries.binary_search(&char_idx) {
		Ok(i) => boundaries[i],
		Err(i) => boundaries.get(i).copied().unwrap_or(text.len()),
	}
}

/// Returns the word segment around `char_idx` as `(start, end)`.
///
/// Prefers a segment containing letters or digits: when the segment after
/// `char_idx` is whitespace or punctuation and the one before is a word, the
/// one before wins.
pub fn nearest_word_range(text: &[char], char_idx: usize) -> (usize, usize) {
	let boundaries = word_boundaries(text);
	let segments: Vec<(usize, usize)> = boundaries.windows(2).map(|w| (w[0], w[1])).collect();
	let Some(index) = segments.iter().position(|&(start, end)| start <= char_idx && char_idx < end) else {
		return match segments.last() {
			Some(&last) if is_word(text, last) => last,
			_ => (char_idx, char_idx),
		};
	};

	let here = segments[index];
	if !is_word(text, here)
		&& here.0 == char_idx
		&& let Some(&before) = index.checked_sub(1).and_then(|i| segments.get(i))
		&& is_word(text, before)
	{
		return before;
	}
	here
}

fn is_word(text: &[char], (start, end): (usize, usize)) -> bool {
	text[start..end].iter().any(|c| c.is_alphanumeric())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn chars(s: &str) -> Vec<char> {
		s.chars().collect()
	}

	#[test]
	fn boundaries_of_latin_phrase() {
		let text = chars("the quick brown fox");
		assert_eq!(word_boundaries(&text), vec![0, 3, 4, 9, 10, 15, 16, 19]);
	}

	#[test]
	fn snapping_to_boundaries() {
		let text = chars("the quick brown fox");
		assert_eq!(prev_word_boundary(&text, 6), 4);
		assert_eq!(next_word_boundary(&text, 13), 15);
		assert_eq!(prev_word_boundary(&text, 4), 4);
		assert_eq!(next_word_boundary(&text, 19), 19);
		assert!(is_word_boundary(&text, 9));
		assert!(!is_word_boundary(&text, 7));
	}

	#[test]
	fn nearest_word_prefers_letters() {
		let text = chars("the quick brown fox");
		assert_eq!(nearest_word_range(&text, 7), (4, 9));
		assert_eq!(nearest_word_range(&text, 9), (4, 9));
		assert_eq!(nearest_word_range(&text, 19), (16, 19));
		assert_eq!(nearest_word_range(&[], 0), (0, 0));
	}

	#[test]
	fn non_latin_words() {
		let text = chars("привет мир");
		assert_eq!(nearest_word_range(&text, 8), (7, 10));
	}
}
