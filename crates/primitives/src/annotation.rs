use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smallvec::SmallVec;

/// A named piece of inline formatting or metadata attached to leaf content.
///
/// Two annotations are equal when both name and data are structurally equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
	/// Annotation name, e.g. `textStyle/bold` or `link`.
	pub name: String,
	/// Additional data, `null` when absent.
	#[serde(default, skip_serializing_if = "Value::is_null")]
	pub data: Value,
}

impl Annotation {
	/// Creates an annotation without data.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			data: Value::Null,
		}
	}

	/// Creates an annotation carrying `data`.
	pub fn with_data(name: impl Into<String>, data: Value) -> Self {
		Self {
			name: name.into(),
			data,
		}
	}
}

/// Selects annotations by exact name or by a regular expression over names.
#[derive(Debug, Clone)]
pub enum NameFilter {
	/// Matches a single name.
	Exact(String),
	/// Matches every name the pattern finds a match in.
	Pattern(Regex),
}

impl NameFilter {
	/// Returns true if `name` passes this filter.
	pub fn matches(&self, name: &str) -> bool {
		match self {
			NameFilter::Exact(exact) => exact == name,
			NameFilter::Pattern(pattern) => pattern.is_match(name),
		}
	}
}

impl From<&str> for NameFilter {
	fn from(name: &str) -> Self {
		NameFilter::Exact(name.to_string())
	}
}

impl From<String> for NameFilter {
	fn from(name: String) -> Self {
		NameFilter::Exact(name)
	}
}

impl From<Regex> for NameFilter {
	fn from(pattern: Regex) -> Self {
		NameFilter::Pattern(pattern)
	}
}

/// An insertion-ordered set of annotations.
///
/// Adding an annotation that is already present is a no-op, so the set never
/// holds structural duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationSet {
	items: SmallVec<[Annotation; 2]>,
}

impl AnnotationSet {
	/// Creates an empty set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the number of annotations.
	pub fn len(&self) -> usize {
		self.items.len()
	}

	/// Returns true if the set holds no annotations.
	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	/// Iterates in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
		self.items.iter()
	}

	/// Returns the annotations as a slice, in insertion order.
	pub fn get(&self) -> &[Annotation] {
		&self.items
	}

	/// Returns true if an equal annotation is present.
	pub fn contains(&self, annotation: &Annotation) -> bool {
		self.items.contains(annotation)
	}

	/// Adds an annotation unless an equal one is present. Returns true if added.
	pub fn push(&mut self, annotation: Annotation) -> bool {
		if self.contains(&annotation) {
			return false;
		}
		self.items.push(annotation);
		true
	}

	/// Removes an equal annotation. Returns true if one was removed.
	pub fn remove(&mut self, annotation: &Annotation) -> bool {
		match self.items.iter().position(|a| a == annotation) {
			Some(index) => {
				self.items.remove(index);
				true
			}
			None => false,
		}
	}

	/// Returns true if any annotation has the given name.
	pub fn has_annotation_with_name(&self, name: &str) -> bool {
		self.items.iter().any(|a| a.name == name)
	}

	/// Returns the annotations whose names pass `filter`.
	pub fn get_annotations_by_name(&self, filter: impl Into<NameFilter>) -> AnnotationSet {
		let filter = filter.into();
		self.items.iter().filter(|a| filter.matches(&a.name)).cloned().collect()
	}

	/// Returns the annotations present in both sets, in the order of self.
	pub fn intersection(&self, other: &AnnotationSet) -> AnnotationSet {
		self.items.iter().filter(|a| other.contains(a)).cloned().collect()
	}

	/// Adds every annotation of `other` not already present.
	pub fn extend_from(&mut self, other: &AnnotationSet) {
		for annotation in other.iter() {
			self.push(annotation.clone());
		}
	}
}

impl FromIterator<Annotation> for AnnotationSet {
	fn from_iter<I: IntoIterator<Item = Annotation>>(iter: I) -> Self {
		let mut set = AnnotationSet::new();
		for annotation in iter {
			set.push(annotation);
		}
		set
	}
}

impl<'a> IntoIterator for &'a AnnotationSet {
	type Item = &'a Annotation;
	type IntoIter = std::slice::Iter<'a, Annotation>;

	fn into_iter(self) -> Self::IntoIter {
		self.items.iter()
	}
}
