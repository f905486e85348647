//! Configuration for linea.
//!
//! Configuration is written in TOML and overrides entries of the node
//! compatibility table ([`Schema`]):
//!
//! ```toml
//! [nodes.title]
//! category = "content"
//! parents = ["document"]
//!
//! [nodes.caption]
//! category = "content"
//! parents = ["table"]
//! ```
//!
//! Entries replace the default rules of the named type, or register a new
//! type. Parent references that resolve to no type are reported in
//! [`Config::warnings`] rather than failing the parse.

pub mod error;


use std::path::Path;

pub use error::{ConfigError, ConfigWarning, Result};
use indexmap::IndexMap;
use linea_primitives::{NodeRules, Schema};
use serde::Deserialize;
use tracing::warn;

/// Parsed configuration from a TOML file.
#[derive(Debug, Clone, Default)]
pub struct Config {
	/// Node table overrides, keyed by element type.
	pub nodes: IndexMap<String, NodeRules>,
	/// Non-fatal warnings encountered during parsing.
	pub warnings: Vec<ConfigWarning>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
	#[serde(default)]
	nodes: IndexMap<String, NodeRules>,
}

impl Config {
	/// Parse a TOML string into a [`Config`].
	///
	/// Non-fatal warnings are collected in `Config::warnings` and logged.
	pub fn parse(input: &str) -> Result<Self> {
		let raw: RawConfig = toml::from_str(input)?;
		let mut config = Config {
			nodes: raw.nodes,
			warnings: Vec::new(),
		};
		config.warnings = config.unresolved_parents();
		for warning in &config.warnings {
			warn!(%warning, "config warning");
		}
		Ok(config)
	}

	/// Load configuration from a file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
			path: path.to_path_buf(),
			error: e,
		})?;
		Self::parse(&content)
	}

	/// Merge another config into this one.
	///
	/// Values from `other` override values in `self`.
	pub fn merge(&mut self, other: Config) {
		self.nodes.extend(other.nodes);
		self.warnings = self.unresolved_parents();
	}

	/// Applies the node overrides to `schema`.
	pub fn apply_to(&self, schema: &mut Schema) {
		for (kind, rules) in &self.nodes {
			schema.register(kind.clone(), rules.clone());
		}
	}

	/// Returns the default table with this configuration applied.
	pub fn schema(&self) -> Schema {
		let mut schema = Schema::default();
		self.apply_to(&mut schema);
		schema
	}

	fn unresolved_parents(&self) -> Vec<ConfigWarning> {
		let schema = self.schema();
		let mut warnings = Vec::new();
		for (kind, rules) in &self.nodes {
			for parent in rules.parents.iter().flatten() {
				if !schema.contains(parent) {
					warnings.push(ConfigWarning::UnknownParent {
						kind: kind.clone(),
						parent: parent.clone(),
					});
				}
			}
		}
		warnings
	}
}
