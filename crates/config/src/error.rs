//! Error types for configuration parsing.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when parsing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error parsing TOML syntax or an unexpected value shape.
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),

	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},
}

/// Non-fatal problems found while parsing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigWarning {
	/// A node lists a parent type that no table entry defines.
	#[error("'{kind}' lists unknown parent type '{parent}'")]
	UnknownParent {
		/// The node whose rules reference the parent.
		kind: String,
		/// The unresolved parent type.
		parent: String,
	},
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
