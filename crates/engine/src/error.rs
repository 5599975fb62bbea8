//! Error types for flag resolution and configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Error produced by a user-supplied resolver.
pub type ResolverError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by engine operations.
///
/// An unknown feature is not an error: it resolves to inactive and is
/// reported through [`FeatureEvent::UnknownChecked`](crate::FeatureEvent).
#[derive(Debug, Error)]
pub enum FlagError {
	/// A scope value could not be reduced to a unique key.
	#[error("malformed scope: {0}")]
	MalformedScope(String),

	/// A resolver failed while computing a feature's state.
	#[error("resolver for feature '{feature}' failed: {source}")]
	Resolver {
		/// Feature whose resolver failed.
		feature: String,
		/// The resolver's own error.
		#[source]
		source: ResolverError,
	},
}

/// Errors that can occur when loading engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error parsing TOML syntax or shape.
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

	/// The null scope key must be a non-empty string.
	#[error("null scope key must not be empty")]
	InvalidNullKey,
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, FlagError>;
