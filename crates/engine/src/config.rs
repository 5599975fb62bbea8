//! Engine configuration.
//!
//! Configuration is optional; [`EngineConfig::default`] is a working setup.
//! When read from TOML every field may be omitted:
//!
//! ```toml
//! null-scope-key = "__flagpole_null"
//! deactivate-fallback = "queried-scope"
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::scope::{DEFAULT_NULL_KEY, ScopeKeyResolver};


/// Scope handed to the rest of a chain after a non-matching deactivation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeactivateFallback {
	/// Keep evaluating against the scope being checked.
	#[default]
	QueriedScope,
	/// Legacy behaviour: continue with the scope the rule deactivated.
	DeactivationScope,
}

/// Settings for a [`FeatureEngine`](crate::FeatureEngine).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct EngineConfig {
	/// Key derived for the absent scope.
	pub null_scope_key: String,
	/// How deactivation rules hand off to older rules.
	pub deactivate_fallback: DeactivateFallback,
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self {
			null_scope_key: DEFAULT_NULL_KEY.to_string(),
			deactivate_fallback: DeactivateFallback::default(),
		}
	}
}

impl EngineConfig {
	/// Parse a TOML string into an [`EngineConfig`].
	pub fn parse(input: &str) -> Result<Self, ConfigError> {
		let config: Self = toml::from_str(input)?;
		config.validate()?;
		Ok(config)
	}

	/// Read and parse a TOML file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let input = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::parse(&input)
	}

	/// Set the key derived for the absent scope.
	pub fn null_scope_key(mut self, key: impl Into<String>) -> Self {
		self.null_scope_key = key.into();
		self
	}

	/// Set the deactivation fallback mode.
	pub fn deactivate_fallback(mut self, fallback: DeactivateFallback) -> Self {
		self.deactivate_fallback = fallback;
		self
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.null_scope_key.is_empty() {
			return Err(ConfigError::InvalidNullKey);
		}
		Ok(())
	}

	pub(crate) fn key_resolver(&self) -> ScopeKeyResolver {
		ScopeKeyResolver::new(self.null_scope_key.clone())
	}
}
