//! Bulk load specifications.

use indexmap::IndexMap;

use crate::cache::cache_key;
use crate::error::Result;
use crate::scope::{Scope, ScopeKeyResolver};


/// Features (and optionally scopes) to resolve in one bulk operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureSpec {
	/// One unscoped feature.
	Feature(String),
	/// Several unscoped features.
	Features(Vec<String>),
	/// Features mapped to the scopes to resolve them for, in insertion order.
	///
	/// A feature with an empty scope list is resolved unscoped.
	Scoped(IndexMap<String, Vec<Scope>>),
}

impl FeatureSpec {
	/// Starts an empty [`FeatureSpec::Scoped`] spec.
	pub fn scoped() -> Self {
		FeatureSpec::Scoped(IndexMap::new())
	}

	/// Adds `scopes` for `feature`, converting the spec to the scoped form.
	pub fn with<I, S>(self, feature: impl Into<String>, scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<Scope>,
	{
		let mut map = self.into_scoped();
		map.entry(feature.into())
			.or_default()
			.extend(scopes.into_iter().map(Into::into));
		FeatureSpec::Scoped(map)
	}

	/// Adds a single scope for `feature`.
	pub fn with_scope(self, feature: impl Into<String>, scope: impl Into<Scope>) -> Self {
		self.with(feature, std::iter::once(scope.into()))
	}

	fn into_scoped(self) -> IndexMap<String, Vec<Scope>> {
		match self {
			FeatureSpec::Feature(feature) => IndexMap::from([(feature, Vec::new())]),
			FeatureSpec::Features(features) => features.into_iter().map(|f| (f, Vec::new())).collect(),
			FeatureSpec::Scoped(map) => map,
		}
	}

	/// Expands into `(feature, scope, key)` triples, features in order then scopes in order.
	pub fn expand(&self, keys: &ScopeKeyResolver) -> Result<Vec<PendingResolution>> {
		let mut out = Vec::new();
		match self {
			FeatureSpec::Feature(feature) => out.extend(resolve(feature, &[], keys)?),
			FeatureSpec::Features(features) => {
				for feature in features {
					out.extend(resolve(feature, &[], keys)?);
				}
			}
			FeatureSpec::Scoped(map) => {
				for (feature, scopes) in map {
					out.extend(resolve(feature, scopes, keys)?);
				}
			}
		}
		Ok(out)
	}
}

impl From<&str> for FeatureSpec {
	fn from(v: &str) -> Self {
		FeatureSpec::Feature(v.to_string())
	}
}

impl From<String> for FeatureSpec {
	fn from(v: String) -> Self {
		FeatureSpec::Feature(v)
	}
}

impl From<Vec<String>> for FeatureSpec {
	fn from(v: Vec<String>) -> Self {
		FeatureSpec::Features(v)
	}
}

impl From<Vec<&str>> for FeatureSpec {
	fn from(v: Vec<&str>) -> Self {
		FeatureSpec::Features(v.into_iter().map(str::to_string).collect())
	}
}

impl<const N: usize> From<[&str; N]> for FeatureSpec {
	fn from(v: [&str; N]) -> Self {
		FeatureSpec::Features(v.into_iter().map(str::to_string).collect())
	}
}

impl From<IndexMap<String, Vec<Scope>>> for FeatureSpec {
	fn from(v: IndexMap<String, Vec<Scope>>) -> Self {
		FeatureSpec::Scoped(v)
	}
}

/// One feature/scope pair awaiting resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingResolution {
	pub feature: String,
	pub scope: Scope,
	/// Cache key the result is stored under.
	pub key: String,
}

/// Pairs `feature` with each of `scopes`; no scopes yields one unscoped entry keyed by the feature name.
pub fn resolve(feature: &str, scopes: &[Scope], keys: &ScopeKeyResolver) -> Result<Vec<PendingResolution>> {
	if scopes.is_empty() {
		return Ok(vec![PendingResolution {
			feature: feature.to_string(),
			scope: Scope::None,
			key: cache_key(feature, None),
		}]);
	}

	scopes
		.iter()
		.map(|scope| {
			let scope_key = keys.resolve_key(scope)?;
			Ok(PendingResolution {
				feature: feature.to_string(),
				scope: scope.clone(),
				key: cache_key(feature, Some(&scope_key)),
			})
		})
		.collect()
}
