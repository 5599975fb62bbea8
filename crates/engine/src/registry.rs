//! Per-feature resolver chains.
//!
//! Every feature owns a terminal resolver plus an ordered list of scope
//! overrides. `activate`/`deactivate` push overrides; they never replace the
//! resolver underneath, so overrides for other scopes keep working. Only
//! [`ResolverRegistry::register`] resets a feature.
//!
//! # Evaluation
//!
//! Overrides are checked newest first. The first override whose scope key
//! equals the queried key decides the result. When none match, the terminal
//! resolver is called.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap as HashMap;

use crate::config::DeactivateFallback;
use crate::error::{FlagError, ResolverError, Result};
use crate::scope::{Scope, ScopeKeyResolver};
use crate::value::ResolverValue;

#[cfg(test)]
mod tests;

/// A feature's terminal resolver.
pub type Resolver = Arc<dyn Fn(&Scope) -> std::result::Result<ResolverValue, ResolverError> + Send + Sync>;

/// One scope override in a feature's chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureRule {
	/// Scope the override applies to.
	pub scope: Scope,
	/// Canonical key of `scope`, compared against queried keys.
	pub scope_key: String,
	/// `true` for an activation, `false` for a deactivation.
	pub outcome: bool,
}

#[derive(Clone)]
struct FeatureEntry {
	resolver: Resolver,
	rules: Vec<FeatureRule>,
}

impl FeatureEntry {
	fn new(resolver: Resolver) -> Self {
		Self {
			resolver,
			rules: Vec::new(),
		}
	}

	fn inactive() -> Self {
		Self::new(Arc::new(|_: &Scope| Ok(ResolverValue::INACTIVE)))
	}
}

/// Maps feature names to resolver chains.
///
/// Entries are copy-on-write: resolution clones the entry handle and runs the
/// resolver with no lock held, so a resolver may consult the registry again.
pub struct ResolverRegistry {
	features: RwLock<HashMap<Box<str>, Arc<FeatureEntry>>>,
	keys: ScopeKeyResolver,
	fallback: DeactivateFallback,
}

impl Default for ResolverRegistry {
	fn default() -> Self {
		Self::new(ScopeKeyResolver::default(), DeactivateFallback::default())
	}
}

impl ResolverRegistry {
	pub fn new(keys: ScopeKeyResolver, fallback: DeactivateFallback) -> Self {
		Self {
			features: RwLock::new(HashMap::default()),
			keys,
			fallback,
		}
	}

	/// Key resolver used to compare override scopes.
	pub fn keys(&self) -> &ScopeKeyResolver {
		&self.keys
	}

	/// Replaces `feature`'s chain with `resolver` and no overrides.
	pub fn register(&self, feature: &str, resolver: Resolver) {
		let replaced = self
			.features
			.write()
			.insert(Box::from(feature), Arc::new(FeatureEntry::new(resolver)))
			.is_some();
		tracing::debug!(feature, replaced, "feature resolver registered");
	}

	/// Makes `feature` active for `scope`, leaving other scopes untouched.
	pub fn activate(&self, feature: &str, scope: &Scope) -> Result<()> {
		self.push_rule(feature, scope, true)
	}

	/// Makes `feature` inactive for `scope`, leaving other scopes untouched.
	pub fn deactivate(&self, feature: &str, scope: &Scope) -> Result<()> {
		self.push_rule(feature, scope, false)
	}

	fn push_rule(&self, feature: &str, scope: &Scope, outcome: bool) -> Result<()> {
		let scope_key = self.keys.resolve_key(scope)?;
		let mut features = self.features.write();
		let entry = features
			.entry(Box::from(feature))
			.or_insert_with(|| Arc::new(FeatureEntry::inactive()));
		let rules = &mut Arc::make_mut(entry).rules;
		rules.push(FeatureRule {
			scope: scope.clone(),
			scope_key,
			outcome,
		});
		tracing::debug!(
			feature,
			scope = %scope,
			outcome,
			chain_len = rules.len(),
			"feature override added"
		);
		Ok(())
	}

	/// Returns true iff nothing was ever registered for `feature`.
	pub fn missing_resolver(&self, feature: &str) -> bool {
		!self.features.read().contains_key(feature)
	}

	/// Registered feature names, sorted.
	pub fn registered(&self) -> Vec<String> {
		let mut names: Vec<String> = self.features.read().keys().map(|k| k.to_string()).collect();
		names.sort();
		names
	}

	/// Overrides for `feature`, oldest first.
	pub fn rules(&self, feature: &str) -> Option<Vec<FeatureRule>> {
		self.entry(feature).map(|entry| entry.rules.clone())
	}

	fn entry(&self, feature: &str) -> Option<Arc<FeatureEntry>> {
		self.features.read().get(feature).cloned()
	}

	/// Resolves `feature` for `scope`.
	///
	/// An unregistered feature is inactive. Resolver failures are returned
	/// as [`FlagError::Resolver`].
	pub fn resolve_feature_state(&self, feature: &str, scope: &Scope) -> Result<bool> {
		let Some(entry) = self.entry(feature) else {
			return Ok(false);
		};

		let mut query = scope.clone();
		let mut query_key = self.keys.resolve_key(scope)?;

		for rule in entry.rules.iter().rev() {
			if rule.scope_key == query_key {
				tracing::trace!(feature, scope_key = %query_key, outcome = rule.outcome, "override matched");
				return Ok(rule.outcome);
			}
			if !rule.outcome && self.fallback == DeactivateFallback::DeactivationScope {
				query = rule.scope.clone();
				query_key = rule.scope_key.clone();
			}
		}

		let value = (entry.resolver)(&query).map_err(|source| FlagError::Resolver {
			feature: feature.to_string(),
			source,
		})?;
		tracing::trace!(feature, scope_key = %query_key, value = ?value, "resolver evaluated");
		Ok(value.is_active())
	}
}

/// Wraps an infallible resolver closure.
pub fn resolver<F, V>(f: F) -> Resolver
where
	F: Fn(&Scope) -> V + Send + Sync + 'static,
	V: Into<ResolverValue>,
{
	Arc::new(move |scope: &Scope| Ok(f(scope).into()))
}

/// Wraps a fallible resolver closure.
pub fn try_resolver<F, V, E>(f: F) -> Resolver
where
	F: Fn(&Scope) -> std::result::Result<V, E> + Send + Sync + 'static,
	V: Into<ResolverValue>,
	E: Into<ResolverError>,
{
	Arc::new(move |scope: &Scope| f(scope).map(Into::into).map_err(Into::into))
}
