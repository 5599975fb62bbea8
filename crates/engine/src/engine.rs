//! The feature engine: registry, cache and event glue.

use std::sync::Arc;

use crate::cache::{ResolutionCache, cache_key};
use crate::config::EngineConfig;
use crate::error::{ConfigError, ResolverError, Result};
use crate::events::{EventSink, FeatureEvent, TracingSink};
use crate::registry::{FeatureRule, ResolverRegistry, resolver, try_resolver};
use crate::scope::Scope;
use crate::spec::FeatureSpec;
use crate::value::ResolverValue;


/// Counts from one bulk load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadReport {
	/// Entries resolved and written.
	pub resolved: usize,
	/// Entries skipped because the feature has no resolver.
	pub skipped: usize,
	/// Entries left alone because they were already cached.
	pub kept: usize,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum FillPolicy {
	Overwrite,
	Missing,
}

/// Resolves feature flags against scopes.
///
/// Single checks go straight to the registry. Bulk loads resolve a
/// [`FeatureSpec`] and populate the cache. The engine holds all state; share
/// it behind an [`Arc`] rather than through a global.
pub struct FeatureEngine {
	registry: ResolverRegistry,
	cache: ResolutionCache,
	events: Arc<dyn EventSink>,
}

impl Default for FeatureEngine {
	fn default() -> Self {
		Self::from_valid(&EngineConfig::default())
	}
}

impl FeatureEngine {
	/// Builds an engine from `config`, rejecting invalid settings.
	pub fn new(config: EngineConfig) -> std::result::Result<Self, ConfigError> {
		config.validate()?;
		Ok(Self::from_valid(&config))
	}

	fn from_valid(config: &EngineConfig) -> Self {
		Self {
			registry: ResolverRegistry::new(config.key_resolver(), config.deactivate_fallback),
			cache: ResolutionCache::new(),
			events: Arc::new(TracingSink),
		}
	}

	/// Replaces the event sink.
	pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
		self.events = events;
		self
	}

	pub fn registry(&self) -> &ResolverRegistry {
		&self.registry
	}

	pub fn cache(&self) -> &ResolutionCache {
		&self.cache
	}

	/// Registers an infallible resolver, replacing any existing chain.
	pub fn register<F, V>(&self, feature: &str, f: F)
	where
		F: Fn(&Scope) -> V + Send + Sync + 'static,
		V: Into<ResolverValue>,
	{
		self.registry.register(feature, resolver(f));
	}

	/// Registers a fallible resolver, replacing any existing chain.
	pub fn try_register<F, V, E>(&self, feature: &str, f: F)
	where
		F: Fn(&Scope) -> std::result::Result<V, E> + Send + Sync + 'static,
		V: Into<ResolverValue>,
		E: Into<ResolverError>,
	{
		self.registry.register(feature, try_resolver(f));
	}

	pub fn activate(&self, feature: &str, scope: impl Into<Scope>) -> Result<()> {
		self.registry.activate(feature, &scope.into())
	}

	pub fn deactivate(&self, feature: &str, scope: impl Into<Scope>) -> Result<()> {
		self.registry.deactivate(feature, &scope.into())
	}

	/// Checks `feature` for `scope`, bypassing the cache.
	///
	/// Unknown features dispatch [`FeatureEvent::UnknownChecked`] and resolve
	/// to `false`.
	pub fn is_active(&self, feature: &str, scope: impl Into<Scope>) -> Result<bool> {
		let scope = scope.into();
		if self.registry.missing_resolver(feature) {
			self.events.dispatch(&FeatureEvent::UnknownChecked {
				feature: feature.to_string(),
				scope,
			});
			return Ok(false);
		}

		self.events.dispatch(&FeatureEvent::Checked {
			feature: feature.to_string(),
			scope: scope.clone(),
		});
		self.registry.resolve_feature_state(feature, &scope)
	}

	pub fn is_inactive(&self, feature: &str, scope: impl Into<Scope>) -> Result<bool> {
		self.is_active(feature, scope).map(|active| !active)
	}

	/// True iff every feature is active for `scope`.
	pub fn all_active<'a>(&self, features: impl IntoIterator<Item = &'a str>, scope: impl Into<Scope>) -> Result<bool> {
		let scope = scope.into();
		for feature in features {
			if !self.is_active(feature, &scope)? {
				return Ok(false);
			}
		}
		Ok(true)
	}

	/// True iff at least one feature is active for `scope`.
	pub fn any_active<'a>(&self, features: impl IntoIterator<Item = &'a str>, scope: impl Into<Scope>) -> Result<bool> {
		let scope = scope.into();
		for feature in features {
			if self.is_active(feature, &scope)? {
				return Ok(true);
			}
		}
		Ok(false)
	}

	/// Resolves every entry in `spec` and overwrites its cache entry.
	pub fn load(&self, spec: impl Into<FeatureSpec>) -> Result<LoadReport> {
		self.fill(&spec.into(), FillPolicy::Overwrite)
	}

	/// Resolves only the entries in `spec` that are not cached yet.
	pub fn load_missing(&self, spec: impl Into<FeatureSpec>) -> Result<LoadReport> {
		self.fill(&spec.into(), FillPolicy::Missing)
	}

	fn fill(&self, spec: &FeatureSpec, policy: FillPolicy) -> Result<LoadReport> {
		let pending = spec.expand(self.registry.keys())?;
		let mut report = LoadReport::default();

		for item in pending {
			if self.registry.missing_resolver(&item.feature) {
				report.skipped += 1;
				continue;
			}
			if policy == FillPolicy::Missing && self.cache.contains(&item.key) {
				report.kept += 1;
				continue;
			}

			let active = self.registry.resolve_feature_state(&item.feature, &item.scope)?;
			match policy {
				FillPolicy::Overwrite => self.cache.put(item.key, active),
				FillPolicy::Missing => {
					if !self.cache.put_missing(item.key, active) {
						report.kept += 1;
						continue;
					}
				}
			}
			report.resolved += 1;
		}

		tracing::debug!(
			overwrite = policy == FillPolicy::Overwrite,
			resolved = report.resolved,
			skipped = report.skipped,
			kept = report.kept,
			"feature cache filled"
		);
		Ok(report)
	}

	/// Cached state of `feature` for `scope`, if loaded.
	///
	/// [`Scope::None`] reads the entry written for an explicit absent scope,
	/// then the unscoped entry written for a bare feature name.
	pub fn cached(&self, feature: &str, scope: impl Into<Scope>) -> Result<Option<bool>> {
		let scope = scope.into();
		let scoped = self.cache.get(&cache_key(feature, Some(&self.resolve_key(&scope)?)));
		if scoped.is_none() && scope.is_none() {
			return Ok(self.cache.get(&cache_key(feature, None)));
		}
		Ok(scoped)
	}

	/// Canonical key for `scope`.
	pub fn resolve_key(&self, scope: &Scope) -> Result<String> {
		self.registry.keys().resolve_key(scope)
	}

	pub fn missing_resolver(&self, feature: &str) -> bool {
		self.registry.missing_resolver(feature)
	}

	/// Registered feature names, sorted.
	pub fn registered(&self) -> Vec<String> {
		self.registry.registered()
	}

	/// Scope overrides for `feature`, oldest first.
	pub fn rules(&self, feature: &str) -> Option<Vec<FeatureRule>> {
		self.registry.rules(feature)
	}

	/// Drops every cached entry for `feature`; returns how many were removed.
	pub fn purge(&self, feature: &str) -> usize {
		self.cache.purge(feature)
	}

	pub fn flush_cache(&self) {
		self.cache.flush();
	}
}
