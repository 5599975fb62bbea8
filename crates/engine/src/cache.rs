//! Memoized feature states.
//!
//! Entries live for the life of the cache and are never evicted.

use parking_lot::RwLock;
use rustc_hash::FxHashMap as HashMap;


/// Composite cache key: `feature` when unscoped, `feature:scope_key` otherwise.
pub fn cache_key(feature: &str, scope_key: Option<&str>) -> String {
	match scope_key {
		Some(scope_key) => format!("{feature}:{scope_key}"),
		None => feature.to_string(),
	}
}

/// In-memory map from cache key to resolved state.
#[derive(Debug, Default)]
pub struct ResolutionCache {
	entries: RwLock<HashMap<String, bool>>,
}

impl ResolutionCache {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, key: &str) -> Option<bool> {
		self.entries.read().get(key).copied()
	}

	pub fn contains(&self, key: &str) -> bool {
		self.entries.read().contains_key(key)
	}

	/// Writes `active` at `key`, replacing any existing entry.
	pub fn put(&self, key: impl Into<String>, active: bool) {
		self.entries.write().insert(key.into(), active);
	}

	/// Writes `active` at `key` only if no entry exists.
	///
	/// Returns whether the entry was written.
	pub fn put_missing(&self, key: impl Into<String>, active: bool) -> bool {
		let mut entries = self.entries.write();
		match entries.entry(key.into()) {
			std::collections::hash_map::Entry::Vacant(v) => {
				v.insert(active);
				true
			}
			std::collections::hash_map::Entry::Occupied(_) => false,
		}
	}

	/// Removes the unscoped entry and every scoped entry for `feature`.
	///
	/// Returns the number of entries removed.
	pub fn purge(&self, feature: &str) -> usize {
		let prefix = format!("{feature}:");
		let mut entries = self.entries.write();
		let before = entries.len();
		entries.retain(|key, _| key != feature && !key.starts_with(&prefix));
		before - entries.len()
	}

	/// Removes every entry.
	pub fn flush(&self) {
		self.entries.write().clear();
	}

	pub fn len(&self) -> usize {
		self.entries.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.read().is_empty()
	}

	/// Copy of all entries, sorted by key.
	pub fn snapshot(&self) -> Vec<(String, bool)> {
		let mut entries: Vec<_> = self
			.entries
			.read()
			.iter()
			.map(|(k, v)| (k.clone(), *v))
			.collect();
		entries.sort();
		entries
	}
}
