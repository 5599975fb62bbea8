//! Feature flag resolution.
//!
//! A [`FeatureEngine`] answers "is this feature active for this scope?" from
//! resolvers registered at runtime. Per-scope overrides layer on top of a
//! feature's resolver without replacing it, and bulk loads warm a local
//! cache of resolved states.
//!
//! ```
//! use flagpole_engine::{FeatureEngine, FeatureSpec};
//!
//! let engine = FeatureEngine::default();
//! engine.register("beta", |_| true);
//! engine.deactivate("beta", ()).unwrap();
//! engine.activate("beta", "alice").unwrap();
//!
//! assert!(engine.is_active("beta", "alice").unwrap());
//! assert!(!engine.is_active("beta", ()).unwrap());
//!
//! engine.load(FeatureSpec::scoped().with("beta", ["alice", "bob"])).unwrap();
//! assert_eq!(engine.cached("beta", "bob").unwrap(), Some(true));
//! ```

/// Resolution cache and composite cache keys.
pub mod cache;
/// Engine configuration.
pub mod config;
/// The engine facade.
pub mod engine;
/// Error types.
pub mod error;
/// Feature check events and sinks.
pub mod events;
/// Resolver chains.
pub mod registry;
/// Scope values and key derivation.
pub mod scope;
/// Bulk load specifications.
pub mod spec;
/// Resolver result values.
pub mod value;

pub use cache::{ResolutionCache, cache_key};
pub use config::{DeactivateFallback, EngineConfig};
pub use engine::{FeatureEngine, LoadReport};
pub use error::{ConfigError, FlagError, ResolverError, Result};
pub use events::{EventSink, FeatureEvent, NoopSink, RecordingSink, TracingSink};
pub use registry::{FeatureRule, Resolver, ResolverRegistry};
pub use scope::{EntityRef, FeatureScopeable, Scope, ScopeKeyResolver};
pub use spec::{FeatureSpec, PendingResolution};
pub use value::ResolverValue;
