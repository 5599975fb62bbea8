use std::sync::atomic::{AtomicUsize, Ordering};

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;

fn registry() -> ResolverRegistry {
	ResolverRegistry::default()
}

fn legacy_registry() -> ResolverRegistry {
	ResolverRegistry::new(ScopeKeyResolver::default(), DeactivateFallback::DeactivationScope)
}

fn state(registry: &ResolverRegistry, feature: &str, scope: impl Into<Scope>) -> bool {
	registry.resolve_feature_state(feature, &scope.into()).unwrap()
}

#[test]
fn unregistered_feature_is_inactive_and_missing() {
	let registry = registry();
	assert!(registry.missing_resolver("beta"));
	assert!(!state(&registry, "beta", ()));
	assert!(!state(&registry, "beta", "alice"));
}

#[test]
fn register_replaces_resolver_and_clears_overrides() {
	let registry = registry();
	registry.register("beta", resolver(|_| false));
	registry.activate("beta", &"alice".into()).unwrap();
	assert!(state(&registry, "beta", "alice"));

	registry.register("beta", resolver(|_| false));
	assert_eq!(registry.rules("beta"), Some(Vec::new()));
	assert!(!state(&registry, "beta", "alice"));
	assert!(!registry.missing_resolver("beta"));
}

#[test]
fn non_boolean_results_are_active() {
	let registry = registry();
	registry.register("null", resolver(|_| ()));
	registry.register("zero", resolver(|_| 0i64));
	registry.register("text", resolver(|_| "off"));
	registry.register("off", resolver(|_| false));

	assert!(state(&registry, "null", ()));
	assert!(state(&registry, "zero", ()));
	assert!(state(&registry, "text", ()));
	assert!(!state(&registry, "off", ()));
}

#[test]
fn resolver_sees_queried_scope() {
	let registry = registry();
	registry.register("staff", resolver(|scope: &Scope| *scope == Scope::from("admin")));

	assert!(state(&registry, "staff", "admin"));
	assert!(!state(&registry, "staff", "guest"));
}

#[test]
fn activate_without_registration_defaults_other_scopes_to_inactive() {
	let registry = registry();
	registry.activate("beta", &"alice".into()).unwrap();

	assert!(!registry.missing_resolver("beta"));
	assert!(state(&registry, "beta", "alice"));
	assert!(!state(&registry, "beta", "bob"));
	assert!(!state(&registry, "beta", ()));
}

#[test]
fn overrides_only_touch_their_own_scope() {
	let registry = registry();
	registry.register("beta", resolver(|scope: &Scope| *scope == Scope::from("carol")));
	registry.activate("beta", &"alice".into()).unwrap();
	registry.deactivate("beta", &"carol".into()).unwrap();
	registry.activate("beta", &"dave".into()).unwrap();

	assert!(state(&registry, "beta", "alice"));
	assert!(!state(&registry, "beta", "carol"));
	assert!(state(&registry, "beta", "dave"));
	assert!(!state(&registry, "beta", "erin"));
}

#[test]
fn newest_override_wins() {
	let registry = registry();
	registry.register("beta", resolver(|_| true));
	registry.deactivate("beta", &"alice".into()).unwrap();
	registry.activate("beta", &"alice".into()).unwrap();
	assert!(state(&registry, "beta", "alice"));

	registry.deactivate("beta", &"alice".into()).unwrap();
	assert!(!state(&registry, "beta", "alice"));
}

#[test]
fn overrides_compare_by_derived_key() {
	let registry = registry();
	registry.activate("beta", &Scope::Identified("42".into())).unwrap();
	assert!(state(&registry, "beta", 42u64));
}

#[test]
fn rules_are_introspectable() {
	let registry = registry();
	registry.activate("beta", &"alice".into()).unwrap();
	registry.deactivate("beta", &Scope::None).unwrap();

	let rules = registry.rules("beta").unwrap();
	assert_eq!(
		rules,
		vec![
			FeatureRule {
				scope: "alice".into(),
				scope_key: "alice".into(),
				outcome: true,
			},
			FeatureRule {
				scope: Scope::None,
				scope_key: crate::scope::DEFAULT_NULL_KEY.into(),
				outcome: false,
			},
		]
	);
	assert_eq!(registry.rules("gamma"), None);
}

#[test]
fn registered_lists_sorted_names() {
	let registry = registry();
	registry.register("zeta", resolver(|_| true));
	registry.activate("alpha", &Scope::None).unwrap();
	registry.deactivate("mu", &Scope::None).unwrap();
	assert_eq!(registry.registered(), vec!["alpha", "mu", "zeta"]);
}

#[test]
fn resolver_errors_propagate() {
	let registry = registry();
	registry.register("flaky", try_resolver(|_| Err::<bool, _>("backend down")));

	let err = registry.resolve_feature_state("flaky", &Scope::None).unwrap_err();
	match err {
		FlagError::Resolver { feature, source } => {
			assert_eq!(feature, "flaky");
			assert_eq!(source.to_string(), "backend down");
		}
		other => panic!("expected resolver error, got {other:?}"),
	}
}

#[test]
fn matching_override_skips_resolver() {
	let calls = Arc::new(AtomicUsize::new(0));
	let seen = Arc::clone(&calls);
	let registry = registry();
	registry.register(
		"beta",
		resolver(move |_| {
			seen.fetch_add(1, Ordering::SeqCst);
			true
		}),
	);
	registry.deactivate("beta", &"alice".into()).unwrap();

	assert!(!state(&registry, "beta", "alice"));
	assert_eq!(calls.load(Ordering::SeqCst), 0);
	assert!(state(&registry, "beta", "bob"));
	assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn resolver_may_query_registry_reentrantly() {
	let registry = Arc::new(registry());
	let inner = Arc::downgrade(&registry);
	registry.register("base", resolver(|_| true));
	registry.register(
		"derived",
		try_resolver(move |scope: &Scope| {
			let registry = inner.upgrade().ok_or("registry dropped")?;
			registry
				.resolve_feature_state("base", scope)
				.map_err(|e| ResolverError::from(e.to_string()))
		}),
	);

	assert!(state(&registry, "derived", "alice"));
}

#[test]
fn queried_scope_fallback_evaluates_resolver_with_query() {
	let registry = registry();
	registry.register("beta", resolver(|scope: &Scope| *scope == Scope::from("bob")));
	registry.deactivate("beta", &"alice".into()).unwrap();

	assert!(state(&registry, "beta", "bob"));
	assert!(!state(&registry, "beta", "carol"));
}

#[test]
fn deactivation_scope_fallback_reproduces_legacy_chain() {
	let registry = legacy_registry();
	registry.register("beta", resolver(|scope: &Scope| *scope != Scope::from("bob")));
	registry.deactivate("beta", &"alice".into()).unwrap();

	// The resolver is consulted with "alice", not the queried scope.
	assert!(state(&registry, "beta", "bob"));
	assert!(state(&registry, "beta", "carol"));
	assert!(!state(&registry, "beta", "alice"));
}

#[test]
fn deactivation_scope_fallback_rechecks_older_overrides_against_deactivated_scope() {
	let registry = legacy_registry();
	registry.activate("beta", &"alice".into()).unwrap();
	registry.deactivate("beta", &"bob".into()).unwrap();

	// Older overrides are matched against "bob", so alice's activation is skipped.
	assert!(!state(&registry, "beta", "alice"));
	assert!(!state(&registry, "beta", "bob"));

	// Activation rules still compare against the query.
	registry.activate("beta", &"carol".into()).unwrap();
	assert!(state(&registry, "beta", "carol"));
}

#[test]
fn the_documented_scenario() {
	let registry = registry();
	registry.register("beta", resolver(|_| true));
	assert!(state(&registry, "beta", ()));

	registry.deactivate("beta", &Scope::None).unwrap();
	assert!(!state(&registry, "beta", ()));

	registry.activate("beta", &"alice".into()).unwrap();
	assert!(state(&registry, "beta", "alice"));
	assert!(!state(&registry, "beta", ()));
}

proptest! {
	#[test]
	fn repeated_activation_is_idempotent(
		target in "[a-z]{1,6}",
		others in proptest::collection::vec("[a-z]{1,6}", 0..6),
		base in any::<bool>(),
	) {
		let once = registry();
		let twice = registry();
		for r in [&once, &twice] {
			r.register("beta", resolver(move |_| base));
		}
		once.activate("beta", &target.as_str().into()).unwrap();
		twice.activate("beta", &target.as_str().into()).unwrap();
		twice.activate("beta", &target.as_str().into()).unwrap();

		prop_assert!(state(&once, "beta", target.as_str()));
		prop_assert!(state(&twice, "beta", target.as_str()));
		for other in &others {
			prop_assert_eq!(state(&once, "beta", other.as_str()), state(&twice, "beta", other.as_str()));
		}
	}

	#[test]
	fn deactivation_leaves_other_scopes_unchanged(
		target in "[a-z]{1,6}",
		other in "[a-z]{1,6}",
	) {
		prop_assume!(target != other);
		let registry = registry();
		registry.register("beta", resolver(|scope: &Scope| scope.to_string().len() % 2 == 0));
		let before = state(&registry, "beta", other.as_str());

		registry.deactivate("beta", &target.as_str().into()).unwrap();

		prop_assert!(!state(&registry, "beta", target.as_str()));
		prop_assert_eq!(state(&registry, "beta", other.as_str()), before);
	}
}
