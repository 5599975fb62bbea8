//! Observability events for single feature checks.
//!
//! The engine hands every [`FeatureEngine::is_active`](crate::FeatureEngine::is_active)
//! call to an [`EventSink`]. Dispatch is fire-and-forget; sinks cannot
//! influence the result.

use parking_lot::Mutex;

use crate::scope::Scope;


/// A feature check, known or unknown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureEvent {
	/// A registered feature was checked.
	Checked { feature: String, scope: Scope },
	/// A feature with no resolver was checked.
	UnknownChecked { feature: String, scope: Scope },
}

impl FeatureEvent {
	pub fn feature(&self) -> &str {
		match self {
			FeatureEvent::Checked { feature, .. } | FeatureEvent::UnknownChecked { feature, .. } => feature,
		}
	}

	pub fn scope(&self) -> &Scope {
		match self {
			FeatureEvent::Checked { scope, .. } | FeatureEvent::UnknownChecked { scope, .. } => scope,
		}
	}
}

/// Receiver for [`FeatureEvent`]s.
pub trait EventSink: Send + Sync {
	fn dispatch(&self, event: &FeatureEvent);
}

/// Emits events through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
	fn dispatch(&self, event: &FeatureEvent) {
		match event {
			FeatureEvent::Checked { feature, scope } => {
				tracing::trace!(feature = %feature, scope = %scope, "feature.checked");
			}
			FeatureEvent::UnknownChecked { feature, scope } => {
				tracing::debug!(feature = %feature, scope = %scope, "feature.unknown_checked");
			}
		}
	}
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl EventSink for NoopSink {
	fn dispatch(&self, _event: &FeatureEvent) {}
}

/// Collects events in memory, in dispatch order.
#[derive(Debug, Default)]
pub struct RecordingSink {
	events: Mutex<Vec<FeatureEvent>>,
}

impl RecordingSink {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns recorded events and clears the buffer.
	pub fn take(&self) -> Vec<FeatureEvent> {
		std::mem::take(&mut *self.events.lock())
	}

	pub fn events(&self) -> Vec<FeatureEvent> {
		self.events.lock().clone()
	}
}

impl EventSink for RecordingSink {
	fn dispatch(&self, event: &FeatureEvent) {
		self.events.lock().push(event.clone());
	}
}
