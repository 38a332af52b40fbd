//! Best-effort analytics events.
//!
//! One event is emitted after each successful archive generation. Delivery
//! is fire-and-forget: sinks have no error channel and must never block or
//! fail the export.

use serde::{Deserialize, Serialize};

/// A single analytics event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalyticsEvent {
    /// Event kind, e.g. "form_filled"
    pub event_type: String,

    /// Kind of the event target, e.g. "form"
    pub target_type: String,

    /// Id of the target entity
    pub target_id: String,
}

impl AnalyticsEvent {
    /// The event emitted after a successful export bundle.
    pub fn form_filled(target_id: impl Into<String>) -> Self {
        Self {
            event_type: "form_filled".to_string(),
            target_type: "form".to_string(),
            target_id: target_id.into(),
        }
    }
}

/// Destination for analytics events.
pub trait AnalyticsSink: Send + Sync {
    /// Record an event. Infallible by contract; implementations swallow
    /// their own delivery errors.
    fn record(&self, event: &AnalyticsEvent);
}

/// Sink that writes events to the log.
#[derive(Debug, Default)]
pub struct LogSink;

impl AnalyticsSink for LogSink {
    fn record(&self, event: &AnalyticsEvent) {
        log::info!(
            "analytics: {} {}={}",
            event.event_type,
            event.target_type,
            event.target_id
        );
    }
}

/// Sink that drops every event.
#[derive(Debug, Default)]
pub struct NullSink;

impl AnalyticsSink for NullSink {
    fn record(&self, _event: &AnalyticsEvent) {}
}
