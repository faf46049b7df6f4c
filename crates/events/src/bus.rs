//! Event bus abstraction for the presentation layer.
//!
//! The dock engine never talks to a renderer directly. It emits JSON payloads
//! on a bus; whatever draws the dock listens. Emission is fire-and-forget.

use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Trait for emitting events to the presentation layer.
pub trait EventBus: Send + Sync {
    /// Emit an event with a JSON payload.
    ///
    /// # Arguments
    /// * `topic` - Event name (e.g., "dock:entry_added")
    /// * `payload` - JSON payload to emit
    fn emit(&self, topic: &str, payload: serde_json::Value);
}

/// Type alias for shared event bus reference.
pub type EventBusRef = Arc<dyn EventBus>;

/// Serialize `event` and emit it on `bus`.
///
/// A payload that fails to serialize is logged and dropped; emission never
/// fails the caller.
pub fn emit_event<T: Serialize>(bus: &dyn EventBus, topic: &str, event: &T) {
    match serde_json::to_value(event) {
        Ok(payload) => bus.emit(topic, payload),
        Err(e) => tracing::warn!(topic, error = %e, "dropping unserializable event"),
    }
}

/// In-memory event bus for testing.
///
/// Captures all emitted events for later inspection.
#[derive(Default)]
pub struct InMemoryEventBus {
    events: Mutex<Vec<EmittedEvent>>,
}

/// A captured event from InMemoryEventBus.
#[derive(Debug, Clone)]
pub struct EmittedEvent {
    pub topic: String,
    pub payload: serde_json::Value,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn captured(&self) -> MutexGuard<'_, Vec<EmittedEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get all captured events.
    pub fn events(&self) -> Vec<EmittedEvent> {
        self.captured().clone()
    }

    /// Get events for a specific topic.
    pub fn events_for(&self, topic: &str) -> Vec<EmittedEvent> {
        self.captured()
            .iter()
            .filter(|e| e.topic == topic)
            .cloned()
            .collect()
    }

    /// Decode every payload captured for `topic`, skipping malformed ones.
    pub fn decoded<T: serde::de::DeserializeOwned>(&self, topic: &str) -> Vec<T> {
        self.captured()
            .iter()
            .filter(|e| e.topic == topic)
            .filter_map(|e| serde_json::from_value(e.payload.clone()).ok())
            .collect()
    }

    pub fn clear(&self) {
        self.captured().clear();
    }

    pub fn len(&self) -> usize {
        self.captured().len()
    }

    pub fn is_empty(&self) -> bool {
        self.captured().is_empty()
    }
}

impl EventBus for InMemoryEventBus {
    fn emit(&self, topic: &str, payload: serde_json::Value) {
        self.captured().push(EmittedEvent {
            topic: topic.to_string(),
            payload,
        });
    }
}

/// No-op event bus for hosts without a presentation layer.
pub struct NullEventBus;

impl EventBus for NullEventBus {
    fn emit(&self, _topic: &str, _payload: serde_json::Value) {
        // Intentionally empty
    }
}
