//! Event contracts between the dock engine and the presentation layer.
//!
//! This crate defines the DTOs for every notification the engine emits.
//! Using shared types prevents runtime deserialization errors from
//! mismatched field names on the renderer side.
//!
//! Also provides the `EventBus` trait for decoupled event emission.

mod bus;

pub use bus::{emit_event, EmittedEvent, EventBus, EventBusRef, InMemoryEventBus, NullEventBus};

use docklet_wm::AppHandle;
use serde::{Deserialize, Serialize};

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Which form an entry has, as seen by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryForm {
    Pinned,
    Transient,
}

/// Event emitted when an entry is appended to the dock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryAddedEvent {
    pub entry_id: u64,
    pub launcher_id: String,
    pub form: EntryForm,
    /// Index in the dock's left-to-right order.
    pub position: usize,
    #[serde(default)]
    pub app: Option<AppHandle>,
    #[serde(default)]
    pub timestamp_ms: i64,
}

impl EntryAddedEvent {
    pub fn new(
        entry_id: u64,
        launcher_id: &str,
        form: EntryForm,
        position: usize,
        app: Option<AppHandle>,
    ) -> Self {
        Self {
            entry_id,
            launcher_id: launcher_id.to_string(),
            form,
            position,
            app,
            timestamp_ms: now_ms(),
        }
    }
}

/// Event emitted when an entry leaves the dock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryRemovedEvent {
    pub entry_id: u64,
    pub launcher_id: String,
    pub position: usize,
    #[serde(default)]
    pub timestamp_ms: i64,
}

impl EntryRemovedEvent {
    pub fn new(entry_id: u64, launcher_id: &str, position: usize) -> Self {
        Self {
            entry_id,
            launcher_id: launcher_id.to_string(),
            position,
            timestamp_ms: now_ms(),
        }
    }
}

/// Event emitted when an entry is converted between pinned and transient.
///
/// The replacement takes the old entry's position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryReplacedEvent {
    pub old_entry_id: u64,
    pub new_entry_id: u64,
    pub form: EntryForm,
    pub position: usize,
    #[serde(default)]
    pub timestamp_ms: i64,
}

impl EntryReplacedEvent {
    pub fn new(old_entry_id: u64, new_entry_id: u64, form: EntryForm, position: usize) -> Self {
        Self {
            old_entry_id,
            new_entry_id,
            form,
            position,
            timestamp_ms: now_ms(),
        }
    }
}

/// Event emitted after a recompute changed at least one attached flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisibilityChangedEvent {
    /// Entries now shown, in dock order.
    pub attached: Vec<u64>,
    /// Entries now hidden, in dock order.
    #[serde(default)]
    pub hidden: Vec<u64>,
    #[serde(default)]
    pub timestamp_ms: i64,
}

impl VisibilityChangedEvent {
    pub fn new(attached: Vec<u64>, hidden: Vec<u64>) -> Self {
        Self {
            attached,
            hidden,
            timestamp_ms: now_ms(),
        }
    }
}

/// Request to redraw the running indicator of a newly attached entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorRefreshEvent {
    pub entry_id: u64,
    #[serde(default)]
    pub app: Option<AppHandle>,
    #[serde(default)]
    pub timestamp_ms: i64,
}

impl IndicatorRefreshEvent {
    pub fn new(entry_id: u64, app: Option<AppHandle>) -> Self {
        Self {
            entry_id,
            app,
            timestamp_ms: now_ms(),
        }
    }
}

/// Event names as constants to prevent typos.
pub mod event_names {
    pub const ENTRY_ADDED: &str = "dock:entry_added";
    pub const ENTRY_REMOVED: &str = "dock:entry_removed";
    pub const ENTRY_REPLACED: &str = "dock:entry_replaced";
    pub const VISIBILITY_CHANGED: &str = "dock:visibility_changed";
    pub const INDICATOR_REFRESH: &str = "dock:indicator_refresh";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_added_deserialize() {
        let json = r#"{"entry_id": 3, "launcher_id": "gedit.desktop", "form": "transient", "position": 2, "app": 9}"#;
        let event: EntryAddedEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.entry_id, 3);
        assert_eq!(event.form, EntryForm::Transient);
        assert_eq!(event.app, Some(AppHandle(9)));
        assert_eq!(event.timestamp_ms, 0);
    }

    #[test]
    fn test_visibility_changed_deserialize_minimal() {
        let json = r#"{"attached": [1, 2]}"#;
        let event: VisibilityChangedEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.attached, vec![1, 2]);
        assert!(event.hidden.is_empty());
    }

    #[test]
    fn test_entry_form_serializes_lowercase() {
        let value = serde_json::to_value(EntryForm::Pinned).unwrap();
        assert_eq!(value, serde_json::json!("pinned"));
    }

    #[test]
    fn test_constructors_stamp_time() {
        let event = EntryRemovedEvent::new(1, "x.desktop", 0);
        assert!(event.timestamp_ms > 0);
    }
}
