//! Visibility and lifecycle engine for a dock.
//!
//! The provider owns the dock's ordered entries and keeps them reconciled
//! with the desktop:
//! - Which entries are shown (attached) given the current workspace, monitor
//!   and settings
//! - Which running applications get a transient entry
//! - Converting entries between pinned and transient form
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Domain Layer                             │
//! │  entry.rs      - DockEntry, EntryKind, EntryList            │
//! │  config.rs     - Settings, ProviderConfig                   │
//! │  visibility.rs - Decision table (pure) and recompute        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Application Layer                          │
//! │  subscriptions.rs - Subscriptions in lock-step with settings│
//! │  lifecycle.rs     - Start/exit handling, pin and unpin      │
//! │  gate.rs          - Suspension of automatic creation        │
//! │  provider.rs      - DockProvider and event routing          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Infrastructure Seams                        │
//! │  launcher.rs - Persisted launcher store                     │
//! │  docklet-wm, docklet-events - desktop and presentation      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use docklet_provider::{Collaborators, DockProvider, ProviderConfig};
//!
//! let mut dock = DockProvider::new(ProviderConfig::default(), collaborators);
//! while let Some(event) = window_manager_events.next() {
//!     dock.handle_event(event);
//! }
//! dock.close();
//! ```

mod config;
mod entry;
mod error;
mod gate;
mod launcher;
mod lifecycle;
mod provider;
mod subscriptions;
mod visibility;

pub use config::{PinnedLauncher, ProviderConfig, Settings, DEFAULT_DOCK_LAUNCHER_ID};
pub use entry::{DockEntry, EntryAttributes, EntryId, EntryKind, EntryList};
pub use error::{DockError, Result};
pub use gate::{CreationGate, CreationGuard};
pub use launcher::{
    InMemoryLauncherStore, LauncherRequest, LauncherStore, LauncherStoreRef, LAUNCHER_EXTENSION,
};
pub use provider::{Collaborators, DockProvider};
pub use subscriptions::{
    viewport_change_applies, workspace_change_applies, SubscriptionManager, Transition,
};
pub use visibility::{is_attached, VisibilityContext};
