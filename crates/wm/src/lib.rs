//! Window-manager facade for docklet.
//!
//! This crate describes everything the dock engine consumes from the desktop:
//! - Window queries (does an app have a window on a workspace / monitor?)
//! - Notification topics and the events pumped for them
//! - Monitor geometry for the monitor the dock lives on
//! - Matching a running application back to its launcher
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Domain Layer                             │
//! │  types.rs    - AppHandle, WindowId, Workspace, Rect, events │
//! │  provider.rs - Traits the engine queries and subscribes to  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Infrastructure Layer                        │
//! │  memory.rs - In-memory desktop for tests and headless hosts │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Real window-manager adapters live with the host; they translate native
//! signals into [`WmEvent`] values and only for topics that are currently
//! subscribed.
//!
//! # Example
//!
//! ```ignore
//! use docklet_wm::{InMemoryWindowManager, Rect, Workspace, WorkspaceId};
//!
//! let wm = InMemoryWindowManager::new();
//! let app = wm.launch();
//! let ws = Workspace::new(WorkspaceId(1));
//! wm.set_active_workspace(Some(ws));
//! wm.open_window(app, ws, Rect::new(0, 0, 640, 480));
//! ```

mod memory;
mod provider;
mod types;

pub use memory::{FixedMonitor, InMemoryWindowManager, StaticMatcher};
pub use provider::{
    AppMatcher, AppMatcherRef, MonitorGeometrySource, MonitorGeometrySourceRef, NoMonitorFilter,
    NullProvider, WindowManager, WindowManagerRef,
};
pub use types::{
    AppHandle, AppInfo, Rect, SubscriptionId, Topic, WindowId, WmEvent, Workspace, WorkspaceId,
};
