//! Provider traits for window-manager state.
//!
//! These traits abstract the desktop the dock runs on,
//! allowing the engine to remain pure and testable.

use crate::types::{AppHandle, AppInfo, Rect, SubscriptionId, Topic, WindowId, Workspace};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Queries and subscriptions offered by the window manager.
///
/// Implementations answer from their current state and never block; a query
/// the window manager cannot answer reports "no windows".
pub trait WindowManager: Send + Sync {
    /// Whether the application has at least one window anywhere.
    fn has_window(&self, app: AppHandle) -> bool;

    fn has_window_on_workspace(&self, app: AppHandle, workspace: &Workspace) -> bool;

    /// Whether the application has a window belonging to the monitor `rect`.
    fn has_window_on_monitor(&self, app: AppHandle, rect: &Rect) -> bool;

    fn window_count_on_workspace_and_monitor(
        &self,
        app: AppHandle,
        workspace: &Workspace,
        rect: &Rect,
    ) -> usize;

    /// The active workspace, if the window manager reports one.
    fn active_workspace(&self) -> Option<Workspace>;

    /// Whether the application process is still alive.
    fn is_running(&self, app: AppHandle) -> bool;

    fn running_applications(&self) -> Vec<AppHandle>;

    /// Every window currently known to the window manager.
    fn windows(&self) -> Vec<WindowId>;

    /// Start delivering notifications for `topic`.
    fn subscribe(&self, topic: Topic) -> SubscriptionId;

    /// Stop delivering notifications for a previously returned handle.
    fn unsubscribe(&self, id: SubscriptionId);
}

/// Source of the geometry of the monitor the dock is shown on.
pub trait MonitorGeometrySource: Send + Sync {
    /// `None` when monitor filtering is not active.
    fn try_get_active_geometry(&self) -> Option<Rect>;
}

/// Matches a running application back to its launcher.
pub trait AppMatcher: Send + Sync {
    fn app_info(&self, app: AppHandle) -> Option<AppInfo>;
}

/// Type alias for shared window-manager reference.
pub type WindowManagerRef = Arc<dyn WindowManager>;

pub type MonitorGeometrySourceRef = Arc<dyn MonitorGeometrySource>;

pub type AppMatcherRef = Arc<dyn AppMatcher>;

/// Monitor source that never filters.
pub struct NoMonitorFilter;

impl MonitorGeometrySource for NoMonitorFilter {
    fn try_get_active_geometry(&self) -> Option<Rect> {
        None
    }
}

/// Null implementation for headless runs or unsupported desktops.
///
/// Reports no windows, no workspace and no running applications. Subscription
/// handles are still unique so callers can keep their bookkeeping.
#[derive(Default)]
pub struct NullProvider {
    next_subscription: AtomicU64,
}

impl NullProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WindowManager for NullProvider {
    fn has_window(&self, _app: AppHandle) -> bool {
        false
    }

    fn has_window_on_workspace(&self, _app: AppHandle, _workspace: &Workspace) -> bool {
        false
    }

    fn has_window_on_monitor(&self, _app: AppHandle, _rect: &Rect) -> bool {
        false
    }

    fn window_count_on_workspace_and_monitor(
        &self,
        _app: AppHandle,
        _workspace: &Workspace,
        _rect: &Rect,
    ) -> usize {
        0
    }

    fn active_workspace(&self) -> Option<Workspace> {
        None
    }

    fn is_running(&self, _app: AppHandle) -> bool {
        false
    }

    fn running_applications(&self) -> Vec<AppHandle> {
        Vec::new()
    }

    fn windows(&self) -> Vec<WindowId> {
        Vec::new()
    }

    fn subscribe(&self, _topic: Topic) -> SubscriptionId {
        SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed))
    }

    fn unsubscribe(&self, _id: SubscriptionId) {
        // Nothing is ever delivered
    }
}

impl AppMatcher for NullProvider {
    fn app_info(&self, _app: AppHandle) -> Option<AppInfo> {
        None
    }
}

impl MonitorGeometrySource for NullProvider {
    fn try_get_active_geometry(&self) -> Option<Rect> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_provider_reports_nothing() {
        let wm = NullProvider::new();
        let app = AppHandle(1);
        assert!(!wm.has_window(app));
        assert!(!wm.is_running(app));
        assert!(wm.active_workspace().is_none());
        assert!(wm.windows().is_empty());
        assert!(wm.app_info(app).is_none());
        assert!(wm.try_get_active_geometry().is_none());
    }

    #[test]
    fn test_null_provider_hands_out_unique_handles() {
        let wm = NullProvider::new();
        let a = wm.subscribe(Topic::WindowOpened);
        let b = wm.subscribe(Topic::WindowOpened);
        assert_ne!(a, b);
    }
}
