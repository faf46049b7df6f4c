//! In-memory desktop.
//!
//! Used by tests and headless hosts. It keeps the windows, the running
//! applications and the live subscriptions, so callers can check that
//! subscriptions are neither leaked nor released twice.

use crate::provider::{AppMatcher, MonitorGeometrySource, WindowManager};
use crate::types::{AppHandle, AppInfo, Rect, SubscriptionId, Topic, WindowId, Workspace};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone)]
struct WindowRecord {
    app: AppHandle,
    workspace: Workspace,
    geometry: Rect,
}

#[derive(Default)]
struct Desktop {
    next_id: u64,
    running: Vec<AppHandle>,
    windows: BTreeMap<WindowId, WindowRecord>,
    active_workspace: Option<Workspace>,
    subscriptions: HashMap<SubscriptionId, Topic>,
    stray_unsubscribes: usize,
}

impl Desktop {
    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn windows_of(&self, app: AppHandle) -> impl Iterator<Item = &WindowRecord> {
        self.windows.values().filter(move |w| w.app == app)
    }
}

/// Window manager whose whole state lives in memory.
#[derive(Default)]
pub struct InMemoryWindowManager {
    desktop: Mutex<Desktop>,
}

impl InMemoryWindowManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn desktop(&self) -> MutexGuard<'_, Desktop> {
        self.desktop.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a new application process without windows.
    pub fn launch(&self) -> AppHandle {
        let mut desktop = self.desktop();
        let app = AppHandle(desktop.allocate());
        desktop.running.push(app);
        app
    }

    /// Terminate an application and every window it owns.
    pub fn quit(&self, app: AppHandle) -> Vec<WindowId> {
        let mut desktop = self.desktop();
        desktop.running.retain(|a| *a != app);
        let closed: Vec<WindowId> = desktop
            .windows
            .iter()
            .filter(|(_, w)| w.app == app)
            .map(|(id, _)| *id)
            .collect();
        for id in &closed {
            desktop.windows.remove(id);
        }
        closed
    }

    pub fn open_window(&self, app: AppHandle, workspace: Workspace, geometry: Rect) -> WindowId {
        let mut desktop = self.desktop();
        let id = WindowId(desktop.allocate());
        desktop.windows.insert(
            id,
            WindowRecord {
                app,
                workspace,
                geometry,
            },
        );
        id
    }

    pub fn close_window(&self, window: WindowId) -> bool {
        self.desktop().windows.remove(&window).is_some()
    }

    pub fn move_window(&self, window: WindowId, geometry: Rect) {
        if let Some(record) = self.desktop().windows.get_mut(&window) {
            record.geometry = geometry;
        }
    }

    pub fn move_to_workspace(&self, window: WindowId, workspace: Workspace) {
        if let Some(record) = self.desktop().windows.get_mut(&window) {
            record.workspace = workspace;
        }
    }

    pub fn set_active_workspace(&self, workspace: Option<Workspace>) {
        self.desktop().active_workspace = workspace;
    }

    /// Number of live subscriptions on `topic`.
    pub fn subscribers(&self, topic: Topic) -> usize {
        self.desktop()
            .subscriptions
            .values()
            .filter(|t| **t == topic)
            .count()
    }

    /// Number of live subscriptions of any kind.
    pub fn subscription_count(&self) -> usize {
        self.desktop().subscriptions.len()
    }

    /// Windows that currently carry a geometry subscription.
    pub fn geometry_watched(&self) -> HashSet<WindowId> {
        self.desktop()
            .subscriptions
            .values()
            .filter_map(|t| match t {
                Topic::GeometryChanged(w) => Some(*w),
                _ => None,
            })
            .collect()
    }

    /// Unsubscribe calls for handles that were not live.
    pub fn stray_unsubscribes(&self) -> usize {
        self.desktop().stray_unsubscribes
    }
}

impl WindowManager for InMemoryWindowManager {
    fn has_window(&self, app: AppHandle) -> bool {
        self.desktop().windows_of(app).next().is_some()
    }

    fn has_window_on_workspace(&self, app: AppHandle, workspace: &Workspace) -> bool {
        self.desktop()
            .windows_of(app)
            .any(|w| w.workspace.id == workspace.id)
    }

    fn has_window_on_monitor(&self, app: AppHandle, rect: &Rect) -> bool {
        self.desktop()
            .windows_of(app)
            .any(|w| rect.owns(&w.geometry))
    }

    fn window_count_on_workspace_and_monitor(
        &self,
        app: AppHandle,
        workspace: &Workspace,
        rect: &Rect,
    ) -> usize {
        self.desktop()
            .windows_of(app)
            .filter(|w| w.workspace.id == workspace.id && rect.owns(&w.geometry))
            .count()
    }

    fn active_workspace(&self) -> Option<Workspace> {
        self.desktop().active_workspace
    }

    fn is_running(&self, app: AppHandle) -> bool {
        self.desktop().running.contains(&app)
    }

    fn running_applications(&self) -> Vec<AppHandle> {
        self.desktop().running.clone()
    }

    fn windows(&self) -> Vec<WindowId> {
        self.desktop().windows.keys().copied().collect()
    }

    fn subscribe(&self, topic: Topic) -> SubscriptionId {
        let mut desktop = self.desktop();
        let id = SubscriptionId(desktop.allocate());
        desktop.subscriptions.insert(id, topic);
        tracing::trace!(subscription = id.0, ?topic, "subscribed");
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        let mut desktop = self.desktop();
        if desktop.subscriptions.remove(&id).is_none() {
            desktop.stray_unsubscribes += 1;
            tracing::warn!(subscription = id.0, "unsubscribe for unknown handle");
        }
    }
}

/// Matcher backed by a fixed table.
#[derive(Default)]
pub struct StaticMatcher {
    table: Mutex<HashMap<AppHandle, AppInfo>>,
}

impl StaticMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, app: AppHandle, info: AppInfo) {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(app, info);
    }
}

impl AppMatcher for StaticMatcher {
    fn app_info(&self, app: AppHandle) -> Option<AppInfo> {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&app)
            .cloned()
    }
}

/// Monitor source reporting a settable rectangle.
#[derive(Default)]
pub struct FixedMonitor {
    geometry: Mutex<Option<Rect>>,
}

impl FixedMonitor {
    pub fn new(geometry: Rect) -> Self {
        Self {
            geometry: Mutex::new(Some(geometry)),
        }
    }

    pub fn set(&self, geometry: Option<Rect>) {
        *self.geometry.lock().unwrap_or_else(PoisonError::into_inner) = geometry;
    }
}

impl MonitorGeometrySource for FixedMonitor {
    fn try_get_active_geometry(&self) -> Option<Rect> {
        *self.geometry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
