//! Subscription manager.
//!
//! Keeps the set of window-manager subscriptions in lock-step with the
//! settings. Three groups are tracked independently:
//! - lifecycle: application opened/closed, held for the provider's lifetime
//! - workspace: held while `current_workspace_only` is on
//! - geometry: held while monitor filtering is on, with one geometry
//!   subscription per known window
//!
//! Every handle acquired here is released exactly once, either by a setting
//! turning its group off or by [`SubscriptionManager::release_all`], which
//! also runs on drop.

use crate::config::Settings;
use docklet_wm::{SubscriptionId, Topic, WindowId, WindowManagerRef, Workspace};
use std::collections::BTreeMap;

const LIFECYCLE_TOPICS: &[Topic] = &[Topic::ApplicationOpened, Topic::ApplicationClosed];

const WORKSPACE_TOPICS: &[Topic] = &[
    Topic::ActiveWindowChanged,
    Topic::ActiveWorkspaceChanged,
    Topic::ViewportsChanged,
    Topic::WindowClosed,
];

const GEOMETRY_TOPICS: &[Topic] = &[Topic::WindowOpened, Topic::WindowClosed];

/// Handles acquired together and released together.
#[derive(Debug, Default)]
struct Group {
    handles: Vec<(Topic, SubscriptionId)>,
}

impl Group {
    fn acquire(&mut self, wm: &WindowManagerRef, topics: &[Topic]) {
        for topic in topics {
            let id = wm.subscribe(*topic);
            self.handles.push((*topic, id));
        }
    }

    fn release(&mut self, wm: &WindowManagerRef) -> usize {
        let released = self.handles.len();
        for (_, id) in self.handles.drain(..) {
            wm.unsubscribe(id);
        }
        released
    }

    fn covers(&self, topic: &Topic) -> bool {
        self.handles.iter().any(|(t, _)| t == topic)
    }

    fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

/// What a call to [`SubscriptionManager::apply`] changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Transition {
    pub workspace: Option<bool>,
    pub geometry: Option<bool>,
}

impl Transition {
    pub fn is_noop(&self) -> bool {
        self.workspace.is_none() && self.geometry.is_none()
    }
}

/// Owns every live window-manager subscription of a provider.
pub struct SubscriptionManager {
    wm: WindowManagerRef,
    monitor_configured: bool,
    lifecycle: Group,
    workspace: Group,
    geometry: Group,
    geometry_windows: BTreeMap<WindowId, SubscriptionId>,
    current_workspace_only: bool,
    tracking_geometry: bool,
}

impl SubscriptionManager {
    /// `monitor_configured` says whether a monitor geometry source exists;
    /// without one the geometry group never activates.
    pub fn new(wm: WindowManagerRef, monitor_configured: bool) -> Self {
        Self {
            wm,
            monitor_configured,
            lifecycle: Group::default(),
            workspace: Group::default(),
            geometry: Group::default(),
            geometry_windows: BTreeMap::new(),
            current_workspace_only: false,
            tracking_geometry: false,
        }
    }

    pub fn acquire_lifecycle(&mut self) {
        if self.lifecycle.is_empty() {
            self.lifecycle.acquire(&self.wm, LIFECYCLE_TOPICS);
            tracing::debug!("lifecycle notifications subscribed");
        }
    }

    /// Bring both setting-driven groups in line with `settings`.
    ///
    /// Values equal to the cached ones leave their group untouched.
    pub fn apply(&mut self, settings: &Settings) -> Transition {
        let mut transition = Transition::default();

        if settings.current_workspace_only != self.current_workspace_only {
            self.current_workspace_only = settings.current_workspace_only;
            if self.current_workspace_only {
                self.workspace.acquire(&self.wm, WORKSPACE_TOPICS);
            } else {
                self.workspace.release(&self.wm);
            }
            tracing::debug!(
                active = self.current_workspace_only,
                "workspace notifications toggled"
            );
            transition.workspace = Some(self.current_workspace_only);
        }

        let track = self.monitor_configured && settings.only_active_monitor;
        if track != self.tracking_geometry {
            self.tracking_geometry = track;
            if track {
                self.start_geometry_tracking();
            } else {
                self.stop_geometry_tracking();
            }
            transition.geometry = Some(track);
        }

        transition
    }

    fn start_geometry_tracking(&mut self) {
        self.geometry.acquire(&self.wm, GEOMETRY_TOPICS);
        for window in self.wm.windows() {
            self.watch_window(window);
        }
        tracing::debug!(
            windows = self.geometry_windows.len(),
            "geometry tracking started"
        );
    }

    fn stop_geometry_tracking(&mut self) {
        self.geometry.release(&self.wm);
        let windows = self.geometry_windows.len();
        for (_, id) in std::mem::take(&mut self.geometry_windows) {
            self.wm.unsubscribe(id);
        }
        tracing::debug!(windows, "geometry tracking stopped");
    }

    fn watch_window(&mut self, window: WindowId) {
        if self.geometry_windows.contains_key(&window) {
            return;
        }
        let id = self.wm.subscribe(Topic::GeometryChanged(window));
        self.geometry_windows.insert(window, id);
    }

    /// A window appeared; watch its geometry if tracking is on.
    pub fn window_opened(&mut self, window: WindowId) {
        if self.tracking_geometry {
            self.watch_window(window);
        }
    }

    /// A window went away; release its geometry subscription.
    pub fn window_closed(&mut self, window: WindowId) {
        if let Some(id) = self.geometry_windows.remove(&window) {
            self.wm.unsubscribe(id);
        }
    }

    /// Whether any live subscription covers `topic`.
    pub fn covers(&self, topic: &Topic) -> bool {
        match topic {
            Topic::GeometryChanged(window) => self.geometry_windows.contains_key(window),
            _ => {
                self.lifecycle.covers(topic)
                    || self.workspace.covers(topic)
                    || self.geometry.covers(topic)
            }
        }
    }

    pub fn is_tracking_workspace(&self) -> bool {
        self.current_workspace_only
    }

    pub fn is_tracking_geometry(&self) -> bool {
        self.tracking_geometry
    }

    /// Windows that carry a geometry subscription.
    pub fn watched_windows(&self) -> Vec<WindowId> {
        self.geometry_windows.keys().copied().collect()
    }

    pub fn live_count(&self) -> usize {
        self.lifecycle.handles.len()
            + self.workspace.handles.len()
            + self.geometry.handles.len()
            + self.geometry_windows.len()
    }

    /// Release every live handle. A second call is a no-op.
    pub fn release_all(&mut self) {
        let mut released = self.lifecycle.release(&self.wm) + self.workspace.release(&self.wm);
        released += self.geometry.release(&self.wm);
        for (_, id) in std::mem::take(&mut self.geometry_windows) {
            self.wm.unsubscribe(id);
            released += 1;
        }
        self.current_workspace_only = false;
        self.tracking_geometry = false;
        if released > 0 {
            tracing::debug!(released, "subscriptions released");
        }
    }
}

impl Drop for SubscriptionManager {
    fn drop(&mut self) {
        self.release_all();
    }
}

/// Whether an active-workspace change warrants a recompute.
///
/// Every switch counts except one onto or off a virtual workspace, which is a
/// viewport scroll and is left to [`viewport_change_applies`]. A missing
/// previous or active workspace still recomputes.
pub fn workspace_change_applies(previous: Option<&Workspace>, active: Option<&Workspace>) -> bool {
    let virtual_switch = active.map_or(false, Workspace::is_virtual)
        || previous.map_or(false, Workspace::is_virtual);
    !virtual_switch
}

/// Whether a viewport change warrants a recompute.
///
/// Kept separate from [`workspace_change_applies`]: only viewport scrolls
/// within a virtual workspace count.
pub fn viewport_change_applies(active: Option<&Workspace>) -> bool {
    matches!(active, Some(active) if active.is_virtual())
}
