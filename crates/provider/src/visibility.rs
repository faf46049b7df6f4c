//! Visibility engine.
//!
//! Decides which entries are attached. The decision is pure and works on a
//! [`VisibilityContext`] snapshot taken once per recompute; the provider
//! applies it to every entry and reports what changed.

use crate::config::Settings;
use crate::entry::{DockEntry, EntryKind};
use crate::provider::DockProvider;
use docklet_events::{
    emit_event, event_names, IndicatorRefreshEvent, VisibilityChangedEvent,
};
use docklet_wm::{AppHandle, MonitorGeometrySource, Rect, WindowManager, Workspace};

/// State the decision table reads, captured once per recompute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityContext {
    pub current_workspace_only: bool,
    /// Active workspace; only queried when filtering by workspace.
    pub active_workspace: Option<Workspace>,
    /// Monitor to filter by; `None` means monitor filtering is inactive.
    pub monitor: Option<Rect>,
}

impl VisibilityContext {
    pub fn capture(
        settings: &Settings,
        wm: &dyn WindowManager,
        monitor: Option<&dyn MonitorGeometrySource>,
    ) -> Self {
        let monitor = match monitor {
            Some(source) if settings.only_active_monitor => source.try_get_active_geometry(),
            _ => None,
        };
        let active_workspace = if settings.current_workspace_only {
            wm.active_workspace()
        } else {
            None
        };

        Self {
            current_workspace_only: settings.current_workspace_only,
            active_workspace,
            monitor,
        }
    }
}

/// Decision table for one entry.
///
/// 1. Unbound pinned entries are always shown.
/// 2. Bound entries are filtered by workspace and/or monitor. Without an
///    active workspace to compare against, the entry is shown.
pub fn is_attached(entry: &DockEntry, ctx: &VisibilityContext, wm: &dyn WindowManager) -> bool {
    let app = match entry.kind() {
        EntryKind::Pinned { app: None, .. } => return true,
        EntryKind::Pinned { app: Some(app), .. } | EntryKind::Transient { app, .. } => *app,
    };
    app_is_visible(app, ctx, wm)
}

fn app_is_visible(app: AppHandle, ctx: &VisibilityContext, wm: &dyn WindowManager) -> bool {
    if ctx.current_workspace_only {
        let Some(workspace) = ctx.active_workspace else {
            return true;
        };
        return match ctx.monitor {
            Some(rect) => wm.window_count_on_workspace_and_monitor(app, &workspace, &rect) > 0,
            None => wm.has_window_on_workspace(app, &workspace),
        };
    }

    match ctx.monitor {
        Some(rect) => wm.has_window_on_monitor(app, &rect),
        None => wm.is_running(app) && wm.has_window(app),
    }
}

impl DockProvider {
    /// Recompute the attached flag of every entry.
    ///
    /// With `update_indicators`, an entry gets an indicator refresh only on
    /// the pass that turns it from hidden to shown; entries that were already
    /// attached keep their indicator. Returns the number of entries whose
    /// flag changed.
    pub fn recompute(&mut self, update_indicators: bool) -> usize {
        let ctx = VisibilityContext::capture(
            &self.settings,
            self.window_manager.as_ref(),
            self.monitor.as_deref(),
        );

        let mut changed = 0;
        let mut refresh = Vec::new();
        for entry in self.entries.iter_mut() {
            let attached = is_attached(entry, &ctx, self.window_manager.as_ref());
            if entry.set_attached(attached) {
                changed += 1;
                if attached && update_indicators {
                    refresh.push((entry.id(), entry.app()));
                }
            }
        }

        for (id, app) in refresh {
            emit_event(
                self.bus.as_ref(),
                event_names::INDICATOR_REFRESH,
                &IndicatorRefreshEvent::new(id.0, app),
            );
        }

        if changed > 0 {
            let (attached, hidden): (Vec<_>, Vec<_>) =
                self.entries.iter().partition(|e| e.is_attached());
            tracing::debug!(
                changed,
                attached = attached.len(),
                hidden = hidden.len(),
                "visibility recomputed"
            );
            emit_event(
                self.bus.as_ref(),
                event_names::VISIBILITY_CHANGED,
                &VisibilityChangedEvent::new(
                    attached.iter().map(|e| e.id().0).collect(),
                    hidden.iter().map(|e| e.id().0).collect(),
                ),
            );
        }

        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{EntryAttributes, EntryId};
    use docklet_wm::{FixedMonitor, InMemoryWindowManager, NoMonitorFilter, WorkspaceId};

    fn ws(n: u32) -> Workspace {
        Workspace::new(WorkspaceId(n))
    }

    fn transient(app: AppHandle) -> DockEntry {
        DockEntry::transient(
            EntryId(1),
            "app.desktop".into(),
            EntryAttributes::default(),
            app,
        )
    }

    fn pinned(app: Option<AppHandle>) -> DockEntry {
        DockEntry::pinned(
            EntryId(2),
            "app.desktop".into(),
            "app.dockitem".into(),
            EntryAttributes::default(),
            app,
        )
    }

    fn ctx(workspace_only: bool, active: Option<Workspace>, monitor: Option<Rect>) -> VisibilityContext {
        VisibilityContext {
            current_workspace_only: workspace_only,
            active_workspace: active,
            monitor,
        }
    }

    const LEFT: Rect = Rect {
        x: 0,
        y: 0,
        width: 1920,
        height: 1080,
    };
    const RIGHT: Rect = Rect {
        x: 1920,
        y: 0,
        width: 1920,
        height: 1080,
    };

    #[test]
    fn test_unbound_pinned_always_attached() {
        let wm = InMemoryWindowManager::new();
        let entry = pinned(None);
        assert!(is_attached(&entry, &ctx(false, None, None), &wm));
        assert!(is_attached(&entry, &ctx(true, Some(ws(1)), Some(LEFT)), &wm));
    }

    #[test]
    fn test_unfiltered_requires_a_window() {
        let wm = InMemoryWindowManager::new();
        let app = wm.launch();
        let entry = transient(app);
        assert!(!is_attached(&entry, &ctx(false, None, None), &wm));

        wm.open_window(app, ws(1), Rect::new(10, 10, 100, 100));
        assert!(is_attached(&entry, &ctx(false, None, None), &wm));
        assert!(is_attached(&pinned(Some(app)), &ctx(false, None, None), &wm));
    }

    #[test]
    fn test_workspace_filter() {
        let wm = InMemoryWindowManager::new();
        let app = wm.launch();
        wm.open_window(app, ws(1), Rect::new(10, 10, 100, 100));
        let entry = transient(app);

        assert!(is_attached(&entry, &ctx(true, Some(ws(1)), None), &wm));
        assert!(!is_attached(&entry, &ctx(true, Some(ws(2)), None), &wm));
    }

    #[test]
    fn test_workspace_filter_fails_open() {
        let wm = InMemoryWindowManager::new();
        let app = wm.launch();
        // No windows at all, still shown without an active workspace
        assert!(is_attached(&transient(app), &ctx(true, None, Some(LEFT)), &wm));
        assert!(is_attached(&pinned(Some(app)), &ctx(true, None, None), &wm));
    }

    #[test]
    fn test_monitor_filter() {
        let wm = InMemoryWindowManager::new();
        let app = wm.launch();
        wm.open_window(app, ws(1), Rect::new(2000, 100, 400, 300));
        let entry = transient(app);

        assert!(!is_attached(&entry, &ctx(false, None, Some(LEFT)), &wm));
        assert!(is_attached(&entry, &ctx(false, None, Some(RIGHT)), &wm));
    }

    #[test]
    fn test_workspace_and_monitor_filter() {
        let wm = InMemoryWindowManager::new();
        let app = wm.launch();
        wm.open_window(app, ws(1), Rect::new(2000, 100, 400, 300));
        wm.open_window(app, ws(2), Rect::new(100, 100, 400, 300));
        let entry = transient(app);

        // Window on the left monitor lives on workspace 2 only
        assert!(!is_attached(&entry, &ctx(true, Some(ws(1)), Some(LEFT)), &wm));
        assert!(is_attached(&entry, &ctx(true, Some(ws(2)), Some(LEFT)), &wm));
        assert!(is_attached(&entry, &ctx(true, Some(ws(1)), Some(RIGHT)), &wm));
    }

    #[test]
    fn test_capture_only_reads_what_is_enabled() {
        let wm = InMemoryWindowManager::new();
        wm.set_active_workspace(Some(ws(3)));
        let monitor = FixedMonitor::new(LEFT);

        let settings = Settings::default();
        let c = VisibilityContext::capture(&settings, &wm, Some(&monitor));
        assert_eq!(c, ctx(false, None, None));

        let settings = Settings {
            current_workspace_only: true,
            only_active_monitor: true,
            ..Settings::default()
        };
        let c = VisibilityContext::capture(&settings, &wm, Some(&monitor));
        assert_eq!(c, ctx(true, Some(ws(3)), Some(LEFT)));

        // Monitor filtering without a source, or with a source reporting none
        assert_eq!(VisibilityContext::capture(&settings, &wm, None).monitor, None);
        assert_eq!(
            VisibilityContext::capture(&settings, &wm, Some(&NoMonitorFilter)).monitor,
            None
        );
    }
}
