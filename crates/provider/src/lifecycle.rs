//! Lifecycle manager.
//!
//! Creates and removes transient entries as applications come and go, and
//! converts entries between pinned and transient form. A converted entry
//! keeps its position and presentation attributes but gets a fresh id and
//! starts detached until the next recompute.

use crate::entry::{DockEntry, EntryAttributes, EntryId, EntryKind};
use crate::error::Result;
use crate::launcher::LauncherRequest;
use crate::provider::DockProvider;
use docklet_wm::AppHandle;

impl DockProvider {
    /// An application started.
    ///
    /// Binds it to the first entry with the same launcher id that has no
    /// live application, or appends a transient entry for it.
    pub(crate) fn application_started(&mut self, app: AppHandle) {
        if self.gate.is_suspended() {
            tracing::debug!(%app, "entry creation suspended, dropping start");
            return;
        }

        if let Some(entry) = self.entries.bound_to(app) {
            tracing::trace!(%app, entry = %entry.id(), "already bound");
            return;
        }

        let Some(info) = self.matcher.app_info(app) else {
            tracing::debug!(%app, "no launcher matches application");
            return;
        };

        let wm = self.window_manager.clone();
        let free = self.entries.iter_mut().find(|e| {
            e.launcher_id() == info.launcher_id
                && e.app().map_or(true, |bound| !wm.is_running(bound))
        });
        if let Some(entry) = free {
            entry.bind(app);
            tracing::debug!(
                %app,
                entry = %entry.id(),
                launcher_id = %info.launcher_id,
                "bound to existing entry"
            );
            return;
        }

        if self.settings.pinned_only {
            tracing::trace!(%app, "pinned only, not creating entry");
            return;
        }
        if self.settings.excludes(&info.launcher_id) {
            tracing::debug!(%app, launcher_id = %info.launcher_id, "dock's own entry excluded");
            return;
        }

        let id = self.allocate_id();
        self.append_entry(DockEntry::transient(
            id,
            info.launcher_id.clone(),
            EntryAttributes::from(&info),
            app,
        ));
    }

    /// An application exited.
    ///
    /// Its transient entry goes away unless flagged to persist; a pinned entry
    /// just loses the binding.
    pub(crate) fn application_closed(&mut self, app: AppHandle) {
        let Some(entry) = self.entries.bound_to(app) else {
            return;
        };
        let id = entry.id();

        match entry.kind().clone() {
            EntryKind::Transient {
                persists_without_window_list_membership: true,
                ..
            } => {
                tracing::debug!(%app, entry = %id, "transient entry persists");
            }
            EntryKind::Transient { .. } => {
                self.remove_entry(id);
            }
            EntryKind::Pinned { .. } => {
                if let Some(entry) = self.entries.get_mut(id) {
                    entry.unbind();
                }
                tracing::debug!(%app, entry = %id, "pinned entry unbound");
            }
        }
    }

    /// Run the start path for every running application.
    pub(crate) fn add_running_applications(&mut self) {
        for app in self.window_manager.running_applications() {
            self.application_started(app);
        }
    }

    pub(crate) fn remove_transient_entries(&mut self) {
        let transient: Vec<EntryId> = self
            .entries
            .iter()
            .filter(|e| !e.is_pinned())
            .map(|e| e.id())
            .collect();
        for id in transient {
            self.remove_entry(id);
        }
    }

    /// Drop the dock's own transient entry when it became excluded, or pick
    /// the dock up again when it no longer is.
    pub(crate) fn apply_exclusion(&mut self) {
        let excluded: Vec<EntryId> = self
            .entries
            .iter()
            .filter(|e| !e.is_pinned() && self.settings.excludes(e.launcher_id()))
            .map(|e| e.id())
            .collect();
        if excluded.is_empty() {
            self.add_running_applications();
        }
        for id in excluded {
            self.remove_entry(id);
        }
    }

    /// Convert a transient entry into a pinned one.
    ///
    /// Returns the id of the pinned entry. Pinning a pinned entry changes
    /// nothing. Automatic entry creation is suspended while the launcher is
    /// materialized.
    pub fn pin(&mut self, id: EntryId) -> Result<EntryId> {
        let entry = match self.entries.get(id) {
            Some(entry) => entry.clone(),
            None => return Err(self.not_found(id, "pin")),
        };
        if entry.is_pinned() {
            tracing::debug!(entry = %id, "already pinned");
            return Ok(id);
        }

        let guard = self.gate.suspend();
        if guard.is_none() {
            tracing::warn!(entry = %id, "entry creation was already suspended");
        }

        let launcher_file = match self.launchers.create_launcher(&LauncherRequest::from(&entry)) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!(entry = %id, error = %e, "pin failed");
                return Err(e);
            }
        };

        let new_id = self.allocate_id();
        self.replace_entry(id, entry.to_pinned(new_id, launcher_file));
        drop(guard);

        self.recompute(false);
        Ok(new_id)
    }

    /// Unpin or delete an entry.
    ///
    /// If its application is running the entry reverts to transient in the
    /// same position and the new id is returned; otherwise it is removed.
    pub fn unpin(&mut self, id: EntryId) -> Result<Option<EntryId>> {
        let entry = match self.entries.get(id) {
            Some(entry) => entry.clone(),
            None => return Err(self.not_found(id, "unpin")),
        };

        if let Some(launcher_file) = entry.launcher_file() {
            if let Err(e) = self.launchers.remove_launcher(launcher_file) {
                tracing::warn!(entry = %id, error = %e, "could not remove launcher");
            }
        }

        let running = entry.app().filter(|app| self.window_manager.is_running(*app));
        let result = match running {
            Some(app) => {
                let new_id = self.allocate_id();
                self.replace_entry(id, entry.to_transient(new_id, app));
                Some(new_id)
            }
            None => {
                self.remove_entry(id);
                None
            }
        };

        self.recompute(false);
        Ok(result)
    }

    /// Same as [`DockProvider::unpin`].
    pub fn delete(&mut self, id: EntryId) -> Result<Option<EntryId>> {
        self.unpin(id)
    }

    /// Flag a transient entry to outlive its application.
    ///
    /// Ignored for pinned entries.
    pub fn set_persists_without_window_list(&mut self, id: EntryId, persists: bool) -> Result<()> {
        match self.entries.get_mut(id) {
            Some(entry) => {
                if !entry.set_persists(persists) {
                    tracing::debug!(entry = %id, "pinned entries always persist");
                }
                Ok(())
            }
            None => Err(self.not_found(id, "set_persists_without_window_list")),
        }
    }

    /// Change the presentation attributes of an entry.
    pub fn update_attributes<F>(&mut self, id: EntryId, update: F) -> Result<()>
    where
        F: FnOnce(&mut EntryAttributes),
    {
        match self.entries.get_mut(id) {
            Some(entry) => {
                update(entry.attributes_mut());
                Ok(())
            }
            None => Err(self.not_found(id, "update_attributes")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PinnedLauncher, ProviderConfig, Settings};
    use crate::error::DockError;
    use crate::launcher::InMemoryLauncherStore;
    use crate::provider::Collaborators;
    use docklet_events::{event_names, EntryReplacedEvent, InMemoryEventBus};
    use docklet_wm::{AppInfo, InMemoryWindowManager, Rect, StaticMatcher, Workspace, WorkspaceId};
    use std::sync::Arc;

    struct Fixture {
        wm: Arc<InMemoryWindowManager>,
        matcher: Arc<StaticMatcher>,
        launchers: Arc<InMemoryLauncherStore>,
        bus: Arc<InMemoryEventBus>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                wm: Arc::new(InMemoryWindowManager::new()),
                matcher: Arc::new(StaticMatcher::new()),
                launchers: Arc::new(InMemoryLauncherStore::new()),
                bus: Arc::new(InMemoryEventBus::new()),
            }
        }

        fn provider(&self, config: ProviderConfig) -> DockProvider {
            DockProvider::new(
                config,
                Collaborators {
                    window_manager: self.wm.clone(),
                    matcher: self.matcher.clone(),
                    monitor: None,
                    launchers: self.launchers.clone(),
                    bus: self.bus.clone(),
                },
            )
        }

        /// Launch an app with one window and register it with the matcher.
        fn run(&self, launcher_id: &str) -> AppHandle {
            let app = self.wm.launch();
            self.matcher.register(app, AppInfo::new(launcher_id, launcher_id));
            self.wm
                .open_window(app, Workspace::new(WorkspaceId(1)), Rect::new(0, 0, 100, 100));
            app
        }
    }

    #[test]
    fn test_start_appends_transient() {
        let f = Fixture::new();
        let mut dock = f.provider(ProviderConfig::default());
        let app = f.run("gedit.desktop");

        dock.application_started(app);
        assert_eq!(dock.entries().len(), 1);
        assert_eq!(dock.entries()[0].app(), Some(app));
        assert!(!dock.entries()[0].is_pinned());
    }

    #[test]
    fn test_start_twice_is_deduplicated() {
        let f = Fixture::new();
        let mut dock = f.provider(ProviderConfig::default());
        let app = f.run("gedit.desktop");

        dock.application_started(app);
        dock.application_started(app);
        assert_eq!(dock.entries().len(), 1);
    }

    #[test]
    fn test_unknown_app_ignored() {
        let f = Fixture::new();
        let mut dock = f.provider(ProviderConfig::default());
        let app = f.wm.launch();
        dock.application_started(app);
        assert!(dock.entries().is_empty());
    }

    #[test]
    fn test_start_binds_first_free_pinned_entry() {
        let f = Fixture::new();
        let config = ProviderConfig {
            pinned: vec![
                PinnedLauncher::new("gedit.desktop", "a.dockitem"),
                PinnedLauncher::new("gedit.desktop", "b.dockitem"),
            ],
            ..ProviderConfig::default()
        };
        let mut dock = f.provider(config);

        let first = f.run("gedit.desktop");
        dock.application_started(first);
        let second = f.run("gedit.desktop");
        dock.application_started(second);

        assert_eq!(dock.entries().len(), 2);
        assert_eq!(dock.entries()[0].app(), Some(first));
        assert_eq!(dock.entries()[1].app(), Some(second));
    }

    #[test]
    fn test_stale_binding_is_replaced() {
        let f = Fixture::new();
        let config = ProviderConfig {
            pinned: vec![PinnedLauncher::new("gedit.desktop", "a.dockitem")],
            ..ProviderConfig::default()
        };
        let mut dock = f.provider(config);

        let old = f.run("gedit.desktop");
        dock.application_started(old);
        f.wm.quit(old);

        let new = f.run("gedit.desktop");
        dock.application_started(new);
        assert_eq!(dock.entries().len(), 1);
        assert_eq!(dock.entries()[0].app(), Some(new));
    }

    #[test]
    fn test_dock_does_not_show_itself() {
        let f = Fixture::new();
        let mut dock = f.provider(ProviderConfig::default());
        let me = f.run(crate::config::DEFAULT_DOCK_LAUNCHER_ID);

        dock.application_started(me);
        assert!(dock.entries().is_empty());

        dock.settings_changed(Settings {
            show_dock_item: true,
            ..Settings::default()
        });
        assert_eq!(dock.entries().len(), 1);

        dock.settings_changed(Settings::default());
        assert!(dock.entries().is_empty());
    }

    #[test]
    fn test_suspended_gate_drops_starts() {
        let f = Fixture::new();
        let mut dock = f.provider(ProviderConfig::default());
        let app = f.run("gedit.desktop");

        let guard = dock.creation_gate().suspend();
        dock.application_started(app);
        assert!(dock.entries().is_empty());

        drop(guard);
        dock.application_started(app);
        assert_eq!(dock.entries().len(), 1);
    }

    #[test]
    fn test_close_unbinds_pinned() {
        let f = Fixture::new();
        let config = ProviderConfig {
            pinned: vec![PinnedLauncher::new("gedit.desktop", "a.dockitem")],
            ..ProviderConfig::default()
        };
        let mut dock = f.provider(config);
        let app = f.run("gedit.desktop");
        dock.application_started(app);

        dock.application_closed(app);
        assert_eq!(dock.entries().len(), 1);
        assert_eq!(dock.entries()[0].app(), None);
    }

    #[test]
    fn test_pin_replaces_in_place() {
        let f = Fixture::new();
        let mut dock = f.provider(ProviderConfig::default());
        for id in ["a.desktop", "b.desktop", "c.desktop"] {
            let app = f.run(id);
            dock.application_started(app);
        }
        let middle = dock.entries()[1].id();

        let pinned = dock.pin(middle).unwrap();
        assert_ne!(pinned, middle);
        assert_eq!(dock.entries()[1].id(), pinned);
        assert!(dock.entries()[1].is_pinned());
        assert_eq!(dock.entries()[1].launcher_file(), Some("b.dockitem"));
        assert_eq!(f.launchers.files(), vec!["b.dockitem".to_string()]);
        assert!(!dock.creation_gate().is_suspended());

        let replaced: Vec<EntryReplacedEvent> = f.bus.decoded(event_names::ENTRY_REPLACED);
        assert_eq!(replaced.len(), 1);
        assert_eq!(replaced[0].position, 1);
        assert_eq!(replaced[0].old_entry_id, middle.0);
    }

    #[test]
    fn test_pin_pinned_is_noop() {
        let f = Fixture::new();
        let config = ProviderConfig {
            pinned: vec![PinnedLauncher::new("gedit.desktop", "a.dockitem")],
            ..ProviderConfig::default()
        };
        let mut dock = f.provider(config);
        let id = dock.entries()[0].id();
        assert_eq!(dock.pin(id).unwrap(), id);
        assert!(f.launchers.files().is_empty());
    }

    #[test]
    fn test_pin_failure_leaves_dock_untouched() {
        let f = Fixture::new();
        let mut dock = f.provider(ProviderConfig::default());
        let app = f.run("gedit.desktop");
        dock.application_started(app);
        let id = dock.entries()[0].id();

        f.launchers.fail_creates(true);
        let err = dock.pin(id).unwrap_err();
        assert!(matches!(err, DockError::Launcher(_)));
        assert_eq!(dock.entries()[0].id(), id);
        assert!(!dock.entries()[0].is_pinned());
        assert!(!dock.creation_gate().is_suspended());
    }

    #[test]
    fn test_missing_entry_is_not_found() {
        let f = Fixture::new();
        let mut dock = f.provider(ProviderConfig::default());
        let ghost = EntryId(999);
        assert!(matches!(dock.pin(ghost), Err(DockError::NotFound(id)) if id == ghost));
        assert!(matches!(dock.unpin(ghost), Err(DockError::NotFound(_))));
        assert!(matches!(dock.delete(ghost), Err(DockError::NotFound(_))));
        assert!(matches!(
            dock.set_persists_without_window_list(ghost, true),
            Err(DockError::NotFound(_))
        ));
        assert!(matches!(
            dock.update_attributes(ghost, |a| a.urgent = true),
            Err(DockError::NotFound(_))
        ));
    }

    #[test]
    fn test_unpin_not_running_removes_and_forgets_launcher() {
        let f = Fixture::new();
        let mut dock = f.provider(ProviderConfig::default());
        let app = f.run("gedit.desktop");
        dock.application_started(app);
        let pinned = dock.pin(dock.entries()[0].id()).unwrap();

        f.wm.quit(app);
        dock.application_closed(app);
        assert_eq!(dock.unpin(pinned).unwrap(), None);
        assert!(dock.entries().is_empty());
        assert!(f.launchers.files().is_empty());
    }

    #[test]
    fn test_unpin_with_missing_launcher_still_unpins() {
        let f = Fixture::new();
        let config = ProviderConfig {
            pinned: vec![PinnedLauncher::new("gedit.desktop", "gone.dockitem")],
            ..ProviderConfig::default()
        };
        let mut dock = f.provider(config);
        let id = dock.entries()[0].id();
        assert_eq!(dock.unpin(id).unwrap(), None);
        assert!(dock.entries().is_empty());
    }

    #[test]
    fn test_persist_flag_only_for_transient() {
        let f = Fixture::new();
        let mut dock = f.provider(ProviderConfig::default());
        let app = f.run("gedit.desktop");
        dock.application_started(app);
        let id = dock.entries()[0].id();

        dock.set_persists_without_window_list(id, true).unwrap();
        assert!(dock.entry(id).unwrap().persists_without_window_list_membership());
    }
}
