//! The dock provider: entry list, settings, subscriptions and routing.

use crate::config::{PinnedLauncher, ProviderConfig, Settings};
use crate::entry::{DockEntry, EntryId, EntryList};
use crate::error::DockError;
use crate::gate::CreationGate;
use crate::launcher::LauncherStoreRef;
use crate::subscriptions::{viewport_change_applies, workspace_change_applies, SubscriptionManager};
use docklet_events::{
    emit_event, event_names, EntryAddedEvent, EntryRemovedEvent, EntryReplacedEvent, EventBusRef,
};
use docklet_wm::{AppMatcherRef, MonitorGeometrySourceRef, WindowManagerRef, WmEvent};

/// Everything the provider talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub window_manager: WindowManagerRef,
    pub matcher: AppMatcherRef,
    /// Without a monitor source, monitor filtering never activates.
    pub monitor: Option<MonitorGeometrySourceRef>,
    pub launchers: LauncherStoreRef,
    pub bus: EventBusRef,
}

/// Visibility and lifecycle engine for one dock.
///
/// All methods run to completion on the caller's thread; the host's event
/// loop serializes calls.
pub struct DockProvider {
    pub(crate) entries: EntryList,
    pub(crate) settings: Settings,
    pub(crate) subscriptions: SubscriptionManager,
    pub(crate) gate: CreationGate,
    pub(crate) window_manager: WindowManagerRef,
    pub(crate) matcher: AppMatcherRef,
    pub(crate) monitor: Option<MonitorGeometrySourceRef>,
    pub(crate) launchers: LauncherStoreRef,
    pub(crate) bus: EventBusRef,
    next_entry_id: u64,
}

impl DockProvider {
    /// Build a provider, subscribe, pick up running applications and compute
    /// initial visibility.
    pub fn new(config: ProviderConfig, deps: Collaborators) -> Self {
        let mut subscriptions =
            SubscriptionManager::new(deps.window_manager.clone(), deps.monitor.is_some());
        subscriptions.acquire_lifecycle();

        let mut provider = Self {
            entries: EntryList::new(),
            settings: config.settings,
            subscriptions,
            gate: CreationGate::new(),
            window_manager: deps.window_manager,
            matcher: deps.matcher,
            monitor: deps.monitor,
            launchers: deps.launchers,
            bus: deps.bus,
            next_entry_id: 0,
        };

        for launcher in config.pinned {
            provider.add_pinned(launcher);
        }

        let transition = provider.subscriptions.apply(&provider.settings);
        tracing::debug!(?transition, "initial subscriptions applied");

        provider.add_running_applications();
        provider.recompute(false);

        tracing::info!(
            entries = provider.entries.len(),
            subscriptions = provider.subscriptions.live_count(),
            "dock provider ready"
        );
        provider
    }

    /// Release every subscription. Dropping the provider does the same.
    pub fn close(mut self) {
        self.subscriptions.release_all();
        tracing::info!("dock provider closed");
    }

    pub fn entries(&self) -> &[DockEntry] {
        self.entries.as_slice()
    }

    pub fn entry(&self, id: EntryId) -> Option<&DockEntry> {
        self.entries.get(id)
    }

    /// Ids of the entries currently shown, in dock order.
    pub fn attached_ids(&self) -> Vec<EntryId> {
        self.entries
            .iter()
            .filter(|e| e.is_attached())
            .map(|e| e.id())
            .collect()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn subscriptions(&self) -> &SubscriptionManager {
        &self.subscriptions
    }

    /// Shared view of the creation gate.
    pub fn creation_gate(&self) -> CreationGate {
        self.gate.clone()
    }

    /// Apply a settings change: subscriptions first, then entries, then
    /// visibility.
    pub fn settings_changed(&mut self, settings: Settings) {
        let previous = std::mem::replace(&mut self.settings, settings);

        let transition = self.subscriptions.apply(&self.settings);
        if !transition.is_noop() {
            tracing::debug!(?transition, "subscriptions reconfigured");
        }

        if previous.pinned_only != self.settings.pinned_only {
            if self.settings.pinned_only {
                self.remove_transient_entries();
            } else {
                self.add_running_applications();
            }
        }

        if previous.show_dock_item != self.settings.show_dock_item
            || previous.dock_launcher_id != self.settings.dock_launcher_id
        {
            self.apply_exclusion();
        }

        self.recompute(false);
    }

    /// Handle one window-manager notification.
    ///
    /// Notifications without a live subscription covering them are dropped.
    pub fn handle_event(&mut self, event: WmEvent) {
        if !self.subscriptions.covers(&event.topic()) {
            tracing::trace!(?event, "no subscription, ignoring");
            return;
        }

        match event {
            WmEvent::ApplicationOpened(app) => {
                self.application_started(app);
                self.recompute(false);
            }
            WmEvent::ApplicationClosed(app) => {
                self.application_closed(app);
                self.recompute(false);
            }
            WmEvent::ActiveWorkspaceChanged { previous } => {
                let active = self.window_manager.active_workspace();
                if workspace_change_applies(previous.as_ref(), active.as_ref()) {
                    self.recompute(true);
                } else {
                    tracing::trace!(?previous, ?active, "workspace change skipped");
                }
            }
            WmEvent::ViewportsChanged => {
                let active = self.window_manager.active_workspace();
                if viewport_change_applies(active.as_ref()) {
                    self.recompute(true);
                } else {
                    tracing::trace!(?active, "viewport change skipped");
                }
            }
            WmEvent::WindowOpened(window) => {
                self.subscriptions.window_opened(window);
                self.recompute(true);
            }
            WmEvent::WindowClosed(window) => {
                self.subscriptions.window_closed(window);
                self.recompute(true);
            }
            WmEvent::ActiveWindowChanged | WmEvent::GeometryChanged(_) => {
                self.recompute(true);
            }
        }
    }

    pub(crate) fn allocate_id(&mut self) -> EntryId {
        self.next_entry_id += 1;
        EntryId(self.next_entry_id)
    }

    pub(crate) fn not_found(&self, id: EntryId, operation: &str) -> DockError {
        tracing::warn!(entry = %id, operation, "entry is not in the dock");
        DockError::NotFound(id)
    }

    fn add_pinned(&mut self, launcher: PinnedLauncher) {
        let id = self.allocate_id();
        self.append_entry(DockEntry::pinned(
            id,
            launcher.launcher_id,
            launcher.launcher_file,
            launcher.attributes,
            None,
        ));
    }

    pub(crate) fn append_entry(&mut self, entry: DockEntry) -> EntryId {
        let id = entry.id();
        let event = EntryAddedEvent::new(id.0, entry.launcher_id(), entry.form(), 0, entry.app());
        let position = self.entries.push(entry);
        tracing::debug!(entry = %id, launcher_id = %event.launcher_id, position, "entry added");
        emit_event(
            self.bus.as_ref(),
            event_names::ENTRY_ADDED,
            &EntryAddedEvent { position, ..event },
        );
        id
    }

    pub(crate) fn remove_entry(&mut self, id: EntryId) -> Option<DockEntry> {
        let (position, entry) = self.entries.remove(id)?;
        tracing::debug!(entry = %id, launcher_id = entry.launcher_id(), position, "entry removed");
        emit_event(
            self.bus.as_ref(),
            event_names::ENTRY_REMOVED,
            &EntryRemovedEvent::new(id.0, entry.launcher_id(), position),
        );
        Some(entry)
    }

    pub(crate) fn replace_entry(&mut self, id: EntryId, replacement: DockEntry) -> Option<DockEntry> {
        let new_id = replacement.id();
        let form = replacement.form();
        let (position, old) = self.entries.replace(id, replacement)?;
        tracing::debug!(old = %id, new = %new_id, ?form, position, "entry replaced");
        emit_event(
            self.bus.as_ref(),
            event_names::ENTRY_REPLACED,
            &EntryReplacedEvent::new(id.0, new_id.0, form, position),
        );
        Some(old)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::launcher::InMemoryLauncherStore;
    use docklet_events::NullEventBus;
    use docklet_wm::{AppHandle, NullProvider, Topic};
    use std::sync::Arc;

    fn headless(config: ProviderConfig) -> DockProvider {
        let null = Arc::new(NullProvider::new());
        DockProvider::new(
            config,
            Collaborators {
                window_manager: null.clone(),
                matcher: null.clone(),
                monitor: Some(null),
                launchers: Arc::new(InMemoryLauncherStore::new()),
                bus: Arc::new(NullEventBus),
            },
        )
    }

    #[test]
    fn test_headless_provider_keeps_pinned_entries() {
        let config = ProviderConfig {
            pinned: vec![
                PinnedLauncher::new("files.desktop", "files.dockitem"),
                PinnedLauncher::new("term.desktop", "term.dockitem"),
            ],
            ..ProviderConfig::default()
        };
        let mut dock = headless(config);
        assert_eq!(dock.entries().len(), 2);
        assert_eq!(dock.attached_ids().len(), 2);
        assert_eq!(dock.subscriptions().live_count(), 2);

        // Nothing matches on a null desktop
        dock.handle_event(WmEvent::ApplicationOpened(AppHandle(7)));
        assert_eq!(dock.entries().len(), 2);
        dock.close();
    }

    #[test]
    fn test_ids_are_never_reused() {
        let mut dock = headless(ProviderConfig {
            pinned: vec![PinnedLauncher::new("files.desktop", "files.dockitem")],
            ..ProviderConfig::default()
        });
        let first = dock.entries()[0].id();
        dock.unpin(first).unwrap();
        assert!(dock.entries().is_empty());

        let next = dock.allocate_id();
        assert!(next > first);
    }

    #[test]
    fn test_settings_changed_updates_subscriptions() {
        let mut dock = headless(ProviderConfig::default());
        dock.settings_changed(Settings {
            current_workspace_only: true,
            only_active_monitor: true,
            ..Settings::default()
        });
        assert!(dock.subscriptions().is_tracking_workspace());
        assert!(dock.subscriptions().is_tracking_geometry());
        assert!(dock.subscriptions().covers(&Topic::ViewportsChanged));
        assert!(dock.settings().only_active_monitor);

        dock.settings_changed(Settings::default());
        assert!(!dock.subscriptions().covers(&Topic::ViewportsChanged));
        assert!(!dock.subscriptions().covers(&Topic::WindowOpened));
        assert_eq!(dock.subscriptions().live_count(), 2);
    }
}
