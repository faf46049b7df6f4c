//! Settings observed by the provider and its start-up configuration.

use crate::entry::EntryAttributes;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Launcher id the dock itself is known by.
pub const DEFAULT_DOCK_LAUNCHER_ID: &str = "docklet.desktop";

/// User settings that drive filtering and subscriptions.
///
/// The provider does not own these; the settings layer pushes every change
/// through [`crate::DockProvider::settings_changed`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Only show running applications with a window on the active workspace.
    pub current_workspace_only: bool,
    /// Never create transient entries.
    pub pinned_only: bool,
    /// Only show running applications with a window on the dock's monitor.
    pub only_active_monitor: bool,
    /// Whether the dock may show an entry for itself.
    pub show_dock_item: bool,
    pub dock_launcher_id: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            current_workspace_only: false,
            pinned_only: false,
            only_active_monitor: false,
            show_dock_item: false,
            dock_launcher_id: DEFAULT_DOCK_LAUNCHER_ID.to_string(),
        }
    }
}

impl Settings {
    /// Exclusion check for automatic entry creation.
    pub fn excludes(&self, launcher_id: &str) -> bool {
        !self.show_dock_item && launcher_id == self.dock_launcher_id
    }
}

/// A pinned launcher the dock starts with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinnedLauncher {
    pub launcher_id: String,
    /// Persisted launcher file backing this entry.
    pub launcher_file: String,
    #[serde(default)]
    pub attributes: EntryAttributes,
}

impl PinnedLauncher {
    pub fn new(launcher_id: impl Into<String>, launcher_file: impl Into<String>) -> Self {
        let launcher_id = launcher_id.into();
        Self {
            attributes: EntryAttributes::named(&launcher_id),
            launcher_id,
            launcher_file: launcher_file.into(),
        }
    }
}

/// Start-up configuration for [`crate::DockProvider`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub settings: Settings,
    /// Pinned launchers in dock order.
    pub pinned: Vec<PinnedLauncher>,
}

impl ProviderConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
