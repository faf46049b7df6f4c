//! Dock entries and the ordered list that holds them.

use docklet_events::EntryForm;
use docklet_wm::{AppHandle, AppInfo};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of one dock entry. Never reused within a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryId(pub u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entry#{}", self.0)
    }
}

/// Presentation state shared by both entry forms.
///
/// Everything here survives a pin or unpin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryAttributes {
    pub display_text: String,
    pub filename_hint: String,
    /// Icon name or path chosen by the user.
    pub icon: Option<String>,
    pub badge_count: Option<i64>,
    /// Progress in `0.0..=1.0` reported over the launcher API.
    pub progress: Option<f64>,
    pub urgent: bool,
}

impl EntryAttributes {
    /// Attributes derived from a bare launcher id.
    pub fn named(launcher_id: &str) -> Self {
        let file = launcher_id.rsplit('/').next().unwrap_or(launcher_id);
        Self {
            display_text: file.trim_end_matches(".desktop").to_string(),
            filename_hint: file.to_string(),
            ..Self::default()
        }
    }
}

impl From<&AppInfo> for EntryAttributes {
    fn from(info: &AppInfo) -> Self {
        Self {
            display_text: info.display_text.clone(),
            filename_hint: info.filename_hint.clone(),
            ..Self::default()
        }
    }
}

/// The two forms an entry can take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    /// User-pinned launcher, possibly backed by a running application.
    Pinned {
        app: Option<AppHandle>,
        launcher_file: String,
    },
    /// Running application without a launcher.
    Transient {
        app: AppHandle,
        /// Set over the launcher API; the entry outlives its application.
        persists_without_window_list_membership: bool,
    },
}

/// One member of the dock's ordered entry sequence.
#[derive(Debug, Clone)]
pub struct DockEntry {
    id: EntryId,
    launcher_id: String,
    attributes: EntryAttributes,
    kind: EntryKind,
    attached: bool,
}

impl DockEntry {
    pub(crate) fn pinned(
        id: EntryId,
        launcher_id: String,
        launcher_file: String,
        attributes: EntryAttributes,
        app: Option<AppHandle>,
    ) -> Self {
        Self {
            id,
            launcher_id,
            attributes,
            kind: EntryKind::Pinned { app, launcher_file },
            attached: false,
        }
    }

    pub(crate) fn transient(
        id: EntryId,
        launcher_id: String,
        attributes: EntryAttributes,
        app: AppHandle,
    ) -> Self {
        Self {
            id,
            launcher_id,
            attributes,
            kind: EntryKind::Transient {
                app,
                persists_without_window_list_membership: false,
            },
            attached: false,
        }
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn launcher_id(&self) -> &str {
        &self.launcher_id
    }

    pub fn attributes(&self) -> &EntryAttributes {
        &self.attributes
    }

    pub fn kind(&self) -> &EntryKind {
        &self.kind
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn is_pinned(&self) -> bool {
        matches!(self.kind, EntryKind::Pinned { .. })
    }

    pub fn form(&self) -> EntryForm {
        match self.kind {
            EntryKind::Pinned { .. } => EntryForm::Pinned,
            EntryKind::Transient { .. } => EntryForm::Transient,
        }
    }

    /// The bound application, if any.
    pub fn app(&self) -> Option<AppHandle> {
        match self.kind {
            EntryKind::Pinned { app, .. } => app,
            EntryKind::Transient { app, .. } => Some(app),
        }
    }

    pub fn launcher_file(&self) -> Option<&str> {
        match &self.kind {
            EntryKind::Pinned { launcher_file, .. } => Some(launcher_file.as_str()),
            EntryKind::Transient { .. } => None,
        }
    }

    pub fn persists_without_window_list_membership(&self) -> bool {
        match self.kind {
            EntryKind::Pinned { .. } => false,
            EntryKind::Transient {
                persists_without_window_list_membership,
                ..
            } => persists_without_window_list_membership,
        }
    }

    pub(crate) fn attributes_mut(&mut self) -> &mut EntryAttributes {
        &mut self.attributes
    }

    /// Returns true if the flag changed.
    pub(crate) fn set_attached(&mut self, attached: bool) -> bool {
        let changed = self.attached != attached;
        self.attached = attached;
        changed
    }

    pub(crate) fn bind(&mut self, handle: AppHandle) {
        match &mut self.kind {
            EntryKind::Pinned { app, .. } => *app = Some(handle),
            EntryKind::Transient { app, .. } => *app = handle,
        }
    }

    /// Drop the application binding of a pinned entry.
    pub(crate) fn unbind(&mut self) {
        if let EntryKind::Pinned { app, .. } = &mut self.kind {
            *app = None;
        }
    }

    pub(crate) fn set_persists(&mut self, flag: bool) -> bool {
        match &mut self.kind {
            EntryKind::Transient {
                persists_without_window_list_membership,
                ..
            } => {
                *persists_without_window_list_membership = flag;
                true
            }
            EntryKind::Pinned { .. } => false,
        }
    }

    /// Pinned replacement for this entry. Attributes and binding carry over;
    /// `attached` starts cleared.
    pub(crate) fn to_pinned(&self, id: EntryId, launcher_file: String) -> DockEntry {
        DockEntry::pinned(
            id,
            self.launcher_id.clone(),
            launcher_file,
            self.attributes.clone(),
            self.app(),
        )
    }

    /// Transient replacement for this entry bound to `app`.
    pub(crate) fn to_transient(&self, id: EntryId, app: AppHandle) -> DockEntry {
        DockEntry::transient(id, self.launcher_id.clone(), self.attributes.clone(), app)
    }
}

/// Ordered entry sequence. Insertion order is the dock's visual order.
#[derive(Debug, Default)]
pub struct EntryList {
    entries: Vec<DockEntry>,
}

impl EntryList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[DockEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DockEntry> {
        self.entries.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, DockEntry> {
        self.entries.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn position(&self, id: EntryId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    pub fn get(&self, id: EntryId) -> Option<&DockEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: EntryId) -> Option<&mut DockEntry> {
        self.entries.iter_mut().find(|e| e.id == id)
    }

    /// Entry currently bound to `app`.
    pub fn bound_to(&self, app: AppHandle) -> Option<&DockEntry> {
        self.entries.iter().find(|e| e.app() == Some(app))
    }

    /// Append at the end; returns the new position.
    pub(crate) fn push(&mut self, entry: DockEntry) -> usize {
        self.entries.push(entry);
        self.entries.len() - 1
    }

    pub(crate) fn remove(&mut self, id: EntryId) -> Option<(usize, DockEntry)> {
        let position = self.position(id)?;
        Some((position, self.entries.remove(position)))
    }

    /// Swap `id` for `replacement` at the same position.
    pub(crate) fn replace(
        &mut self,
        id: EntryId,
        replacement: DockEntry,
    ) -> Option<(usize, DockEntry)> {
        let position = self.position(id)?;
        let old = std::mem::replace(&mut self.entries[position], replacement);
        Some((position, old))
    }
}
