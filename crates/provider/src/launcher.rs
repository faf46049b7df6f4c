//! Persisted launcher seam.
//!
//! Writing launcher files is the host's business. The provider only asks for
//! one to be created when an entry is pinned and removed when it is unpinned.

use crate::entry::DockEntry;
use crate::error::{DockError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// File extension used for generated launcher names.
pub const LAUNCHER_EXTENSION: &str = "dockitem";

/// What a launcher store needs to materialize a launcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LauncherRequest {
    pub launcher_id: String,
    pub display_text: String,
    pub filename_hint: String,
}

impl From<&DockEntry> for LauncherRequest {
    fn from(entry: &DockEntry) -> Self {
        Self {
            launcher_id: entry.launcher_id().to_string(),
            display_text: entry.attributes().display_text.clone(),
            filename_hint: entry.attributes().filename_hint.clone(),
        }
    }
}

/// Creates and removes persisted launchers.
pub trait LauncherStore: Send + Sync {
    /// Materialize a launcher; returns the launcher file it was written to.
    fn create_launcher(&self, request: &LauncherRequest) -> Result<String>;

    fn remove_launcher(&self, launcher_file: &str) -> Result<()>;
}

pub type LauncherStoreRef = Arc<dyn LauncherStore>;

/// Launcher store that keeps launchers in memory.
#[derive(Default)]
pub struct InMemoryLauncherStore {
    launchers: Mutex<BTreeMap<String, LauncherRequest>>,
    fail_creates: AtomicBool,
}

impl InMemoryLauncherStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn launchers(&self) -> MutexGuard<'_, BTreeMap<String, LauncherRequest>> {
        self.launchers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every following `create_launcher` call fail.
    pub fn fail_creates(&self, fail: bool) {
        self.fail_creates.store(fail, Ordering::SeqCst);
    }

    pub fn files(&self) -> Vec<String> {
        self.launchers().keys().cloned().collect()
    }

    pub fn get(&self, launcher_file: &str) -> Option<LauncherRequest> {
        self.launchers().get(launcher_file).cloned()
    }
}

/// Pick a file name from the hint that is not yet taken.
fn unique_name(taken: &BTreeMap<String, LauncherRequest>, request: &LauncherRequest) -> String {
    let hint = if request.filename_hint.is_empty() {
        request.launcher_id.as_str()
    } else {
        request.filename_hint.as_str()
    };
    let stem = hint
        .rsplit('/')
        .next()
        .unwrap_or(hint)
        .trim_end_matches(".desktop");

    let mut name = format!("{}.{}", stem, LAUNCHER_EXTENSION);
    let mut n = 1;
    while taken.contains_key(&name) {
        name = format!("{}-{}.{}", stem, n, LAUNCHER_EXTENSION);
        n += 1;
    }
    name
}

impl LauncherStore for InMemoryLauncherStore {
    fn create_launcher(&self, request: &LauncherRequest) -> Result<String> {
        if self.fail_creates.load(Ordering::SeqCst) {
            return Err(DockError::Launcher(format!(
                "store refused launcher for {}",
                request.launcher_id
            )));
        }

        let mut launchers = self.launchers();
        let name = unique_name(&launchers, request);
        launchers.insert(name.clone(), request.clone());
        tracing::debug!(file = %name, launcher_id = %request.launcher_id, "launcher created");
        Ok(name)
    }

    fn remove_launcher(&self, launcher_file: &str) -> Result<()> {
        match self.launchers().remove(launcher_file) {
            Some(_) => Ok(()),
            None => Err(DockError::Launcher(format!(
                "no launcher at {}",
                launcher_file
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(launcher_id: &str) -> LauncherRequest {
        LauncherRequest {
            launcher_id: launcher_id.to_string(),
            display_text: "Editor".to_string(),
            filename_hint: launcher_id.to_string(),
        }
    }

    #[test]
    fn test_create_and_remove() {
        let store = InMemoryLauncherStore::new();
        let file = store.create_launcher(&request("gedit.desktop")).unwrap();
        assert_eq!(file, "gedit.dockitem");
        assert_eq!(store.get(&file).map(|r| r.display_text), Some("Editor".into()));

        store.remove_launcher(&file).unwrap();
        assert!(store.files().is_empty());
        assert!(store.remove_launcher(&file).is_err());
    }

    #[test]
    fn test_names_are_unique() {
        let store = InMemoryLauncherStore::new();
        let a = store.create_launcher(&request("gedit.desktop")).unwrap();
        let b = store.create_launcher(&request("gedit.desktop")).unwrap();
        let c = store.create_launcher(&request("gedit.desktop")).unwrap();
        assert_eq!(a, "gedit.dockitem");
        assert_eq!(b, "gedit-1.dockitem");
        assert_eq!(c, "gedit-2.dockitem");
    }

    #[test]
    fn test_empty_hint_falls_back_to_launcher_id() {
        let store = InMemoryLauncherStore::new();
        let mut req = request("/opt/apps/tool.desktop");
        req.filename_hint.clear();
        assert_eq!(store.create_launcher(&req).unwrap(), "tool.dockitem");
    }

    #[test]
    fn test_failing_store() {
        let store = InMemoryLauncherStore::new();
        store.fail_creates(true);
        let err = store.create_launcher(&request("gedit.desktop")).unwrap_err();
        assert!(matches!(err, DockError::Launcher(_)));
        assert!(store.files().is_empty());
    }
}
