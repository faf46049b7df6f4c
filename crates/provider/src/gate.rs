//! Suspension of automatic entry creation.
//!
//! While a [`CreationGuard`] is alive, application-started notifications are
//! dropped instead of creating transient entries. Pin holds one so the
//! application it is re-homing cannot be rediscovered halfway through.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared switch for automatic entry creation.
///
/// Cloning hands out another view of the same switch.
#[derive(Debug, Clone, Default)]
pub struct CreationGate {
    suspended: Arc<AtomicBool>,
}

impl CreationGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended.load(Ordering::SeqCst)
    }

    /// Suspend creation until the returned guard is dropped.
    ///
    /// Returns `None` if creation is already suspended; the gate does not nest.
    pub fn suspend(&self) -> Option<CreationGuard> {
        self.suspended
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| CreationGuard {
                suspended: Arc::clone(&self.suspended),
            })
    }
}

/// Resumes creation when dropped.
#[must_use = "creation resumes as soon as the guard is dropped"]
#[derive(Debug)]
pub struct CreationGuard {
    suspended: Arc<AtomicBool>,
}

impl Drop for CreationGuard {
    fn drop(&mut self) {
        self.suspended.store(false, Ordering::SeqCst);
    }
}
