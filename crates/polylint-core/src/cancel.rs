//! Cooperative cancellation of per-file evaluations.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// A flag checked by the engine at every node boundary.
///
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Creates an uncancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Returns true once cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Tracks the running evaluation of each file.
///
/// Starting new work on a path cancels whatever was running for it, so an
/// edited file never reports results computed from its previous contents.
#[derive(Debug, Default)]
pub struct InFlight {
    running: Mutex<HashMap<PathBuf, CancellationToken>>,
}

impl InFlight {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers new work for `path`, cancelling the previous token if any.
    pub fn begin(&self, path: &Path) -> CancellationToken {
        let token = CancellationToken::new();
        let mut running = self.running.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = running.insert(path.to_path_buf(), token.clone()) {
            previous.cancel();
        }
        token
    }

    /// Unregisters `token` for `path` if it is still the current one.
    pub fn finish(&self, path: &Path, token: &CancellationToken) {
        let mut running = self.running.lock().unwrap_or_else(PoisonError::into_inner);
        if running.get(path).is_some_and(|current| current.same_as(token)) {
            running.remove(path);
        }
    }

    /// Returns true while an evaluation of `path` is registered.
    #[must_use]
    pub fn is_running(&self, path: &Path) -> bool {
        self.running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(path)
    }

    /// Number of files with running work.
    #[must_use]
    pub fn len(&self) -> usize {
        self.running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if nothing is running.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_cancels_previous_work_for_same_path() {
        let in_flight = InFlight::new();
        let first = in_flight.begin(Path::new("a.kt"));
        let other = in_flight.begin(Path::new("b.kt"));
        let second = in_flight.begin(Path::new("a.kt"));

        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert!(!other.is_cancelled());
        assert_eq!(in_flight.len(), 2);
        assert!(in_flight.is_running(Path::new("b.kt")));
        assert!(!in_flight.is_running(Path::new("c.kt")));
    }

    #[test]
    fn stale_finish_keeps_current_entry() {
        let in_flight = InFlight::new();
        let first = in_flight.begin(Path::new("a.kt"));
        let second = in_flight.begin(Path::new("a.kt"));

        in_flight.finish(Path::new("a.kt"), &first);
        assert_eq!(in_flight.len(), 1);

        in_flight.finish(Path::new("a.kt"), &second);
        assert!(in_flight.is_empty());
    }

    #[test]
    fn clones_share_the_flag() {
        let token = CancellationToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }
}
