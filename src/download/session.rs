//! Session-level download lock.

use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};

/// Process-visible download state: at most one bulk-or-single session may
/// be in flight at a time.
///
/// The lock exists for UI-state consistency, not to serialize network
/// calls: it is acquired when a session starts and released only when both
/// the active-task count and the pending queue have drained. Owned
/// explicitly and shared by handle, never a global.
#[derive(Debug, Default)]
pub struct DownloadSession {
    state: Mutex<SessionState>,
}

#[derive(Debug, Default, Clone, Copy)]
struct SessionState {
    is_processing: bool,
    active_tasks: usize,
    queued: usize,
}

impl DownloadSession {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Whether a session currently holds the lock.
    pub fn is_processing(&self) -> bool {
        self.state.lock().unwrap().is_processing
    }

    /// `(is_processing, active_tasks, queued)` for diagnostics.
    pub fn snapshot(&self) -> (bool, usize, usize) {
        let state = self.state.lock().unwrap();
        (state.is_processing, state.active_tasks, state.queued)
    }

    /// Acquire the session lock for a batch of `queued` tasks. Fails with
    /// [`Error::SessionBusy`] when another session holds it.
    pub fn acquire(self: &Arc<Self>, queued: usize) -> Result<SessionGuard> {
        let mut state = self.state.lock().unwrap();
        if state.is_processing {
            return Err(Error::SessionBusy);
        }
        *state = SessionState {
            is_processing: true,
            active_tasks: 0,
            queued,
        };
        drop(state);

        Ok(SessionGuard {
            session: Arc::clone(self),
        })
    }

    fn task_started(&self) {
        let mut state = self.state.lock().unwrap();
        state.queued = state.queued.saturating_sub(1);
        state.active_tasks += 1;
    }

    fn task_finished(&self) {
        let mut state = self.state.lock().unwrap();
        state.active_tasks = state.active_tasks.saturating_sub(1);
    }

    fn release(&self) {
        let mut state = self.state.lock().unwrap();
        *state = SessionState::default();
    }
}

/// Holds the session lock; dropping it releases the session once the
/// workers have drained.
#[derive(Debug)]
pub struct SessionGuard {
    session: Arc<DownloadSession>,
}

impl SessionGuard {
    /// A worker picked up a task from the queue.
    pub fn task_started(&self) {
        self.session.task_started();
    }

    /// A worker finished a task (successfully or not).
    pub fn task_finished(&self) {
        self.session.task_finished();
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.session.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_and_release() {
        let session = DownloadSession::new();
        assert!(!session.is_processing());

        let guard = session.acquire(3).unwrap();
        assert!(session.is_processing());
        assert_eq!(session.snapshot(), (true, 0, 3));

        drop(guard);
        assert!(!session.is_processing());
        assert_eq!(session.snapshot(), (false, 0, 0));
    }

    #[test]
    fn test_overlapping_sessions_rejected() {
        let session = DownloadSession::new();
        let _guard = session.acquire(1).unwrap();
        assert!(matches!(session.acquire(1), Err(Error::SessionBusy)));
    }

    #[test]
    fn test_reacquire_after_release() {
        let session = DownloadSession::new();
        drop(session.acquire(1).unwrap());
        assert!(session.acquire(1).is_ok());
    }

    #[test]
    fn test_task_counters() {
        let session = DownloadSession::new();
        let guard = session.acquire(2).unwrap();

        guard.task_started();
        assert_eq!(session.snapshot(), (true, 1, 1));

        guard.task_started();
        assert_eq!(session.snapshot(), (true, 2, 0));

        guard.task_finished();
        guard.task_finished();
        assert_eq!(session.snapshot(), (true, 0, 0));
    }
}
