//! Worker lifecycle state machine.
//!
//! The gateway moves through
//! `Installing -> Waiting -> Activating -> Activated`, with `Redundant`
//! reached when install fails. The `Waiting -> Activating` transition fires
//! immediately after install completes (skip-waiting): a freshly installed
//! gateway supersedes its predecessor without an external release.

use std::sync::{Arc, Mutex};

/// Lifecycle states of the gateway worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Constructed, install not yet begun.
    New,
    /// Precaching the application shell.
    Installing,
    /// Install complete; eligible to activate immediately.
    Waiting,
    /// Purging stale cache generations.
    Activating,
    /// Serving all clients.
    Activated,
    /// Fatal install failure; the previous generation stays in control.
    Redundant,
}

/// An attempted transition the state machine does not allow.
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("invalid lifecycle transition: {from:?} -> {to:?}")]
pub struct TransitionError {
    pub from: WorkerState,
    pub to: WorkerState,
}

/// Shared handle to the worker's lifecycle state.
#[derive(Debug, Clone)]
pub struct Lifecycle {
    state: Arc<Mutex<WorkerState>>,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Self { state: Arc::new(Mutex::new(WorkerState::New)) }
    }

    /// Current state.
    pub fn state(&self) -> WorkerState {
        *self.state.lock().expect("lifecycle lock poisoned")
    }

    /// `New -> Installing`.
    pub fn begin_install(&self) -> Result<(), TransitionError> {
        self.transition(WorkerState::New, WorkerState::Installing)
    }

    /// `Installing -> Waiting`. The worker signals readiness to supersede
    /// any predecessor immediately rather than dwelling here.
    pub fn finish_install(&self) -> Result<(), TransitionError> {
        self.transition(WorkerState::Installing, WorkerState::Waiting)
    }

    /// `Waiting -> Activating`, without waiting for other instances to
    /// release control (the skip-waiting transition).
    pub fn begin_activate(&self) -> Result<(), TransitionError> {
        self.transition(WorkerState::Waiting, WorkerState::Activating)
    }

    /// `Activating -> Activated`. The worker claims all clients at once.
    pub fn finish_activate(&self) -> Result<(), TransitionError> {
        self.transition(WorkerState::Activating, WorkerState::Activated)
    }

    /// Mark the worker redundant after a fatal install error.
    pub fn fail(&self) {
        let mut state = self.state.lock().expect("lifecycle lock poisoned");
        *state = WorkerState::Redundant;
    }

    /// Whether the worker has claimed control and serves requests.
    pub fn is_activated(&self) -> bool {
        self.state() == WorkerState::Activated
    }

    fn transition(&self, expected: WorkerState, to: WorkerState) -> Result<(), TransitionError> {
        let mut state = self.state.lock().expect("lifecycle lock poisoned");
        if *state != expected {
            return Err(TransitionError { from: *state, to });
        }
        *state = to;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_lifecycle() {
        let lifecycle = Lifecycle::new();
        assert_eq!(lifecycle.state(), WorkerState::New);

        lifecycle.begin_install().unwrap();
        lifecycle.finish_install().unwrap();
        assert_eq!(lifecycle.state(), WorkerState::Waiting);

        lifecycle.begin_activate().unwrap();
        lifecycle.finish_activate().unwrap();
        assert!(lifecycle.is_activated());
    }

    #[test]
    fn test_activate_before_install_rejected() {
        let lifecycle = Lifecycle::new();
        let err = lifecycle.begin_activate().unwrap_err();
        assert_eq!(err.from, WorkerState::New);
        assert_eq!(err.to, WorkerState::Activating);
    }

    #[test]
    fn test_double_install_rejected() {
        let lifecycle = Lifecycle::new();
        lifecycle.begin_install().unwrap();
        assert!(lifecycle.begin_install().is_err());
    }

    #[test]
    fn test_fail_marks_redundant() {
        let lifecycle = Lifecycle::new();
        lifecycle.begin_install().unwrap();
        lifecycle.fail();
        assert_eq!(lifecycle.state(), WorkerState::Redundant);
        assert!(lifecycle.finish_install().is_err());
    }
}
