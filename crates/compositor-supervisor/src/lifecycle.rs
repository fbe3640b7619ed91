//! Lifecycle Controller: the tri-state `{running, quit-ok, quit-err}` machine
//! that gates new submissions and mass-rejects pending waiters on exit.

use crate::registry::{WaiterRegistry, reject_all};
use compositor_core::error::{Error, Result};
use compositor_core::status::RunningStatus;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use tracing::{info, warn};

/// Completion handle for a single installed `wait_for_done` call.
type DoneWaiter = oneshot::Sender<std::result::Result<(), Error>>;

/// Tracks whether the compositor child is running, exited cleanly, or
/// crashed, and owns the single allowed `wait_for_done` waiter.
///
/// Transitions happen at most once; a second exit signal
/// (which should not occur, but is not trusted not to) is silently ignored
/// rather than double-rejecting already-resolved waiters.
#[derive(Debug)]
pub struct LifecycleController {
    status: Mutex<RunningStatus>,
    done_waiter: Mutex<Option<DoneWaiter>>,
    registry: Arc<WaiterRegistry>,
}

impl LifecycleController {
    /// Creates a controller starting in [`RunningStatus::Running`], sharing
    /// `registry` with the Command Gateway and Frame Dispatch.
    pub fn new(registry: Arc<WaiterRegistry>) -> Self {
        Self {
            status: Mutex::new(RunningStatus::Running),
            done_waiter: Mutex::new(None),
            registry,
        }
    }

    /// Returns the current lifecycle status.
    pub fn status(&self) -> RunningStatus {
        self.status.lock().expect("lifecycle mutex poisoned").clone()
    }

    /// Fails fast if the compositor is not currently running; otherwise a
    /// no-op. Used as the shared precondition for `execute_command` and
    /// `finish_commands`.
    pub fn ensure_running(&self) -> Result<()> {
        match self.status() {
            RunningStatus::Running => Ok(()),
            RunningStatus::QuitWithoutError => Err(Error::AlreadyQuitClean),
            RunningStatus::QuitWithError { stderr } => Err(Error::AlreadyQuitCrash { stderr }),
        }
    }

    /// Installs (or replaces) the single `wait_for_done` waiter.
    ///
    /// A clean exit rejects rather than resolves a waiter
    /// installed afterwards: this is the documented historical behavior,
    /// preserved here even though it reads as surprising.
    pub fn wait_for_done(&self) -> Result<oneshot::Receiver<std::result::Result<(), Error>>> {
        match self.status() {
            RunningStatus::Running => {
                let (tx, rx) = oneshot::channel();
                *self.done_waiter.lock().expect("lifecycle mutex poisoned") = Some(tx);
                Ok(rx)
            }
            RunningStatus::QuitWithoutError => Err(Error::AlreadyQuitClean),
            RunningStatus::QuitWithError { stderr } => Err(Error::AlreadyQuitCrash { stderr }),
        }
    }

    /// Transitions to [`RunningStatus::QuitWithoutError`] on a clean child
    /// exit, draining and rejecting any waiters that never received a
    /// response before stdout closed, and resolving `wait_for_done` if one
    /// was installed.
    pub fn transition_clean(&self) {
        if !self.take_transition(RunningStatus::QuitWithoutError) {
            return;
        }
        info!(target: "compositor", "compositor process exited cleanly");

        let waiters = self.registry.drain();
        reject_all(waiters, || Error::AlreadyQuitClean);

        if let Some(done_tx) = self
            .done_waiter
            .lock()
            .expect("lifecycle mutex poisoned")
            .take()
        {
            let _ = done_tx.send(Ok(()));
        }
    }

    /// Transitions to [`RunningStatus::QuitWithError`] on a non-zero child
    /// exit or a fatal parser violation, mass-rejecting every pending waiter
    /// and `wait_for_done` with `stderr`.
    pub fn transition_crash(&self, stderr: String) {
        if !self.take_transition(RunningStatus::QuitWithError {
            stderr: stderr.clone(),
        }) {
            return;
        }
        warn!(target: "compositor", stderr = %stderr, "compositor process exited with error");

        let waiters = self.registry.drain();
        let stderr_for_waiters = stderr.clone();
        reject_all(waiters, move || Error::CompositorPanicked {
            stderr: stderr_for_waiters.clone(),
        });

        if let Some(done_tx) = self
            .done_waiter
            .lock()
            .expect("lifecycle mutex poisoned")
            .take()
        {
            let _ = done_tx.send(Err(Error::CompositorPanicked {
                stderr: stderr.clone(),
            }));
        }
    }

    /// Moves `status` to `new_status` iff it is currently `Running`.
    /// Returns whether the transition was actually taken.
    fn take_transition(&self, new_status: RunningStatus) -> bool {
        let mut status = self.status.lock().expect("lifecycle mutex poisoned");
        if !status.is_running() {
            return false;
        }
        *status = new_status;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_running_passes_while_running() {
        let lifecycle = LifecycleController::new(Arc::new(WaiterRegistry::new()));
        assert!(lifecycle.ensure_running().is_ok());
    }

    #[test]
    fn ensure_running_fails_after_clean_exit() {
        let lifecycle = LifecycleController::new(Arc::new(WaiterRegistry::new()));
        lifecycle.transition_clean();
        assert!(matches!(
            lifecycle.ensure_running(),
            Err(Error::AlreadyQuitClean)
        ));
    }

    #[test]
    fn ensure_running_fails_with_stderr_after_crash() {
        let lifecycle = LifecycleController::new(Arc::new(WaiterRegistry::new()));
        lifecycle.transition_crash("boom".to_string());
        match lifecycle.ensure_running() {
            Err(Error::AlreadyQuitCrash { stderr }) => assert_eq!(stderr, "boom"),
            other => panic!("expected AlreadyQuitCrash, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn crash_rejects_every_pending_waiter_with_stderr() {
        let registry = Arc::new(WaiterRegistry::new());
        let lifecycle = LifecycleController::new(registry.clone());

        let (tx1, rx1) = oneshot::channel();
        let (tx2, rx2) = oneshot::channel();
        registry.insert("a".to_string(), tx1);
        registry.insert("b".to_string(), tx2);

        lifecycle.transition_crash("boom".to_string());

        for rx in [rx1, rx2] {
            match rx.await.unwrap() {
                Err(Error::CompositorPanicked { stderr }) => assert_eq!(stderr, "boom"),
                other => panic!("expected CompositorPanicked, got {other:?}"),
            }
        }
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn clean_exit_resolves_an_installed_done_waiter() {
        let lifecycle = LifecycleController::new(Arc::new(WaiterRegistry::new()));
        let rx = lifecycle.wait_for_done().unwrap();
        lifecycle.transition_clean();
        assert!(rx.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn crash_rejects_an_installed_done_waiter() {
        let lifecycle = LifecycleController::new(Arc::new(WaiterRegistry::new()));
        let rx = lifecycle.wait_for_done().unwrap();
        lifecycle.transition_crash("boom".to_string());
        match rx.await.unwrap() {
            Err(Error::CompositorPanicked { stderr }) => assert_eq!(stderr, "boom"),
            other => panic!("expected CompositorPanicked, got {other:?}"),
        }
    }

    #[test]
    fn wait_for_done_fails_fast_after_clean_exit() {
        let lifecycle = LifecycleController::new(Arc::new(WaiterRegistry::new()));
        lifecycle.transition_clean();
        assert!(matches!(
            lifecycle.wait_for_done(),
            Err(Error::AlreadyQuitClean)
        ));
    }

    #[test]
    fn second_transition_is_ignored() {
        let lifecycle = LifecycleController::new(Arc::new(WaiterRegistry::new()));
        lifecycle.transition_clean();
        lifecycle.transition_crash("boom".to_string());
        // First transition (clean) wins; the crash signal is dropped.
        assert_eq!(lifecycle.status(), RunningStatus::QuitWithoutError);
    }
}
