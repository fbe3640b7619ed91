//! Waiter Registry: correlates a response nonce with the caller awaiting it.

use bytes::Bytes;
use compositor_core::error::{Error, Result};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::oneshot;

/// The resolution side of a pending `execute_command` call.
///
/// Dropping a `Waiter` without completing it (e.g. the registry is dropped
/// entirely) silently drops the paired receiver; the caller's future then
/// resolves with a channel-closed error, which is the same externally
/// observable outcome as an explicit rejection.
pub type Waiter = oneshot::Sender<Result<Bytes>>;

/// Maps in-flight correlation nonces to their [`Waiter`].
///
/// A nonce occupies the registry for at most one in-flight request at a
/// time; re-inserting under a key that is already present is a caller bug; it
/// is a no-op rather than a double-complete because [`WaiterRegistry::take`]
/// always removes before returning.
#[derive(Debug, Default)]
pub struct WaiterRegistry {
    waiters: Mutex<HashMap<String, Waiter>>,
}

impl WaiterRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a waiter under `nonce`.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `nonce` is already present: re-insertion
    /// under a live key is a protocol invariant violation, not a
    /// recoverable condition.
    pub fn insert(&self, nonce: String, waiter: Waiter) {
        let mut waiters = self.waiters.lock().expect("registry mutex poisoned");
        debug_assert!(
            !waiters.contains_key(&nonce),
            "nonce {nonce} already has a pending waiter"
        );
        waiters.insert(nonce, waiter);
    }

    /// Removes and returns the waiter registered under `nonce`, if any.
    pub fn take(&self, nonce: &str) -> Option<Waiter> {
        self.waiters
            .lock()
            .expect("registry mutex poisoned")
            .remove(nonce)
    }

    /// Removes and returns every currently registered waiter.
    ///
    /// Used by the Lifecycle Controller to mass-reject on child exit.
    pub fn drain(&self) -> Vec<Waiter> {
        self.waiters
            .lock()
            .expect("registry mutex poisoned")
            .drain()
            .map(|(_, waiter)| waiter)
            .collect()
    }

    /// Returns `true` if no requests are currently in flight.
    pub fn is_empty(&self) -> bool {
        self.waiters.lock().expect("registry mutex poisoned").is_empty()
    }
}

/// Rejects every waiter in `waiters` with a clone of `build_error()`'s result.
///
/// `Error` does not implement `Clone` (its I/O and serde variants don't), so
/// callers pass a closure that builds a fresh error per waiter instead.
pub fn reject_all(waiters: Vec<Waiter>, build_error: impl Fn() -> Error) {
    for waiter in waiters {
        let _ = waiter.send(Err(build_error()));
    }
}
