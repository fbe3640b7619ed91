//! Command Gateway: the public surface callers interact with.

use std::io;
use std::sync::Arc;
use std::sync::Mutex as StdMutex;

use bytes::Bytes;
use compositor_core::error::{Error, Result};
use compositor_process::write_line;
use compositor_wire::request::{Command, SerializedRequest, eof_line};
use serde_json::Value;
use tokio::process::ChildStdin;
use tokio::sync::{Mutex, oneshot};

use crate::lifecycle::LifecycleController;
use crate::nonce::NonceSource;
use crate::registry::WaiterRegistry;

/// Shared state behind the handles cloned out to `execute_command` callers.
struct Shared {
    registry: Arc<WaiterRegistry>,
    lifecycle: Arc<LifecycleController>,
    stdin: Mutex<ChildStdin>,
    nonce_source: StdMutex<Box<dyn NonceSource>>,
    pid: Option<u32>,
}

/// The supervisor's public contract: submit commands, signal shutdown, wait
/// for the child to finish, and inspect its process id.
///
/// Cloning a `CommandGateway` is cheap and shares the same underlying child,
/// registry, and lifecycle; every clone observes the same transitions.
#[derive(Clone)]
pub struct CommandGateway {
    shared: Arc<Shared>,
}

impl CommandGateway {
    pub(crate) fn new(
        registry: Arc<WaiterRegistry>,
        lifecycle: Arc<LifecycleController>,
        stdin: ChildStdin,
        nonce_source: Box<dyn NonceSource>,
        pid: Option<u32>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                registry,
                lifecycle,
                stdin: Mutex::new(stdin),
                nonce_source: StdMutex::new(nonce_source),
                pid,
            }),
        }
    }

    /// Submits a command and returns a future resolving to the response
    /// payload bytes on success.
    ///
    /// Fails synchronously (before any I/O) if the compositor has already
    /// quit.
    pub async fn execute_command(&self, command_type: impl Into<String>, params: Value) -> Result<Bytes> {
        self.shared.lifecycle.ensure_running()?;

        let nonce = self
            .shared
            .nonce_source
            .lock()
            .expect("nonce source mutex poisoned")
            .next_nonce();

        let request = SerializedRequest::new(nonce.clone(), Command::new(command_type.into(), params));
        let line = request.to_line()?;

        let (tx, rx) = oneshot::channel();
        self.shared.registry.insert(nonce.clone(), tx);

        if let Err(err) = self.write_stdin_line(&line).await {
            // The request never reached the child; nobody will ever resolve
            // this waiter, so take it back out rather than leak it.
            self.shared.registry.take(&nonce);
            return Err(err);
        }

        match rx.await {
            Ok(result) => result,
            Err(_) => Err(channel_closed_without_resolution()),
        }
    }

    /// Signals the child to finish processing and exit cleanly by writing
    /// the literal `EOF\n` line. Does not itself wait for the exit; pair
    /// with [`CommandGateway::wait_for_done`], installed beforehand.
    pub async fn finish_commands(&self) -> Result<()> {
        self.shared.lifecycle.ensure_running()?;
        self.write_stdin_line(&eof_line()).await
    }

    /// Returns a future that resolves when the child exits cleanly, or
    /// rejects with the accumulated stderr if it crashes.
    ///
    /// Must be installed before [`CommandGateway::finish_commands`] is called
    /// if the caller wants to observe the resulting exit.
    pub async fn wait_for_done(&self) -> Result<()> {
        let rx = self.shared.lifecycle.wait_for_done()?;
        match rx.await {
            Ok(result) => result,
            Err(_) => Err(channel_closed_without_resolution()),
        }
    }

    /// The child's process id, or `None` if the host could not obtain one.
    pub fn pid(&self) -> Option<u32> {
        self.shared.pid
    }

    async fn write_stdin_line(&self, line: &str) -> Result<()> {
        let mut stdin = self.shared.stdin.lock().await;
        write_line(&mut stdin, line).await
    }
}

/// Builds the error surfaced when a oneshot receiver is dropped without ever
/// being resolved. This should not happen in normal operation, since every
/// registry entry is either resolved by a frame or rejected by a lifecycle
/// transition. It only fires if the `Shared` state was torn down out from
/// under a still-pending call.
fn channel_closed_without_resolution() -> Error {
    Error::Io(io::Error::new(
        io::ErrorKind::BrokenPipe,
        "compositor supervisor shut down without resolving a pending call",
    ))
}
