//! Bootstrap: wires the whole supervisor graph from configuration and an
//! initial start command.

use std::sync::Arc;

use compositor_core::config::SupervisorConfig;
use compositor_core::constants::START_COMMAND_CACHE_SIZE_FIELD;
use compositor_core::error::Result;
use compositor_core::sizing;
use compositor_process::{SpawnedChild, pump_stdout};
use compositor_wire::FrameParser;
use compositor_wire::request::Command;
use serde_json::Value;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStderr, ChildStdout};
use tokio::sync::mpsc;
use tracing::{error, warn};

use crate::dispatch::dispatch_frame;
use crate::gateway::CommandGateway;
use crate::lifecycle::LifecycleController;
use crate::nonce::{NonceSource, UuidNonceSource};
use crate::registry::WaiterRegistry;

/// Spawns the compositor with `start_command` (its frame-cache capacity
/// folded in first) and returns an immediately-usable [`CommandGateway`].
///
/// Uses [`UuidNonceSource`] as the default nonce generator. Callers that need
/// a different nonce strategy (e.g. deterministic nonces in tests) should use
/// [`bootstrap_with_nonce_source`] instead.
pub async fn bootstrap(config: SupervisorConfig, start_command: Command) -> Result<CommandGateway> {
    bootstrap_with_nonce_source(config, start_command, Box::new(UuidNonceSource)).await
}

/// As [`bootstrap`], but with an explicit [`NonceSource`].
pub async fn bootstrap_with_nonce_source(
    config: SupervisorConfig,
    mut start_command: Command,
    nonce_source: Box<dyn NonceSource>,
) -> Result<CommandGateway> {
    let capacity = config
        .frame_cache_capacity_override
        .unwrap_or_else(sizing::frame_cache_capacity);
    fold_cache_size_into_params(&mut start_command.params, capacity);
    let start_command_line = serde_json::to_string(&start_command)?;

    let spawned = SpawnedChild::spawn(&config, &start_command_line).await?;
    let SpawnedChild {
        child,
        pid,
        stdin,
        stdout,
        stderr,
    } = spawned;

    let registry = Arc::new(WaiterRegistry::new());
    let lifecycle = Arc::new(LifecycleController::new(registry.clone()));

    spawn_stdout_task(stdout, registry.clone(), lifecycle.clone());
    spawn_exit_watcher(child, stderr, lifecycle.clone());

    Ok(CommandGateway::new(registry, lifecycle, stdin, nonce_source, pid))
}

/// Inserts the resolved frame-cache capacity into the start command's
/// params, under [`START_COMMAND_CACHE_SIZE_FIELD`].
///
/// If `params` is already a JSON object, the field is added directly. If it
/// is `null` (the common "no params" case), a fresh object is created. Any
/// other JSON shape is preserved under a nested `params` key alongside the
/// capacity, rather than silently discarded.
fn fold_cache_size_into_params(params: &mut Value, capacity: u32) {
    match params {
        Value::Object(map) => {
            map.insert(START_COMMAND_CACHE_SIZE_FIELD.to_string(), Value::from(capacity));
        }
        Value::Null => {
            let mut map = serde_json::Map::new();
            map.insert(START_COMMAND_CACHE_SIZE_FIELD.to_string(), Value::from(capacity));
            *params = Value::Object(map);
        }
        other => {
            let mut map = serde_json::Map::new();
            map.insert("params".to_string(), other.take());
            map.insert(START_COMMAND_CACHE_SIZE_FIELD.to_string(), Value::from(capacity));
            *params = Value::Object(map);
        }
    }
}

/// Spawns the two cooperating tasks that turn raw stdout bytes into
/// dispatched frames: one pumping bytes through the [`FrameParser`], one
/// draining decoded frames to [`dispatch_frame`]. A parser-fatal
/// [`compositor_core::error::Error::ProtocolViolation`] transitions
/// `lifecycle` to the crashed state.
fn spawn_stdout_task(stdout: ChildStdout, registry: Arc<WaiterRegistry>, lifecycle: Arc<LifecycleController>) {
    let (frames_tx, mut frames_rx) = mpsc::unbounded_channel();
    let parser = FrameParser::new();

    tokio::spawn(async move {
        if let Err(err) = pump_stdout(stdout, parser, frames_tx).await {
            error!(target: "compositor", %err, "fatal protocol violation reading compositor stdout");
            lifecycle.transition_crash(format!("protocol violation: {err}"));
        }
    });

    tokio::spawn(async move {
        while let Some(frame) = frames_rx.recv().await {
            dispatch_frame(frame, &registry);
        }
    });
}

/// Awaits the child's exit status and the remainder of its stderr
/// concurrently, then drives the corresponding [`LifecycleController`]
/// transition.
fn spawn_exit_watcher(mut child: Child, mut stderr: ChildStderr, lifecycle: Arc<LifecycleController>) {
    tokio::spawn(async move {
        let mut stderr_bytes = Vec::new();
        let (wait_result, _) = tokio::join!(child.wait(), async {
            let _ = stderr.read_to_end(&mut stderr_bytes).await;
        });

        match wait_result {
            Ok(status) if status.success() => lifecycle.transition_clean(),
            Ok(status) => {
                let stderr_text = String::from_utf8_lossy(&stderr_bytes).into_owned();
                warn!(target: "compositor", code = status.code(), "compositor process exited with error");
                lifecycle.transition_crash(stderr_text);
            }
            Err(io_err) => {
                lifecycle.transition_crash(format!("failed to wait for compositor process: {io_err}"));
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn folds_capacity_into_object_params() {
        let mut params = json!({"existing": "value"});
        fold_cache_size_into_params(&mut params, 750);
        assert_eq!(params["existing"], "value");
        assert_eq!(params[START_COMMAND_CACHE_SIZE_FIELD], 750);
    }

    #[test]
    fn folds_capacity_into_null_params() {
        let mut params = Value::Null;
        fold_cache_size_into_params(&mut params, 500);
        assert_eq!(params[START_COMMAND_CACHE_SIZE_FIELD], 500);
    }

    #[test]
    fn preserves_non_object_params_under_a_nested_key() {
        let mut params = json!([1, 2, 3]);
        fold_cache_size_into_params(&mut params, 2000);
        assert_eq!(params["params"], json!([1, 2, 3]));
        assert_eq!(params[START_COMMAND_CACHE_SIZE_FIELD], 2000);
    }
}
