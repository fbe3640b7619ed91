//! Spawns and owns the compositor child process.

use compositor_core::config::SupervisorConfig;
use compositor_core::constants::EXECUTABLE_MODE;
use compositor_core::error::Result;
use std::path::Path;
use std::process::Stdio;
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};
use tracing::{debug, info};

/// A spawned compositor child process with its stdio handles split out for
/// independent reader/writer tasks.
///
/// All fields are public and meant to be destructured immediately at the
/// call site (`let SpawnedChild { child, stdin, stdout, stderr, .. } =
/// spawned;`), handing `stdin`/`stdout`/`stderr` to their own tasks and
/// `child` to whichever task awaits the exit status.
pub struct SpawnedChild {
    /// The underlying child handle; call `.wait().await` on it directly.
    pub child: Child,
    /// Process identifier, or `None` if the platform could not report one.
    pub pid: Option<u32>,
    pub stdin: ChildStdin,
    pub stdout: ChildStdout,
    pub stderr: ChildStderr,
}

impl SpawnedChild {
    /// Spawns the compositor executable named in `config`, passing
    /// `start_command_line` as its sole argument.
    ///
    /// Ensures the executable bit is set on the target binary first, unless
    /// `config.read_only_fs` is set.
    pub async fn spawn(config: &SupervisorConfig, start_command_line: &str) -> Result<Self> {
        ensure_executable(&config.executable_path, config.read_only_fs).await?;

        info!(
            executable = %config.executable_path.display(),
            "spawning compositor child process"
        );

        let mut command = Command::new(&config.executable_path);
        command
            .arg(start_command_line)
            .envs(&config.extra_env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command.spawn()?;
        let pid = child.id();
        let stdin = child.stdin.take().expect("stdin was requested as piped");
        let stdout = child.stdout.take().expect("stdout was requested as piped");
        let stderr = child.stderr.take().expect("stderr was requested as piped");

        debug!(?pid, "compositor child process spawned");

        Ok(Self {
            child,
            pid,
            stdin,
            stdout,
            stderr,
        })
    }
}

#[cfg(unix)]
async fn ensure_executable(path: &Path, read_only_fs: bool) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    if read_only_fs {
        debug!("read-only filesystem signaled, skipping executable bit check");
        return Ok(());
    }

    let permissions = std::fs::Permissions::from_mode(EXECUTABLE_MODE);
    tokio::fs::set_permissions(path, permissions).await?;
    Ok(())
}

#[cfg(not(unix))]
async fn ensure_executable(_path: &Path, _read_only_fs: bool) -> Result<()> {
    Ok(())
}
