//! Configuration for bootstrapping the compositor supervisor.

use std::collections::HashMap;
use std::path::PathBuf;

/// Configuration consumed by the supervisor's bootstrap routine.
///
/// # Example
///
/// ```
/// use compositor_core::SupervisorConfig;
/// use std::path::PathBuf;
///
/// let config = SupervisorConfig {
///     executable_path: PathBuf::from("/opt/compositor/bin/renderer"),
///     ..Default::default()
/// };
/// assert!(!config.read_only_fs);
/// ```
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// Path to the compositor executable.
    pub executable_path: PathBuf,

    /// Whether the host filesystem is read-only. When `true`, the supervisor
    /// does not attempt to set the executable bit on `executable_path`.
    pub read_only_fs: bool,

    /// Explicit frame-cache capacity override. When `None`, the supervisor
    /// computes one from host free memory via the sizing heuristic.
    pub frame_cache_capacity_override: Option<u32>,

    /// Additional environment variables to set on the child process, such as
    /// a dynamic library search path computed by the caller.
    pub extra_env: HashMap<String, String>,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            executable_path: PathBuf::new(),
            read_only_fs: false,
            frame_cache_capacity_override: None,
            extra_env: HashMap::new(),
        }
    }
}

impl SupervisorConfig {
    /// Reads the read-only-filesystem signal from the process environment
    /// (the [`crate::constants::READ_ONLY_FS_ENV`] variable) and folds it
    /// into an otherwise-default configuration for the given executable.
    pub fn from_env(executable_path: PathBuf) -> Self {
        let read_only_fs = std::env::var_os(crate::constants::READ_ONLY_FS_ENV).is_some();
        Self {
            executable_path,
            read_only_fs,
            ..Default::default()
        }
    }
}
