//! Shared types, constants, and configuration for the compositor supervisor.
//!
//! This crate has no async runtime dependency of its own beyond what
//! `sysinfo` requires; it is the common foundation that `compositor-wire`,
//! `compositor-process`, and `compositor-supervisor` all build on.

pub mod config;
pub mod constants;
pub mod error;
pub mod sizing;
pub mod status;

pub use config::SupervisorConfig;
pub use error::{Error, Result};
pub use status::RunningStatus;
