//! Request envelope written to the compositor's stdin.

use compositor_core::constants::EOF_LINE;
use compositor_core::error::Result;
use serde::Serialize;
use serde_json::Value;

/// A single compositor command: a type tag plus opaque, serializable params.
///
/// Command schemas themselves are treated as opaque values — this crate only
/// needs to carry them, not interpret them.
#[derive(Debug, Clone, Serialize)]
pub struct Command {
    #[serde(rename = "type")]
    pub command_type: String,
    pub params: Value,
}

impl Command {
    /// Builds a command with the given type tag and parameters.
    pub fn new(command_type: impl Into<String>, params: Value) -> Self {
        Self {
            command_type: command_type.into(),
            params,
        }
    }
}

/// A command paired with the correlation nonce used to match its response.
///
/// # Example
///
/// ```
/// use compositor_wire::request::{Command, SerializedRequest};
/// use serde_json::json;
///
/// let request = SerializedRequest::new("abc", Command::new("renderStill", json!({"frame": 12})));
/// let line = request.to_line().unwrap();
/// assert!(line.ends_with('\n'));
/// assert!(line.contains("\"nonce\":\"abc\""));
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct SerializedRequest {
    pub nonce: String,
    pub payload: Command,
}

impl SerializedRequest {
    /// Pairs a nonce with a command.
    pub fn new(nonce: impl Into<String>, payload: Command) -> Self {
        Self {
            nonce: nonce.into(),
            payload,
        }
    }

    /// Renders this request as a single newline-terminated JSON line, ready
    /// to be written directly to the child's stdin.
    pub fn to_line(&self) -> Result<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

/// The literal newline-terminated line that signals orderly shutdown.
pub fn eof_line() -> String {
    format!("{EOF_LINE}\n")
}
