//! Crate-wide error taxonomy for the compositor supervisor.

use thiserror::Error;

/// Errors raised by the compositor supervisor and its supporting crates.
#[derive(Debug, Error)]
pub enum Error {
    /// A command was submitted after the compositor had already exited cleanly.
    #[error("compositor already quit")]
    AlreadyQuitClean,

    /// A command was submitted (or `wait_for_done` was called) after the
    /// compositor crashed. Carries the accumulated stderr for diagnostics.
    #[error("compositor already quit with error: {stderr}")]
    AlreadyQuitCrash {
        /// Stderr text accumulated up to the point of the crash.
        stderr: String,
    },

    /// The compositor replied with a well-formed `{error, backtrace}` JSON
    /// error payload for a specific request.
    #[error("Compositor error: {message}\n{backtrace}")]
    CompositorError {
        /// Human-readable error message reported by the compositor.
        message: String,
        /// Backtrace text reported alongside the error message.
        backtrace: String,
    },

    /// The compositor replied with an error frame whose payload was not
    /// valid JSON; the raw payload is surfaced as text.
    #[error("compositor error (raw): {raw}")]
    CompositorRawError {
        /// Raw, non-JSON payload bytes, rendered as a UTF-8 string (lossily
        /// if necessary).
        raw: String,
    },

    /// The child process exited with a non-zero status while requests were
    /// still pending. Every pending waiter is rejected with this variant.
    #[error("compositor panicked: {stderr}")]
    CompositorPanicked {
        /// Stderr text accumulated up to the point of the crash.
        stderr: String,
    },

    /// A frame header could not be parsed (non-numeric length, truncated
    /// field, or similar malformed input). Fatal: transitions the lifecycle
    /// to the crashed state.
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    /// Low-level I/O failure talking to the child process.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure (de)serializing a request or response JSON payload.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Convenience alias used throughout the supervisor's public API.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compositor_error_renders_the_exact_caller_facing_message() {
        let err = Error::CompositorError {
            message: "bad".to_string(),
            backtrace: "at foo".to_string(),
        };
        assert_eq!(err.to_string(), "Compositor error: bad\nat foo");
    }
}
