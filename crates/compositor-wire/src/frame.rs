//! Response frame types for the compositor wire protocol.

use bytes::Bytes;
use compositor_core::constants::{DIAGNOSTIC_NONCE, STATUS_ERROR, STATUS_SUCCESS};
use std::fmt;

/// Status carried by a response frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// The request completed successfully; payload is the result.
    Success,
    /// The request failed; payload describes the error.
    Error,
}

impl FrameStatus {
    /// Parses a status field from its single-byte wire representation
    /// (`0` for success, `1` for error).
    pub fn from_wire_bytes(bytes: &[u8]) -> Option<Self> {
        match bytes {
            STATUS_SUCCESS => Some(FrameStatus::Success),
            STATUS_ERROR => Some(FrameStatus::Error),
            _ => None,
        }
    }
}

/// A complete, decoded response frame: `remotion_buffer:<nonce>:<length>:<status>:<payload>`.
///
/// # Example
///
/// ```
/// use compositor_wire::frame::{Frame, FrameStatus};
/// use bytes::Bytes;
///
/// let frame = Frame {
///     nonce: "abc".to_string(),
///     status: FrameStatus::Success,
///     payload: Bytes::from_static(b"foo"),
/// };
/// assert!(!frame.is_diagnostic());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Correlation nonce, or the reserved diagnostic nonce `"0"`.
    pub nonce: String,
    /// Success or error status.
    pub status: FrameStatus,
    /// Raw, binary-safe payload bytes.
    pub payload: Bytes,
}

impl Frame {
    /// Returns `true` if this frame is an unsolicited diagnostic log frame
    /// rather than a response to a pending request.
    pub fn is_diagnostic(&self) -> bool {
        self.nonce == DIAGNOSTIC_NONCE
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match std::str::from_utf8(&self.payload) {
            Ok(text) => write!(f, "Frame(nonce={}, status={:?}, payload={text:?})", self.nonce, self.status),
            Err(_) => write!(
                f,
                "Frame(nonce={}, status={:?}, payload=<{} bytes binary>)",
                self.nonce,
                self.status,
                self.payload.len()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_nonce_is_recognized() {
        let frame = Frame {
            nonce: "0".to_string(),
            status: FrameStatus::Success,
            payload: Bytes::from_static(b"hello"),
        };
        assert!(frame.is_diagnostic());
    }

    #[test]
    fn ordinary_nonce_is_not_diagnostic() {
        let frame = Frame {
            nonce: "abc".to_string(),
            status: FrameStatus::Success,
            payload: Bytes::from_static(b"hello"),
        };
        assert!(!frame.is_diagnostic());
    }

    #[test]
    fn status_round_trips_through_wire_bytes() {
        assert_eq!(FrameStatus::from_wire_bytes(b"0"), Some(FrameStatus::Success));
        assert_eq!(FrameStatus::from_wire_bytes(b"1"), Some(FrameStatus::Error));
        assert_eq!(FrameStatus::from_wire_bytes(b"2"), None);
    }

    #[test]
    fn display_falls_back_to_binary_summary_for_non_utf8_payload() {
        let frame = Frame {
            nonce: "abc".to_string(),
            status: FrameStatus::Success,
            payload: Bytes::from_static(&[0xff, 0xfe, 0x00]),
        };
        let rendered = frame.to_string();
        assert!(rendered.contains("3 bytes binary"));
    }
}
