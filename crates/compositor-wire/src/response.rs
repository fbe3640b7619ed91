//! Parsing for the compositor's JSON error payload shape.

use serde::Deserialize;

/// The `{error, backtrace}` shape the compositor emits on an error frame.
///
/// Not every error frame carries valid JSON; callers should fall back to
/// treating the raw payload as text when [`parse_error_payload`] returns
/// `None`.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorPayload {
    pub error: String,
    #[serde(default)]
    pub backtrace: String,
}

/// Attempts to parse an error frame's payload as an [`ErrorPayload`].
pub fn parse_error_payload(payload: &[u8]) -> Option<ErrorPayload> {
    serde_json::from_slice(payload).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_error_payload() {
        let payload = br#"{"error":"bad","backtrace":"at foo"}"#;
        let parsed = parse_error_payload(payload).unwrap();
        assert_eq!(parsed.error, "bad");
        assert_eq!(parsed.backtrace, "at foo");
    }

    #[test]
    fn missing_backtrace_defaults_to_empty() {
        let payload = br#"{"error":"bad"}"#;
        let parsed = parse_error_payload(payload).unwrap();
        assert_eq!(parsed.backtrace, "");
    }

    #[test]
    fn non_json_payload_returns_none() {
        assert!(parse_error_payload(b"not json at all").is_none());
    }
}
