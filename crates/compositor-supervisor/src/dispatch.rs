//! Frame Dispatch: routes a decoded [`Frame`] to either the diagnostic log
//! stream or the waiter registered under its nonce (§4.5).

use bytes::Bytes;
use compositor_core::error::Error;
use compositor_wire::frame::{Frame, FrameStatus};
use compositor_wire::response::parse_error_payload;
use tracing::trace;

use crate::registry::WaiterRegistry;

/// Routes one decoded frame.
///
/// Diagnostic frames (nonce `"0"`) are logged and never touch the registry.
/// Response frames resolve the matching waiter with the payload bytes on
/// success, or with a [`Error::CompositorError`] / [`Error::CompositorRawError`]
/// on failure, depending on whether the error payload parses as the
/// `{error, backtrace}` JSON shape. A frame whose nonce has no registered
/// waiter (a late duplicate, which should not occur per §3) is dropped.
pub fn dispatch_frame(frame: Frame, registry: &WaiterRegistry) {
    if frame.is_diagnostic() {
        log_diagnostic_frame(&frame);
        return;
    }

    let Some(waiter) = registry.take(&frame.nonce) else {
        trace!(nonce = %frame.nonce, "dropping frame with no registered waiter");
        return;
    };

    let result = match frame.status {
        FrameStatus::Success => Ok(frame.payload),
        FrameStatus::Error => Err(error_from_payload(&frame.payload)),
    };

    // The caller may have dropped its future; a closed receiver here is not
    // an error, just a result nobody wanted.
    let _ = waiter.send(result);
}

fn log_diagnostic_frame(frame: &Frame) {
    match std::str::from_utf8(&frame.payload) {
        Ok(text) => trace!(target: "compositor", "{text}"),
        Err(_) => trace!(
            target: "compositor",
            bytes = frame.payload.len(),
            "received non-utf8 diagnostic payload"
        ),
    }
}

fn error_from_payload(payload: &Bytes) -> Error {
    match parse_error_payload(payload) {
        Some(parsed) => Error::CompositorError {
            message: parsed.error,
            backtrace: parsed.backtrace,
        },
        None => Error::CompositorRawError {
            raw: String::from_utf8_lossy(payload).into_owned(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(nonce: &str, status: FrameStatus, payload: &[u8]) -> Frame {
        Frame {
            nonce: nonce.to_string(),
            status,
            payload: Bytes::copy_from_slice(payload),
        }
    }

    #[tokio::test]
    async fn success_frame_resolves_waiter_with_raw_bytes() {
        let registry = WaiterRegistry::new();
        let (tx, rx) = tokio::sync::oneshot::channel();
        registry.insert("n1".to_string(), tx);

        dispatch_frame(frame("n1", FrameStatus::Success, b"foo"), &registry);

        assert_eq!(rx.await.unwrap().unwrap(), Bytes::from_static(b"foo"));
    }

    #[tokio::test]
    async fn json_error_frame_rejects_with_message_and_backtrace() {
        let registry = WaiterRegistry::new();
        let (tx, rx) = tokio::sync::oneshot::channel();
        registry.insert("n1".to_string(), tx);

        let payload = br#"{"error":"bad","backtrace":"at foo"}"#;
        dispatch_frame(frame("n1", FrameStatus::Error, payload), &registry);

        match rx.await.unwrap() {
            Err(err @ Error::CompositorError { ref message, ref backtrace }) => {
                assert_eq!(message, "bad");
                assert_eq!(backtrace, "at foo");
                assert_eq!(err.to_string(), "Compositor error: bad\nat foo");
            }
            other => panic!("expected CompositorError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_json_error_frame_rejects_with_raw_text() {
        let registry = WaiterRegistry::new();
        let (tx, rx) = tokio::sync::oneshot::channel();
        registry.insert("n1".to_string(), tx);

        dispatch_frame(frame("n1", FrameStatus::Error, b"plain text failure"), &registry);

        match rx.await.unwrap() {
            Err(Error::CompositorRawError { raw }) => assert_eq!(raw, "plain text failure"),
            other => panic!("expected CompositorRawError, got {other:?}"),
        }
    }

    #[test]
    fn diagnostic_frame_never_touches_the_registry() {
        let registry = WaiterRegistry::new();
        dispatch_frame(frame("0", FrameStatus::Success, b"hello"), &registry);
        assert!(registry.is_empty());
    }

    #[test]
    fn frame_with_no_registered_waiter_is_dropped_without_panicking() {
        let registry = WaiterRegistry::new();
        dispatch_frame(frame("unknown", FrameStatus::Success, b"x"), &registry);
        assert!(registry.is_empty());
    }
}
