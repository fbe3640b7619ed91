//! Incremental parser for the compositor's length-prefixed stdout framing.
//!
//! This module implements the wire format described on [`Frame`]: a marker
//! byte string, three colon-terminated ASCII header fields (nonce, length,
//! status), and a binary-safe payload of exactly `length` bytes. Frames may be
//! preceded or interleaved with arbitrary noise bytes that do not contain the
//! marker.
//!
//! # Design
//!
//! The parser is a pure state machine: `feed(chunk)` mutates internal state
//! and queues any complete frames produced; `next_frame()`/`drain_frames()`
//! pull them back out. This keeps the parser runtime-agnostic and trivially
//! unit-testable — it never touches an actual child process or socket.
//!
//! # Fast Path
//!
//! Once a frame's header has been parsed but its payload has not fully
//! arrived, the parser knows exactly how many more bytes it needs. Chunks
//! that do not contain the marker are appended to a side buffer and counted
//! off against that requirement without re-scanning the (potentially large)
//! accumulation buffer for the marker on every call. Only once enough bytes
//! have arrived — or a chunk does contain the marker, which can only mean the
//! current frame's payload just completed and a new one may follow in the
//! same chunk — does the parser fold the side buffer in and re-run the
//! marker search. Without this, a multi-megabyte payload delivered in many
//! small reads would cost time quadratic in the payload size, since a naive
//! implementation rescans the whole buffer for the marker on every chunk.

use crate::frame::{Frame, FrameStatus};
use bytes::{Buf, BytesMut};
use compositor_core::constants::{FRAME_FIELD_SEP, FRAME_MARKER, MAX_BUFFER_SIZE};
use compositor_core::error::{Error, Result};
use std::collections::VecDeque;

/// Incremental, runtime-agnostic parser for the compositor response stream.
#[derive(Debug, Default)]
pub struct FrameParser {
    /// Bytes that are ready to be (re-)scanned for a marker and header.
    buffer: BytesMut,
    /// Bytes accumulated while a frame's payload is known to be incomplete,
    /// not yet folded into `buffer`.
    pending: BytesMut,
    /// Bytes still needed before `pending` should be folded into `buffer`
    /// and parsing resumed. `None` means there is no known shortfall.
    missing: Option<usize>,
    /// Frames decoded so far, awaiting pickup via `next_frame`/`drain_frames`.
    frames: VecDeque<Frame>,
}

impl FrameParser {
    /// Creates an empty parser.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a chunk of bytes read from the child's stdout.
    ///
    /// Any complete frames produced are queued internally; pull them with
    /// [`FrameParser::next_frame`] or [`FrameParser::drain_frames`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProtocolViolation`] if a frame header is malformed
    /// (non-numeric length, unrecognized status byte, non-UTF-8 nonce) or if
    /// a declared frame length would grow the buffer past
    /// [`MAX_BUFFER_SIZE`].
    pub fn feed(&mut self, chunk: &[u8]) -> Result<()> {
        if chunk.is_empty() {
            return Ok(());
        }

        match self.missing {
            Some(need) if find_subslice(chunk, FRAME_MARKER).is_none() => {
                self.pending.extend_from_slice(chunk);
                if chunk.len() >= need {
                    self.missing = None;
                    let pending = std::mem::take(&mut self.pending);
                    self.buffer.unsplit(pending);
                    self.drain_into_queue()?;
                } else {
                    self.missing = Some(need - chunk.len());
                }
            }
            _ => {
                if !self.pending.is_empty() {
                    let pending = std::mem::take(&mut self.pending);
                    self.buffer.unsplit(pending);
                }
                self.buffer.extend_from_slice(chunk);
                self.drain_into_queue()?;
            }
        }

        Ok(())
    }

    /// Removes and returns the next complete frame, if any are queued.
    pub fn next_frame(&mut self) -> Option<Frame> {
        self.frames.pop_front()
    }

    /// Drains every currently queued complete frame, in arrival order.
    pub fn drain_frames(&mut self) -> std::collections::vec_deque::Drain<'_, Frame> {
        self.frames.drain(..)
    }

    /// Repeatedly scans `self.buffer` for complete frames, pushing each one
    /// onto the internal queue, until no more can be extracted.
    fn drain_into_queue(&mut self) -> Result<()> {
        loop {
            let Some(marker_pos) = find_subslice(&self.buffer, FRAME_MARKER) else {
                // No marker anywhere in the buffer: everything but a
                // marker-length-minus-one tail is noise and can be dropped,
                // in case the marker itself straddles the next chunk.
                let keep = FRAME_MARKER.len().saturating_sub(1);
                if self.buffer.len() > keep {
                    let drop_len = self.buffer.len() - keep;
                    self.buffer.advance(drop_len);
                }
                self.missing = None;
                return Ok(());
            };

            if marker_pos > 0 {
                self.buffer.advance(marker_pos);
            }

            match self.try_extract_one_frame()? {
                Some(frame) => self.frames.push_back(frame),
                None => return Ok(()),
            }
        }
    }

    /// Attempts to parse and extract exactly one frame starting at the
    /// beginning of `self.buffer` (which is known to start with the marker).
    ///
    /// Returns `Ok(None)` and records the shortfall in `self.missing` if the
    /// header or payload is not fully present yet.
    fn try_extract_one_frame(&mut self) -> Result<Option<Frame>> {
        let header_start = FRAME_MARKER.len();
        let Some(rest) = self.buffer.get(header_start..) else {
            self.missing = None;
            return Ok(None);
        };

        let Some(nonce_end) = find_byte(rest, FRAME_FIELD_SEP) else {
            self.missing = None;
            return Ok(None);
        };
        let nonce_bytes = &rest[..nonce_end];

        let after_nonce = &rest[nonce_end + 1..];
        let Some(length_end) = find_byte(after_nonce, FRAME_FIELD_SEP) else {
            self.missing = None;
            return Ok(None);
        };
        let length_bytes = &after_nonce[..length_end];

        let after_length = &after_nonce[length_end + 1..];
        let Some(status_end) = find_byte(after_length, FRAME_FIELD_SEP) else {
            self.missing = None;
            return Ok(None);
        };
        let status_bytes = &after_length[..status_end];

        let nonce = std::str::from_utf8(nonce_bytes)
            .map_err(|_| Error::ProtocolViolation("nonce field is not valid utf-8".into()))?
            .to_string();

        let length_str = std::str::from_utf8(length_bytes)
            .map_err(|_| Error::ProtocolViolation("length field is not valid utf-8".into()))?;
        let length: usize = length_str
            .parse()
            .map_err(|_| Error::ProtocolViolation(format!("invalid length field: {length_str:?}")))?;

        let status = FrameStatus::from_wire_bytes(status_bytes).ok_or_else(|| {
            Error::ProtocolViolation(format!("invalid status field: {status_bytes:?}"))
        })?;

        let header_len = header_start + nonce_end + 1 + length_end + 1 + status_end + 1;
        let total_len = header_len + length;

        if total_len > MAX_BUFFER_SIZE {
            return Err(Error::ProtocolViolation(format!(
                "declared frame length {length} exceeds maximum buffer size {MAX_BUFFER_SIZE}"
            )));
        }

        if self.buffer.len() < total_len {
            self.missing = Some(total_len - self.buffer.len());
            return Ok(None);
        }

        let mut frame_bytes = self.buffer.split_to(total_len);
        let payload = frame_bytes.split_off(header_len).freeze();
        self.missing = None;

        Ok(Some(Frame {
            nonce,
            status,
            payload,
        }))
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn find_byte(haystack: &[u8], byte: u8) -> Option<usize> {
    haystack.iter().position(|&b| b == byte)
}
