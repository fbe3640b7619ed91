//! Shared constants for the compositor wire protocol and supervisor.
//!
//! These constants are derived from the stdin/stdout contract described in the
//! supervisor's wire format: frames are prefixed by [`FRAME_MARKER`], requests are
//! newline-delimited JSON, and shutdown is signaled with the literal [`EOF_LINE`].
//!
//! # Frame Format
//!
//! ```text
//! remotion_buffer:<nonce>:<length>:<status>:<payload bytes>
//! ^^^^^^^^^^^^^^^^
//! FRAME_MARKER
//! ```

// ============================================================================
// Wire Framing
// ============================================================================

/// Marker that begins every response frame on the child's stdout.
///
/// Bytes preceding this marker in a stdout chunk are noise and are discarded.
pub const FRAME_MARKER: &[u8] = b"remotion_buffer:";

/// Field separator within a frame header (nonce, length, status).
pub const FRAME_FIELD_SEP: u8 = b':';

/// Status byte value denoting a successful response.
pub const STATUS_SUCCESS: &[u8] = b"0";

/// Status byte value denoting an error response.
pub const STATUS_ERROR: &[u8] = b"1";

/// Reserved nonce used for unsolicited diagnostic log frames.
///
/// The host never submits a request with this nonce; any frame carrying it is
/// interpreted as a UTF-8 log line rather than a response to a pending waiter.
pub const DIAGNOSTIC_NONCE: &str = "0";

/// Upper bound on the parser's internal accumulation buffer, in bytes.
///
/// Guards against unbounded memory growth if a child never completes a frame
/// (e.g. a declared length far larger than any legitimate payload).
pub const MAX_BUFFER_SIZE: usize = 64 * 1024 * 1024;

// ============================================================================
// Request Envelope
// ============================================================================

/// Literal line written to child stdin to signal orderly shutdown.
pub const EOF_LINE: &str = "EOF";

// ============================================================================
// Executable Preparation
// ============================================================================

/// Unix permission mode applied to the compositor executable before spawning,
/// unless [`READ_ONLY_FS_ENV`] is set.
pub const EXECUTABLE_MODE: u32 = 0o755;

/// Environment variable that, when present, signals that the host filesystem
/// is read-only and the executable bit must not be modified.
pub const READ_ONLY_FS_ENV: &str = "READ_ONLY_FS";

// ============================================================================
// Sizing Heuristic
// ============================================================================

/// Assumed memory footprint of a single cached compositor frame, in bytes.
///
/// # Value: 6 MiB
pub const BYTES_PER_FRAME: u64 = 6 * 1024 * 1024;

/// Minimum frame-cache capacity returned by the sizing heuristic, regardless
/// of how little free memory is available.
pub const MIN_FRAME_CACHE_CAPACITY: u32 = 500;

/// Maximum frame-cache capacity returned by the sizing heuristic, regardless
/// of how much free memory is available.
pub const MAX_FRAME_CACHE_CAPACITY: u32 = 2000;

// ============================================================================
// Bootstrap
// ============================================================================

/// Key folded into the start command's `params` object carrying the resolved
/// frame-cache capacity.
pub const START_COMMAND_CACHE_SIZE_FIELD: &str = "frameCacheSize";
