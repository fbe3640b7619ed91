//! Correlation nonce generation.
//!
//! Nonce generation is treated as an opaque, swappable unique-string source:
//! this module only fixes the trait boundary so the rest of the crate never
//! has to care how a nonce is produced, while still shipping a usable
//! default.

use uuid::Uuid;

/// Produces fresh correlation nonces for outgoing requests.
///
/// Implementations must never produce the reserved diagnostic nonce `"0"`
/// (see [`compositor_core::constants::DIAGNOSTIC_NONCE`]) and must never
/// repeat a value that may still be in flight.
pub trait NonceSource: Send {
    /// Returns a fresh, previously-unused nonce.
    fn next_nonce(&mut self) -> String;
}

/// Default [`NonceSource`] backed by random UUIDs.
#[derive(Debug, Default)]
pub struct UuidNonceSource;

impl NonceSource for UuidNonceSource {
    fn next_nonce(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}
