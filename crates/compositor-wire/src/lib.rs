//! Wire format for talking to the compositor over stdin/stdout.
//!
//! [`parser::FrameParser`] is the core of this crate: an incremental state
//! machine that reassembles [`frame::Frame`]s from arbitrarily-chunked stdout
//! reads. [`request`] and [`response`] cover the stdin request envelope and
//! the JSON error-payload shape respectively.

pub mod frame;
pub mod parser;
pub mod request;
pub mod response;

pub use frame::{Frame, FrameStatus};
pub use parser::FrameParser;
pub use request::{Command, SerializedRequest};
