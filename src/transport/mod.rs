//! Transport module - the byte-stream boundary of the protocol engine.
//!
//! The core assumes only bounded-size partial reads with a short timeout
//! and fire-and-forget writes; it requires no framing from the transport
//! itself. Two implementations are provided:
//! - [`SerialLink`] over a real serial port
//! - [`loopback`] in-memory pair for demos and tests

mod loopback;
mod serial;

pub use loopback::{loopback, loopback_with_timeout, LoopbackReader, LoopbackWriter};
pub use serial::{
    available_ports, SerialLink, SerialReader, SerialWriter, DEFAULT_BAUD_RATE,
    DEFAULT_READ_TIMEOUT,
};

use crate::error::Result;

/// Write half of a link.
pub trait LinkWrite: Send {
    /// Write all bytes to the link.
    fn write_all(&mut self, bytes: &[u8]) -> Result<()>;
}

/// Read half of a link.
pub trait LinkRead: Send {
    /// Perform one bounded read into `buf`.
    ///
    /// Returns the number of bytes read. `Ok(0)` means the read timed out
    /// with no data available, which is not an error; a hard transport
    /// failure returns `Err`.
    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize>;
}
