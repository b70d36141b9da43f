//! In-memory loopback transport.
//!
//! Everything written to the [`LoopbackWriter`] becomes readable from the
//! paired [`LoopbackReader`], modeling a device that echoes frames back
//! verbatim. The reader honors the same bounded-read-with-timeout contract
//! as a real serial port, so the full engine can run against it in demos
//! and tests without hardware.
//!
//! # Example
//!
//! ```
//! use echolink::transport::{loopback, LinkRead, LinkWrite};
//!
//! let (mut writer, mut reader) = loopback();
//! writer.write_all(b"ping").unwrap();
//!
//! let mut buf = [0u8; 16];
//! let n = reader.read_chunk(&mut buf).unwrap();
//! assert_eq!(&buf[..n], b"ping");
//! ```

use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use super::serial::DEFAULT_READ_TIMEOUT;
use super::{LinkRead, LinkWrite};
use crate::error::{LinkError, Result};

/// Write half of an in-memory link.
pub struct LoopbackWriter {
    tx: Sender<Vec<u8>>,
}

/// Read half of an in-memory link.
pub struct LoopbackReader {
    rx: Receiver<Vec<u8>>,
    /// Bytes received but not yet handed out by `read_chunk`.
    pending: VecDeque<u8>,
    read_timeout: Duration,
}

/// Create a connected writer/reader pair with the default read timeout.
pub fn loopback() -> (LoopbackWriter, LoopbackReader) {
    loopback_with_timeout(DEFAULT_READ_TIMEOUT)
}

/// Create a connected writer/reader pair with a custom read timeout.
pub fn loopback_with_timeout(read_timeout: Duration) -> (LoopbackWriter, LoopbackReader) {
    let (tx, rx) = mpsc::channel();
    (
        LoopbackWriter { tx },
        LoopbackReader {
            rx,
            pending: VecDeque::new(),
            read_timeout,
        },
    )
}

impl LinkWrite for LoopbackWriter {
    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.tx.send(bytes.to_vec()).map_err(|_| {
            LinkError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "loopback reader closed",
            ))
        })
    }
}

impl LinkRead for LoopbackReader {
    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize> {
        if self.pending.is_empty() {
            match self.rx.recv_timeout(self.read_timeout) {
                Ok(chunk) => self.pending.extend(chunk),
                Err(RecvTimeoutError::Timeout) => return Ok(0),
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(LinkError::Io(std::io::Error::new(
                        std::io::ErrorKind::BrokenPipe,
                        "loopback writer closed",
                    )))
                }
            }
        }

        let n = buf.len().min(self.pending.len());
        for (slot, byte) in buf.iter_mut().zip(self.pending.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}
