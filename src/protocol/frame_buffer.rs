//! Stream framer: resynchronizing frame extraction from a byte stream.
//!
//! Uses `bytes::BytesMut` for the accumulation buffer. Incoming chunks are
//! appended and every complete valid frame is extracted; on any rejection
//! (bad magic or bad checksum) exactly one leading byte is dropped and the
//! scan continues. The one-byte drop recovers from any single-byte
//! insertion, deletion, or corruption at the cost of re-scanning the same
//! region.
//!
//! After every [`push`](FrameBuffer::push) the buffer holds fewer than one
//! frame's worth of bytes, so no recognizable complete frame is ever left
//! unprocessed. Partial state persists across calls.
//!
//! # Example
//!
//! ```
//! use echolink::protocol::{Frame, FrameBuffer, FrameFormat};
//!
//! let format = FrameFormat::default();
//! let frame = Frame::encode(&format, &[1; 11]).unwrap();
//!
//! let mut buffer = FrameBuffer::new(format);
//! let payloads = buffer.push(frame.as_bytes());
//! assert_eq!(payloads.len(), 1);
//! assert_eq!(&payloads[0][..], &[1; 11]);
//! ```

use bytes::{Bytes, BytesMut};
use tracing::trace;

use super::frame::Frame;
use super::wire_format::FrameFormat;

/// Initial accumulation buffer capacity.
const INITIAL_CAPACITY: usize = 1024;

/// Buffer that turns an arbitrarily-chunked byte stream into validated
/// payloads, self-healing after corruption or alignment loss.
///
/// Owned exclusively by one receiving session; never shared across
/// execution contexts, so it needs no lock.
pub struct FrameBuffer {
    /// Accumulated bytes not yet consumed.
    buffer: BytesMut,
    /// Frame geometry.
    format: FrameFormat,
    /// Valid frames extracted so far.
    frames_decoded: u64,
    /// Bytes dropped during resynchronization.
    bytes_discarded: u64,
}

impl FrameBuffer {
    /// Create a framer for the given frame format.
    pub fn new(format: FrameFormat) -> Self {
        Self {
            buffer: BytesMut::with_capacity(INITIAL_CAPACITY),
            format,
            frames_decoded: 0,
            bytes_discarded: 0,
        }
    }

    /// Append a chunk and extract every complete valid frame's payload.
    ///
    /// Returns payloads in stream order (possibly empty). An empty chunk
    /// is a no-op; fragments shorter than the magic are retained since
    /// they may complete a frame on the next read.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Bytes> {
        self.buffer.extend_from_slice(chunk);

        let frame_len = self.format.frame_len();
        let mut payloads = Vec::new();

        while self.buffer.len() >= frame_len {
            match Frame::try_decode(&self.format, &self.buffer[..frame_len]) {
                Ok(frame) => {
                    let _ = self.buffer.split_to(frame_len);
                    self.frames_decoded += 1;
                    payloads.push(frame.payload_bytes());
                }
                Err(reason) => {
                    // Resync: drop a single leading byte and rescan.
                    let _ = self.buffer.split_to(1);
                    self.bytes_discarded += 1;
                    trace!(?reason, "dropping one byte to resynchronize");
                }
            }
        }

        payloads
    }

    /// Number of buffered bytes awaiting more data.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Valid frames extracted over the buffer's lifetime.
    pub fn frames_decoded(&self) -> u64 {
        self.frames_decoded
    }

    /// Bytes dropped during resynchronization over the buffer's lifetime.
    pub fn bytes_discarded(&self) -> u64 {
        self.bytes_discarded
    }

    /// The frame format this buffer scans for.
    pub fn format(&self) -> &FrameFormat {
        &self.format
    }

    /// Discard all buffered bytes.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}
