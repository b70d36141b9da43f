//! Wire format geometry.
//!
//! The default frame is 16 bytes:
//! ```text
//! ┌──────────┬──────────────┬───────────┐
//! │ Magic    │ Payload      │ Checksum  │
//! │ 3 bytes  │ 11 bytes     │ 2 bytes   │
//! │ "$FS"    │ one per field│ uint16 LE │
//! └──────────┴──────────────┴───────────┘
//! ```
//!
//! The checksum is CRC-16/Modbus over magic + payload, little-endian on
//! the wire. Magic and payload length are configurable via [`FrameFormat`];
//! the defaults are wire-compatible with the fixed 16-byte protocol.

use crate::error::{LinkError, Result};

/// Default magic constant: "$FS".
pub const MAGIC: [u8; 3] = [0x24, 0x46, 0x53];

/// Default payload length in bytes (one per measurement field).
pub const DEFAULT_PAYLOAD_LEN: usize = 11;

/// Checksum width in bytes (fixed, uint16 little-endian).
pub const CHECKSUM_LEN: usize = 2;

/// Default total frame length (magic + payload + checksum = 16).
pub const DEFAULT_FRAME_LEN: usize = MAGIC.len() + DEFAULT_PAYLOAD_LEN + CHECKSUM_LEN;

/// Frame geometry: magic bytes and payload length.
///
/// Every codec and framer operation takes its sizes from here rather than
/// hard-coded literals. `FrameFormat::default()` is the 16-byte format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameFormat {
    magic: Vec<u8>,
    payload_len: usize,
}

impl FrameFormat {
    /// Create a frame format with custom magic and payload length.
    ///
    /// # Errors
    ///
    /// Returns `LinkError::Config` if the magic is empty or the payload
    /// length is zero.
    pub fn new(magic: impl Into<Vec<u8>>, payload_len: usize) -> Result<Self> {
        let magic = magic.into();
        if magic.is_empty() {
            return Err(LinkError::Config("magic must not be empty".to_string()));
        }
        if payload_len == 0 {
            return Err(LinkError::Config(
                "payload length must be at least 1".to_string(),
            ));
        }
        Ok(Self { magic, payload_len })
    }

    /// The magic bytes that open every frame.
    #[inline]
    pub fn magic(&self) -> &[u8] {
        &self.magic
    }

    /// Payload length in bytes.
    #[inline]
    pub fn payload_len(&self) -> usize {
        self.payload_len
    }

    /// Total frame length: magic + payload + checksum.
    #[inline]
    pub fn frame_len(&self) -> usize {
        self.magic.len() + self.payload_len + CHECKSUM_LEN
    }

    /// Byte offset where the payload starts.
    #[inline]
    pub fn payload_start(&self) -> usize {
        self.magic.len()
    }

    /// Byte offset where the checksum starts (end of checksummed region).
    #[inline]
    pub fn checksum_start(&self) -> usize {
        self.magic.len() + self.payload_len
    }
}

impl Default for FrameFormat {
    fn default() -> Self {
        Self {
            magic: MAGIC.to_vec(),
            payload_len: DEFAULT_PAYLOAD_LEN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_format_is_16_bytes() {
        let format = FrameFormat::default();
        assert_eq!(format.magic(), b"$FS");
        assert_eq!(format.payload_len(), 11);
        assert_eq!(format.frame_len(), 16);
        assert_eq!(DEFAULT_FRAME_LEN, 16);
    }

    #[test]
    fn test_default_offsets() {
        let format = FrameFormat::default();
        assert_eq!(format.payload_start(), 3);
        assert_eq!(format.checksum_start(), 14);
    }

    #[test]
    fn test_custom_format() {
        let format = FrameFormat::new([0xAA, 0x55], 4).unwrap();
        assert_eq!(format.magic(), &[0xAA, 0x55]);
        assert_eq!(format.frame_len(), 2 + 4 + CHECKSUM_LEN);
    }

    #[test]
    fn test_empty_magic_rejected() {
        let result = FrameFormat::new(Vec::new(), 11);
        assert!(matches!(result, Err(LinkError::Config(_))));
    }

    #[test]
    fn test_zero_payload_len_rejected() {
        let result = FrameFormat::new(MAGIC, 0);
        assert!(matches!(result, Err(LinkError::Config(_))));
    }
}
