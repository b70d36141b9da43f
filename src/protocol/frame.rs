//! Frame construction and validation.
//!
//! A [`Frame`] is an immutable, checksum-valid wire unit. It can only be
//! obtained through [`Frame::encode`] (which computes the checksum) or
//! [`Frame::try_decode`] (which verifies it), so a mismatched checksum is
//! unrepresentable.
//!
//! # Example
//!
//! ```
//! use echolink::protocol::{Frame, FrameFormat};
//!
//! let format = FrameFormat::default();
//! let frame = Frame::encode(&format, &[10, 20, 30, 40, 50, 60, 70, 80, 90, 100, 110]).unwrap();
//! assert_eq!(frame.as_bytes().len(), 16);
//!
//! let decoded = Frame::try_decode(&format, frame.as_bytes()).unwrap();
//! assert_eq!(decoded.payload(), frame.payload());
//! ```

use bytes::{Bytes, BytesMut};

use super::checksum::crc16;
use super::wire_format::{FrameFormat, CHECKSUM_LEN};
use crate::error::{LinkError, Result};

/// Why a candidate byte window is not a valid frame.
///
/// Rejection is an expected outcome of scanning a noisy stream, not an
/// error: the framer answers it by resynchronizing, never by failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The leading bytes do not match the magic constant.
    BadMagic,
    /// The trailing checksum does not match the computed CRC-16.
    BadChecksum,
}

/// A complete, validated wire frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Full wire bytes: magic + payload + checksum.
    bytes: Bytes,
    /// Payload view into `bytes` (cheap slice clone).
    payload: Bytes,
}

impl Frame {
    /// Encode a payload into a frame.
    ///
    /// Builds magic + payload, computes the CRC-16 over those bytes and
    /// appends it little-endian.
    ///
    /// # Errors
    ///
    /// Returns `LinkError::InvalidPayloadLength` unless the payload is
    /// exactly `format.payload_len()` bytes.
    pub fn encode(format: &FrameFormat, payload: &[u8]) -> Result<Self> {
        if payload.len() != format.payload_len() {
            return Err(LinkError::InvalidPayloadLength {
                expected: format.payload_len(),
                actual: payload.len(),
            });
        }

        let mut buf = BytesMut::with_capacity(format.frame_len());
        buf.extend_from_slice(format.magic());
        buf.extend_from_slice(payload);
        let checksum = crc16(&buf);
        buf.extend_from_slice(&checksum.to_le_bytes());

        let bytes = buf.freeze();
        let payload = bytes.slice(format.payload_start()..format.checksum_start());
        Ok(Self { bytes, payload })
    }

    /// Validate a candidate window and construct a frame from it.
    ///
    /// The candidate must be exactly `format.frame_len()` bytes. Rejects
    /// (does not error) on bad magic or bad checksum. Performs no
    /// resynchronization; that is the stream framer's job.
    pub fn try_decode(
        format: &FrameFormat,
        candidate: &[u8],
    ) -> std::result::Result<Self, RejectReason> {
        debug_assert_eq!(candidate.len(), format.frame_len());

        if &candidate[..format.magic().len()] != format.magic() {
            return Err(RejectReason::BadMagic);
        }

        let checksum_start = format.checksum_start();
        let stored = u16::from_le_bytes([candidate[checksum_start], candidate[checksum_start + 1]]);
        if crc16(&candidate[..checksum_start]) != stored {
            return Err(RejectReason::BadChecksum);
        }

        let bytes = Bytes::copy_from_slice(candidate);
        let payload = bytes.slice(format.payload_start()..checksum_start);
        Ok(Self { bytes, payload })
    }

    /// Full wire bytes of this frame.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Payload bytes carried by this frame.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Payload as `Bytes` (cheap, zero-copy clone).
    #[inline]
    pub fn payload_bytes(&self) -> Bytes {
        self.payload.clone()
    }

    /// The frame's checksum as carried on the wire.
    #[inline]
    pub fn checksum(&self) -> u16 {
        let tail = &self.bytes[self.bytes.len() - CHECKSUM_LEN..];
        u16::from_le_bytes([tail[0], tail[1]])
    }

    /// Total frame length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Frames are never empty; provided for slice-like symmetry.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::wire_format::MAGIC;

    const PAYLOAD: [u8; 11] = [10, 20, 30, 40, 50, 60, 70, 80, 90, 100, 110];

    #[test]
    fn test_encode_layout() {
        let format = FrameFormat::default();
        let frame = Frame::encode(&format, &PAYLOAD).unwrap();
        let bytes = frame.as_bytes();

        assert_eq!(bytes.len(), 16);
        assert_eq!(&bytes[..3], &MAGIC);
        assert_eq!(&bytes[3..14], &PAYLOAD);

        // Checksum covers magic + payload and is little-endian.
        let expected = crc16(&bytes[..14]);
        assert_eq!(bytes[14], (expected & 0xFF) as u8);
        assert_eq!(bytes[15], (expected >> 8) as u8);
        assert_eq!(frame.checksum(), expected);
    }

    #[test]
    fn test_encode_wrong_length_fails() {
        let format = FrameFormat::default();

        let short = Frame::encode(&format, &[1, 2, 3]);
        assert!(matches!(
            short,
            Err(LinkError::InvalidPayloadLength {
                expected: 11,
                actual: 3
            })
        ));

        let long = Frame::encode(&format, &[0u8; 12]);
        assert!(matches!(long, Err(LinkError::InvalidPayloadLength { .. })));
    }

    #[test]
    fn test_roundtrip() {
        let format = FrameFormat::default();
        let frame = Frame::encode(&format, &PAYLOAD).unwrap();
        let decoded = Frame::try_decode(&format, frame.as_bytes()).unwrap();
        assert_eq!(decoded.payload(), &PAYLOAD);
        assert_eq!(decoded, frame);
    }

    #[test]
    fn test_reject_bad_magic() {
        let format = FrameFormat::default();
        let mut bytes = Frame::encode(&format, &PAYLOAD).unwrap().as_bytes().to_vec();
        bytes[0] = 0x25;
        assert_eq!(
            Frame::try_decode(&format, &bytes),
            Err(RejectReason::BadMagic)
        );
    }

    #[test]
    fn test_reject_bad_checksum() {
        let format = FrameFormat::default();
        let mut bytes = Frame::encode(&format, &PAYLOAD).unwrap().as_bytes().to_vec();
        bytes[5] ^= 0x01; // corrupt one payload byte
        assert_eq!(
            Frame::try_decode(&format, &bytes),
            Err(RejectReason::BadChecksum)
        );
    }

    #[test]
    fn test_every_single_bit_flip_rejected() {
        // CRC-16 detects all single-bit errors, and magic corruption is
        // caught before the checksum, so every flip must reject.
        let format = FrameFormat::default();
        let clean = Frame::encode(&format, &PAYLOAD).unwrap().as_bytes().to_vec();

        for byte_idx in 0..clean.len() {
            for bit in 0..8 {
                let mut corrupted = clean.clone();
                corrupted[byte_idx] ^= 1 << bit;
                assert!(
                    Frame::try_decode(&format, &corrupted).is_err(),
                    "flip at byte {byte_idx} bit {bit} was not rejected"
                );
            }
        }
    }

    #[test]
    fn test_custom_format_roundtrip() {
        let format = FrameFormat::new([0xAA, 0x55], 4).unwrap();
        let frame = Frame::encode(&format, &[1, 2, 3, 4]).unwrap();
        assert_eq!(frame.len(), 8);
        let decoded = Frame::try_decode(&format, frame.as_bytes()).unwrap();
        assert_eq!(decoded.payload(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_payload_bytes_zero_copy() {
        let format = FrameFormat::default();
        let frame = Frame::encode(&format, &PAYLOAD).unwrap();
        let a = frame.payload_bytes();
        let b = frame.payload_bytes();
        assert_eq!(a.as_ptr(), b.as_ptr());
    }
}
