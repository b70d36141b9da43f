//! Protocol module - checksum, wire format, frame codec, and stream framing.
//!
//! This module implements the fixed-size binary frame protocol:
//! - CRC-16/Modbus integrity code
//! - Frame geometry as configuration (`FrameFormat`)
//! - Frame encode/validate (`Frame`)
//! - Resynchronizing stream framer (`FrameBuffer`)

mod checksum;
mod frame;
mod frame_buffer;
mod wire_format;

pub use checksum::crc16;
pub use frame::{Frame, RejectReason};
pub use frame_buffer::FrameBuffer;
pub use wire_format::{FrameFormat, CHECKSUM_LEN, DEFAULT_FRAME_LEN, DEFAULT_PAYLOAD_LEN, MAGIC};
