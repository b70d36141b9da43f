//! # echolink
//!
//! Serial link verification engine. Sends fixed-format CRC-16 framed
//! packets to a remote device and verifies that echoed/processed frames
//! match expected values within tolerance.
//!
//! ## Architecture
//!
//! - **Protocol**: 16-byte frames (`$FS` magic + 11 payload bytes +
//!   CRC-16/Modbus, little-endian), with a resynchronizing stream parser
//!   that recovers from corruption by dropping one byte at a time.
//! - **Receiver**: reads the transport on a blocking task and publishes
//!   validated payloads over a channel; cooperatively stoppable.
//! - **Session**: transmits N frames, consumes N payloads with bounded
//!   waits, and classifies every field as pass/fail by percent error.
//!
//! The link is assumed best-effort with independent byte corruption and
//! loss; all robustness comes from resynchronization and checksum
//! rejection. There is no handshake, flow control, or retransmission.
//!
//! ## Example
//!
//! ```
//! use echolink::protocol::FrameFormat;
//! use echolink::receiver::{spawn_receiver, ReceiverConfig};
//! use echolink::session::{SessionConfig, SessionOutcome, VerificationSession};
//! use echolink::transport::loopback;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> echolink::Result<()> {
//!     // The loopback pair echoes every written frame straight back.
//!     let (writer, reader) = loopback();
//!
//!     let format = FrameFormat::default();
//!     let mut receiver = spawn_receiver(reader, format.clone(), ReceiverConfig::default());
//!
//!     let session = VerificationSession::new(format, SessionConfig::default())?;
//!     let report = session.run(writer, &mut receiver).await?;
//!
//!     assert_eq!(report.outcome, SessionOutcome::Completed);
//!     assert_eq!(report.records.len(), 55); // 11 fields x 5 payloads
//!     receiver.join().await
//! }
//! ```

pub mod error;
pub mod protocol;
pub mod receiver;
pub mod report;
pub mod session;
pub mod transport;

pub use error::{LinkError, Result};
pub use protocol::{Frame, FrameBuffer, FrameFormat};
pub use receiver::{spawn_receiver, ReceiverHandle, StopSignal};
pub use session::{SessionConfig, SessionReport, VerificationSession};
