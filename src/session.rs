//! Verification session: send expected frames, compare what comes back.
//!
//! A session transmits one fixed expected payload `packets_to_send` times,
//! then consumes that many validated payloads from the receiver. There is
//! no in-band correlation id: the Kth payload received is taken to answer
//! the Kth frame sent. Each payload is compared field by field against the
//! expected values, producing one [`ComparisonRecord`] per field with a
//! signed percent error and a pass/fail verdict.
//!
//! Receive timeouts are liveness events, not failures: the session logs
//! them, counts them, and keeps waiting. A permanently stalled link will
//! wait forever; callers needing a hard deadline wrap
//! [`run`](VerificationSession::run) in `tokio::time::timeout`. The
//! session only halts early when the receiver itself stops (transport
//! failure or external cancellation), in which case the records gathered
//! so far are still returned.

use std::time::Duration;

use serde::Serialize;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::error::{LinkError, Result};
use crate::protocol::{Frame, FrameFormat};
use crate::receiver::ReceiverHandle;
use crate::transport::LinkWrite;

/// Default expected field values, one per measurement channel.
pub const DEFAULT_EXPECTED: [u8; 11] = [10, 20, 30, 40, 50, 60, 70, 80, 90, 100, 110];

/// Default number of frames to send per session.
pub const DEFAULT_PACKETS_TO_SEND: usize = 5;

/// Default bounded wait for each payload.
pub const DEFAULT_RECV_TIMEOUT: Duration = Duration::from_secs(1);

/// Default pacing gap between transmissions.
pub const DEFAULT_SEND_GAP: Duration = Duration::from_millis(5);

/// Default pass tolerance on the absolute percent error.
pub const DEFAULT_TOLERANCE_PCT: f64 = 1.0;

/// Session configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Expected value per payload field. Must match the frame format's
    /// payload length and contain no zeros.
    pub expected: Vec<u8>,
    /// Number of frames to transmit (and payloads to await).
    pub packets_to_send: usize,
    /// Bounded wait per payload before logging a timeout and retrying.
    pub recv_timeout: Duration,
    /// Pacing gap between transmissions.
    pub send_gap: Duration,
    /// Maximum absolute percent error that still passes.
    pub tolerance_pct: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            expected: DEFAULT_EXPECTED.to_vec(),
            packets_to_send: DEFAULT_PACKETS_TO_SEND,
            recv_timeout: DEFAULT_RECV_TIMEOUT,
            send_gap: DEFAULT_SEND_GAP,
            tolerance_pct: DEFAULT_TOLERANCE_PCT,
        }
    }
}

/// Pass/fail classification of one field comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Pass,
    Fail,
}

/// One field-level expected-vs-received outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRecord {
    /// 1-based field index.
    pub field: usize,
    /// Expected value for this field.
    pub expected: u8,
    /// Value actually received.
    pub received: u8,
    /// Signed percent error: (received - expected) / expected * 100.
    pub percent_error: f64,
    /// Pass iff |percent_error| is within tolerance.
    pub verdict: Verdict,
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionOutcome {
    /// All expected payloads were received and compared.
    Completed,
    /// The receiver stopped (transport failure or cancellation) before
    /// the expected payload count was reached.
    ReceiverStopped,
}

/// Result of a verification session, handed to the report boundary.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    /// Comparison records in generation order: field order within each
    /// payload, payloads in arrival order.
    pub records: Vec<ComparisonRecord>,
    /// Frames transmitted.
    pub frames_sent: usize,
    /// Validated payloads received and compared.
    pub payloads_received: usize,
    /// Receive waits that timed out before a payload arrived.
    pub wait_timeouts: usize,
    /// How the session ended.
    pub outcome: SessionOutcome,
}

/// Compare a received payload field-by-field against expected values.
///
/// Both slices must be the same length and `expected` must contain no
/// zeros; [`VerificationSession::new`] enforces this before any payload
/// can reach here.
pub fn compare_fields(expected: &[u8], received: &[u8], tolerance_pct: f64) -> Vec<ComparisonRecord> {
    debug_assert_eq!(expected.len(), received.len());

    expected
        .iter()
        .zip(received.iter())
        .enumerate()
        .map(|(idx, (&exp, &rec))| {
            let percent_error = (f64::from(rec) - f64::from(exp)) / f64::from(exp) * 100.0;
            let verdict = if percent_error.abs() <= tolerance_pct {
                Verdict::Pass
            } else {
                Verdict::Fail
            };
            ComparisonRecord {
                field: idx + 1,
                expected: exp,
                received: rec,
                percent_error,
                verdict,
            }
        })
        .collect()
}

/// Orchestrates one send-then-compare round trip.
pub struct VerificationSession {
    format: FrameFormat,
    config: SessionConfig,
}

impl VerificationSession {
    /// Create a session, validating the configuration up front.
    ///
    /// # Errors
    ///
    /// - `InvalidPayloadLength` if the expected set does not match the
    ///   frame format's payload length.
    /// - `Config` if any expected value is zero (the percent-error
    ///   division requires non-zero expected values) or if
    ///   `packets_to_send` is zero.
    pub fn new(format: FrameFormat, config: SessionConfig) -> Result<Self> {
        if config.expected.len() != format.payload_len() {
            return Err(LinkError::InvalidPayloadLength {
                expected: format.payload_len(),
                actual: config.expected.len(),
            });
        }
        if let Some(idx) = config.expected.iter().position(|&v| v == 0) {
            return Err(LinkError::Config(format!(
                "expected value for field {} is zero; percent error would divide by zero",
                idx + 1
            )));
        }
        if config.packets_to_send == 0 {
            return Err(LinkError::Config(
                "packets_to_send must be at least 1".to_string(),
            ));
        }
        Ok(Self { format, config })
    }

    /// The session's configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Run the session: transmit, then consume and compare.
    ///
    /// Sends are fire-and-forget per packet (no transmit retries; all
    /// resilience lives in the framer's resync and the receive-timeout
    /// retry). The writer is taken by value because the send phase runs
    /// on a blocking task; it is not returned.
    ///
    /// On completion the receiver's stop signal is triggered, so the
    /// caller can `join()` the receiver afterwards.
    pub async fn run<W>(&self, writer: W, receiver: &mut ReceiverHandle) -> Result<SessionReport>
    where
        W: LinkWrite + 'static,
    {
        let frame = Frame::encode(&self.format, &self.config.expected)?;

        let frames_sent = self.send_all(writer, frame).await?;
        let mut report = SessionReport {
            records: Vec::with_capacity(frames_sent * self.format.payload_len()),
            frames_sent,
            payloads_received: 0,
            wait_timeouts: 0,
            outcome: SessionOutcome::Completed,
        };

        while report.payloads_received < self.config.packets_to_send {
            match timeout(self.config.recv_timeout, receiver.recv()).await {
                Err(_elapsed) => {
                    // Liveness report only; keep waiting.
                    report.wait_timeouts += 1;
                    warn!(
                        received = report.payloads_received,
                        pending = self.config.packets_to_send - report.payloads_received,
                        "timeout waiting for payload"
                    );
                }
                Ok(None) => {
                    warn!("receiver stopped before all payloads arrived");
                    report.outcome = SessionOutcome::ReceiverStopped;
                    break;
                }
                Ok(Some(payload)) => {
                    report.payloads_received += 1;
                    debug!(
                        received = report.payloads_received,
                        expected = self.config.packets_to_send,
                        "payload received"
                    );
                    report.records.extend(compare_fields(
                        &self.config.expected,
                        &payload,
                        self.config.tolerance_pct,
                    ));
                }
            }
        }

        receiver.stop();
        info!(
            frames_sent = report.frames_sent,
            payloads_received = report.payloads_received,
            records = report.records.len(),
            outcome = ?report.outcome,
            "session finished"
        );
        Ok(report)
    }

    /// Transmit the encoded frame `packets_to_send` times with pacing.
    async fn send_all<W>(&self, mut writer: W, frame: Frame) -> Result<usize>
    where
        W: LinkWrite + 'static,
    {
        let count = self.config.packets_to_send;
        let gap = self.config.send_gap;

        // Writes block (serial), so the whole send phase runs off the
        // async executor.
        tokio::task::spawn_blocking(move || -> Result<usize> {
            for sent in 0..count {
                writer.write_all(frame.as_bytes())?;
                if sent + 1 < count && !gap.is_zero() {
                    std::thread::sleep(gap);
                }
            }
            Ok(count)
        })
        .await
        .map_err(|e| LinkError::Io(std::io::Error::other(format!("send task panicked: {e}"))))?
    }
}
