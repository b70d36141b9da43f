//! Concurrent receiver: runs the stream framer against a live transport.
//!
//! The read loop runs on a blocking task (serial reads block with a short
//! timeout) and publishes every validated payload, in arrival order, to an
//! unbounded channel so the read path never waits on a slow consumer. The
//! frame buffer is owned by the loop and never shared, so it needs no
//! lock; the only cross-context traffic is the payload channel and the
//! stop signal.
//!
//! # Architecture
//!
//! ```text
//! Transport ─► read loop ─► FrameBuffer ─► mpsc::UnboundedSender ─► session
//!                 ▲
//!             StopSignal (checked each iteration)
//! ```
//!
//! Cancellation is cooperative: once the stop signal is triggered the loop
//! exits before issuing another read, but an in-flight read is not
//! interrupted, so shutdown latency is bounded by one read timeout.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, trace};

use crate::error::{LinkError, Result};
use crate::protocol::{FrameBuffer, FrameFormat};
use crate::transport::LinkRead;

/// Default bounded read size in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 64;

/// Configuration for the receive loop.
#[derive(Debug, Clone)]
pub struct ReceiverConfig {
    /// Maximum bytes per transport read.
    pub chunk_size: usize,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Shared cooperative stop flag.
///
/// Cheaply cloneable; all clones observe the same trigger.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    /// Create an untriggered stop signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that the receive loop stop.
    pub fn trigger(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Check whether a stop has been requested.
    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Handle to a running receiver.
///
/// Consume payloads with [`recv`](ReceiverHandle::recv), stop the loop
/// with [`stop`](ReceiverHandle::stop), and collect its outcome with
/// [`join`](ReceiverHandle::join).
pub struct ReceiverHandle {
    payloads: mpsc::UnboundedReceiver<Bytes>,
    stop: StopSignal,
    task: JoinHandle<Result<()>>,
}

impl ReceiverHandle {
    /// Receive the next validated payload.
    ///
    /// Returns `None` once the receive loop has terminated and all
    /// buffered payloads have been consumed.
    pub async fn recv(&mut self) -> Option<Bytes> {
        self.payloads.recv().await
    }

    /// Request cooperative shutdown of the receive loop.
    pub fn stop(&self) {
        self.stop.trigger();
    }

    /// The loop's stop signal, for sharing with other shutdown paths.
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Wait for the receive loop to finish and return its outcome.
    ///
    /// `Ok(())` means a clean exit (stop signal or consumer gone);
    /// `Err(ReceiverStopped)` carries the transport failure that killed
    /// the loop.
    pub async fn join(self) -> Result<()> {
        match self.task.await {
            Ok(result) => result,
            Err(e) => Err(LinkError::ReceiverStopped(format!(
                "receive task panicked: {e}"
            ))),
        }
    }
}

/// Spawn the receive loop against a transport read half.
///
/// The loop runs until the stop signal is triggered, the consumer side of
/// the channel is dropped, or the transport fails.
pub fn spawn_receiver<R>(reader: R, format: FrameFormat, config: ReceiverConfig) -> ReceiverHandle
where
    R: LinkRead + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let stop = StopSignal::new();
    let stop_clone = stop.clone();

    let task = tokio::task::spawn_blocking(move || {
        receive_loop(reader, FrameBuffer::new(format), tx, stop_clone, config)
    });

    ReceiverHandle {
        payloads: rx,
        stop,
        task,
    }
}

/// The blocking read/decode loop.
fn receive_loop<R: LinkRead>(
    mut reader: R,
    mut framer: FrameBuffer,
    tx: mpsc::UnboundedSender<Bytes>,
    stop: StopSignal,
    config: ReceiverConfig,
) -> Result<()> {
    let mut buf = vec![0u8; config.chunk_size];

    while !stop.is_triggered() {
        let n = match reader.read_chunk(&mut buf) {
            Ok(0) => continue, // quiet interval, not an error
            Ok(n) => n,
            Err(e) => {
                error!(error = %e, "transport failure, terminating receive loop");
                return Err(LinkError::ReceiverStopped(e.to_string()));
            }
        };

        trace!(bytes = n, buffered = framer.len(), "read chunk");

        for payload in framer.push(&buf[..n]) {
            if tx.send(payload).is_err() {
                debug!("payload consumer dropped, terminating receive loop");
                return Ok(());
            }
        }
    }

    debug!(
        frames = framer.frames_decoded(),
        discarded = framer.bytes_discarded(),
        "stop signal observed, receive loop exiting"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Frame;
    use crate::transport::{loopback, loopback_with_timeout, LinkWrite};
    use std::time::Duration;

    const PAYLOAD: [u8; 11] = [10, 20, 30, 40, 50, 60, 70, 80, 90, 100, 110];

    #[tokio::test]
    async fn test_receives_published_payloads_in_order() {
        let format = FrameFormat::default();
        let (mut writer, reader) = loopback();
        let mut handle = spawn_receiver(reader, format.clone(), ReceiverConfig::default());

        let frame_a = Frame::encode(&format, &PAYLOAD).unwrap();
        let frame_b = Frame::encode(&format, &[1; 11]).unwrap();
        writer.write_all(frame_a.as_bytes()).unwrap();
        writer.write_all(frame_b.as_bytes()).unwrap();

        assert_eq!(&handle.recv().await.unwrap()[..], &PAYLOAD);
        assert_eq!(&handle.recv().await.unwrap()[..], &[1; 11]);

        handle.stop();
        handle.join().await.unwrap();
    }

    #[tokio::test]
    async fn test_reassembles_frame_split_across_reads() {
        let format = FrameFormat::default();
        let (mut writer, reader) = loopback();
        let mut handle = spawn_receiver(reader, format.clone(), ReceiverConfig::default());

        let frame = Frame::encode(&format, &PAYLOAD).unwrap();
        let bytes = frame.as_bytes();
        writer.write_all(&bytes[..7]).unwrap();
        writer.write_all(&bytes[7..]).unwrap();

        assert_eq!(&handle.recv().await.unwrap()[..], &PAYLOAD);

        handle.stop();
        handle.join().await.unwrap();
    }

    #[tokio::test]
    async fn test_stop_signal_terminates_cleanly() {
        let format = FrameFormat::default();
        let (_writer, reader) = loopback_with_timeout(Duration::from_millis(5));
        let handle = spawn_receiver(reader, format, ReceiverConfig::default());

        handle.stop();
        handle.join().await.unwrap();
    }

    #[tokio::test]
    async fn test_transport_failure_surfaces_via_join() {
        let format = FrameFormat::default();
        let (writer, reader) = loopback_with_timeout(Duration::from_millis(5));
        let mut handle = spawn_receiver(reader, format, ReceiverConfig::default());

        // Dropping the writer makes the next read fail hard.
        drop(writer);

        assert!(handle.recv().await.is_none());
        let result = handle.join().await;
        assert!(matches!(result, Err(LinkError::ReceiverStopped(_))));
    }

    #[tokio::test]
    async fn test_corrupted_frames_never_surface() {
        let format = FrameFormat::default();
        let (mut writer, reader) = loopback();
        let mut handle = spawn_receiver(reader, format.clone(), ReceiverConfig::default());

        let frame = Frame::encode(&format, &PAYLOAD).unwrap();
        let mut corrupted = frame.as_bytes().to_vec();
        corrupted[9] ^= 0x40;

        writer.write_all(&corrupted).unwrap();
        writer.write_all(frame.as_bytes()).unwrap();

        // Only the clean frame comes through; corruption is silent.
        assert_eq!(&handle.recv().await.unwrap()[..], &PAYLOAD);

        handle.stop();
        handle.join().await.unwrap();
    }
}
