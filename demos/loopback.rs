//! Run a full verification session against an in-memory echo device.
//!
//! ```sh
//! cargo run --example loopback
//! ```

use echolink::protocol::FrameFormat;
use echolink::receiver::{spawn_receiver, ReceiverConfig};
use echolink::report::write_text_report;
use echolink::session::{SessionConfig, VerificationSession};
use echolink::transport::loopback;

#[tokio::main]
async fn main() -> echolink::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "echolink=debug".into()),
        )
        .init();

    // The loopback pair echoes every written frame straight back, acting
    // as an ideal remote device.
    let (writer, reader) = loopback();

    let format = FrameFormat::default();
    let mut receiver = spawn_receiver(reader, format.clone(), ReceiverConfig::default());

    let session = VerificationSession::new(format, SessionConfig::default())?;
    let report = session.run(writer, &mut receiver).await?;
    receiver.join().await?;

    let mut stdout = std::io::stdout();
    write_text_report(&mut stdout, &report)?;
    Ok(())
}
