//! Run a verification session against a real serial device.
//!
//! The device on the other end is expected to echo (or process and
//! return) every 16-byte frame it receives.
//!
//! ```sh
//! cargo run --example serial -- /dev/ttyUSB0 [baud]
//! ```
//!
//! With no arguments, lists the serial ports available on this system.

use echolink::protocol::FrameFormat;
use echolink::receiver::{spawn_receiver, ReceiverConfig};
use echolink::report::write_text_report;
use echolink::session::{SessionConfig, VerificationSession};
use echolink::transport::{available_ports, SerialLink, DEFAULT_BAUD_RATE};

#[tokio::main]
async fn main() -> echolink::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "echolink=info".into()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        eprintln!("usage: serial <port> [baud]");
        eprintln!("available ports:");
        for port in available_ports()? {
            eprintln!("  {port}");
        }
        return Ok(());
    };
    let baud = args
        .next()
        .map(|s| s.parse().expect("baud must be a number"))
        .unwrap_or(DEFAULT_BAUD_RATE);

    let link = SerialLink::open(&path, baud)?;
    let (reader, writer) = link.into_split()?;

    let format = FrameFormat::default();
    let mut receiver = spawn_receiver(reader, format.clone(), ReceiverConfig::default());

    let session = VerificationSession::new(format, SessionConfig::default())?;
    let report = session.run(writer, &mut receiver).await?;
    receiver.join().await?;

    let mut stdout = std::io::stdout();
    write_text_report(&mut stdout, &report)?;
    Ok(())
}
