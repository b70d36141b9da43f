//! Serial port transport.
//!
//! Wraps the `serialport` crate: opens and configures a port, then splits
//! it into independent read/write halves so the receiver can own the read
//! side while the session writes.
//!
//! # Example
//!
//! ```no_run
//! use echolink::transport::SerialLink;
//!
//! let link = SerialLink::open("/dev/ttyUSB0", 115_200).unwrap();
//! let (reader, writer) = link.into_split().unwrap();
//! ```

use std::io::{Read, Write};
use std::time::Duration;

use serialport::SerialPort;

use super::{LinkRead, LinkWrite};
use crate::error::Result;

/// Default baud rate.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Default per-read timeout.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// An open serial port, not yet split into halves.
pub struct SerialLink {
    port: Box<dyn SerialPort>,
}

/// Read half of a serial link.
pub struct SerialReader {
    port: Box<dyn SerialPort>,
}

/// Write half of a serial link.
pub struct SerialWriter {
    port: Box<dyn SerialPort>,
}

impl SerialLink {
    /// Open a serial port at the given baud rate with the default read
    /// timeout (8 data bits, no parity, one stop bit).
    pub fn open(path: &str, baud_rate: u32) -> Result<Self> {
        Self::open_with_timeout(path, baud_rate, DEFAULT_READ_TIMEOUT)
    }

    /// Open a serial port with a custom per-read timeout.
    ///
    /// The timeout bounds each [`LinkRead::read_chunk`] call and therefore
    /// also bounds receiver shutdown latency.
    pub fn open_with_timeout(path: &str, baud_rate: u32, read_timeout: Duration) -> Result<Self> {
        let port = serialport::new(path, baud_rate)
            .timeout(read_timeout)
            .open()?;
        Ok(Self { port })
    }

    /// Split into independent read and write halves.
    ///
    /// Both halves refer to the same underlying device; closing happens
    /// when the last half is dropped.
    pub fn into_split(self) -> Result<(SerialReader, SerialWriter)> {
        let write_half = self.port.try_clone()?;
        Ok((
            SerialReader { port: self.port },
            SerialWriter { port: write_half },
        ))
    }
}

impl LinkRead for SerialReader {
    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize> {
        match self.port.read(buf) {
            Ok(n) => Ok(n),
            // A timed-out read simply means no data arrived this interval.
            Err(e)
                if e.kind() == std::io::ErrorKind::TimedOut
                    || e.kind() == std::io::ErrorKind::WouldBlock =>
            {
                Ok(0)
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl LinkWrite for SerialWriter {
    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.port.write_all(bytes)?;
        self.port.flush()?;
        Ok(())
    }
}

/// List the serial ports available on this system.
pub fn available_ports() -> Result<Vec<String>> {
    let ports = serialport::available_ports()?;
    Ok(ports.into_iter().map(|p| p.port_name).collect())
}
