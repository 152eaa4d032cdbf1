//! Newline-framed transport to the microcontroller.
//!
//! The physical byte stream is an external collaborator: this module only
//! frames lines over whatever `AsyncRead`/`AsyncWrite` pair the caller
//! provides, so the binary (a character device), the tests (an in-memory
//! duplex), and any future bridge share one code path.

use std::io;
use std::path::Path;
use std::time::Duration;

use thiserror::Error;
use tokio::fs::{File, OpenOptions};
use tokio::io::{
    AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Lines, ReadHalf, WriteHalf,
};
use tokio::time::sleep;
use tracing::debug;

use crate::dto::order_line;
use crate::state::TeamId;

/// Failures raised by the link transport.
#[derive(Debug, Error)]
pub enum LinkError {
    /// Opening the device failed.
    #[error("failed to open link device `{device}`")]
    Open {
        /// Path of the device that could not be opened.
        device: String,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// Reading from the link failed.
    #[error("link read failed")]
    Read {
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// Writing to the link failed.
    #[error("link write failed")]
    Write {
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
}

/// Link established over the configured character device.
pub type DeviceLink = EventLink<ReadHalf<File>, WriteHalf<File>>;

/// Newline-framed command/report channel over a byte stream.
pub struct EventLink<R, W> {
    reader: Lines<BufReader<R>>,
    writer: W,
}

impl DeviceLink {
    /// Open the character device and wait out the settle delay.
    ///
    /// Opening the port typically resets the microcontroller, which needs a
    /// moment before it starts sending; `settle` covers that window.
    pub async fn open(device: impl AsRef<Path>, settle: Duration) -> Result<Self, LinkError> {
        let device = device.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(device)
            .await
            .map_err(|source| LinkError::Open {
                device: device.display().to_string(),
                source,
            })?;

        let (reader, writer) = tokio::io::split(file);

        if !settle.is_zero() {
            debug!(settle_ms = settle.as_millis() as u64, "waiting for link to settle");
            sleep(settle).await;
        }

        Ok(Self::from_stream(reader, writer))
    }
}

impl<R, W> EventLink<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Frame an already-established byte stream pair.
    pub fn from_stream(reader: R, writer: W) -> Self {
        Self {
            reader: BufReader::new(reader).lines(),
            writer,
        }
    }

    /// Next raw line from the link, or `None` once the peer closes.
    ///
    /// Cancellation safe: dropping the future between polls never loses a
    /// line, since partial input stays buffered inside [`Lines`].
    pub async fn next_line(&mut self) -> Result<Option<String>, LinkError> {
        self.reader
            .next_line()
            .await
            .map_err(|source| LinkError::Read { source })
    }

    /// Transmit the ranking as one `ORDER:` line.
    pub async fn send_order(&mut self, ranking: &[TeamId]) -> Result<(), LinkError> {
        let line = order_line(ranking);
        self.writer
            .write_all(line.as_bytes())
            .await
            .map_err(|source| LinkError::Write { source })?;
        self.writer
            .flush()
            .await
            .map_err(|source| LinkError::Write { source })
    }
}
