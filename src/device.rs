use futures::{SinkExt, StreamExt};
use log::{debug, info, warn};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_serial::{DataBits, Parity, SerialPortBuilderExt, SerialStream, StopBits};
use tokio_util::codec::{Decoder, Framed};

use super::proto::{
    codec::ProtocolCodec,
    command::Command,
    response::{Ident, Response},
    ProtoError,
};
use crate::proto::Result;
use crate::rawrec::RawRecord;
use crate::{DEFAULT_BAUDRATE, DEFAULT_TIMEOUT};

/// Result of a download session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    /// Identification line, if the device sent one
    pub ident: Option<Ident>,
    /// Number of records the device reported
    pub count: u8,
    /// Complete records in slot order
    pub records: Vec<RawRecord>,
}

/// Session with a single monitor.
///
/// The session owns the link; dropping it closes the port.
pub struct Device<T> {
    stream: Framed<T, ProtocolCodec>,
    timeout: Duration,
}

impl Device<SerialStream> {
    /// Open the serial port with the fixed BM58 line settings (4800 8N1).
    pub fn new(com: impl AsRef<str>) -> Result<Self> {
        #[allow(unused_mut)]
        let mut port = tokio_serial::new(com.as_ref(), DEFAULT_BAUDRATE)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .timeout(DEFAULT_TIMEOUT)
            .open_native_async()?;

        #[cfg(unix)]
        port.set_exclusive(false)?;

        Ok(Self::from_transport(port))
    }
}

impl<T> Device<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    pub fn from_transport(io: T) -> Self {
        Self {
            stream: ProtocolCodec::default().framed(io),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the per-response timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Send a command and wait for its response.
    ///
    /// `None` means the device did not answer completely in time.
    /// Bytes of an incomplete answer are dropped.
    async fn request(&mut self, cmd: Command) -> Result<Option<Response>> {
        self.stream.send(cmd).await?;
        match tokio::time::timeout(self.timeout, self.stream.next()).await {
            Ok(Some(Ok(response))) => Ok(Some(response)),
            Ok(Some(Err(ioerr))) => Err(ioerr.into()),
            Ok(None) => Err(ProtoError::Abort),
            Err(_elapsed) => {
                let pending = self.stream.read_buffer().len();
                if pending > 0 {
                    debug!("Discarding {} bytes of incomplete response", pending);
                }
                self.stream.read_buffer_mut().clear();
                Ok(None)
            }
        }
    }

    /// Connect handshake, must succeed before any other command.
    pub async fn connect(&mut self) -> Result<()> {
        match self.request(Command::Connect).await? {
            Some(Response::Ack) => {
                debug!("Handshake acknowledged");
                Ok(())
            }
            Some(Response::Nak(byte)) => {
                warn!("Handshake answered with 0x{:02X}", byte);
                Err(ProtoError::Protocol("handshake failed"))
            }
            Some(response) => Err(response.into()),
            None => Err(ProtoError::Protocol("handshake failed")),
        }
    }

    /// Query device identification
    pub async fn ident(&mut self) -> Result<Option<Ident>> {
        match self.request(Command::Identify).await? {
            Some(Response::Ident(id)) => Ok(Some(id)),
            Some(response) => Err(response.into()),
            None => {
                warn!("Device sent no identification");
                Ok(None)
            }
        }
    }

    /// Query number of records stored in device memory
    pub async fn record_count(&mut self) -> Result<u8> {
        match self.request(Command::RecordCount).await? {
            Some(Response::RecordCount(count)) => Ok(count),
            Some(response) => Err(response.into()),
            None => Err(ProtoError::Protocol("no record count received")),
        }
    }

    /// Get a single record by its 1-based slot index.
    ///
    /// Returns `None` for a short or missing response.
    pub async fn record(&mut self, index: u8) -> Result<Option<RawRecord>> {
        match self.request(Command::Record(index)).await? {
            Some(Response::Record(raw)) => Ok(Some(raw)),
            Some(response) => Err(response.into()),
            None => {
                debug!("Record {} incomplete, skipped", index);
                Ok(None)
            }
        }
    }

    /// Run a full download session.
    ///
    /// Records come back in slot order, which is not necessarily
    /// chronological. Slots without a complete answer are left out.
    pub async fn download(&mut self) -> Result<Download> {
        self.connect().await?;
        let ident = self.ident().await?;
        if let Some(id) = &ident {
            info!("Connected to: {}", id);
        }

        let count = self.record_count().await?;
        info!("Available records: {}", count);

        let mut records = Vec::with_capacity(usize::from(count));
        for index in 1..=count {
            if let Some(raw) = self.record(index).await? {
                records.push(raw);
            }
        }
        if records.len() < usize::from(count) {
            warn!(
                "Skipped {} incomplete records",
                usize::from(count) - records.len()
            );
        }
        Ok(Download {
            ident,
            count,
            records,
        })
    }

    /// Get all saved records from device memory
    pub async fn fetch_all_records(&mut self) -> Result<Vec<RawRecord>> {
        Ok(self.download().await?.records)
    }
}
