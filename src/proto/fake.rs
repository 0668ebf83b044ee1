//! Simulated monitor answering the wire protocol over an in-memory pipe.

use tokio::io::{duplex, AsyncReadExt, AsyncWriteExt, DuplexStream};

use super::command::Opcode;

pub(crate) struct FakeDevice {
    /// Byte sent on connect, `None` keeps silent
    pub ack: Option<u8>,
    pub ident: Vec<u8>,
    /// Byte sent on count query, `None` keeps silent
    pub count: Option<u8>,
    /// Response per slot, index 0 answers record 1
    pub records: Vec<Vec<u8>>,
}

impl Default for FakeDevice {
    fn default() -> Self {
        Self {
            ack: Some(Opcode::Ack.into()),
            ident: b"BM58 FAKE\r\n".to_vec(),
            count: Some(0),
            records: Vec::new(),
        }
    }
}

impl FakeDevice {
    pub fn with_records(records: Vec<Vec<u8>>) -> Self {
        Self {
            count: Some(records.len() as u8),
            records,
            ..Default::default()
        }
    }

    /// Start serving and return the host side of the link.
    ///
    /// The device task ends when the host side is dropped.
    pub fn spawn(self) -> DuplexStream {
        let (host, mut dev) = duplex(1024);
        tokio::spawn(async move {
            loop {
                let op = match dev.read_u8().await {
                    Ok(op) => op,
                    Err(_) => break,
                };
                let reply = match Opcode::try_from(op) {
                    Ok(Opcode::Connect) => self.ack.map(|b| vec![b]),
                    Ok(Opcode::Identify) => Some(self.ident.clone()),
                    Ok(Opcode::RecordCount) => self.count.map(|c| vec![c]),
                    Ok(Opcode::Record) => {
                        let index = match dev.read_u8().await {
                            Ok(index) => index as usize,
                            Err(_) => break,
                        };
                        index
                            .checked_sub(1)
                            .and_then(|slot| self.records.get(slot))
                            .cloned()
                    }
                    _ => None,
                };
                if let Some(bytes) = reply {
                    if dev.write_all(&bytes).await.is_err() {
                        break;
                    }
                }
            }
        });
        host
    }
}
