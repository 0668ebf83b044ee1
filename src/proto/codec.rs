use bytes::{Buf, BufMut, BytesMut};
use std::io;
use tokio_util::codec::{Decoder, Encoder};

use crate::proto::command::{Command, Opcode};
use crate::proto::response::{Ident, Response};
use crate::rawrec::{RawRecord, RAW_RECORD_LEN};

const EOL: u8 = b'\n';

/// Codec for the BM58 byte protocol.
///
/// Responses carry no header, their layout is implied by the command
/// sent before. The codec remembers the last command to know what to expect.
#[derive(Default)]
pub struct ProtocolCodec {
    last_cmd: Option<Command>,
}

impl Decoder for ProtocolCodec {
    type Item = Response;
    // A NAK on connect still decodes fine, rejecting it is up to the device session.
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }
        match self.last_cmd {
            Some(Command::Connect) => {
                let byte = src.get_u8();
                if byte == u8::from(Opcode::Ack) {
                    Ok(Some(Response::Ack))
                } else {
                    Ok(Some(Response::Nak(byte)))
                }
            }
            Some(Command::Identify) => match src.iter().position(|b| *b == EOL) {
                Some(n) => {
                    let line = src.split_to(n + 1);
                    Ok(Some(Response::Ident(Ident::from_line(&line))))
                }
                None => Ok(None),
            },
            Some(Command::RecordCount) => Ok(Some(Response::RecordCount(src.get_u8()))),
            Some(Command::Record(_)) => {
                if src.len() >= RAW_RECORD_LEN {
                    let payload = src.split_to(RAW_RECORD_LEN);
                    let record = RawRecord::try_from(&payload[..])?;
                    Ok(Some(Response::Record(record)))
                } else {
                    Ok(None) // Not enough bytes yet
                }
            }
            None => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "Unsolicited data from device",
            )),
        }
    }
}

impl Encoder<Command> for ProtocolCodec {
    type Error = io::Error;

    fn encode(&mut self, item: Command, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.put_u8(item.opcode().into());
        if let Command::Record(index) = item {
            dst.put_u8(index);
        }
        self.last_cmd = Some(item);
        Ok(())
    }
}
