use std::fmt;

use crate::rawrec::RawRecord;

/// Device response, one per command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Connect accepted
    Ack,
    /// Connect answered with something else than ACK
    Nak(u8),
    Ident(Ident),
    RecordCount(u8),
    Record(RawRecord),
}

/// Identification line sent by the device, without line terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident(pub String);

impl Ident {
    pub(crate) fn from_line(line: &[u8]) -> Self {
        let text = String::from_utf8_lossy(line);
        Self(text.trim_end_matches(&['\r', '\n'][..]).to_string())
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
