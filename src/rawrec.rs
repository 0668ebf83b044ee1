use byteorder::ReadBytesExt;
use std::io::{self, Cursor, Read};

/// Length of a single record response.
pub const RAW_RECORD_LEN: usize = 9;

/// Raw record as stored in device memory
///
/// Pressure values are offsets, see [`crate::measurement::decode`]
/// for the normalized reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawRecord {
    /// Status byte, unused
    pub status: u8,
    /// Systolic pressure - 25 mmHg
    pub systolic: u8,
    /// Diastolic pressure - 25 mmHg
    pub diastolic: u8,
    /// Pulse in beats per minute
    pub pulse: u8,
    /// Month [1 - 12]
    pub month: u8,
    /// Day of month [1 - 31]
    pub day: u8,
    /// Hour [0 - 23]
    pub hour: u8,
    /// Minute [0 - 59]
    pub minute: u8,
    /// Two digit year, 2000 based
    pub year: u8,
}

impl RawRecord {
    pub(crate) fn new(cur: &mut impl Read) -> io::Result<Self> {
        Ok(Self {
            status: cur.read_u8()?,
            systolic: cur.read_u8()?,
            diastolic: cur.read_u8()?,
            pulse: cur.read_u8()?,
            month: cur.read_u8()?,
            day: cur.read_u8()?,
            hour: cur.read_u8()?,
            minute: cur.read_u8()?,
            year: cur.read_u8()?,
        })
    }

    /// Wire representation of this record.
    pub fn as_bytes(&self) -> [u8; RAW_RECORD_LEN] {
        [
            self.status,
            self.systolic,
            self.diastolic,
            self.pulse,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.year,
        ]
    }
}

impl TryFrom<&[u8]> for RawRecord {
    type Error = io::Error;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        if value.len() != RAW_RECORD_LEN {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "Record must be {} bytes, got {}",
                    RAW_RECORD_LEN,
                    value.len()
                ),
            ));
        }
        Self::new(&mut Cursor::new(value))
    }
}
