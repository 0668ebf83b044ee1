use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;

use crate::rawrec::RawRecord;

/// Offset added to the raw systolic and diastolic bytes (mmHg).
pub const PRESSURE_OFFSET: u16 = 25;

/// Device years are stored as two digits.
const BASE_YEAR: i32 = 2000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("Invalid record timestamp: {year:04}-{month:02}-{day:02} {hour:02}:{minute:02}")]
    InvalidTimestamp {
        year: i32,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
    },
}

/// Blood pressure measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Measurement {
    /// Time of measurement, device local time
    pub timestamp: NaiveDateTime,
    /// Systolic pressure (mmHg)
    pub systolic: u16,
    /// Diastolic pressure (mmHg)
    pub diastolic: u16,
    /// Pulse (1/min)
    pub pulse: u16,
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} Sys={:3} Dia={:3} Pulse={}",
            self.timestamp.format("%Y-%m-%d %H:%M"),
            self.systolic,
            self.diastolic,
            self.pulse
        )
    }
}

/// Normalize a raw record.
///
/// Calendar fields are not clamped: a record with an impossible date
/// (month 13, February 30th, ...) yields [`DecodeError::InvalidTimestamp`].
pub fn decode(raw: &RawRecord) -> Result<Measurement, DecodeError> {
    let year = BASE_YEAR + i32::from(raw.year);
    let timestamp = NaiveDate::from_ymd_opt(year, raw.month.into(), raw.day.into())
        .and_then(|date| date.and_hms_opt(raw.hour.into(), raw.minute.into(), 0))
        .ok_or(DecodeError::InvalidTimestamp {
            year,
            month: raw.month,
            day: raw.day,
            hour: raw.hour,
            minute: raw.minute,
        })?;

    Ok(Measurement {
        timestamp,
        systolic: PRESSURE_OFFSET + u16::from(raw.systolic),
        diastolic: PRESSURE_OFFSET + u16::from(raw.diastolic),
        pulse: raw.pulse.into(),
    })
}

impl TryFrom<&RawRecord> for Measurement {
    type Error = DecodeError;

    fn try_from(value: &RawRecord) -> Result<Self, Self::Error> {
        decode(value)
    }
}
