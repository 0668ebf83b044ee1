use std::io::{self, Write};

use crate::device::Download;
use crate::measurement::Measurement;
use crate::store::Averages;

/// Number of latest readings averaged in the summary.
pub const AVERAGE_WINDOW: usize = 2;

/// Write the device identification and the number of stored records.
pub fn write_header(out: &mut impl Write, download: &Download) -> io::Result<()> {
    if let Some(ident) = &download.ident {
        out.write_fmt(format_args!("{}\n", ident))?;
    }
    out.write_fmt(format_args!("Available records: {}\n", download.count))
}

/// Write one line per measurement, newest first.
///
/// Numbering follows download order, so the oldest slot is #1
/// and is printed last.
pub fn write_listing(out: &mut impl Write, measurements: &[Measurement]) -> io::Result<()> {
    for (c, mea) in measurements.iter().enumerate().rev() {
        out.write_fmt(format_args!("{:2} - {}\n", c + 1, mea))?;
    }
    Ok(())
}

pub fn write_summary(
    out: &mut impl Write,
    total: usize,
    average: Option<&Averages>,
) -> io::Result<()> {
    out.write_fmt(format_args!(
        "Total number of records in the database: {}\n",
        total
    ))?;
    if let Some(avg) = average {
        out.write_fmt(format_args!(
            "Average values from the last {} measurement\n    {}\n",
            AVERAGE_WINDOW, avg
        ))?;
    }
    Ok(())
}
