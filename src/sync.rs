//! Download run: fetch, show, persist, summarize.

use log::{info, warn};
use std::io::Write;
use std::path::Path;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::device::Device;
use crate::error::Error;
use crate::measurement::Measurement;
use crate::rawrec::RawRecord;
use crate::report::{write_header, write_listing, write_summary, AVERAGE_WINDOW};
use crate::store::{Averages, Store};

/// Outcome of a run
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    /// Records downloaded and decoded
    pub fetched: usize,
    /// Records new to the database
    pub inserted: usize,
    /// Rows in the database after the run
    pub total: usize,
    pub average: Option<Averages>,
}

/// Decode raw records, dropping those with an impossible timestamp.
pub fn decode_all(records: &[RawRecord]) -> Vec<Measurement> {
    records
        .iter()
        .filter_map(|raw| match Measurement::try_from(raw) {
            Ok(mea) => Some(mea),
            Err(err) => {
                warn!("Skipping record {:02X?}: {}", raw.as_bytes(), err);
                None
            }
        })
        .collect()
}

/// Store measurements and collect the statistics of the resulting table.
pub fn persist(store: &mut Store, measurements: &[Measurement]) -> Result<Summary, Error> {
    let inserted = store.upsert_all(measurements)?;
    let total = store.total_count()?;
    let average = if total > 0 {
        store.recent_average(AVERAGE_WINDOW)?
    } else {
        None
    };
    Ok(Summary {
        fetched: measurements.len(),
        inserted,
        total,
        average,
    })
}

/// Complete run against one device and one database file.
///
/// The database is not touched unless the download succeeded.
pub async fn run<T>(
    device: &mut Device<T>,
    db: impl AsRef<Path>,
    out: &mut impl Write,
) -> Result<Summary, Error>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    let download = device.download().await?;
    write_header(out, &download)?;

    let measurements = decode_all(&download.records);
    write_listing(out, &measurements)?;

    let mut store = Store::open(db)?;
    let summary = persist(&mut store, &measurements)?;
    info!(
        "{} new of {} downloaded records stored",
        summary.inserted, summary.fetched
    );

    write_summary(out, summary.total, summary.average.as_ref())?;
    Ok(summary)
}
