//!
//! This library provides communication with a Beurer BM58 blood pressure monitor
//! and keeps the downloaded readings in a local SQLite database.
//!
//! <br>
//!
//! # Details
//!
//! - You need the USB serial cable shipped with the monitor.
//!
//! - Basic setup and download
//!
//!   ```no_run
//!   use bm58ctrl::{measurement::decode, Device, DEFAULT_TTY};
//!   #[tokio::main]
//!   async fn main() -> bm58ctrl::Result<()> {
//!       let mut device = Device::new(DEFAULT_TTY)?;
//!       for raw in device.fetch_all_records().await? {
//!           if let Ok(mea) = decode(&raw) {
//!               println!("{}", mea);
//!           }
//!       }
//!       Ok(())
//!   }
//!   ```
//!
//! # Supported devices
//!
//!  * Beurer BM58
//!

use std::time::Duration;

pub mod device;
pub mod error;
pub mod measurement;
pub mod proto;
pub mod rawrec;
pub mod report;
pub mod store;
pub mod sync;

pub use device::Device;
pub use error::Error;
pub use proto::Result;
pub use store::Store;

#[cfg(target_os = "macos")]
pub const DEFAULT_TTY: &str = "/dev/cu.usbserial-1140";
#[cfg(all(unix, not(target_os = "macos")))]
pub const DEFAULT_TTY: &str = "/dev/ttyUSB0";
#[cfg(windows)]
pub const DEFAULT_TTY: &str = "COM1";

/// Default database file, relative to the working directory.
pub const DEFAULT_DB: &str = "bm58.sqlite";

/// Fixed baudrate of the BM58 link.
pub const DEFAULT_BAUDRATE: u32 = 4800;

/// How long a single response may take before it counts as missing.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(500);
