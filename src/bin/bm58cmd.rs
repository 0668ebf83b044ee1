#![deny(clippy::unwrap_used)]

use bm58ctrl::device::Device;
use bm58ctrl::proto::ProtoError;
use bm58ctrl::store::StoreError;
use bm58ctrl::{sync, Error, DEFAULT_DB, DEFAULT_TTY};
use clap::{arg, command, value_parser};
use log::LevelFilter;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::exit;

fn cli() -> clap::Command {
    command!() // requires `cargo` feature
        .about("Download Beurer BM58 blood pressure readings into SQLite")
        .arg(
            arg!(
                -p --port <PORT> "Port for USB adapter"
            )
            .default_value(DEFAULT_TTY)
            .required(false)
            .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            arg!(
                -d --db <PATH> "SQLite database file"
            )
            .default_value(DEFAULT_DB)
            .required(false)
            .value_parser(value_parser!(PathBuf)),
        )
        .arg(arg!(
            -v --verbose ... "Turn debugging information on"
        ))
}

#[tokio::main]
async fn main() {
    let matches = cli().get_matches();

    let level = match matches.get_count("verbose") {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let port = matches
        .get_one::<PathBuf>("port")
        .expect("Port has a default value");
    let db = matches
        .get_one::<PathBuf>("db")
        .expect("Database has a default value");

    if let Err(e) = handle_args(port, db).await {
        match e {
            Error::Proto(ProtoError::Serial(err)) => {
                if err.kind() == tokio_serial::ErrorKind::NoDevice
                    || matches!(err.kind(), tokio_serial::ErrorKind::Io(ErrorKind::NotFound))
                {
                    eprintln!("{}: File not found", port.display());
                } else {
                    eprintln!("I/O Error: {} [device: {}]", err, port.display());
                }
            }
            Error::Proto(ProtoError::Io(err)) => {
                eprintln!("I/O Error: {} [device: {}]", err, port.display());
            }
            Error::Proto(ProtoError::Protocol(msg)) => {
                eprintln!("Failed to communicate with device: {}, aborting!", msg);
            }
            Error::Proto(ProtoError::Abort) => {
                eprintln!("Device closed the connection, aborting!");
            }
            Error::Proto(ProtoError::Unexpected(response)) => {
                eprintln!(
                    "Received an unexpected response from device, aborting!: {:?}",
                    response
                );
            }
            Error::Store(StoreError::Sqlite(err)) => {
                eprintln!("Database error: {} [db: {}]", err, db.display());
            }
            Error::Store(err) => {
                eprintln!("{} [db: {}]", err, db.display());
            }
            Error::Io(err) => {
                eprintln!("Output error: {}", err);
            }
        }
        exit(-1);
    }
}

async fn handle_args(port: &Path, db: &Path) -> Result<(), Error> {
    let mut device = Device::new(port.to_string_lossy())?;
    eprintln!("Opened port: {}\n", port.display());

    let mut output = BufWriter::new(std::io::stdout().lock());
    sync::run(&mut device, db, &mut output).await?;
    output.flush()?;
    Ok(())
}
