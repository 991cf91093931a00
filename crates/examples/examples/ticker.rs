//! Run a tick stream and a background task on an event loop.

use std::{io, path::PathBuf, time::Duration};

use clap::Parser;
use terrace::error::Result;
use terrace_examples::{logging, ticker};
use tracing::Level;

/// CLI flags for the ticker example.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Number of ticks to wait for.
    #[clap(short, long, default_value_t = 5)]
    ticks: u64,

    /// Milliseconds between ticks.
    #[clap(short, long, default_value_t = 200)]
    interval: u64,

    /// Write debug logs to this file.
    #[clap(short, long)]
    log: Option<PathBuf>,
}

/// Run the ticker example.
pub fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = &args.log {
        logging::init(path, Level::DEBUG)?;
    }
    ticker::run(
        args.ticks,
        Duration::from_millis(args.interval),
        &mut io::stdout(),
    )
}
