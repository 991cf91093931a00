//! Launch the selector gym example.

use std::path::PathBuf;

use clap::Parser;
use terrace::{
    RunloopOptions,
    backend::crossterm::runloop_with_options,
    error::Result,
};
use terrace_examples::{
    logging,
    selectgym::{SelectGymOptions, build, summary},
};
use tracing::Level;

/// CLI flags for the selector gym example.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Pick several items instead of one.
    #[clap(short, long)]
    multi: bool,

    /// Number of visible rows.
    #[clap(short = 'n', long)]
    max_items: Option<usize>,

    /// Item to place under the cursor at startup.
    #[clap(short, long)]
    default: Option<String>,

    /// Write trace logs to this file.
    #[clap(short, long)]
    log: Option<PathBuf>,

    /// Clear the screen when the selector exits.
    #[clap(short, long)]
    clear: bool,
}

/// Run the selector gym example.
pub fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = &args.log {
        logging::init(path, Level::TRACE)?;
    }
    let mut component = build(&SelectGymOptions {
        multi: args.multi,
        max_items: args.max_items,
        default: args.default,
    })?;
    let options = RunloopOptions {
        clear_on_exit: args.clear,
        ..Default::default()
    };
    let picked = runloop_with_options(&mut component, options)?;
    println!("{}", summary(&picked));
    Ok(())
}
