use std::{fs::File, path::Path, sync::Mutex};

use terrace::error::{Error, Result};
use tracing::Level;

/// Send tracing output to a file so it does not disturb the terminal.
pub fn init(path: &Path, level: Level) -> Result<()> {
    let file = File::create(path)?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(level)
        .try_init()
        .map_err(|e| Error::Invalid(e.to_string()))
}
