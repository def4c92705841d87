use std::fs;

use anyhow::Result;
use inquire::Confirm;

use gym_export::ExportError;

mod members;
pub use members::*;

mod trainers;
pub use trainers::*;

mod payments;
pub use payments::*;

mod attendance;
pub use attendance::*;

mod reports;
pub use reports::*;

/// Ask before changing the database
pub(crate) fn confirm(message: &str) -> Result<bool> {
    let confirmed = Confirm::new(message).with_default(true).prompt()?;
    if !confirmed {
        tracing::info!("aborted by user");
    }
    Ok(confirmed)
}

/// Render an export in memory and write it to `path` only
/// if it succeeded. On error the file is left untouched.
pub(crate) fn write_export<F>(path: &str, export: F) -> Result<usize>
where
    F: FnOnce(&mut Vec<u8>) -> Result<usize, ExportError>,
{
    let mut buf = Vec::new();
    let count = export(&mut buf)?;
    fs::write(path, buf)?;
    tracing::debug!(path, count, "wrote export");
    Ok(count)
}
