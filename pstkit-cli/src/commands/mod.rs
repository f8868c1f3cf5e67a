//! Subcommands of the `pstkit` binary

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use tracing::info;

pub mod layout;
pub mod pack;
pub mod unpack;
pub mod verify;

/// Write a run summary as pretty JSON
pub(crate) fn write_summary<T: Serialize>(path: &str, summary: &T) -> Result<()> {
    let json =
        serde_json::to_string_pretty(summary).with_context(|| "Failed to serialize summary")?;

    fs::write(path, json).with_context(|| format!("Failed to write summary file: {}", path))?;

    info!("Summary written to: {}", path);
    Ok(())
}
