use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use pstkit_core::{Schema, UnpackSummary, Unpacker};
use std::fs::{self, File};
use std::io::{BufWriter, Cursor};
use std::path::{Path, PathBuf};
use tracing::info;

/// Output path used when none is given: the input with a `pst` extension
pub fn default_output_path(input: &str) -> PathBuf {
    Path::new(input).with_extension("pst")
}

pub fn execute(
    input: &str,
    output: Option<&str>,
    progress: bool,
    summary_path: Option<&str>,
) -> Result<UnpackSummary> {
    let output = output
        .map(PathBuf::from)
        .unwrap_or_else(|| default_output_path(input));
    info!("Unpacking {} to {}", input, output.display());

    let data = fs::read(input).with_context(|| format!("Failed to read input file: {}", input))?;
    info!("File size: {} bytes", data.len());

    let schema = Schema::savegame().context("Built-in savegame schema is inconsistent")?;
    let file = File::create(&output)
        .with_context(|| format!("Failed to create output file: {}", output.display()))?;

    let mut unpacker = Unpacker::new(&schema, Cursor::new(data), BufWriter::new(file));
    let bar = progress.then(|| section_bar(unpacker.section_count() as u64));

    for section in schema.sections() {
        if let Some(bar) = &bar {
            bar.set_message(section.name.clone());
        }
        unpacker
            .unpack_section(section)
            .with_context(|| format!("Failed to unpack {} in {}", section.name, input))?;
        if let Some(bar) = &bar {
            bar.inc(1);
        }
    }

    let summary = unpacker
        .finish()
        .with_context(|| format!("Failed to write output file: {}", output.display()))?;
    if let Some(bar) = bar {
        bar.finish_with_message("done");
    }

    println!("\n=== Unpack Results ===");
    println!("Bytes read:        {} bytes", summary.bytes_read);
    println!("Field lines:       {}", summary.lines);
    println!("Feature lines:     {}", summary.features);
    match summary.starting_year {
        Some(year) => println!("Starting year:     {}", year),
        None => println!("Starting year:     (not captured)"),
    }
    info!("Unpacked savegame written to: {}", output.display());

    if let Some(path) = summary_path {
        super::write_summary(path, &summary)?;
    }

    Ok(summary)
}

fn section_bar(sections: u64) -> ProgressBar {
    let bar = ProgressBar::new(sections);
    let style = ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    bar.set_style(style);
    bar
}
