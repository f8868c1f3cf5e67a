use anyhow::{Context, Result};
use pstkit_core::{pack_str, pack_strict, PackSummary, Schema};
use std::fs;
use tracing::info;

pub fn execute(
    input: &str,
    output: &str,
    strict: bool,
    summary_path: Option<&str>,
) -> Result<PackSummary> {
    info!("Packing {} to {}", input, output);

    let text = fs::read_to_string(input)
        .with_context(|| format!("Failed to read input file: {}", input))?;

    let (packed, summary) = if strict {
        let schema = Schema::savegame().context("Built-in savegame schema is inconsistent")?;
        pack_strict(&text, &schema)
    } else {
        pack_str(&text)
    }
    .with_context(|| format!("Failed to pack {}", input))?;

    fs::write(output, &packed)
        .with_context(|| format!("Failed to write output file: {}", output))?;

    println!("\n=== Pack Results ===");
    println!("Field lines:       {}", summary.lines);
    println!("Feature lines:     {}", summary.features);
    println!("Bytes written:     {} bytes", summary.bytes_written);
    info!("Packed savegame written to: {}", output);

    if let Some(path) = summary_path {
        super::write_summary(path, &summary)?;
    }

    Ok(summary)
}
