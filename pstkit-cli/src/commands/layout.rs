use anyhow::{Context, Result};
use pstkit_core::{Layout, Schema};
use std::fs;
use tracing::info;

pub fn execute(output: Option<&str>) -> Result<Layout> {
    let schema = Schema::savegame().context("Built-in savegame schema is inconsistent")?;
    let layout = Layout::of(&schema).context("Failed to resolve the savegame layout")?;

    println!("\n=== Savegame Layout ===");
    println!("Sections:          {}", schema.sections().len());
    println!("Leaves:            {}", layout.leaves.len());
    println!("Minimum size:      {} bytes", layout.min_stream_len());

    if let Some(output_path) = output {
        let json = serde_json::to_string_pretty(&layout)
            .with_context(|| "Failed to serialize layout")?;

        fs::write(output_path, json)
            .with_context(|| format!("Failed to write output file: {}", output_path))?;

        info!("Layout written to: {}", output_path);
    } else {
        println!();
        for section in schema.sections() {
            println!(
                "{:<14} {:>4} x {:>4} bytes  {}",
                section.name,
                section.count,
                section.width,
                section.kind.code()
            );
        }
    }

    Ok(layout)
}
