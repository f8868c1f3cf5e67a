use anyhow::{bail, Context, Result};
use colored::*;
use pstkit_core::{pack_strict, unpack_bytes, Schema};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Read};
use tracing::{info, warn};

/// Outcome of unpacking a savegame and packing it straight back
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyReport {
    /// BLAKE3 of the input savegame, hex encoded
    pub original_digest: String,
    /// BLAKE3 of the repacked savegame, hex encoded
    pub repacked_digest: String,
    /// Field lines in the intermediate pst text
    pub lines: usize,
    /// Feature lines in the intermediate pst text
    pub features: usize,
    /// Starting year seen during the unpack
    pub starting_year: Option<i32>,
    /// First byte offset where the two savegames differ
    pub first_difference: Option<usize>,
}

impl VerifyReport {
    /// Whether the round trip was byte-identical
    pub fn is_identical(&self) -> bool {
        self.first_difference.is_none() && self.original_digest == self.repacked_digest
    }
}

/// Round-trip `data` through pst text and compare
pub fn check(data: &[u8]) -> Result<VerifyReport> {
    let schema = Schema::savegame().context("Built-in savegame schema is inconsistent")?;
    let (text, unpacked) = unpack_bytes(&schema, data).context("Failed to unpack savegame")?;
    let (packed, _) = pack_strict(&text, &schema).context("Failed to pack the unpacked text")?;

    let first_difference = data
        .iter()
        .zip(packed.iter())
        .position(|(a, b)| a != b)
        .or_else(|| (data.len() != packed.len()).then(|| data.len().min(packed.len())));

    Ok(VerifyReport {
        original_digest: hex::encode(blake3::hash(data).as_bytes()),
        repacked_digest: hex::encode(blake3::hash(&packed).as_bytes()),
        lines: unpacked.lines,
        features: unpacked.features,
        starting_year: unpacked.starting_year,
        first_difference,
    })
}

pub fn execute(input: &str) -> Result<VerifyReport> {
    info!("Verifying file: {}", input);

    // Read input file or stdin
    let data = if input == "-" {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf)?;
        buf
    } else {
        fs::read(input).with_context(|| format!("Failed to read input file: {}", input))?
    };

    let report = check(&data).with_context(|| format!("Failed to verify {}", input))?;

    println!("\n=== Verification Results ===");
    println!("Field lines:       {}", report.lines);
    println!("Feature lines:     {}", report.features);
    if let Some(year) = report.starting_year {
        println!("Starting year:     {}", year);
    }
    println!("Original BLAKE3:   {}", report.original_digest);
    println!("Repacked BLAKE3:   {}", report.repacked_digest);

    println!("\n=== Summary ===");
    if report.is_identical() {
        println!("{} Savegame round-trips byte for byte", "✓".green());
    } else {
        let offset = report.first_difference.unwrap_or(0);
        warn!("Repacked savegame first differs at byte {}", offset);
        println!("{} Repacked savegame differs at byte {}", "✗".red(), offset);
        bail!("{} does not round-trip", input);
    }

    Ok(report)
}
