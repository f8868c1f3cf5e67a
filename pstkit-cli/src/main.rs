use anyhow::Result;
use clap::{Parser, Subcommand};
use pstkit_cli::commands;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "pstkit")]
#[command(
    about = "pstkit - Unpack Pirates! savegames to editable text and pack them back",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Unpack a savegame into pst text
    Unpack {
        /// Input savegame
        #[arg(short, long)]
        input: String,

        /// Output pst file (defaults to the input with a .pst extension)
        #[arg(short, long)]
        output: Option<String>,

        /// Show a per-section progress bar
        #[arg(long)]
        progress: bool,

        /// Output JSON file for the run summary
        #[arg(long)]
        summary: Option<String>,
    },

    /// Pack pst text back into a savegame
    Pack {
        /// Input pst file
        #[arg(short, long)]
        input: String,

        /// Output savegame
        #[arg(short, long)]
        output: String,

        /// Require field lines to follow the savegame layout exactly
        #[arg(long)]
        strict: bool,

        /// Output JSON file for the run summary
        #[arg(long)]
        summary: Option<String>,
    },

    /// Check that a savegame survives unpack and pack unchanged
    Verify {
        /// Input savegame, or - for stdin
        #[arg(short, long)]
        input: String,
    },

    /// Print the resolved savegame layout
    Layout {
        /// Output JSON file for the full leaf list
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    // Execute command
    match cli.command {
        Commands::Unpack {
            input,
            output,
            progress,
            summary,
        } => commands::unpack::execute(&input, output.as_deref(), progress, summary.as_deref())
            .map(drop),

        Commands::Pack {
            input,
            output,
            strict,
            summary,
        } => commands::pack::execute(&input, &output, strict, summary.as_deref()).map(drop),

        Commands::Verify { input } => commands::verify::execute(&input).map(drop),

        Commands::Layout { output } => commands::layout::execute(output.as_deref()).map(drop),
    }
}
