use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "vellum")]
#[command(about = "vellum - markdown editor core tooling")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (defaults apply when omitted)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse markdown into a JSON document tree
    Parse {
        /// Input file (stdin if omitted)
        input: Option<PathBuf>,

        /// Pretty-print the JSON output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Parse and serialize back to markdown
    Roundtrip {
        /// Input file (stdin if omitted)
        input: Option<PathBuf>,

        /// Exit nonzero if the output differs from the input
        #[arg(long)]
        verify: bool,
    },

    /// Report parse diagnostics without producing output
    Check {
        /// Input file (stdin if omitted)
        input: Option<PathBuf>,
    },
}
