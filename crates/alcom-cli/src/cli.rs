//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// ALCOM - decision-diagram quantum circuit simulator
#[derive(Debug, Parser)]
#[command(name = "alcom")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Log filter for the verbosity count.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Simulate an OpenQASM 2.0 circuit
    Run(RunArgs),

    /// List available backends
    Backends {
        /// Print capabilities as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

#[derive(Debug, Clone, clap::Args)]
pub struct RunArgs {
    /// Input file (OpenQASM 2.0, one experiment)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Number of shots
    #[arg(short, long, default_value = "1024")]
    pub shots: u32,

    /// Also return the final statevector
    #[arg(long)]
    pub statevector: bool,

    /// RNG seed for reproducible sampling
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Backend configuration file (YAML)
    #[arg(long, env = "ALCOM_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}
