pub mod agent;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "ops-primer")]
#[command(about = "DevOps study guide companion with a toy metrics exporter and service watchdog")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Work with a markdown study guide of numbered Q&A entries
    Guide {
        #[command(subcommand)]
        action: GuideAction,
    },

    /// Run the metrics-polling exporter loop
    Export {
        /// Path to TOML configuration file
        #[arg(short, long, default_value = "primer.toml")]
        config: String,

        /// Override the metrics endpoint from config
        #[arg(long)]
        endpoint: Option<String>,

        /// Override the poll interval in seconds
        #[arg(long)]
        interval: Option<u64>,

        /// Stop after this many polls (default: run forever)
        #[arg(long)]
        cycles: Option<u64>,
    },

    /// Run the CPU-threshold service watchdog loop
    Watch {
        /// Path to TOML configuration file
        #[arg(short, long, default_value = "primer.toml")]
        config: String,

        /// Override the watched unit name from config
        #[arg(long)]
        unit: Option<String>,

        /// Override the CPU threshold percentage
        #[arg(long)]
        threshold: Option<f32>,

        /// Override the sample interval in seconds
        #[arg(long)]
        interval: Option<u64>,

        /// Stop after this many samples (default: run forever)
        #[arg(long)]
        cycles: Option<u64>,
    },
}

#[derive(Debug, Subcommand)]
pub enum GuideAction {
    /// List all entries in the guide
    List {
        #[arg(short, long, default_value = "guide.md")]
        file: String,
    },

    /// Search entries by title and answer text
    Search {
        query: String,

        #[arg(short, long, default_value = "guide.md")]
        file: String,
    },

    /// Verify that every entry has a non-empty answer
    Check {
        #[arg(short, long, default_value = "guide.md")]
        file: String,
    },

    /// Export entries as JSON or CSV
    Export {
        #[arg(short, long, default_value = "guide.md")]
        file: String,

        /// Output format: json or csv
        #[arg(long, default_value = "json")]
        format: String,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<String>,
    },
}
