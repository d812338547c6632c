//! CLI for the fdl download accelerator.

mod commands;
mod console;

use anyhow::Result;
use clap::{Parser, Subcommand};
use fdl_core::config;
use std::path::PathBuf;

use commands::{run_config, run_get};

/// Top-level CLI for fdl.
#[derive(Debug, Parser)]
#[command(name = "fdl")]
#[command(about = "fdl: chunked parallel HTTP download accelerator", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download a URL, or every URL listed in a file.
    Get {
        /// URL (starting with "http") or path to a file with one URL per line.
        input: String,

        /// Output file name (single URL only; sanitized).
        #[arg(short = 'f', long, value_name = "NAME")]
        file_name: Option<String>,

        /// Output directory (default: current directory).
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Number of chunks fetched in parallel (default: config, then CPU count).
        #[arg(short, long, value_name = "N")]
        parts: Option<usize>,

        /// How many list entries download at once (default: config).
        #[arg(long, value_name = "N")]
        jobs: Option<usize>,
    },

    /// Show the config file path and effective settings.
    Config,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Get {
                input,
                file_name,
                output,
                parts,
                jobs,
            } => {
                let output_dir = match output {
                    Some(dir) => dir,
                    None => std::env::current_dir()?,
                };
                run_get(&cfg, &input, file_name, &output_dir, parts, jobs).await?;
            }
            CliCommand::Config => run_config(&cfg)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
