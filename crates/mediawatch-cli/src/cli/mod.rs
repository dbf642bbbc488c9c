//! CLI for the mediawatch connectivity watchdog.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;

use commands::{
    run_completions, run_config, run_descriptors, run_man, run_probe, run_watch, WatchArgs,
};

/// Top-level CLI for the mediawatch connectivity watchdog.
#[derive(Debug, Parser)]
#[command(name = "mediawatch")]
#[command(about = "mediawatch: resume media playback after network interruptions", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Send one HEAD probe and report whether the source is reachable.
    Probe {
        /// URL to probe.
        url: String,
        /// Overall request timeout in seconds.
        #[arg(long, default_value = "30", value_name = "SECS")]
        timeout: u64,
    },

    /// Print the effective error descriptor table.
    Descriptors,

    /// Attach the watchdog to a headless player driven by events on stdin.
    Watch(WatchArgs),

    /// Show the config file path and effective settings.
    Config,

    /// Generate shell completions.
    Completions {
        /// Target shell.
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Generate a man page on stdout.
    Man,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Probe { url, timeout } => run_probe(&url, timeout).await?,
            CliCommand::Descriptors => run_descriptors()?,
            CliCommand::Watch(args) => run_watch(args).await?,
            CliCommand::Config => run_config()?,
            CliCommand::Completions { shell } => run_completions(shell)?,
            CliCommand::Man => run_man()?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
