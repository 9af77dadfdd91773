//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    cache::CacheCommands, completions::CompletionsArgs, init::InitArgs, seed::SeedArgs,
    status::StatusArgs, track::TrackArgs,
};

#[derive(Parser)]
#[command(name = "tracklite")]
#[command(author, version, about = "Sample tracking timelines for lab records")]
#[command(long_about = "Follow a sample from branch intake through lab testing, reporting and billing. Records are plain YAML files; tracking queries accept a courier AWB, an invoice number or any record ID.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (default: auto-detect by finding .tracklite/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new TrackLite project
    Init(InitArgs),

    /// Show the status timeline for an AWB, invoice number or record ID
    Track(TrackArgs),

    /// Write a set of demo records
    Seed(SeedArgs),

    /// Show store status dashboard
    Status(StatusArgs),

    /// Cache management (rebuild, sync, status, clear)
    #[command(subcommand)]
    Cache(CacheCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (table on a terminal)
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as ValueEnum>::from_str(s, true)
    }
}

impl OutputFormat {
    /// Resolve `auto` against a configured default format
    pub fn or_configured(self, configured: Option<&str>) -> OutputFormat {
        if self != OutputFormat::Auto {
            return self;
        }
        match configured.map(str::parse::<OutputFormat>) {
            Some(Ok(format)) => format,
            Some(Err(e)) => {
                tracing::warn!("ignoring configured default_format: {}", e);
                OutputFormat::Auto
            }
            None => OutputFormat::Auto,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_explicit_format_wins_over_config() {
        assert_eq!(
            OutputFormat::Json.or_configured(Some("yaml")),
            OutputFormat::Json
        );
    }

    #[test]
    fn test_auto_uses_configured_format() {
        assert_eq!(
            OutputFormat::Auto.or_configured(Some("TSV")),
            OutputFormat::Tsv
        );
        assert_eq!(OutputFormat::Auto.or_configured(None), OutputFormat::Auto);
        assert_eq!(
            OutputFormat::Auto.or_configured(Some("markdown")),
            OutputFormat::Auto
        );
    }
}
