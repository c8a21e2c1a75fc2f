use clap::{ArgAction, Args, Parser, Subcommand};
use renamr_archive::Compression;
use renamr_library::Filter;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "renamr", version, about = "Rename files in sequence and bundle them into a ZIP archive")]
pub struct Cli {
    /// Configuration file (TOML, YAML or JSON). Defaults to the platform
    /// config directory.
    #[arg(long, short, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace). `RUST_LOG`
    /// takes precedence.
    #[arg(long, short, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Rename input files as `{base}_{n}.{ext}` and write `{base}_files.zip`.
    Rename(RenameArgs),
    /// Show the most recent renames, newest first.
    History(HistoryArgs),
    /// Show usage statistics.
    Analytics(AnalyticsArgs),
    /// Print the effective configuration.
    Config,
}

#[derive(Debug, Args)]
pub struct RenameArgs {
    /// Base name for the new file names.
    #[arg(long, short)]
    pub base: String,

    /// Only rename one category: all, images, videos, audio, documents, others.
    #[arg(long, short, default_value_t = Filter::All)]
    pub filter: Filter,

    /// Directory the archive is written to.
    #[arg(long, short, default_value = ".", value_name = "DIR")]
    pub output: PathBuf,

    /// Compression method for archive entries. Overrides the configuration.
    #[arg(long, value_parser = parse_compression)]
    pub compression: Option<Compression>,

    /// Do everything except writing the archive and the ledger.
    #[arg(long)]
    pub dry_run: bool,

    /// Files, ZIP archives or directories to rename.
    #[arg(required = true, value_name = "INPUT")]
    pub inputs: Vec<PathBuf>,
}

#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Maximum number of entries to show.
    #[arg(long, short = 'n', default_value_t = 20)]
    pub limit: usize,
}

#[derive(Debug, Args)]
pub struct AnalyticsArgs {
    /// Number of entries in each ranking.
    #[arg(long, default_value_t = 5)]
    pub top: usize,
}

fn parse_compression(value: &str) -> Result<Compression, String> {
    value.parse().map_err(|err: renamr_archive::error::Error| err.to_string())
}
