//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    color::ColorCommands,
    completions::CompletionsArgs,
    init::InitArgs,
    item::{ItemCommands, LinkArgs},
    purge::PurgeArgs,
    tag::{AddArgs, EraseArgs, ListArgs, RenameArgs, SearchArgs, ShowArgs},
};

#[derive(Parser)]
#[command(name = "tagkeep")]
#[command(author, version, about = "Tag store with rename-merge, purge and colors")]
#[command(long_about = "Keeps tags and their item links in a local SQLite store, with cached lookups, case-insensitive rename-merge, orphan purging and tag colors.")]
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

    /// Project root (default: auto-detect by finding .tagkeep/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,

    /// Library to act on (default: from config, else the unscoped library)
    #[arg(long, short = 'l', global = true)]
    pub library: Option<i64>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new tagkeep project
    Init(InitArgs),

    /// Create a tag (or print the id of the existing one)
    Add(AddArgs),

    /// List tags in collation order
    List(ListArgs),

    /// Find tags whose name contains text
    Search(SearchArgs),

    /// Show one tag and its items
    Show(ShowArgs),

    /// Rename a tag, merging into an existing manual tag of that name
    Rename(RenameArgs),

    /// Delete tags and their item links
    Erase(EraseArgs),

    /// Delete given tags, or tags no item carries
    Purge(PurgeArgs),

    /// Item registration
    #[command(subcommand)]
    Item(ItemCommands),

    /// Attach a tag to an item
    Link(LinkArgs),

    /// Detach a tag from an item
    Unlink(LinkArgs),

    /// Tag colors
    #[command(subcommand)]
    Color(ColorCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (yaml for show, tsv for list)
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// Just IDs, one per line
    Id,
}
