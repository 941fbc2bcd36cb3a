//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

use crate::domain::EpisodeSelection;

/// Administer versioned dataset repositories on the Hugging Face hub
#[derive(Parser, Debug)]
#[command(name = "hubadmin")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(after_help = "Workflow: tag before changing anything, e.g.\n  \
    hubadmin create-tag v1.0 \"Before cleanup\"\n  \
    hubadmin delete-episodes 5,10,15\n  \
    hubadmin create-tag v1.1 \"Removed bad episodes\"")]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Dataset repository to administer (overrides config)
    #[arg(short, long, global = true, value_name = "ORG/NAME")]
    pub repo: Option<String>,

    /// Config file (default: $XDG_CONFIG_HOME/hubadmin/hubadmin.toml)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Answer yes to every confirmation prompt
    #[arg(short, long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List branches and tags
    #[command(name = "list-versions")]
    ListVersions,

    /// List episodes with their file counts
    #[command(name = "list-episodes")]
    ListEpisodes,

    /// Tag the current head of main
    #[command(name = "create-tag")]
    CreateTag {
        /// Tag name (e.g. v1.0)
        name: String,
        /// Tag description
        message: String,
    },

    /// Delete a tag (asks for confirmation)
    #[command(name = "delete-tag")]
    DeleteTag {
        /// Tag name
        name: String,
    },

    /// Delete all files of the given episodes (asks for confirmation)
    #[command(name = "delete-episodes")]
    DeleteEpisodes {
        /// Comma-separated episode indices (e.g. 0,1,5)
        #[arg(value_name = "EP1,EP2,...")]
        episodes: EpisodeSelection,
    },

    /// Merge a source dataset into a target and push the result
    #[command(name = "merge-datasets")]
    MergeDatasets {
        /// Dataset to merge from
        #[arg(value_name = "SOURCE_REPO")]
        source: String,
        /// Dataset to merge into (default: configured repository)
        #[arg(long, value_name = "TARGET_REPO")]
        target: Option<String>,
        /// Where to push the merged result (default: target)
        #[arg(long, value_name = "OUTPUT_REPO")]
        output: Option<String>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Show config file path
    Path,

    /// Create config template
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
