//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

use crate::domain::{Direction, NodeId};

/// Build and edit hierarchical mind maps, export them as JSON
#[derive(Parser, Debug)]
#[command(name = "mindmap")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output, repeat for more (-d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Working directory for relative paths and local config (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new map holding only a root node
    New {
        /// Map file (default: configured map_file)
        #[arg(value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
        /// Root title (default: configured root_title)
        #[arg(short, long)]
        title: Option<String>,
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show the map as a tree
    Show {
        #[arg(value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
        /// Show node ids
        #[arg(long)]
        ids: bool,
        /// Print JSON instead of a tree
        #[arg(long, conflicts_with = "ids")]
        json: bool,
    },

    /// Add a child node (appended as last child)
    Add {
        /// Node title
        title: String,
        /// Parent node id (default: root)
        #[arg(short, long)]
        parent: Option<NodeId>,
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
    },

    /// Rename a node
    Rename {
        /// Node id
        id: NodeId,
        /// New title
        title: String,
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
    },

    /// Delete a node and its subtree
    Delete {
        /// Node id
        id: NodeId,
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
    },

    /// Change a node's display level
    Level {
        /// Node id
        id: NodeId,
        /// Level change, e.g. 1 or -1
        #[arg(long, allow_hyphen_values = true, default_value_t = 1)]
        delta: i32,
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
    },

    /// Move a node among its siblings
    Move {
        /// Node id
        id: NodeId,
        /// up or down
        direction: Direction,
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
    },

    /// Export the map as pretty JSON
    Export {
        #[arg(value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
        /// Output file (default: stdout)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Edit interactively
    Shell {
        /// Map file, created on first save if missing
        #[arg(value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
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

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
    },

    /// Show config paths
    Path,
}
