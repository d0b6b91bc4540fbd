// CLI argument parsing for todo

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "todo")]
#[command(about = "Keep a single todo list on local disk")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the data directory from the config
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Add a task
    Add {
        /// Task text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Replace the text of a task
    Edit {
        /// Task id or unique prefix
        id: String,

        /// New task text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Flip a task between pending and completed
    Toggle {
        /// Task id or unique prefix
        id: String,
    },

    /// Remove a task
    Delete {
        /// Task id or unique prefix
        id: String,
    },

    /// Remove every task
    Clear,

    /// Show tasks (default)
    List {
        /// all, completed or pending
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Interactive session keeping draft and edit state between commands
    Shell,
}
