use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load and validate a schema file, then list its entities
    Schema {
        /// TOML schema file
        #[arg(short, long)]
        schema: PathBuf,
    },

    /// Print the criteria built for a field's arguments and selection
    Explain {
        /// TOML schema file
        #[arg(short, long)]
        schema: PathBuf,

        /// Entity the arguments apply to
        #[arg(short, long)]
        entity: String,

        /// JSON file with the field arguments
        #[arg(short, long)]
        args: PathBuf,

        /// JSON file with the selection tree
        #[arg(long)]
        selection: Option<PathBuf>,

        /// TOML gateway configuration
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Encode or decode pagination cursors
    Cursor {
        #[command(subcommand)]
        action: CursorAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum CursorAction {
    /// Cursor for a 1-based row position
    Encode { position: u64 },

    /// Row position held by a cursor
    Decode { cursor: String },
}
