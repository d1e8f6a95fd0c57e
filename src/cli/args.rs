//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Chess variation trees: build, extend and navigate explored lines
#[derive(Parser, Debug)]
#[command(name = "varitree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output, repeat for more (-d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Config file layered over the global one
    #[arg(short, long, global = true, env = "VARITREE_CONFIG", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Accept plain SAN only (overrides rules.sloppy)
    #[arg(long, global = true)]
    pub strict: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a tree from one or more lines and print it
    Tree {
        /// Starting position (default: configured start_fen or initial position)
        #[arg(long)]
        fen: Option<String>,

        /// Main line moves, e.g. "1. e4 e5 2. Nf3"
        moves: Vec<String>,

        /// Additional line from the start position (repeatable)
        #[arg(short = 'a', long = "variation")]
        variations: Vec<String>,

        /// Print the FEN after every move
        #[arg(long)]
        show_fen: bool,
    },

    /// Replay a single line and print it numbered
    Line {
        /// Starting position
        #[arg(long)]
        fen: Option<String>,

        /// Moves to replay
        moves: Vec<String>,

        /// Print the position after every move
        #[arg(long)]
        fens: bool,
    },

    /// Run a session script (stdin when no file is given)
    Session {
        /// Starting position
        #[arg(long)]
        fen: Option<String>,

        /// Script file
        #[arg(value_hint = ValueHint::FilePath)]
        script: Option<PathBuf>,

        /// Skip illegal moves instead of aborting
        #[arg(short, long)]
        keep_going: bool,
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
    /// Show effective configuration
    Show,

    /// Show global config file location
    Path,

    /// Print a commented config template
    Template,
}
