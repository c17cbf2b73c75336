use clap::{Parser, Subcommand};
use std::path::PathBuf;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " ", env!("GIT_HASH"));

#[derive(Parser, Debug)]
#[command(name = "fretpad")]
#[command(about = "Profile manager for the guitar practice app", long_about = None)]
#[command(version = VERSION)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Data directory (defaults to the platform data dir, or $FRETPAD_HOME)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage user profiles
    #[command(alias = "u")]
    Users {
        #[command(subcommand)]
        command: Option<UsersCommands>,
    },

    /// Export a profile (or all profiles) to a JSON file
    Export {
        /// Profile name or id; omit with --all
        user: Option<String>,

        /// Export every profile into one document
        #[arg(long)]
        all: bool,

        /// Output directory (defaults to the current directory)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Import profiles from an exported JSON file
    Import {
        /// Path to the exported document
        file: PathBuf,

        /// The file is a bulk (all-users) export
        #[arg(long)]
        all: bool,

        /// Replace an existing profile with the same name instead of
        /// creating a renamed copy
        #[arg(long)]
        overwrite: bool,
    },

    /// Snapshot all profiles into the single backup slot
    Backup,

    /// Replace all profiles with the backup slot's contents
    Restore,
}

#[derive(Subcommand, Debug)]
pub enum UsersCommands {
    /// List profiles
    #[command(alias = "ls")]
    List,

    /// Create a profile
    #[command(alias = "n")]
    Create {
        name: String,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        avatar: Option<String>,
    },

    /// Delete a profile
    #[command(alias = "rm")]
    Delete {
        /// Profile name or id
        user: String,
    },

    /// Make a profile the current one
    Switch {
        /// Profile name or id
        user: String,
    },

    /// Show one profile's details
    Show {
        /// Profile name or id
        user: String,
    },

    /// Rename a profile
    Rename {
        /// Profile name or id
        user: String,
        new_name: String,
    },
}
