use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory to scan for videos
    #[arg(short, long, default_value = ".")]
    pub directory: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the content hash used for subtitle lookups
    Hash {
        /// Video file to hash
        input: PathBuf,
    },

    /// Write the default configuration to a file
    InitConfig {
        /// Output path
        #[arg(default_value = "subgrab.toml")]
        output: PathBuf,
    },
}
