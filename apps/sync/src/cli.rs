//! Command-line arguments.

use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "leetcard-sync")]
#[command(author, version, about = "Sync a LeetCode problem note into an Anki card")]
pub struct Cli {
    /// Note file, named `<number>. <title>.md`
    pub note: PathBuf,

    /// Config file (default: ./config.yaml, then the user config dir)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Run every read stage but do not write to Anki
    #[arg(long)]
    pub dry_run: bool,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    pub debug: bool,
}
