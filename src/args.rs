use clap::{ArgGroup, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "whatblocks",
    about = "Find out which blocklists are actually blocking your DNS queries",
    version,
    long_about = None
)]
#[command(group(ArgGroup::new("input").required(true).args(["profile", "file"])))]
pub struct Args {
    /// Profile name from the config file to download logs for
    #[arg(short, long)]
    pub profile: Option<String>,

    /// Previously saved log file to analyze
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Save the downloaded logs to a timestamped file
    #[arg(short, long, visible_alias = "save")]
    pub keep: bool,

    /// Path to the config file
    #[arg(short, long, default_value = "config.json")]
    pub config: PathBuf,

    /// Directory holding the per-profile attribution stores
    #[arg(long, default_value = ".")]
    pub store_dir: PathBuf,

    /// Analyze only this run's logs, without reading or updating the store
    #[arg(long)]
    pub no_store: bool,

    /// Redact domain names in the report and in drift log messages
    #[arg(long)]
    pub redact: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
