// bases/rooster_cli/src/args.rs
use clap::{ArgGroup, Parser};
use std::path::PathBuf;

/// Batch download Rooster Teeth episodes and series
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(group(
    ArgGroup::new("mode")
        .required(true)
        .args(["show", "ia", "archivist"])
))]
pub struct Args {
    /// Email for authentication
    #[arg(long)]
    pub email: Option<String>,

    /// Password for authentication
    #[arg(long)]
    pub password: Option<String>,

    /// Number of fragments yt-dlp downloads in parallel
    #[arg(long, default_value_t = 10)]
    pub concurrent_fragments: u32,

    /// Number of attempts to retry downloading a fragment
    #[arg(long, default_value_t = 10)]
    pub fragment_retries: u32,

    /// Abort a download if a fragment cannot be fetched
    #[arg(long)]
    pub fragment_abort: bool,

    /// Download using the series/season folder layout
    #[arg(long)]
    pub show: bool,

    /// Upload to the Internet Archive and delete the local files
    #[arg(long)]
    pub ia: bool,

    /// Download into per-episode folders with every sidecar file
    #[arg(long)]
    pub archivist: bool,

    /// Check the ledger using the URL before fetching metadata
    #[arg(long)]
    pub fast_check: bool,

    /// Use aria2c as the downloader if it exists on the system
    #[arg(long)]
    pub use_aria: bool,

    /// Ignore existing uploads
    #[arg(short = 'i', long = "ignore-existing", alias = "i")]
    pub ignore_existing: bool,

    /// Do not delete files after uploads
    #[arg(long = "keep-uploads")]
    pub keep_uploads: bool,

    /// Only update metadata, nothing else
    #[arg(long = "update-meta")]
    pub update_meta: bool,

    /// Shuffle the links of a txt file or series before downloading
    #[arg(long)]
    pub random: bool,

    /// Directory to store downloaded files
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Directory for rooster.log and downloaded.log
    #[arg(long, default_value = "logs")]
    pub log_dir: PathBuf,

    /// Show error causes on the console
    #[arg(short, long)]
    pub verbose: bool,

    /// URL or .txt file containing a list of links
    pub input: String,
}
