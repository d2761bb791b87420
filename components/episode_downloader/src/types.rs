// components/episode_downloader/src/types.rs
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::ledger::LedgerError;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Required dependency not found: {0}")]
    DependencyNotFound(&'static str),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Metadata could not be read: {0}")]
    MetadataError(String),

    #[error("Archive upload failed: {0}")]
    ArchiveFailed(String),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Playlist error: {0}")]
    PlaylistError(String),
}

/// How downloaded episodes are laid out and what happens to them afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// `Series/Season NN/Series - SNNENN - Title.ext`
    Show,
    /// Download into a per-slug directory and upload it to the Internet Archive.
    Archive,
    /// Per-slug directory with every sidecar yt-dlp can write.
    Archivist,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Show => write!(f, "show"),
            Mode::Archive => write!(f, "ia"),
            Mode::Archivist => write!(f, "archivist"),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Settings for a single invocation. Built once, then only ever borrowed.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub credentials: Option<Credentials>,
    pub concurrent_fragments: u32,
    pub fragment_retries: u32,
    /// Abort the whole download when a fragment cannot be fetched
    pub fragment_abort: bool,
    pub mode: Mode,
    /// Check the ledger with the URL slug before fetching any metadata
    pub fast_check: bool,
    pub use_aria: bool,
    /// Upload even if the archive item already exists
    pub ignore_existing: bool,
    pub keep_after_upload: bool,
    /// Refresh metadata only, never download media
    pub update_metadata: bool,
    pub randomize: bool,
    pub output_dir: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            credentials: None,
            concurrent_fragments: 10,
            fragment_retries: 10,
            fragment_abort: false,
            mode: Mode::Show,
            fast_check: false,
            use_aria: false,
            ignore_existing: false,
            keep_after_upload: false,
            update_metadata: false,
            randomize: false,
            output_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    AlreadyDownloaded,
    AlreadyArchived,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::AlreadyDownloaded => write!(f, "already downloaded"),
            SkipReason::AlreadyArchived => write!(f, "already archived"),
        }
    }
}

/// Result of processing one link. Errors never escape `process_one`;
/// they end up here as `Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Completed { slug: String },
    MetadataUpdated { slug: String },
    Skipped { slug: String, reason: SkipReason },
    Failed { reason: String },
}

impl ItemOutcome {
    pub fn failed(reason: impl Into<String>) -> Self {
        ItemOutcome::Failed {
            reason: reason.into(),
        }
    }
}
