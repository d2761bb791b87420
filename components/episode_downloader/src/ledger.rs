// components/episode_downloader/src/ledger.rs
//! Append-only log of slugs that finished downloading in earlier runs.
//!
//! The file holds one slug per line. It is read once at startup and only
//! appended to afterwards, so a partially written or corrupt file never
//! stops a run: whatever could be read is used.

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const LEDGER_FILE_NAME: &str = "downloaded.log";

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("failed to append {slug} to ledger {path}")]
    Append {
        slug: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug)]
pub struct CompletionLedger {
    path: PathBuf,
    slugs: HashSet<String>,
}

impl CompletionLedger {
    /// Load the ledger at `path`. A missing file gives an empty ledger and a
    /// read error part way through keeps the slugs read so far.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut slugs = HashSet::new();

        match File::open(&path) {
            Ok(file) => {
                // Lines are opaque: bytes that aren't UTF-8 are decoded lossily
                for line in BufReader::new(file).split(b'\n') {
                    match line {
                        Ok(bytes) => {
                            let line = String::from_utf8_lossy(&bytes);
                            let slug = line.trim();
                            if !slug.is_empty() {
                                slugs.insert(slug.to_string());
                            }
                        }
                        Err(error) => {
                            tracing::warn!(
                                "Error reading ledger {}: {error}; keeping {} slugs",
                                path.display(),
                                slugs.len()
                            );
                            break;
                        }
                    }
                }
            }
            Err(error) if error.kind() == ErrorKind::NotFound => {
                tracing::debug!("No ledger at {}, starting empty", path.display());
            }
            Err(error) => {
                tracing::warn!("Error opening ledger {}: {error}", path.display());
            }
        }

        tracing::info!("Loaded {} previously downloaded slugs", slugs.len());
        Self { path, slugs }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.slugs.contains(slug)
    }

    pub fn len(&self) -> usize {
        self.slugs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slugs.is_empty()
    }

    /// Append `slug` to the file and the in-memory set.
    ///
    /// Returns `false` without touching the file when the slug is already known.
    pub fn record(&mut self, slug: &str) -> Result<bool, LedgerError> {
        if self.slugs.contains(slug) {
            return Ok(false);
        }

        let append = |path: &Path| -> std::io::Result<()> {
            let mut file = OpenOptions::new().create(true).append(true).open(path)?;
            writeln!(file, "{slug}")
        };

        append(&self.path).map_err(|source| LedgerError::Append {
            slug: slug.to_string(),
            path: self.path.clone(),
            source,
        })?;

        self.slugs.insert(slug.to_string());
        Ok(true)
    }
}
