// components/episode_downloader/src/organization.rs
use std::path::{Path, PathBuf};

use crate::metadata::EpisodeMetadata;
use crate::types::Mode;

const UNKNOWN_SERIES: &str = "Unknown Series";

/// Where an episode lands on disk: a directory plus a file stem that
/// yt-dlp completes with the real extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeLocation {
    pub directory: PathBuf,
    pub file_stem: String,
}

impl EpisodeLocation {
    pub fn for_mode(mode: Mode, root: impl AsRef<Path>, metadata: &EpisodeMetadata) -> Self {
        match mode {
            Mode::Show => Self::show(root, metadata),
            Mode::Archive | Mode::Archivist => Self::by_slug(root, metadata.slug()),
        }
    }

    fn show(root: impl AsRef<Path>, metadata: &EpisodeMetadata) -> Self {
        let series = metadata
            .series
            .as_deref()
            .map(sanitize_filename::sanitize)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| UNKNOWN_SERIES.to_string());
        let title = sanitize_filename::sanitize(&metadata.title);

        let mut directory = root.as_ref().join(&series);

        let file_stem = match (metadata.season_number, metadata.episode_number) {
            (Some(season), Some(episode)) => {
                directory.push(format!("Season {season:02}"));
                format!("{series} - S{season:02}E{episode:02} - {title}")
            }
            (Some(season), None) => {
                directory.push(format!("Season {season:02}"));
                format!("{series} - {title}")
            }
            _ => format!("{series} - {title}"),
        };

        Self {
            directory,
            file_stem,
        }
    }

    fn by_slug(root: impl AsRef<Path>, slug: &str) -> Self {
        let slug = sanitize_filename::sanitize(slug);
        Self {
            directory: root.as_ref().join(&slug),
            file_stem: slug,
        }
    }

    /// yt-dlp `-o` template
    pub fn output_template(&self) -> PathBuf {
        self.directory.join(format!("{}.%(ext)s", self.file_stem))
    }
}
