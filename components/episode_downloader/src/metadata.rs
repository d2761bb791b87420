// components/episode_downloader/src/metadata.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The subset of yt-dlp's `--dump-json` output we care about.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeMetadata {
    pub id: String,

    #[serde(default)]
    pub display_id: Option<String>,

    pub title: String,

    #[serde(default)]
    pub series: Option<String>,

    #[serde(default)]
    pub season_number: Option<u32>,

    #[serde(default)]
    pub episode_number: Option<u32>,

    /// `YYYYMMDD` as yt-dlp reports it
    #[serde(default)]
    pub upload_date: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    pub webpage_url: String,
}

impl EpisodeMetadata {
    /// Ledger key for this episode
    pub fn slug(&self) -> &str {
        self.display_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.id)
    }

    pub fn release_date(&self) -> Option<NaiveDate> {
        self.upload_date
            .as_deref()
            .and_then(|date| NaiveDate::parse_from_str(date, "%Y%m%d").ok())
    }

    /// Key/value pairs for the archive item.
    pub fn archive_fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![
            ("mediatype".to_string(), "movies".to_string()),
            ("title".to_string(), self.title.clone()),
            ("source".to_string(), self.webpage_url.clone()),
        ];

        if let Some(date) = self.release_date() {
            fields.push(("date".to_string(), date.format("%Y-%m-%d").to_string()));
        }
        if let Some(series) = &self.series {
            fields.push(("subject".to_string(), series.clone()));
        }
        if let Some(description) = &self.description {
            fields.push(("description".to_string(), description.clone()));
        }

        fields
    }
}
