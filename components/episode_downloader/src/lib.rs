// components/episode_downloader/src/lib.rs
mod archive;
mod ledger;
mod metadata;
mod organization;
mod types;
mod utils;
mod ytdlp;

use std::path::Path;
use std::sync::Arc;
use async_trait::async_trait;
use url::Url;

pub use archive::{Archiver, InternetArchiveCli};
pub use ledger::{CompletionLedger, LedgerError, LEDGER_FILE_NAME};
pub use metadata::EpisodeMetadata;
pub use organization::EpisodeLocation;
pub use types::{Credentials, DownloadError, ItemOutcome, Mode, RunConfig, SkipReason};
pub use utils::{archive_identifier, slug_from_url};
pub use ytdlp::{Downloader, YtDlp};

use ytdlp::{download_args, metadata_only_args};

/// Turns a series page into its ordered episode links.
#[async_trait]
pub trait EpisodeLinkSource {
    /// `None` when the listing could not be resolved or was empty
    async fn get_episode_links(&self, series_url: &Url) -> Option<Vec<String>>;
}

pub struct EpisodeDownloader {
    downloader: Arc<dyn Downloader + Send + Sync>,
    archiver: Option<Arc<dyn Archiver + Send + Sync>>,
    aria_available: bool,
    /// Used for series listings, which have no per-call config
    credentials: Option<Credentials>,
}

impl EpisodeDownloader {
    /// Create a downloader backed by yt-dlp (and `ia` in archive mode)
    pub async fn new(config: &RunConfig) -> Result<Self, DownloadError> {
        Self::new_with_tools(
            config,
            Arc::new(YtDlp),
            Arc::new(InternetArchiveCli),
            which::which("aria2c").is_ok(),
        )
        .await
    }

    /// Create a downloader with specific tool implementations
    pub async fn new_with_tools(
        config: &RunConfig,
        downloader: Arc<dyn Downloader + Send + Sync>,
        archiver: Arc<dyn Archiver + Send + Sync>,
        aria_available: bool,
    ) -> Result<Self, DownloadError> {
        downloader.check_available().await?;

        let archiver = if config.mode == Mode::Archive {
            archiver.check_available().await?;
            Some(archiver)
        } else {
            None
        };

        if config.use_aria && !aria_available {
            tracing::warn!("aria2c not found on PATH, using the native downloader");
        }

        tokio::fs::create_dir_all(&config.output_dir).await?;

        Ok(Self {
            downloader,
            archiver,
            aria_available,
            credentials: config.credentials.clone(),
        })
    }

    /// Process a single episode link.
    ///
    /// Skips slugs already in `ledger` and appends the slug on success.
    /// Never returns an error: failures come back as [`ItemOutcome::Failed`].
    pub async fn process_one(
        &self,
        config: &RunConfig,
        link: &str,
        ledger: &mut CompletionLedger,
    ) -> ItemOutcome {
        match self.try_process_one(config, link, ledger).await {
            Ok(outcome) => outcome,
            Err(error) => {
                tracing::debug!("Processing {link} failed: {error:?}");
                ItemOutcome::failed(error.to_string())
            }
        }
    }

    async fn try_process_one(
        &self,
        config: &RunConfig,
        link: &str,
        ledger: &mut CompletionLedger,
    ) -> Result<ItemOutcome, DownloadError> {
        let url = Url::parse(link.trim())
            .map_err(|e| DownloadError::InvalidUrl(format!("{link}: {e}")))?;

        if config.fast_check && !config.update_metadata {
            if let Some(slug) = slug_from_url(&url).filter(|slug| ledger.contains(slug)) {
                tracing::info!("Skipping {slug}: found in ledger (fast check)");
                return Ok(ItemOutcome::Skipped {
                    slug,
                    reason: SkipReason::AlreadyDownloaded,
                });
            }
        }

        let metadata = self
            .downloader
            .fetch_metadata(&url, config.credentials.as_ref())
            .await?;
        let slug = metadata.slug().to_string();

        if !config.update_metadata && ledger.contains(&slug) {
            tracing::info!("Skipping {slug}: found in ledger");
            return Ok(ItemOutcome::Skipped {
                slug,
                reason: SkipReason::AlreadyDownloaded,
            });
        }

        let identifier = archive_identifier(&slug);
        let location = EpisodeLocation::for_mode(config.mode, &config.output_dir, &metadata);

        if config.update_metadata {
            self.refresh_metadata(config, &url, &metadata, &location, &identifier)
                .await?;
            return Ok(ItemOutcome::MetadataUpdated { slug });
        }

        if config.mode == Mode::Archive && !config.ignore_existing {
            if self.archiver()?.item_exists(&identifier).await? {
                tracing::info!("Skipping {slug}: {identifier} already archived");
                ledger.record(&slug)?;
                return Ok(ItemOutcome::Skipped {
                    slug,
                    reason: SkipReason::AlreadyArchived,
                });
            }
        }

        tokio::fs::create_dir_all(&location.directory).await?;
        let args = download_args(
            config,
            &location.output_template(),
            config.use_aria && self.aria_available,
        );
        self.downloader.download(&url, &args).await?;

        if config.mode == Mode::Archive {
            self.upload(config, &identifier, &metadata, &location).await?;
        }

        ledger.record(&slug)?;
        tracing::info!("Finished {slug}");
        Ok(ItemOutcome::Completed { slug })
    }

    fn archiver(&self) -> Result<&(dyn Archiver + Send + Sync), DownloadError> {
        self.archiver
            .as_deref()
            .ok_or(DownloadError::DependencyNotFound("ia"))
    }

    async fn refresh_metadata(
        &self,
        config: &RunConfig,
        url: &Url,
        metadata: &EpisodeMetadata,
        location: &EpisodeLocation,
        identifier: &str,
    ) -> Result<(), DownloadError> {
        if config.mode == Mode::Archive {
            return self
                .archiver()?
                .update_metadata(identifier, &metadata.archive_fields())
                .await;
        }

        tokio::fs::create_dir_all(&location.directory).await?;
        let args = metadata_only_args(config, &location.output_template());
        self.downloader.download(url, &args).await
    }

    async fn upload(
        &self,
        config: &RunConfig,
        identifier: &str,
        metadata: &EpisodeMetadata,
        location: &EpisodeLocation,
    ) -> Result<(), DownloadError> {
        let mut files = Vec::new();
        let mut entries = tokio::fs::read_dir(&location.directory).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                files.push(entry.path());
            }
        }
        files.sort();

        if files.is_empty() {
            return Err(DownloadError::ArchiveFailed(format!(
                "nothing to upload in {}",
                location.directory.display()
            )));
        }

        self.archiver()?
            .upload(identifier, &files, &metadata.archive_fields())
            .await?;

        if !config.keep_after_upload {
            remove_staging(&location.directory).await?;
        }
        Ok(())
    }
}

async fn remove_staging(directory: &Path) -> Result<(), DownloadError> {
    tracing::debug!("Removing uploaded files in {}", directory.display());
    tokio::fs::remove_dir_all(directory).await?;
    Ok(())
}

#[async_trait]
impl EpisodeLinkSource for EpisodeDownloader {
    async fn get_episode_links(&self, series_url: &Url) -> Option<Vec<String>> {
        match self
            .downloader
            .fetch_playlist_urls(series_url, self.credentials.as_ref())
            .await
        {
            Ok(links) if !links.is_empty() => Some(links),
            Ok(_) => {
                tracing::warn!("No episodes listed for {series_url}");
                None
            }
            Err(error) => {
                tracing::error!("Could not list episodes for {series_url}: {error}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use archive::stub::ArchiverStub;
    use assert_matches::assert_matches;
    use std::collections::HashSet;
    use std::fs;
    use tempfile::TempDir;
    use ytdlp::stub::DownloaderStub;

    const LINK: &str = "https://roosterteeth.com/watch/rvb-s1e1";

    fn episode() -> EpisodeMetadata {
        EpisodeMetadata {
            id: "a1b2".to_string(),
            display_id: Some("rvb-s1e1".to_string()),
            title: "Why Are We Here?".to_string(),
            series: Some("Red vs. Blue".to_string()),
            season_number: Some(1),
            episode_number: Some(1),
            upload_date: Some("20030401".to_string()),
            description: None,
            webpage_url: LINK.to_string(),
        }
    }

    struct Fixture {
        dir: TempDir,
        config: RunConfig,
        ledger: CompletionLedger,
    }

    fn fixture(mode: Mode) -> Fixture {
        let dir = TempDir::new().unwrap();
        let config = RunConfig {
            mode,
            output_dir: dir.path().join("out"),
            ..RunConfig::default()
        };
        let ledger = CompletionLedger::load(dir.path().join(LEDGER_FILE_NAME));
        Fixture { dir, config, ledger }
    }

    async fn downloader(
        config: &RunConfig,
        stub: Arc<DownloaderStub>,
        archiver: Arc<ArchiverStub>,
    ) -> EpisodeDownloader {
        EpisodeDownloader::new_with_tools(config, stub, archiver, false)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_downloader_creation() {
        let f = fixture(Mode::Show);
        let result = EpisodeDownloader::new_with_tools(
            &f.config,
            Arc::new(DownloaderStub::default()),
            Arc::new(ArchiverStub::default()),
            false,
        )
        .await;

        assert!(
            result.is_ok(),
            "Downloader creation failed with error: {:?}",
            result.err().unwrap()
        );
        assert!(f.config.output_dir.is_dir());
    }

    #[tokio::test]
    async fn completed_download_is_recorded() {
        let mut f = fixture(Mode::Show);
        let stub = Arc::new(DownloaderStub::with_metadata(episode()));
        let episodes = downloader(&f.config, stub.clone(), Arc::default()).await;

        let outcome = episodes.process_one(&f.config, LINK, &mut f.ledger).await;

        assert_eq!(outcome, ItemOutcome::Completed { slug: "rvb-s1e1".to_string() });
        assert!(f.ledger.contains("rvb-s1e1"));
        assert_eq!(
            fs::read_to_string(f.dir.path().join(LEDGER_FILE_NAME)).unwrap(),
            "rvb-s1e1\n"
        );

        let downloads = stub.downloads.lock().unwrap();
        assert_eq!(downloads.len(), 1);
        assert!(downloads[0].contains(&"--concurrent-fragments".to_string()));
        assert!(f.config.output_dir.join("Red vs. Blue").join("Season 01").is_dir());
    }

    #[tokio::test]
    async fn ledger_hit_skips_download() {
        let mut f = fixture(Mode::Show);
        f.ledger.record("rvb-s1e1").unwrap();
        let stub = Arc::new(DownloaderStub::with_metadata(episode()));
        let episodes = downloader(&f.config, stub.clone(), Arc::default()).await;

        let outcome = episodes.process_one(&f.config, LINK, &mut f.ledger).await;

        assert_matches!(
            outcome,
            ItemOutcome::Skipped { reason: SkipReason::AlreadyDownloaded, .. }
        );
        assert_eq!(stub.metadata_calls.lock().unwrap().len(), 1);
        assert!(stub.downloads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn fast_check_skips_without_fetching_metadata() {
        let mut f = fixture(Mode::Show);
        f.config.fast_check = true;
        f.ledger.record("rvb-s1e1").unwrap();
        let stub = Arc::new(DownloaderStub::with_metadata(episode()));
        let episodes = downloader(&f.config, stub.clone(), Arc::default()).await;

        let outcome = episodes.process_one(&f.config, LINK, &mut f.ledger).await;

        assert_matches!(outcome, ItemOutcome::Skipped { ref slug, .. } if slug == "rvb-s1e1");
        assert!(stub.metadata_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn download_failure_becomes_outcome() {
        let mut f = fixture(Mode::Show);
        let stub = Arc::new(DownloaderStub {
            fail_download: true,
            ..DownloaderStub::with_metadata(episode())
        });
        let episodes = downloader(&f.config, stub, Arc::default()).await;

        let outcome = episodes.process_one(&f.config, LINK, &mut f.ledger).await;

        assert_matches!(outcome, ItemOutcome::Failed { ref reason } if reason.contains("status: 1"));
        assert!(f.ledger.is_empty());
    }

    #[tokio::test]
    async fn invalid_link_fails_before_network() {
        let mut f = fixture(Mode::Show);
        let stub = Arc::new(DownloaderStub::with_metadata(episode()));
        let episodes = downloader(&f.config, stub.clone(), Arc::default()).await;

        let outcome = episodes.process_one(&f.config, "", &mut f.ledger).await;

        assert_matches!(outcome, ItemOutcome::Failed { ref reason } if reason.starts_with("Invalid URL"));
        assert!(stub.metadata_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn existing_archive_item_is_skipped_and_recorded() {
        let mut f = fixture(Mode::Archive);
        let archiver = Arc::new(ArchiverStub {
            existing: HashSet::from(["roosterteeth-rvb-s1e1".to_string()]),
            ..ArchiverStub::default()
        });
        let stub = Arc::new(DownloaderStub::with_metadata(episode()));
        let episodes = downloader(&f.config, stub.clone(), archiver).await;

        let outcome = episodes.process_one(&f.config, LINK, &mut f.ledger).await;

        assert_matches!(
            outcome,
            ItemOutcome::Skipped { reason: SkipReason::AlreadyArchived, .. }
        );
        assert!(f.ledger.contains("rvb-s1e1"));
        assert!(stub.downloads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn archive_mode_uploads_and_cleans_up() {
        let mut f = fixture(Mode::Archive);
        let staging = f.config.output_dir.join("rvb-s1e1");
        fs::create_dir_all(&staging).unwrap();
        fs::write(staging.join("rvb-s1e1.mp4"), b"video").unwrap();

        let archiver = Arc::new(ArchiverStub::default());
        let stub = Arc::new(DownloaderStub::with_metadata(episode()));
        let episodes = downloader(&f.config, stub, archiver.clone()).await;

        let outcome = episodes.process_one(&f.config, LINK, &mut f.ledger).await;

        assert_matches!(outcome, ItemOutcome::Completed { .. });
        let uploads = archiver.uploads.lock().unwrap();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].0, "roosterteeth-rvb-s1e1");
        assert_eq!(uploads[0].1, vec![staging.join("rvb-s1e1.mp4")]);
        assert!(!staging.exists());
    }

    #[tokio::test]
    async fn keep_after_upload_leaves_files() {
        let mut f = fixture(Mode::Archive);
        f.config.keep_after_upload = true;
        let staging = f.config.output_dir.join("rvb-s1e1");
        fs::create_dir_all(&staging).unwrap();
        fs::write(staging.join("rvb-s1e1.mp4"), b"video").unwrap();

        let stub = Arc::new(DownloaderStub::with_metadata(episode()));
        let episodes = downloader(&f.config, stub, Arc::default()).await;

        let outcome = episodes.process_one(&f.config, LINK, &mut f.ledger).await;

        assert_matches!(outcome, ItemOutcome::Completed { .. });
        assert!(staging.join("rvb-s1e1.mp4").exists());
    }

    #[tokio::test]
    async fn failed_upload_is_not_recorded() {
        let mut f = fixture(Mode::Archive);
        let staging = f.config.output_dir.join("rvb-s1e1");
        fs::create_dir_all(&staging).unwrap();
        fs::write(staging.join("rvb-s1e1.mp4"), b"video").unwrap();

        let archiver = Arc::new(ArchiverStub {
            fail_upload: true,
            ..ArchiverStub::default()
        });
        let stub = Arc::new(DownloaderStub::with_metadata(episode()));
        let episodes = downloader(&f.config, stub, archiver).await;

        let outcome = episodes.process_one(&f.config, LINK, &mut f.ledger).await;

        assert_matches!(outcome, ItemOutcome::Failed { ref reason } if reason.contains("503"));
        assert!(f.ledger.is_empty());
        assert!(staging.exists());
    }

    #[tokio::test]
    async fn update_metadata_ignores_ledger() {
        let mut f = fixture(Mode::Show);
        f.config.update_metadata = true;
        f.ledger.record("rvb-s1e1").unwrap();
        let stub = Arc::new(DownloaderStub::with_metadata(episode()));
        let episodes = downloader(&f.config, stub.clone(), Arc::default()).await;

        let outcome = episodes.process_one(&f.config, LINK, &mut f.ledger).await;

        assert_eq!(outcome, ItemOutcome::MetadataUpdated { slug: "rvb-s1e1".to_string() });
        let downloads = stub.downloads.lock().unwrap();
        assert!(downloads[0].contains(&"--skip-download".to_string()));
        assert_eq!(f.ledger.len(), 1);
    }

    #[tokio::test]
    async fn update_metadata_in_archive_mode_pushes_to_archive() {
        let mut f = fixture(Mode::Archive);
        f.config.update_metadata = true;
        let archiver = Arc::new(ArchiverStub::default());
        let stub = Arc::new(DownloaderStub::with_metadata(episode()));
        let episodes = downloader(&f.config, stub.clone(), archiver.clone()).await;

        let outcome = episodes.process_one(&f.config, LINK, &mut f.ledger).await;

        assert_matches!(outcome, ItemOutcome::MetadataUpdated { .. });
        assert_eq!(
            *archiver.metadata_updates.lock().unwrap(),
            vec!["roosterteeth-rvb-s1e1".to_string()]
        );
        assert!(stub.downloads.lock().unwrap().is_empty());
        assert!(f.ledger.is_empty());
    }

    #[tokio::test]
    async fn series_listing_uses_credentials() {
        let mut f = fixture(Mode::Show);
        let credentials = Credentials {
            username: "first@roosterteeth.com".to_string(),
            password: "sponsor".to_string(),
        };
        f.config.credentials = Some(credentials.clone());
        let stub = Arc::new(DownloaderStub {
            playlist: Some(vec![LINK.to_string()]),
            ..DownloaderStub::default()
        });
        let episodes = downloader(&f.config, stub.clone(), Arc::default()).await;
        let url = Url::parse("https://roosterteeth.com/series/red-vs-blue").unwrap();

        assert_eq!(episodes.get_episode_links(&url).await, Some(vec![LINK.to_string()]));
        assert_eq!(
            *stub.playlist_credentials.lock().unwrap(),
            vec![Some(credentials)]
        );
    }

    #[tokio::test]
    async fn empty_playlist_resolves_to_none() {
        let f = fixture(Mode::Show);
        let stub = Arc::new(DownloaderStub {
            playlist: Some(Vec::new()),
            ..DownloaderStub::default()
        });
        let episodes = downloader(&f.config, stub, Arc::default()).await;
        let url = Url::parse("https://roosterteeth.com/series/red-vs-blue").unwrap();

        assert_eq!(episodes.get_episode_links(&url).await, None);
    }

    #[tokio::test]
    async fn playlist_links_keep_order() {
        let f = fixture(Mode::Show);
        let links = vec![
            "https://roosterteeth.com/watch/rvb-s1e1".to_string(),
            "https://roosterteeth.com/watch/rvb-s1e2".to_string(),
        ];
        let stub = Arc::new(DownloaderStub {
            playlist: Some(links.clone()),
            ..DownloaderStub::default()
        });
        let episodes = downloader(&f.config, stub, Arc::default()).await;
        let url = Url::parse("https://roosterteeth.com/series/red-vs-blue").unwrap();

        assert_eq!(episodes.get_episode_links(&url).await, Some(links));
    }
}
