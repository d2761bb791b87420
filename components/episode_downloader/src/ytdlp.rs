// components/episode_downloader/src/ytdlp.rs
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use url::Url;
use crate::metadata::EpisodeMetadata;
use crate::types::{Credentials, DownloadError, RunConfig};
use async_trait::async_trait;

const YT_DLP: &str = "yt-dlp";

#[async_trait]
pub trait Downloader {
    async fn check_available(&self) -> Result<(), DownloadError>;
    async fn fetch_metadata(&self, url: &Url, credentials: Option<&Credentials>) -> Result<EpisodeMetadata, DownloadError>;
    async fn download(&self, url: &Url, args: &[String]) -> Result<(), DownloadError>;
    async fn fetch_playlist_urls(&self, url: &Url, credentials: Option<&Credentials>) -> Result<Vec<String>, DownloadError>;
}

fn credential_args(credentials: Option<&Credentials>) -> Vec<String> {
    match credentials {
        Some(credentials) => vec![
            "--username".to_string(),
            credentials.username.clone(),
            "--password".to_string(),
            credentials.password.clone(),
        ],
        None => Vec::new(),
    }
}

/// Arguments for a media download, everything except the URL itself.
pub fn download_args(config: &RunConfig, output_template: &Path, use_aria: bool) -> Vec<String> {
    let mut args = credential_args(config.credentials.as_ref());

    args.extend([
        "--no-playlist".to_string(),
        "--newline".to_string(),
        "--concurrent-fragments".to_string(),
        config.concurrent_fragments.to_string(),
        "--fragment-retries".to_string(),
        config.fragment_retries.to_string(),
    ]);

    if config.fragment_abort {
        args.push("--abort-on-unavailable-fragment".to_string());
    } else {
        args.push("--skip-unavailable-fragments".to_string());
    }

    if use_aria {
        args.extend(["--downloader".to_string(), "aria2c".to_string()]);
    }

    if config.mode != crate::types::Mode::Show {
        args.extend(sidecar_args());
    }

    args.extend(["-o".to_string(), output_template.to_string_lossy().into_owned()]);
    args
}

/// Arguments that refresh the info JSON and thumbnail without touching media.
pub fn metadata_only_args(config: &RunConfig, output_template: &Path) -> Vec<String> {
    let mut args = credential_args(config.credentials.as_ref());
    args.extend([
        "--no-playlist".to_string(),
        "--skip-download".to_string(),
        "--write-info-json".to_string(),
        "--write-thumbnail".to_string(),
        "-o".to_string(),
        output_template.to_string_lossy().into_owned(),
    ]);
    args
}

fn sidecar_args() -> [String; 5] {
    [
        "--write-info-json".to_string(),
        "--write-thumbnail".to_string(),
        "--write-description".to_string(),
        "--write-subs".to_string(),
        "--embed-metadata".to_string(),
    ]
}

pub struct YtDlp;

#[async_trait]
impl Downloader for YtDlp {
    async fn check_available(&self) -> Result<(), DownloadError> {
        which::which(YT_DLP)
            .map(|_| ())
            .map_err(|_| DownloadError::DependencyNotFound(YT_DLP))
    }

    async fn fetch_metadata(&self, url: &Url, credentials: Option<&Credentials>) -> Result<EpisodeMetadata, DownloadError> {
        tracing::debug!("Fetching metadata for {url}");

        let output = Command::new(YT_DLP)
            .args(credential_args(credentials))
            .arg("--dump-json")
            .arg("--no-download")
            .arg("--no-playlist")
            .arg(url.as_str())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            return Err(DownloadError::DownloadFailed(
                String::from_utf8_lossy(&output.stderr).trim().to_string()
            ));
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| DownloadError::MetadataError(e.to_string()))
    }

    async fn download(&self, url: &Url, args: &[String]) -> Result<(), DownloadError> {
        tracing::debug!("Running {YT_DLP} for {url}");

        let status = Command::new(YT_DLP)
            .args(args)
            .arg(url.as_str())
            .status()
            .await?;

        if !status.success() {
            return Err(DownloadError::DownloadFailed(
                format!("{YT_DLP} exited with status: {status}")
            ));
        }

        Ok(())
    }

    async fn fetch_playlist_urls(&self, url: &Url, credentials: Option<&Credentials>) -> Result<Vec<String>, DownloadError> {
        let output = Command::new(YT_DLP)
            .args(credential_args(credentials))
            .arg("--flat-playlist")
            .arg("--print")
            .arg("url")
            .arg(url.as_str())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            return Err(DownloadError::PlaylistError(
                String::from_utf8_lossy(&output.stderr).trim().to_string()
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }
}
