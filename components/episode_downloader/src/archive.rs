// components/episode_downloader/src/archive.rs
use std::path::PathBuf;
use std::process::Stdio;
use async_trait::async_trait;
use tokio::process::Command;
use crate::types::DownloadError;

const IA: &str = "ia";

#[async_trait]
pub trait Archiver {
    async fn check_available(&self) -> Result<(), DownloadError>;
    async fn item_exists(&self, identifier: &str) -> Result<bool, DownloadError>;
    async fn upload(&self, identifier: &str, files: &[PathBuf], metadata: &[(String, String)]) -> Result<(), DownloadError>;
    async fn update_metadata(&self, identifier: &str, metadata: &[(String, String)]) -> Result<(), DownloadError>;
}

/// Talks to archive.org through the `ia` command-line client.
pub struct InternetArchiveCli;

fn metadata_flags(flag: &str, metadata: &[(String, String)]) -> Vec<String> {
    metadata
        .iter()
        .map(|(key, value)| format!("--{flag}={key}:{value}"))
        .collect()
}

async fn run_ia(args: &[String]) -> Result<Vec<u8>, DownloadError> {
    let output = Command::new(IA)
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(DownloadError::ArchiveFailed(format!(
            "{IA} {} exited with {}: {}",
            args.first().map(String::as_str).unwrap_or_default(),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    Ok(output.stdout)
}

#[async_trait]
impl Archiver for InternetArchiveCli {
    async fn check_available(&self) -> Result<(), DownloadError> {
        which::which(IA)
            .map(|_| ())
            .map_err(|_| DownloadError::DependencyNotFound(IA))
    }

    async fn item_exists(&self, identifier: &str) -> Result<bool, DownloadError> {
        let stdout = run_ia(&["metadata".to_string(), identifier.to_string()]).await?;

        // Unknown identifiers come back as an empty object
        let value: serde_json::Value = serde_json::from_slice(&stdout)
            .map_err(|e| DownloadError::ArchiveFailed(e.to_string()))?;
        Ok(value.get("metadata").is_some())
    }

    async fn upload(&self, identifier: &str, files: &[PathBuf], metadata: &[(String, String)]) -> Result<(), DownloadError> {
        tracing::info!("Uploading {} files to {identifier}", files.len());

        let mut args = vec!["upload".to_string(), identifier.to_string()];
        args.extend(files.iter().map(|file| file.to_string_lossy().into_owned()));
        args.extend(metadata_flags("metadata", metadata));
        args.extend(["--retries".to_string(), "10".to_string()]);

        run_ia(&args).await.map(|_| ())
    }

    async fn update_metadata(&self, identifier: &str, metadata: &[(String, String)]) -> Result<(), DownloadError> {
        let mut args = vec!["metadata".to_string(), identifier.to_string()];
        args.extend(metadata_flags("modify", metadata));

        run_ia(&args).await.map(|_| ())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_flags_are_key_value_pairs() {
        let flags = metadata_flags(
            "modify",
            &[("title".to_string(), "Why Are We Here?".to_string())],
        );
        assert_eq!(flags, vec!["--modify=title:Why Are We Here?".to_string()]);
    }
}
