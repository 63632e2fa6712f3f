//! First-run download of the dictionary dataset.
//!
//! While the dataset file is absent every query is answered with a status
//! row instead of a lookup. Selecting that row starts one background
//! download: probe connectivity, pick the primary or mirror archive, stream
//! it to a `.download` sibling of the dataset, unpack it, then delete the
//! temporary file.

use std::fs;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use cidian_config::download::DownloadConfig;
use cidian_types::{ItemAction, ResultItem};
use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;

/// Encoded states of the state cell; `0..=100` is a download percentage
const NOT_STARTED: u8 = u8::MAX;
const COMPLETE: u8 = u8::MAX - 1;

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Download server answered HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Archive did not contain {0}")]
    DatasetMissing(String),

    #[error("Extraction task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("A download is already running")]
    AlreadyRunning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadState {
    NotStarted,
    InProgress(u8),
    Complete,
}

/// Archive location chosen for one download attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadSource {
    Primary(String),
    Mirror(String),
}

impl DownloadSource {
    pub fn url(&self) -> &str {
        match self {
            DownloadSource::Primary(url) | DownloadSource::Mirror(url) => url,
        }
    }
}

pub struct BootstrapManager {
    dataset: PathBuf,
    config: DownloadConfig,
    client: reqwest::Client,
    state: AtomicU8,
    last_error: Mutex<Option<String>>,
}

impl BootstrapManager {
    pub fn new(dataset: impl Into<PathBuf>, config: DownloadConfig) -> Result<Self, BootstrapError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            dataset: dataset.into(),
            config,
            client,
            state: AtomicU8::new(NOT_STARTED),
            last_error: Mutex::new(None),
        })
    }

    pub fn dataset_path(&self) -> &Path {
        &self.dataset
    }

    /// True while the dataset file is absent
    pub fn needs_bootstrap(&self) -> bool {
        !self.dataset.exists()
    }

    pub fn state(&self) -> DownloadState {
        match self.state.load(Ordering::SeqCst) {
            NOT_STARTED => DownloadState::NotStarted,
            COMPLETE => DownloadState::Complete,
            percent => DownloadState::InProgress(percent),
        }
    }

    /// Error of the last failed attempt, cleared by a successful one
    pub fn last_error(&self) -> Option<String> {
        self.last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Row shown instead of lookup results while the dataset is missing
    pub fn status(&self) -> ResultItem {
        match self.state() {
            DownloadState::InProgress(percent) => {
                let title = if percent == 0 {
                    "Downloading dictionary database...".to_string()
                } else {
                    format!("Downloading dictionary database... {percent} %")
                };
                ResultItem::new(
                    title,
                    "Press enter to refresh percentage.",
                    ItemAction::RefreshProgress,
                )
            }
            DownloadState::NotStarted | DownloadState::Complete => {
                let subtitle = match self.last_error() {
                    Some(error) => format!("Download failed: {error}. Press enter to retry"),
                    None => format!(
                        "Press enter to download to {} (~230MB)",
                        self.dataset.display()
                    ),
                };
                ResultItem::new(
                    "Dictionary database not found (~1GB Decompressed)",
                    subtitle,
                    ItemAction::StartDownload,
                )
            }
        }
    }

    /// Claim the single download slot, flipping the state to `InProgress(0)`
    fn claim(&self) -> bool {
        self.state
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |state| {
                let free = state == NOT_STARTED || (state == COMPLETE && self.needs_bootstrap());
                free.then_some(0)
            })
            .is_ok()
    }

    /// Start a background download unless one is already running.
    ///
    /// Returns whether this call started it.
    pub fn begin_download(self: &Arc<Self>) -> bool {
        if !self.claim() {
            tracing::debug!("Download already running or finished");
            return false;
        }

        let manager = Arc::clone(self);
        tokio::spawn(async move {
            // Outcome is recorded in the state cell and last_error
            let _ = manager.run().await;
        });
        true
    }

    /// Download and unpack the dataset, waiting for the outcome
    pub async fn download(&self) -> Result<(), BootstrapError> {
        if !self.claim() {
            return Err(BootstrapError::AlreadyRunning);
        }
        self.run().await
    }

    async fn run(&self) -> Result<(), BootstrapError> {
        let result = self.transfer().await;

        match &result {
            Ok(()) => {
                tracing::info!("Dictionary ready at {}", self.dataset.display());
                *self.last_error.lock().unwrap_or_else(PoisonError::into_inner) = None;
                self.state.store(COMPLETE, Ordering::SeqCst);
            }
            Err(e) => {
                tracing::error!("Dictionary download failed: {}", e);
                *self.last_error.lock().unwrap_or_else(PoisonError::into_inner) = Some(e.to_string());
                self.state.store(NOT_STARTED, Ordering::SeqCst);
            }
        }

        result
    }

    /// Primary archive when the probe answers in time, mirror otherwise
    pub async fn select_source(&self) -> DownloadSource {
        if self.probe().await {
            DownloadSource::Primary(self.config.primary_url.clone())
        } else {
            tracing::info!("Connectivity probe failed, using mirror");
            DownloadSource::Mirror(self.config.mirror_url.clone())
        }
    }

    async fn probe(&self) -> bool {
        let timeout = Duration::from_millis(self.config.probe_timeout_ms);
        match self.client.get(&self.config.probe_url).timeout(timeout).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!("Probe failed: {}", e);
                false
            }
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.dataset.file_name().unwrap_or_default().to_os_string();
        name.push(".download");
        self.dataset.with_file_name(name)
    }

    fn dataset_dir(&self) -> PathBuf {
        match self.dataset.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    async fn transfer(&self) -> Result<(), BootstrapError> {
        let source = self.select_source().await;
        let dir = self.dataset_dir();
        tokio::fs::create_dir_all(&dir).await?;

        let tmp = self.temp_path();
        tracing::info!("Downloading dictionary from {}", source.url());

        let mut result = self.fetch(source.url(), &tmp).await;
        if result.is_ok() {
            result = self.unpack(&tmp, &dir).await;
        }

        match tokio::fs::remove_file(&tmp).await {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
                tracing::warn!("Could not remove {}: {}", tmp.display(), e);
            }
            _ => {}
        }

        result?;
        if self.needs_bootstrap() {
            return Err(BootstrapError::DatasetMissing(
                self.dataset.file_name().unwrap_or_default().to_string_lossy().into_owned(),
            ));
        }
        Ok(())
    }

    fn set_progress(&self, percent: u8) {
        self.state.store(percent.min(100), Ordering::SeqCst);
    }

    async fn fetch(&self, url: &str, dest: &Path) -> Result<(), BootstrapError> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(BootstrapError::Status(response.status()));
        }

        let total_size = response.content_length().filter(|size| *size > 0);
        let mut downloaded: u64 = 0;

        let mut file = tokio::fs::File::create(dest).await?;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;

            if let Some(total) = total_size {
                self.set_progress((downloaded * 100 / total).min(100) as u8);
            }
        }

        file.flush().await?;
        tracing::debug!("Downloaded {} bytes to {}", downloaded, dest.display());
        Ok(())
    }

    async fn unpack(&self, archive: &Path, dir: &Path) -> Result<(), BootstrapError> {
        let archive = archive.to_path_buf();
        let dir = dir.to_path_buf();
        let dataset_name = self.dataset.file_name().map(|name| name.to_os_string());

        tokio::task::spawn_blocking(move || extract(&archive, &dir, dataset_name.as_deref()))
            .await?
    }
}

/// Unpack into a staging directory next to the dataset, then move entries
/// into place with the dataset file last. A failure midway never leaves the
/// dataset file behind.
fn extract(
    archive: &Path,
    dir: &Path,
    dataset_name: Option<&std::ffi::OsStr>,
) -> Result<(), BootstrapError> {
    let staging = tempfile::Builder::new()
        .prefix(".extracting")
        .tempdir_in(dir)?;

    let file = fs::File::open(archive)?;
    let mut zip = zip::ZipArchive::new(BufReader::new(file))?;
    tracing::info!("Extracting {} entries", zip.len());
    zip.extract(staging.path())?;

    let mut entries = fs::read_dir(staging.path())?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(|path| path.file_name() == dataset_name);

    for src in entries {
        let Some(name) = src.file_name() else {
            continue;
        };
        let dest = dir.join(name);
        if dest.is_dir() {
            fs::remove_dir_all(&dest)?;
        } else if dest.exists() {
            fs::remove_file(&dest)?;
        }
        fs::rename(&src, &dest)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Write};

    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};
    use zip::write::SimpleFileOptions;

    use super::*;

    fn archive(files: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in files {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn config(server: &MockServer) -> DownloadConfig {
        DownloadConfig {
            primary_url: format!("{}/primary.zip", server.uri()),
            mirror_url: format!("{}/mirror.zip", server.uri()),
            probe_url: format!("{}/generate_204", server.uri()),
            probe_timeout_ms: 200,
        }
    }

    async fn probe_answers(server: &MockServer, template: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path("/generate_204"))
            .respond_with(template)
            .mount(server)
            .await;
    }

    async fn serves(server: &MockServer, at: &str, template: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(at))
            .respond_with(template)
            .mount(server)
            .await;
    }

    fn manager(dir: &Path, server: &MockServer) -> BootstrapManager {
        BootstrapManager::new(dir.join("dicts").join("ecdict.db"), config(server)).unwrap()
    }

    #[tokio::test]
    async fn probe_success_selects_primary() {
        let server = MockServer::start().await;
        probe_answers(&server, ResponseTemplate::new(204)).await;
        let dir = tempfile::tempdir().unwrap();

        let source = manager(dir.path(), &server).select_source().await;

        assert_eq!(source, DownloadSource::Primary(format!("{}/primary.zip", server.uri())));
    }

    #[tokio::test]
    async fn probe_timeout_selects_mirror() {
        let server = MockServer::start().await;
        probe_answers(
            &server,
            ResponseTemplate::new(204).set_delay(Duration::from_secs(2)),
        )
        .await;
        let dir = tempfile::tempdir().unwrap();

        let source = manager(dir.path(), &server).select_source().await;

        assert_eq!(source, DownloadSource::Mirror(format!("{}/mirror.zip", server.uri())));
    }

    #[tokio::test]
    async fn probe_error_status_selects_mirror() {
        let server = MockServer::start().await;
        probe_answers(&server, ResponseTemplate::new(503)).await;
        let dir = tempfile::tempdir().unwrap();

        let source = manager(dir.path(), &server).select_source().await;

        assert!(matches!(source, DownloadSource::Mirror(_)));
    }

    #[tokio::test]
    async fn download_unpacks_the_dataset() {
        let server = MockServer::start().await;
        probe_answers(&server, ResponseTemplate::new(204)).await;
        serves(
            &server,
            "/primary.zip",
            ResponseTemplate::new(200)
                .set_body_bytes(archive(&[("ecdict.db", b"sqlite"), ("README.md", b"ecdict")])),
        )
        .await;
        let dir = tempfile::tempdir().unwrap();
        let manager = manager(dir.path(), &server);

        assert!(manager.needs_bootstrap());

        manager.download().await.unwrap();

        assert!(!manager.needs_bootstrap());
        assert_eq!(manager.state(), DownloadState::Complete);
        assert_eq!(manager.last_error(), None);

        let dicts = dir.path().join("dicts");
        assert_eq!(fs::read(dicts.join("ecdict.db")).unwrap(), b"sqlite");
        assert!(dicts.join("README.md").exists());
        assert!(!dicts.join("ecdict.db.download").exists());
        // Only the unpacked files remain, no staging leftovers
        assert_eq!(fs::read_dir(&dicts).unwrap().count(), 2);
    }

    #[tokio::test]
    async fn download_uses_mirror_when_offline() {
        let server = MockServer::start().await;
        probe_answers(&server, ResponseTemplate::new(500)).await;
        serves(
            &server,
            "/mirror.zip",
            ResponseTemplate::new(200).set_body_bytes(archive(&[("ecdict.db", b"mirror")])),
        )
        .await;
        let dir = tempfile::tempdir().unwrap();
        let manager = manager(dir.path(), &server);

        manager.download().await.unwrap();

        assert_eq!(fs::read(manager.dataset_path()).unwrap(), b"mirror");
    }

    #[tokio::test]
    async fn failed_transfer_is_recoverable() {
        let server = MockServer::start().await;
        probe_answers(&server, ResponseTemplate::new(204)).await;
        serves(&server, "/primary.zip", ResponseTemplate::new(404)).await;
        let dir = tempfile::tempdir().unwrap();
        let manager = manager(dir.path(), &server);

        let result = manager.download().await;

        assert!(matches!(result, Err(BootstrapError::Status(_))));
        assert!(manager.needs_bootstrap());
        assert_eq!(manager.state(), DownloadState::NotStarted);
        assert!(!dir.path().join("dicts").join("ecdict.db.download").exists());

        let status = manager.status();
        assert_eq!(status.action, ItemAction::StartDownload);
        assert!(status.subtitle.starts_with("Download failed"));

        // A fresh attempt is allowed and fails the same way
        assert!(matches!(manager.download().await, Err(BootstrapError::Status(_))));
    }

    #[tokio::test]
    async fn corrupt_archive_is_not_ready() {
        let server = MockServer::start().await;
        probe_answers(&server, ResponseTemplate::new(204)).await;
        serves(
            &server,
            "/primary.zip",
            ResponseTemplate::new(200).set_body_bytes(b"definitely not a zip".to_vec()),
        )
        .await;
        let dir = tempfile::tempdir().unwrap();
        let manager = manager(dir.path(), &server);

        let result = manager.download().await;

        assert!(matches!(result, Err(BootstrapError::Archive(_))));
        assert!(manager.needs_bootstrap());
        let leftovers = fs::read_dir(dir.path().join("dicts")).unwrap().count();
        assert_eq!(leftovers, 0);
    }

    #[tokio::test]
    async fn archive_without_dataset_is_not_ready() {
        let server = MockServer::start().await;
        probe_answers(&server, ResponseTemplate::new(204)).await;
        serves(
            &server,
            "/primary.zip",
            ResponseTemplate::new(200).set_body_bytes(archive(&[("other.db", b"x")])),
        )
        .await;
        let dir = tempfile::tempdir().unwrap();
        let manager = manager(dir.path(), &server);

        let result = manager.download().await;

        assert!(matches!(result, Err(BootstrapError::DatasetMissing(_))));
        assert_eq!(manager.state(), DownloadState::NotStarted);
    }

    #[tokio::test]
    async fn only_one_download_runs() {
        let server = MockServer::start().await;
        probe_answers(&server, ResponseTemplate::new(204)).await;
        serves(
            &server,
            "/primary.zip",
            ResponseTemplate::new(200)
                .set_body_bytes(archive(&[("ecdict.db", b"sqlite")]))
                .set_delay(Duration::from_millis(300)),
        )
        .await;
        let dir = tempfile::tempdir().unwrap();
        let manager = Arc::new(manager(dir.path(), &server));

        assert!(manager.begin_download());
        assert_eq!(manager.state(), DownloadState::InProgress(0));
        assert!(!manager.begin_download());
        assert!(matches!(manager.download().await, Err(BootstrapError::AlreadyRunning)));

        let status = manager.status();
        assert_eq!(status.action, ItemAction::RefreshProgress);

        tokio::time::timeout(Duration::from_secs(5), async {
            while manager.state() != DownloadState::Complete {
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        })
        .await
        .expect("download never completed");

        assert!(!manager.needs_bootstrap());
        assert!(!manager.begin_download());
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }

    #[test]
    fn status_texts() {
        let manager = BootstrapManager::new("dicts/ecdict.db", DownloadConfig::default()).unwrap();

        let missing = manager.status();
        assert_eq!(missing.title, "Dictionary database not found (~1GB Decompressed)");
        assert_eq!(missing.subtitle, "Press enter to download to dicts/ecdict.db (~230MB)");

        manager.set_progress(42);
        assert_eq!(manager.state(), DownloadState::InProgress(42));
        assert_eq!(manager.status().title, "Downloading dictionary database... 42 %");
    }

    #[test]
    fn temp_file_sits_next_to_the_dataset() {
        let manager = BootstrapManager::new("dicts/ecdict.db", DownloadConfig::default()).unwrap();
        assert_eq!(manager.temp_path(), PathBuf::from("dicts/ecdict.db.download"));
        assert_eq!(manager.dataset_dir(), PathBuf::from("dicts"));

        let bare = BootstrapManager::new("ecdict.db", DownloadConfig::default()).unwrap();
        assert_eq!(bare.dataset_dir(), PathBuf::from("."));
    }
}
