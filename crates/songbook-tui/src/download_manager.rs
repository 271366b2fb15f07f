//! Download manager for sheet-music PDFs.
//!
//! Streams a resolved direct-download URL into the downloads directory on a
//! background task and reports progress back over a channel.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use futures_util::StreamExt;
use songbook_core::resolver::DownloadTarget;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tracing::{error, info};

/// Report progress at most once per this many bytes.
const PROGRESS_STEP: u64 = 256 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub enum DownloadStatus {
    Downloading { received: u64, total: Option<u64> },
    Downloaded { path: PathBuf, at: DateTime<Local> },
    Failed(String),
}

impl DownloadStatus {
    /// Short badge for the song row.
    pub fn badge(&self) -> String {
        match self {
            Self::Downloading {
                received,
                total: Some(total),
            } if *total > 0 => format!("{}%", received * 100 / total),
            Self::Downloading { received, .. } => format!("{}k", received / 1024),
            Self::Downloaded { at, .. } => format!("saved {}", at.format("%H:%M")),
            Self::Failed(_) => "failed".to_string(),
        }
    }
}

/// Progress update from a download task, keyed by URL.
#[derive(Debug, Clone)]
pub struct DownloadProgress {
    pub url: String,
    pub status: DownloadStatus,
}

pub struct DownloadManager {
    /// Destination per URL while its download is running.
    in_flight: HashMap<String, PathBuf>,
    download_dir: PathBuf,
    client: reqwest::Client,
    progress_tx: mpsc::Sender<DownloadProgress>,
    progress_rx: mpsc::Receiver<DownloadProgress>,
}

impl DownloadManager {
    pub fn new(download_dir: PathBuf) -> Self {
        let (progress_tx, progress_rx) = mpsc::channel(100);
        Self {
            in_flight: HashMap::new(),
            download_dir,
            client: reqwest::Client::new(),
            progress_tx,
            progress_rx,
        }
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Start fetching `target`. Returns the path the file will be written to.
    pub async fn start_download(&mut self, target: &DownloadTarget) -> Result<PathBuf, String> {
        if self.in_flight.contains_key(&target.url) {
            return Err("Already downloading".to_string());
        }

        tokio::fs::create_dir_all(&self.download_dir)
            .await
            .map_err(|e| format!("Failed to create download directory: {}", e))?;

        let filename = sanitize_filename(&target.filename_or_fallback());
        let dest = unique_path(&self.download_dir, &filename, |p| {
            p.exists() || self.in_flight.values().any(|d| d == p)
        });
        info!("Starting download of {} -> {}", target.url, dest.display());

        self.in_flight.insert(target.url.clone(), dest.clone());

        let client = self.client.clone();
        let progress_tx = self.progress_tx.clone();
        let url = target.url.clone();
        let dest_clone = dest.clone();
        tokio::spawn(async move {
            let result = do_download(&client, &url, &dest_clone, &progress_tx).await;
            let status = match result {
                Ok(()) => {
                    info!("Download complete: {}", dest_clone.display());
                    DownloadStatus::Downloaded {
                        path: dest_clone,
                        at: Local::now(),
                    }
                }
                Err(e) => {
                    error!("Download of {} failed: {:#}", url, e);
                    DownloadStatus::Failed(e.to_string())
                }
            };
            let _ = progress_tx.send(DownloadProgress { url, status }).await;
        });

        Ok(dest)
    }

    /// Drain pending progress updates and return them.
    pub fn update_statuses(&mut self) -> Vec<DownloadProgress> {
        let mut updates = Vec::new();
        while let Ok(progress) = self.progress_rx.try_recv() {
            if !matches!(progress.status, DownloadStatus::Downloading { .. }) {
                self.in_flight.remove(&progress.url);
            }
            updates.push(progress);
        }
        updates
    }

    pub fn is_downloading(&self, url: &str) -> bool {
        self.in_flight.contains_key(url)
    }
}

async fn do_download(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
    progress_tx: &mpsc::Sender<DownloadProgress>,
) -> anyhow::Result<()> {
    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        anyhow::bail!("HTTP {}", response.status());
    }
    let total = response.content_length();

    let partial = partial_path(dest);
    let result = async {
        let mut file = tokio::fs::File::create(&partial).await?;
        let mut stream = response.bytes_stream();
        let mut received = 0u64;
        let mut last_report = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            received += chunk.len() as u64;
            if received - last_report >= PROGRESS_STEP {
                last_report = received;
                let _ = progress_tx
                    .send(DownloadProgress {
                        url: url.to_string(),
                        status: DownloadStatus::Downloading { received, total },
                    })
                    .await;
            }
        }
        file.flush().await?;
        drop(file);
        tokio::fs::rename(&partial, dest).await?;
        Ok::<(), anyhow::Error>(())
    }
    .await;

    if result.is_err() {
        let _ = tokio::fs::remove_file(&partial).await;
    }
    result
}

/// `<dest>.part`, written next to the target and renamed once complete.
fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

/// Replace characters that are not allowed in filenames on common platforms.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let trimmed = cleaned.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        "download.pdf".to_string()
    } else {
        trimmed.to_string()
    }
}

/// `dir/name`, or `dir/name (n).ext` for the first `n` that is not taken.
fn unique_path(dir: &Path, filename: &str, is_taken: impl Fn(&Path) -> bool) -> PathBuf {
    let candidate = dir.join(filename);
    if !is_taken(&candidate) {
        return candidate;
    }
    let path = Path::new(filename);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);
    let ext = path.extension().and_then(|e| e.to_str());
    (1..)
        .map(|n| match ext {
            Some(ext) => dir.join(format!("{} ({}).{}", stem, n, ext)),
            None => dir.join(format!("{} ({})", stem, n)),
        })
        .find(|p| !is_taken(p))
        .unwrap_or(candidate)
}
