//! Feed builder: turns Drive folder listings into the per-source song files
//! the browser reads.
//!
//! For every drive in the catalog configuration, the folder to list comes
//! from `DRIVE_FOLDER_ID_<ID>` (drive id uppercased). Drives without a folder
//! are skipped; a drive that fails to list is logged and the rest continue.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::catalog::{CatalogDocument, SongRecord, SourceConfig};

pub const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";
pub const API_KEY_VAR: &str = "GOOGLE_API_KEY";
pub const LEGACY_FOLDER_VAR: &str = "DRIVE_FOLDER_ID";
pub const LEGACY_OUTPUT_VAR: &str = "OUTPUT_JSON_PATH";
pub const LEGACY_OUTPUT_FILE: &str = "songs.json";

const LIST_PAGE_SIZE: u32 = 100;

/// A file entry from the Drive `files.list` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileListResponse {
    #[serde(default)]
    files: Vec<DriveFile>,
    #[serde(default)]
    next_page_token: Option<String>,
}

/// Direct-download link written into the feed for a Drive file.
pub fn drive_download_url(file_id: &str) -> String {
    format!(
        "https://drive.usercontent.google.com/u/0/uc?id={}&export=download",
        file_id
    )
}

/// Drop a trailing `.pdf` (any case).
pub fn strip_pdf_extension(name: &str) -> &str {
    let len = name.len();
    if len >= 4 && name.is_char_boundary(len - 4) && name[len - 4..].eq_ignore_ascii_case(".pdf") {
        &name[..len - 4]
    } else {
        name
    }
}

/// Environment variable holding the folder id for a drive.
pub fn folder_env_var(drive_id: &str) -> String {
    format!("DRIVE_FOLDER_ID_{}", drive_id.to_uppercase())
}

/// Build sorted, renumbered song records from a folder listing.
pub fn build_records(files: &[DriveFile]) -> Vec<SongRecord> {
    let mut songs: Vec<SongRecord> = files
        .iter()
        .map(|f| SongRecord {
            id: None,
            name: strip_pdf_extension(&f.name).to_string(),
            artist: None,
            pdf_url: drive_download_url(&f.id),
        })
        .collect();
    songs.sort_by_cached_key(|s| s.name.to_lowercase());
    for (idx, song) in songs.iter_mut().enumerate() {
        song.id = Some(idx as u32 + 1);
    }
    songs
}

/// Pretty JSON with a trailing newline, creating parent directories.
pub fn write_feed(path: &Path, songs: &[SongRecord]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut json = serde_json::to_string_pretty(songs)?;
    json.push('\n');
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    info!("Wrote {} song(s) to {}", songs.len(), path.display());
    Ok(())
}

/// Minimal Drive v3 client authenticated with an API key.
pub struct DriveClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl DriveClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DRIVE_API_BASE)
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    /// List every PDF in a folder, following page tokens.
    pub async fn list_pdf_files(&self, folder_id: &str) -> anyhow::Result<Vec<DriveFile>> {
        let query = format!(
            "'{}' in parents and (mimeType='application/pdf' or name contains '.pdf') and trashed=false",
            folder_id
        );
        let url = format!("{}/files", self.base_url.trim_end_matches('/'));
        let page_size = LIST_PAGE_SIZE.to_string();

        info!("Querying folder: {}", folder_id);
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut params: Vec<(&str, &str)> = vec![
                ("q", query.as_str()),
                ("spaces", "drive"),
                ("fields", "nextPageToken, files(id, name, mimeType)"),
                ("pageSize", page_size.as_str()),
                ("key", self.api_key.as_str()),
            ];
            if let Some(token) = page_token.as_deref() {
                params.push(("pageToken", token));
            }

            let response = self
                .client
                .get(&url)
                .query(&params)
                .send()
                .await
                .context("Failed to reach Drive API")?;
            let status = response.status();
            if !status.is_success() {
                let hint = match status.as_u16() {
                    404 => " (check that the folder id is correct and the folder is shared)",
                    403 => " (check that the folder is shared publicly and the API key is valid)",
                    _ => "",
                };
                anyhow::bail!("Drive API returned status: {}{}", status, hint);
            }
            let page: FileListResponse = response
                .json()
                .await
                .context("Failed to parse Drive API response")?;
            files.extend(page.files);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }
        info!("Found {} file(s)", files.len());
        Ok(files)
    }
}

/// Result of a whole build run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<String>,
    pub failed: Vec<String>,
}

/// Build every configured drive's feed next to `config_path`.
///
/// `env` looks up folder ids; pass `|k| std::env::var(k).ok()` in production.
pub async fn build_all(
    config_path: &Path,
    drive: &DriveClient,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<BuildReport> {
    let content = std::fs::read_to_string(config_path)
        .with_context(|| format!("Config file not found: {}", config_path.display()))?;
    let doc: CatalogDocument = serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in config file: {}", config_path.display()))?;
    if doc.drives.is_empty() {
        anyhow::bail!("No drives configured in {}", config_path.display());
    }
    info!("Found {} drive(s) to process", doc.drives.len());

    let base_dir = config_path.parent().unwrap_or_else(|| Path::new(""));
    let mut report = BuildReport::default();

    for source in &doc.drives {
        let var = folder_env_var(&source.id);
        let Some(folder_id) = env(&var) else {
            warn!("{} not set, skipping {}", var, source.id);
            report.skipped.push(source.id.clone());
            continue;
        };
        let output = base_dir.join(&source.output_file);
        match build_one(drive, source, &folder_id, &output).await {
            Ok(()) => report.written.push(output),
            Err(e) => {
                error!("Error processing {}: {:#}", source.id, e);
                report.failed.push(source.id.clone());
            }
        }
    }

    if let Some(folder_id) = env(LEGACY_FOLDER_VAR) {
        warn!("Legacy {} set, also generating a single feed", LEGACY_FOLDER_VAR);
        let output = env(LEGACY_OUTPUT_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| base_dir.join(LEGACY_OUTPUT_FILE));
        let files = drive.list_pdf_files(&folder_id).await?;
        write_feed(&output, &build_records(&files))?;
        report.written.push(output);
    }

    Ok(report)
}

async fn build_one(
    drive: &DriveClient,
    source: &SourceConfig,
    folder_id: &str,
    output: &Path,
) -> anyhow::Result<()> {
    info!(
        "Processing drive: {} ({}) -> {}",
        source.name,
        source.id,
        output.display()
    );
    let files = drive.list_pdf_files(folder_id).await?;
    if files.is_empty() {
        warn!("No PDF files found in folder for {}", source.name);
    }
    write_feed(output, &build_records(&files))
}
