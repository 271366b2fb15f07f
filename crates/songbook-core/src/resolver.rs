//! Share-link rewriting for the file host (Google Drive).
//!
//! A catalog record carries whatever link the feed author pasted: a `?id=`
//! style link, a `/file/d/<id>/view` share link, or something else entirely.
//! The resolver pulls the file identifier out when it can and derives the
//! canonical view and direct-download URLs from it. When it can't, callers
//! silently fall back to the original link.

use std::sync::LazyLock;

use regex::Regex;

static QUERY_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[?&]id=([^&]+)").expect("static regex")
});

static PATH_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/d/([^/]+)/").expect("static regex")
});

const VIEW_BASE: &str = "https://drive.google.com/file/d";
const DOWNLOAD_BASE: &str = "https://drive.google.com/uc?export=download&id=";

/// Pull the file identifier out of a share link.
///
/// The `id=` query parameter wins over a `/d/<id>/` path segment.
pub fn extract_file_id(url: &str) -> Option<&str> {
    QUERY_ID
        .captures(url)
        .or_else(|| PATH_ID.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Browser view URL for a record's PDF, or the original link.
pub fn view_url(pdf_url: &str) -> String {
    match extract_file_id(pdf_url) {
        Some(id) => format!("{}/{}/view", VIEW_BASE, id),
        None => pdf_url.to_string(),
    }
}

/// Direct-download URL for a record's PDF, or the original link.
pub fn direct_url(pdf_url: &str) -> String {
    match extract_file_id(pdf_url) {
        Some(id) => format!("{}{}", DOWNLOAD_BASE, id),
        None => pdf_url.to_string(),
    }
}

/// What to fetch and what to call it on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    pub url: String,
    /// Suggested filename. Empty when the link resolved but no display
    /// name was given.
    pub filename: String,
    /// The resolved identifier, if any.
    pub file_id: Option<String>,
}

impl DownloadTarget {
    /// A filename that is never empty, for writing to disk.
    pub fn filename_or_fallback(&self) -> String {
        if !self.filename.is_empty() {
            return self.filename.clone();
        }
        match &self.file_id {
            Some(id) => format!("{}.pdf", id),
            None => "download.pdf".to_string(),
        }
    }
}

pub fn download_target(pdf_url: &str, display_name: Option<&str>) -> DownloadTarget {
    match extract_file_id(pdf_url) {
        Some(id) => DownloadTarget {
            url: format!("{}{}", DOWNLOAD_BASE, id),
            filename: display_name.map(pdf_filename).unwrap_or_default(),
            file_id: Some(id.to_string()),
        },
        None => DownloadTarget {
            url: pdf_url.to_string(),
            filename: last_path_segment(pdf_url).to_string(),
            file_id: None,
        },
    }
}

/// Compose the direct-download URL into a custom-scheme deep link.
pub fn reader_link(pdf_url: &str, scheme_template: &str) -> String {
    let direct = direct_url(pdf_url);
    scheme_template.replace("{url}", &urlencoding::encode(&direct))
}

fn pdf_filename(name: &str) -> String {
    if name.to_lowercase().ends_with(".pdf") {
        name.to_string()
    } else {
        format!("{}.pdf", name)
    }
}

fn last_path_segment(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_query_id() {
        assert_eq!(
            extract_file_id("https://drive.usercontent.google.com/u/0/uc?id=1AbC-d_9&export=download"),
            Some("1AbC-d_9")
        );
        assert_eq!(
            extract_file_id("https://drive.google.com/uc?export=download&id=XYZ"),
            Some("XYZ")
        );
    }

    #[test]
    fn test_extract_path_id() {
        assert_eq!(
            extract_file_id("https://drive.google.com/file/d/ABC123/view?usp=sharing"),
            Some("ABC123")
        );
    }

    #[test]
    fn test_query_beats_path() {
        assert_eq!(
            extract_file_id("https://host/file/d/PATHID/view?id=QUERYID"),
            Some("QUERYID")
        );
    }

    #[test]
    fn test_no_id() {
        assert_eq!(extract_file_id("https://example.com/scores/sonata.pdf"), None);
        assert_eq!(extract_file_id("https://example.com/?fid=nope"), None);
        assert_eq!(extract_file_id("https://drive.google.com/file/d/"), None);
        assert_eq!(extract_file_id("https://drive.google.com/open?id="), None);
    }

    #[test]
    fn test_view_url() {
        assert_eq!(
            view_url("https://drive.usercontent.google.com/u/0/uc?id=F1&export=download"),
            "https://drive.google.com/file/d/F1/view"
        );
        assert_eq!(
            view_url("https://example.com/a/b.pdf"),
            "https://example.com/a/b.pdf"
        );
    }

    #[test]
    fn test_download_target_resolved() {
        let t = download_target("https://drive.google.com/file/d/ABC123/view", Some("Sonata No.1"));
        assert!(t.url.contains("id=ABC123"));
        assert_eq!(t.filename, "Sonata No.1.pdf");
        assert_eq!(t.file_id.as_deref(), Some("ABC123"));
    }

    #[test]
    fn test_download_target_keeps_existing_extension() {
        let t = download_target("https://drive.google.com/file/d/A/view", Some("Etude.PDF"));
        assert_eq!(t.filename, "Etude.PDF");
    }

    #[test]
    fn test_download_target_without_name() {
        let t = download_target("https://drive.google.com/file/d/A/view", None);
        assert_eq!(t.filename, "");
        assert_eq!(t.filename_or_fallback(), "A.pdf");
    }

    #[test]
    fn test_download_target_fallback() {
        let t = download_target("https://example.com/scores/nocturne.pdf", Some("Nocturne"));
        assert_eq!(t.url, "https://example.com/scores/nocturne.pdf");
        assert_eq!(t.filename, "nocturne.pdf");
        assert_eq!(t.file_id, None);
    }

    #[test]
    fn test_reader_link_encodes_direct_url() {
        let link = reader_link(
            "https://drive.google.com/file/d/ABC/view",
            "pdfreader://open?url={url}",
        );
        assert_eq!(
            link,
            "pdfreader://open?url=https%3A%2F%2Fdrive.google.com%2Fuc%3Fexport%3Ddownload%26id%3DABC"
        );
    }
}
