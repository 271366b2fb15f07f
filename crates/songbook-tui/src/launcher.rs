//! Hands URLs to the desktop: the system browser for viewing, and a custom
//! URL scheme for the external PDF reader.

use anyhow::Context;
use songbook_core::resolver;
use tracing::info;

/// Open `url` with the system handler without blocking the UI.
pub fn open_url(url: &str) -> anyhow::Result<()> {
    info!("Opening {}", url);
    open::that_detached(url).with_context(|| format!("could not open {}", url))
}

/// Open a record's view page. Returns the URL that was opened.
pub fn open_view(pdf_url: &str) -> anyhow::Result<String> {
    let url = resolver::view_url(pdf_url);
    open_url(&url)?;
    Ok(url)
}

/// Fire the reader deep link. Returns the direct URL to fall back to.
pub fn open_reader(pdf_url: &str, scheme_template: &str) -> anyhow::Result<String> {
    let link = resolver::reader_link(pdf_url, scheme_template);
    open_url(&link)?;
    Ok(resolver::direct_url(pdf_url))
}
