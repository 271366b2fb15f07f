#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use axum::Router;
use serde_json::{json, Value};
use songbook_core::catalog::SongRecord;

/// `n` songs named "<prefix> 01".., each with a Drive share link.
pub fn songs(prefix: &str, n: usize) -> Vec<SongRecord> {
    (1..=n)
        .map(|i| SongRecord {
            id: Some(i as u32),
            name: format!("{} {:02}", prefix, i),
            artist: (i % 2 == 0).then(|| "Traditional".to_string()),
            pdf_url: format!("https://drive.google.com/file/d/{}-{}/view", prefix, i),
        })
        .collect()
}

/// Configuration document with two sources, `a` and `b`.
pub fn two_source_config() -> Value {
    json!({
        "drives": [
            { "id": "a", "name": "Choir", "displayName": "Choir Library", "outputFile": "songs-a.json" },
            { "id": "b", "name": "Solo", "outputFile": "songs-b.json" }
        ]
    })
}

/// Write a catalog into `dir`. `None` leaves that source's file missing.
pub fn write_catalog(
    dir: &Path,
    config: &Value,
    a: Option<&[SongRecord]>,
    b: Option<&[SongRecord]>,
) -> PathBuf {
    let config_path = dir.join("config.json");
    std::fs::write(&config_path, config.to_string()).expect("write config");
    if let Some(songs) = a {
        std::fs::write(dir.join("songs-a.json"), serde_json::to_string(songs).unwrap())
            .expect("write songs-a");
    }
    if let Some(songs) = b {
        std::fs::write(dir.join("songs-b.json"), serde_json::to_string(songs).unwrap())
            .expect("write songs-b");
    }
    config_path
}

/// Serve `router` on an ephemeral localhost port.
pub async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test server");
    });
    addr
}
