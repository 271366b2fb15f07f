mod common;

use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use common::catalog_fixture::{serve, songs, two_source_config, write_catalog};
use songbook_core::catalog::{CatalogError, CatalogLoader, Location};
use songbook_core::resolver;
use songbook_core::state::{CatalogState, Event, LoadPhase};

/// Run the same startup sequence the TUI runs.
async fn load_into_state(config: &Location) -> CatalogState {
    let loader = CatalogLoader::new();
    let mut state = CatalogState::new(10);
    let sources = loader
        .load_sources(config)
        .await
        .expect("configuration should load");
    state.dispatch(Event::SourcesLoaded(sources.clone()));
    let catalogs = loader.load_all_catalogs(config, &sources).await;
    state.dispatch(Event::CatalogsLoaded(catalogs));
    state
}

#[tokio::test]
async fn file_catalog_survives_one_missing_source() {
    let dir = tempfile::tempdir().unwrap();
    let a = songs("Hymn", 15);
    let config_path = write_catalog(dir.path(), &two_source_config(), Some(&a), None);

    let mut state = load_into_state(&Location::File(config_path)).await;
    assert_eq!(state.phase(), &LoadPhase::Ready);

    let view = state.view();
    assert_eq!(view.tabs[0].label, "Choir Library");
    assert_eq!(view.filtered_count, 15);
    assert_eq!(view.total_pages, 2);
    assert_eq!(view.rows.len(), 10);

    state.dispatch(Event::NextPage);
    assert_eq!(state.view().rows.len(), 5);

    state.dispatch(Event::SelectSource("b".to_string()));
    let view = state.view();
    assert!(view.rows.is_empty());
    assert_eq!(view.tabs[1].song_count, Some(0));
    assert_eq!(view.notice.as_deref(), Some("No songs found."));
}

#[tokio::test]
async fn http_catalog_survives_one_failing_source() {
    let config = two_source_config();
    let a = songs("Carol", 15);
    let router = Router::new()
        .route("/site/config.json", get(move || async move { Json(config) }))
        .route("/site/songs-a.json", get(move || async move { Json(a) }))
        .route(
            "/site/songs-b.json",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
    let addr = serve(router).await;

    let location = Location::parse(&format!("http://{}/site/config.json", addr));
    let mut state = load_into_state(&location).await;

    let view = state.view();
    assert_eq!(view.filtered_count, 15);
    assert_eq!(view.total_pages, 2);

    state.dispatch(Event::SelectSource("b".to_string()));
    assert_eq!(state.view().filtered_count, 0);
    assert_eq!(state.records_for("b").map(|r| r.len()), Some(0));
}

#[tokio::test]
async fn failing_source_maps_to_source_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_catalog(dir.path(), &two_source_config(), None, None);
    let location = Location::File(config_path);
    let loader = CatalogLoader::new();
    let sources = loader.load_sources(&location).await.unwrap();

    let err = loader.load_catalog(&location, &sources[1]).await.unwrap_err();
    match err {
        CatalogError::SourceLoad { source_id, .. } => assert_eq!(source_id, "b"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn empty_configuration_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_catalog(dir.path(), &json!({ "drives": [] }), None, None);

    let err = CatalogLoader::new()
        .load_sources(&Location::File(config_path))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Config { .. }));
    assert!(err.to_string().contains("no sources configured"));
}

#[tokio::test]
async fn unreachable_configuration_is_a_config_error() {
    let router = Router::new().route(
        "/config.json",
        get(|| async { (StatusCode::NOT_FOUND, "missing") }),
    );
    let addr = serve(router).await;

    let err = CatalogLoader::new()
        .load_sources(&Location::parse(&format!("http://{}/config.json", addr)))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Config { .. }));
    assert!(err.to_string().contains("404"));
}

#[tokio::test]
async fn search_then_download_target_from_loaded_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let mut a = songs("Hymn", 3);
    a.push(songbook_core::catalog::SongRecord {
        id: None,
        name: "Sonata No.1".to_string(),
        artist: Some("Clementi".to_string()),
        pdf_url: "https://drive.google.com/file/d/ABC123/view".to_string(),
    });
    let config_path = write_catalog(dir.path(), &two_source_config(), Some(&a), Some(&[]));

    let mut state = load_into_state(&Location::File(config_path)).await;
    state.dispatch(Event::Search("clementi".to_string()));
    let view = state.view();
    assert_eq!(view.rows.len(), 1);

    let song = view.rows[0];
    let target = resolver::download_target(&song.pdf_url, Some(&song.name));
    assert!(target.url.contains("id=ABC123"));
    assert_eq!(target.filename, "Sonata No.1.pdf");
}
