//! Integration tests for the account scraper
//!
//! These tests use wiremock to serve account pages and run the full
//! fetch, extract and store cycle end-to-end.

use konto_scrape::config::{Config, ParseErrorPolicy};
use konto_scrape::scrape::{build_http_client, fetch_page, locator_for, FetchOutcome};
use konto_scrape::storage::{CatalogStorage, JsonFileStorage};
use konto_scrape::{get_accounts, AccountStore, Catalog, KontoError, StoreState};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(server: &MockServer, first_id: u32, last_id: u32, dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.source.base_url = format!("{}/kontobeskrivelser/", server.uri());
    config.source.first_id = first_id;
    config.source.last_id = last_id;
    config.output.catalog_path = catalog_path(dir).to_string_lossy().into_owned();
    config
}

fn catalog_path(dir: &TempDir) -> PathBuf {
    dir.path().join("lucaregnskap.json")
}

fn account_page(id: &str, title: &str, description: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="no"><head><title>Konto {id}</title></head>
<body>
  <nav><a href="/" title="Forside">Hjem</a></nav>
  <h1>Konto: {id}</h1>
  <h1>{title}</h1>
  <div class="account-description">
    {description}
  </div>
</body></html>"#
    )
}

async fn mount_page(server: &MockServer, id: u32, body: String) {
    Mock::given(method("GET"))
        .and(path(format!("/kontobeskrivelser/{}", id)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

async fn mount_status(server: &MockServer, id: u32, status: u16) {
    Mock::given(method("GET"))
        .and(path(format!("/kontobeskrivelser/{}", id)))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

async fn request_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .map(|requests| requests.len())
        .unwrap_or(0)
}

#[tokio::test]
async fn test_absent_page_is_left_out() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        1000,
        account_page("1000", "Forskning og utvikling", "Aktiverte utgifter."),
    )
    .await;
    mount_page(
        &server,
        1001,
        account_page("1001", "Forskning og utvikling, ervervet", "Kjøpt FoU."),
    )
    .await;
    mount_status(&server, 1002, 404).await;
    mount_page(
        &server,
        1003,
        account_page("1003", "Utviklingsprosjekter", "Egne prosjekter."),
    )
    .await;

    let config = create_test_config(&server, 1000, 1003, &dir);
    let catalog = get_accounts(&config).await.expect("Scrape failed");

    assert_eq!(catalog.len(), 3);
    assert!(catalog.get("1000").is_some());
    assert!(catalog.get("1001").is_some());
    assert!(catalog.get("1002").is_none());
    assert_eq!(catalog.get("1003").unwrap().tittel, "Utviklingsprosjekter");
    assert_eq!(catalog.get("1003").unwrap().beskrivelse, "Egne prosjekter.");

    assert!(catalog_path(&dir).exists());
}

#[tokio::test]
async fn test_server_error_fails_whole_batch() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, 1000, account_page("1000", "A", "a")).await;
    mount_status(&server, 1001, 500).await;
    mount_page(&server, 1002, account_page("1002", "C", "c")).await;

    let config = create_test_config(&server, 1000, 1002, &dir);
    let mut store = AccountStore::new(config);
    let err = store.get_accounts().await.unwrap_err();

    match err {
        KontoError::UnexpectedStatus { url, status } => {
            assert_eq!(status, 500);
            assert!(url.ends_with("/kontobeskrivelser/1001"));
        }
        other => panic!("Expected UnexpectedStatus, got {:?}", other),
    }

    assert_eq!(store.state(), StoreState::Uninitialized);
    assert!(!catalog_path(&dir).exists());
}

#[tokio::test]
async fn test_rate_limited_status_is_fatal() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_status(&server, 1000, 429).await;

    let config = create_test_config(&server, 1000, 1000, &dir);
    let result = get_accounts(&config).await;

    assert!(matches!(
        result,
        Err(KontoError::UnexpectedStatus { status: 429, .. })
    ));
    assert!(!catalog_path(&dir).exists());
}

#[tokio::test]
async fn test_second_load_uses_stored_catalog() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/kontobeskrivelser/1500"))
        .respond_with(ResponseTemplate::new(200).set_body_string(account_page(
            "1500",
            "Kundefordringer",
            "Fordringer på kunder.",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&server, 1500, 1500, &dir);
    let mut store = AccountStore::new(config);

    let first = store.get_accounts().await.expect("First load failed");
    let requests_after_first = request_count(&server).await;
    let second = store.get_accounts().await.expect("Second load failed");

    assert_eq!(first, second);
    assert_eq!(request_count(&server).await, requests_after_first);
    assert_eq!(store.state(), StoreState::Loaded);
}

#[tokio::test]
async fn test_deleted_catalog_is_regenerated() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, 2400, account_page("2400", "Leverandørgjeld", "Gjeld.")).await;

    let config = create_test_config(&server, 2400, 2400, &dir);
    let mut store = AccountStore::new(config);

    store.get_accounts().await.unwrap();
    assert_eq!(request_count(&server).await, 1);

    std::fs::remove_file(catalog_path(&dir)).unwrap();
    let catalog = store.get_accounts().await.unwrap();

    assert_eq!(request_count(&server).await, 2);
    assert_eq!(catalog.len(), 1);
    assert!(catalog_path(&dir).exists());
}

#[tokio::test]
async fn test_links_are_rendered_inline() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        2700,
        account_page(
            "2700",
            "Utgående merverdiavgift",
            r#"Avregnes mot <a href="/kontobeskrivelser/2740" title="Oppgjørskonto merverdiavgift">2740</a> hver termin."#,
        ),
    )
    .await;

    let config = create_test_config(&server, 2700, 2700, &dir);
    let catalog = get_accounts(&config).await.unwrap();

    assert_eq!(
        catalog.get("2700").unwrap().beskrivelse,
        "Avregnes mot 2740 (Oppgjørskonto merverdiavgift) hver termin."
    );
}

#[tokio::test]
async fn test_catalog_file_roundtrip_keeps_utf8() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        5000,
        account_page("5000", "Lønn til ansatte", "Lønn, ferielønn og særavtaler – æøå ÆØÅ."),
    )
    .await;

    let config = create_test_config(&server, 5000, 5000, &dir);
    let scraped = get_accounts(&config).await.unwrap();

    let raw = std::fs::read_to_string(catalog_path(&dir)).unwrap();
    assert!(raw.contains("Lønn til ansatte"));
    assert!(raw.contains("æøå ÆØÅ"));
    assert!(raw.contains("\"tittel\""));
    assert!(raw.contains("\"beskrivelse\""));

    let reloaded = Catalog::from_json(&raw).unwrap();
    assert_eq!(reloaded, scraped);
}

#[tokio::test]
async fn test_id_comes_from_page_content() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    // The page served at 1000 describes account 4242
    mount_page(&server, 1000, account_page("4242", "Annet", "Tekst.")).await;

    let config = create_test_config(&server, 1000, 1000, &dir);
    let catalog = get_accounts(&config).await.unwrap();

    assert!(catalog.get("1000").is_none());
    assert_eq!(catalog.get("4242").unwrap().tittel, "Annet");
}

#[tokio::test]
async fn test_bounded_concurrency_fetches_everything() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    for id in 3000..=3009 {
        mount_page(
            &server,
            id,
            account_page(&id.to_string(), &format!("Salg {}", id), "Inntekt."),
        )
        .await;
    }

    let mut config = create_test_config(&server, 3000, 3009, &dir);
    config.source.max_concurrent_requests = Some(2);
    let catalog = get_accounts(&config).await.unwrap();

    assert_eq!(catalog.len(), 10);
    assert_eq!(request_count(&server).await, 10);
}

#[tokio::test]
async fn test_malformed_page_aborts_by_default() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, 1000, account_page("1000", "A", "a")).await;
    mount_page(
        &server,
        1001,
        "<html><body><p>Siden er flyttet</p></body></html>".to_string(),
    )
    .await;

    let config = create_test_config(&server, 1000, 1001, &dir);
    let err = get_accounts(&config).await.unwrap_err();

    assert!(err.is_parse_error());
    assert!(!catalog_path(&dir).exists());
}

#[tokio::test]
async fn test_malformed_page_skipped_when_configured() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, 1000, account_page("1000", "A", "a")).await;
    mount_page(
        &server,
        1001,
        "<html><body><p>Siden er flyttet</p></body></html>".to_string(),
    )
    .await;

    let mut config = create_test_config(&server, 1000, 1001, &dir);
    config.extract.on_parse_error = ParseErrorPolicy::Skip;
    let catalog = get_accounts(&config).await.unwrap();

    assert_eq!(catalog.len(), 1);
    assert!(catalog.get("1000").is_some());
}

#[tokio::test]
async fn test_refresh_replaces_stored_catalog() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let stale = Catalog::from_json(r#"{"9999": {"tittel": "Gammel", "beskrivelse": "Utdatert"}}"#)
        .unwrap();
    JsonFileStorage::new(catalog_path(&dir)).save(&stale).unwrap();

    mount_page(&server, 1920, account_page("1920", "Bankinnskudd", "Penger i bank.")).await;

    let config = create_test_config(&server, 1920, 1920, &dir);
    let mut store = AccountStore::new(config);

    assert_eq!(store.get_accounts().await.unwrap(), stale);
    assert_eq!(request_count(&server).await, 0);

    let fresh = store.refresh().await.unwrap();
    assert!(fresh.get("9999").is_none());
    assert_eq!(fresh.get("1920").unwrap().tittel, "Bankinnskudd");

    let stored = store.storage().load().unwrap().unwrap();
    assert_eq!(stored, fresh);
}

#[tokio::test]
async fn test_fetch_page_outcomes() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, 1000, "<html>ok</html>".to_string()).await;
    mount_status(&server, 1001, 404).await;
    mount_status(&server, 1002, 503).await;

    let config = create_test_config(&server, 1000, 1002, &dir);
    let client = build_http_client(&config.source, &config.user_agent).unwrap();
    let base = &config.source.base_url;

    let page = fetch_page(&client, &locator_for(base, 1000).unwrap())
        .await
        .unwrap();
    assert_eq!(page, FetchOutcome::Page("<html>ok</html>".to_string()));

    let absent = fetch_page(&client, &locator_for(base, 1001).unwrap())
        .await
        .unwrap();
    assert_eq!(absent, FetchOutcome::Absent);

    let failed = fetch_page(&client, &locator_for(base, 1002).unwrap()).await;
    assert!(matches!(
        failed,
        Err(KontoError::UnexpectedStatus { status: 503, .. })
    ));
}

#[tokio::test]
async fn test_fatal_status_cancels_slow_requests() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/kontobeskrivelser/1000"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(account_page("1000", "A", "a"))
                .set_delay(Duration::from_secs(20)),
        )
        .mount(&server)
        .await;
    mount_status(&server, 1001, 500).await;

    let config = create_test_config(&server, 1000, 1001, &dir);
    let started = Instant::now();
    let result = get_accounts(&config).await;

    assert!(matches!(
        result,
        Err(KontoError::UnexpectedStatus { status: 500, .. })
    ));
    assert!(
        started.elapsed() < Duration::from_secs(10),
        "batch waited {:?} for the slow page",
        started.elapsed()
    );
    assert!(!catalog_path(&dir).exists());
}

#[tokio::test]
async fn test_request_timeout_is_applied() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/kontobeskrivelser/1000"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(account_page("1000", "A", "a"))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let mut config = create_test_config(&server, 1000, 1000, &dir);
    config.source.request_timeout_secs = Some(1);
    let result = get_accounts(&config).await;

    match result {
        Err(KontoError::Http { url, source }) => {
            assert!(source.is_timeout(), "expected timeout, got {}", source);
            assert!(url.ends_with("/kontobeskrivelser/1000"));
        }
        other => panic!("Expected Http timeout, got {:?}", other),
    }
    assert!(!catalog_path(&dir).exists());
}

#[tokio::test]
async fn test_removed_catalog_is_regenerated() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, 6300, account_page("6300", "Leie lokale", "Husleie.")).await;

    let config = create_test_config(&server, 6300, 6300, &dir);
    let mut store = AccountStore::new(config);

    store.get_accounts().await.unwrap();
    assert!(store.storage().remove().unwrap());
    assert!(!catalog_path(&dir).exists());
    assert!(!store.storage().remove().unwrap());

    let catalog = store.get_accounts().await.unwrap();
    assert_eq!(request_count(&server).await, 2);
    assert_eq!(catalog.get("6300").unwrap().tittel, "Leie lokale");
    assert!(catalog_path(&dir).exists());
}
