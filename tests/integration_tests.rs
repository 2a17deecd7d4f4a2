// Integration tests against the live Homebrew JSON API
// Run with: cargo test --test integration_tests -- --ignored --test-threads=1

use brewlens::{BrewApi, CatalogCache, CatalogSource, PackageKind, classify, filter};
use std::time::Duration;

#[tokio::test]
#[ignore] // Requires network
async fn test_fetch_single_formula() {
    let api = BrewApi::new().unwrap();
    let record = api.lookup(PackageKind::Formula, "wget").await.unwrap();

    assert_eq!(record.id(), "wget");
    assert_eq!(record.install_command(), "brew install wget");
    assert_ne!(record.version(), "N/A");
    assert!(record.search_key().contains("wget"));
}

#[tokio::test]
#[ignore] // Requires network
async fn test_fetch_single_cask() {
    let api = BrewApi::new().unwrap();
    let record = api.lookup(PackageKind::Cask, "firefox").await.unwrap();

    assert_eq!(record.token(), "firefox");
    assert_eq!(record.display_name(), "Mozilla Firefox");
    assert_eq!(record.install_command(), "brew install --cask firefox");
}

#[tokio::test]
#[ignore] // Requires network
async fn test_unknown_token_is_not_found() {
    let api = BrewApi::new().unwrap();
    let err = api
        .fetch_package(PackageKind::Formula, "this-formula-does-not-exist-12345")
        .await
        .unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {err}");
}

#[tokio::test]
#[ignore] // Requires network, downloads the full formula catalog
async fn test_formula_catalog_is_cached_and_searchable() {
    let cache = CatalogCache::new(BrewApi::new().unwrap(), Duration::from_secs(3600));

    let catalog = cache.get_catalog(PackageKind::Formula).await.unwrap();
    assert!(catalog.len() > 5000, "catalog too small: {}", catalog.len());

    let again = cache.get_catalog(PackageKind::Formula).await.unwrap();
    assert!(std::sync::Arc::ptr_eq(&catalog, &again));

    let matches = filter(&catalog, "redis");
    assert!(matches.iter().any(|record| record.id() == "redis"));
}

#[tokio::test]
#[ignore] // Requires network
async fn test_neovim_has_head_source() {
    let api = BrewApi::new().unwrap();
    let record = api.lookup(PackageKind::Formula, "neovim").await.unwrap();
    let status = classify(&record);

    assert!(status.verified);
    assert!(status.is_open_source);
    assert!(status.source_url.unwrap().contains("github.com/neovim"));
}
