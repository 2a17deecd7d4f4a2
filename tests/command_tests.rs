// Command-level tests: browse and info against an in-memory catalog

mod test_helpers;

use brewlens::commands::{self, BrowseOptions};
use brewlens::error::{BrewError, Result};
use brewlens::{CatalogCache, IndexJump, MemoryPageStore, PackageKind, PageStore};
use std::time::Duration;
use test_helpers::{FakeSource, ManualClock, cask, formula, numbered_formulae};

fn cache() -> CatalogCache<FakeSource, ManualClock> {
    let mut formulae = numbered_formulae(40);
    formulae.push(formula("redis", "Persistent key-value database").into());
    CatalogCache::with_clock(
        FakeSource::new(
            formulae,
            vec![
                cask("alacritty", "Alacritty", "Terminal emulator").into(),
                cask("firefox", "Mozilla Firefox", "Web browser").into(),
                cask("mpv", "mpv", "Media player").into(),
            ],
        ),
        ManualClock::new(),
        Duration::from_secs(3600),
    )
}

/// Store that can't write, like a read-only state directory
struct ReadOnlyStore;

impl PageStore for ReadOnlyStore {
    fn load(&self, _key: &str) -> Option<usize> {
        Some(2)
    }

    fn save(&self, _key: &str, _page: usize) -> Result<()> {
        Err(BrewError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only file system",
        )))
    }
}

fn options(kind: PackageKind) -> BrowseOptions {
    BrowseOptions {
        kind,
        query: None,
        page: None,
        per_page: 10,
        jump: None,
    }
}

#[tokio::test]
async fn test_browse_remembers_page_between_runs() {
    let cache = cache();
    let store = MemoryPageStore::new();

    let mut first = options(PackageKind::Formula);
    first.page = Some(3);
    commands::browse(&cache, &store, &first).await.unwrap();
    assert_eq!(store.load("browse:formula"), Some(3));

    // No --page: the saved page is reused, and the catalog was not refetched
    commands::browse(&cache, &store, &options(PackageKind::Formula))
        .await
        .unwrap();
    assert_eq!(store.load("browse:formula"), Some(3));
    assert_eq!(cache.source().catalog_fetches(), 1);
}

#[tokio::test]
async fn test_browse_search_does_not_touch_saved_page() {
    let cache = cache();
    let store = MemoryPageStore::new();
    store.save("browse:formula", 4).unwrap();

    let mut search = options(PackageKind::Formula);
    search.query = Some("redis".to_string());
    commands::browse(&cache, &store, &search).await.unwrap();

    assert_eq!(store.load("browse:formula"), Some(4));
}

#[tokio::test]
async fn test_browse_letter_jump_moves_to_matching_page() {
    let cache = cache();
    let store = MemoryPageStore::new();

    let mut jump = options(PackageKind::Cask);
    jump.per_page = 1;
    jump.jump = Some(IndexJump::Letter('M'));
    commands::browse(&cache, &store, &jump).await.unwrap();
    assert_eq!(store.load("browse:cask"), Some(2));

    // No cask starts with Z: the page stays where it was
    jump.jump = Some(IndexJump::Letter('Z'));
    commands::browse(&cache, &store, &jump).await.unwrap();
    assert_eq!(store.load("browse:cask"), Some(2));

    jump.jump = Some(IndexJump::Reset);
    commands::browse(&cache, &store, &jump).await.unwrap();
    assert_eq!(store.load("browse:cask"), Some(1));
}

#[tokio::test]
async fn test_browse_succeeds_when_page_cannot_be_saved() {
    let cache = cache();

    commands::browse(&cache, &ReadOnlyStore, &options(PackageKind::Formula))
        .await
        .unwrap();

    let mut jump = options(PackageKind::Cask);
    jump.jump = Some(IndexJump::Letter('F'));
    commands::browse(&cache, &ReadOnlyStore, &jump).await.unwrap();
}

#[tokio::test]
async fn test_browse_surfaces_upstream_failure() {
    let cache = cache();
    cache.source().set_failing(true);
    let store = MemoryPageStore::new();

    let result = commands::browse(&cache, &store, &options(PackageKind::Formula)).await;
    assert!(result.is_err());
    assert_eq!(store.load("browse:formula"), None);
}

#[tokio::test]
async fn test_info_falls_back_to_casks() {
    let cache = cache();
    commands::info(&cache, "https://example.test/api", "firefox", None, true)
        .await
        .unwrap();
    // Formula lookup missed, cask lookup hit
    assert_eq!(
        cache
            .source()
            .package_fetches
            .load(std::sync::atomic::Ordering::SeqCst),
        2
    );
}

#[tokio::test]
async fn test_info_unknown_token_is_not_an_error() {
    let cache = cache();
    commands::info(&cache, "https://example.test/api", "redsi", None, false)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_info_transport_failure_is_an_error() {
    let cache = cache();
    cache.source().set_failing(true);
    let result = commands::info(
        &cache,
        "https://example.test/api",
        "redis",
        Some(PackageKind::Formula),
        false,
    )
    .await;
    assert!(result.is_err());
}
