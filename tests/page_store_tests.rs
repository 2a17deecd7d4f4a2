// Page persistence across runs, using an isolated temp directory

use brewlens::{FilePageStore, MemoryPageStore, PageStore, Paginator};
use tempfile::TempDir;

#[test]
fn test_file_store_round_trips_pages_per_context() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("state").join("pages.json");
    let store = FilePageStore::new(&path);

    assert_eq!(store.load("browse:formula"), None);
    store.save("browse:formula", 4).unwrap();
    store.save("browse:cask", 2).unwrap();

    // A fresh handle on the same file sees both keys
    let reopened = FilePageStore::new(&path);
    assert_eq!(reopened.load("browse:formula"), Some(4));
    assert_eq!(reopened.load("browse:cask"), Some(2));

    let content = std::fs::read_to_string(&path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(json["browse:formula"], "4");
}

#[test]
fn test_file_store_ignores_garbage() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("pages.json");
    std::fs::write(&path, "not json at all").unwrap();

    let store = FilePageStore::new(&path);
    assert_eq!(store.load("browse:formula"), None);

    // Saving replaces the unreadable file
    store.save("browse:formula", 3).unwrap();
    assert_eq!(store.load("browse:formula"), Some(3));
}

#[test]
fn test_file_store_ignores_non_numeric_page() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("pages.json");
    std::fs::write(&path, r#"{"browse:formula": "three"}"#).unwrap();

    assert_eq!(FilePageStore::new(&path).load("browse:formula"), None);
}

#[test]
fn test_restored_page_is_clamped_to_new_dataset() {
    let temp = TempDir::new().unwrap();
    let store = FilePageStore::new(temp.path().join("pages.json"));

    let mut paginator = Paginator::restore("browse:formula", &store, 200, 20);
    paginator.set_page(9);
    paginator.persist(&store);

    // Catalog shrank between runs
    let restored = Paginator::restore("browse:formula", &store, 50, 20);
    assert_eq!(restored.current_page(), 3);
}

#[test]
fn test_memory_store_contexts_are_independent() {
    let store = MemoryPageStore::new();
    let mut formulae = Paginator::restore("browse:formula", &store, 100, 10);
    let mut casks = Paginator::restore("browse:cask", &store, 100, 10);

    formulae.set_page(7);
    casks.set_page(2);
    formulae.persist(&store);
    casks.persist(&store);

    assert_eq!(store.load("browse:formula"), Some(7));
    assert_eq!(store.load("browse:cask"), Some(2));
}
