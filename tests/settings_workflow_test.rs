//! Settings Workflow Integration Tests
//!
//! End-to-end reads and writes through the manager:
//! - Round trips and overwrites in every scope
//! - Clearing back to defaults
//! - Batched writes
//! - Global fallback for ALL settings and `all(owner)`
//! - Persistence through the JSON file repository
//! - Alternate name lookup strategy

mod common;

use common::{SiteSettings, TestFixture, User, init_logging};
use scoped_settings::{
    JsonFileRepository, OwnerScanLookup, SettingsManager, SharedSettingsManager,
};
use serde_json::{Value, json};
use tempfile::TempDir;

// =============================================================================
// Round Trips
// =============================================================================

#[test]
fn test_round_trip_with_overwrite() {
    init_logging();
    let mut fixture = TestFixture::new();
    let alice = User::new(1, "alice");

    fixture.manager.set("site.title", "First", None).unwrap();
    assert_eq!(fixture.manager.get("site.title", None).unwrap(), json!("First"));

    fixture.manager.set("site.title", "Second", None).unwrap();
    assert_eq!(fixture.manager.get("site.title", None).unwrap(), json!("Second"));

    fixture
        .manager
        .set("profile.signature", json!({"text": "-- A", "html": false}), Some(&alice))
        .unwrap();
    assert_eq!(
        fixture.manager.get("profile.signature", Some(&alice)).unwrap(),
        json!({"text": "-- A", "html": false})
    );

    // Overwrites update the existing row instead of adding one
    assert_eq!(fixture.repository.rows().len(), 2);
}

#[test]
fn test_writes_are_visible_to_new_managers() {
    let mut fixture = TestFixture::new();
    let alice = User::new(1, "alice");

    fixture
        .manager
        .set("site.maintenance", true, None)
        .unwrap()
        .set("ui.theme", "light", None)
        .unwrap();
    fixture.manager.set("ui.theme", "solarized", Some(&alice)).unwrap();

    let mut other = fixture.second_manager();
    assert_eq!(other.get("site.maintenance", None).unwrap(), json!(true));
    assert_eq!(other.get("ui.theme", None).unwrap(), json!("light"));
    assert_eq!(other.get("ui.theme", Some(&alice)).unwrap(), json!("solarized"));
}

#[test]
fn test_get_as_typed() {
    let mut fixture = TestFixture::new();
    let alice = User::new(1, "alice");

    assert_eq!(
        fixture.manager.get_as::<u32>("profile.page_size", Some(&alice)).unwrap(),
        Some(20)
    );
    assert_eq!(fixture.manager.get_as::<String>("ui.theme", None).unwrap(), None);
}

// =============================================================================
// Clearing
// =============================================================================

#[test]
fn test_clear_returns_explicit_default() {
    let mut fixture = TestFixture::new();
    let alice = User::new(1, "alice");

    fixture.manager.set("profile.signature", "-- A", Some(&alice)).unwrap();
    fixture.manager.clear("profile.signature", Some(&alice)).unwrap();

    assert_eq!(
        fixture.manager.get_or("profile.signature", Some(&alice), "none").unwrap(),
        json!("none")
    );
    assert_eq!(fixture.manager.get("profile.signature", Some(&alice)).unwrap(), Value::Null);
}

#[test]
fn test_clear_returns_declared_default() {
    let mut fixture = TestFixture::new();

    fixture.manager.set("site.title", "Custom", None).unwrap();
    fixture.manager.clear("site.title", None).unwrap();

    assert_eq!(fixture.manager.get("site.title", None).unwrap(), json!("My Site"));
    assert_eq!(
        fixture.repository.row("site.title", None).unwrap().value,
        "\"My Site\""
    );
}

#[test]
fn test_clear_without_default_stores_null() {
    let mut fixture = TestFixture::new();

    fixture.manager.set("ui.theme", "light", None).unwrap();
    fixture.manager.clear("ui.theme", None).unwrap();

    let row = fixture.repository.row("ui.theme", None).unwrap();
    assert_eq!(row.value, "null");
}

// =============================================================================
// Batched Writes
// =============================================================================

#[test]
fn test_set_many_commits_once() {
    let mut fixture = TestFixture::new();
    let alice = User::new(1, "alice");

    fixture.manager.all(Some(&alice)).unwrap();
    let queries_before = fixture.repository.query_count();

    fixture
        .manager
        .set_many(
            [
                ("profile.signature", json!("-- A")),
                ("profile.page_size", json!(50)),
                ("ui.theme", json!("light")),
            ],
            Some(&alice),
        )
        .unwrap();

    assert_eq!(fixture.repository.commit_count(), 1);
    assert_eq!(fixture.repository.query_count(), queries_before + 1);

    let all = fixture.manager.all(Some(&alice)).unwrap();
    assert_eq!(all["profile.signature"], json!("-- A"));
    assert_eq!(all["profile.page_size"], json!(50));
    assert_eq!(all["ui.theme"], json!("light"));
}

#[test]
fn test_set_many_mixes_inserts_and_updates() {
    let mut fixture = TestFixture::new();

    fixture.manager.set("site.title", "Old", None).unwrap();
    fixture
        .manager
        .set_many([("site.title", json!("New")), ("site.maintenance", json!(true))], None)
        .unwrap();

    assert_eq!(fixture.repository.commit_count(), 2);
    assert_eq!(fixture.repository.rows().len(), 2);
    assert_eq!(fixture.repository.row("site.title", None).unwrap().value, "\"New\"");
}

#[test]
fn test_set_many_last_duplicate_wins() {
    let mut fixture = TestFixture::new();

    fixture
        .manager
        .set_many([("site.title", "A"), ("site.title", "B")], None)
        .unwrap();

    assert_eq!(fixture.repository.rows().len(), 1);
    assert_eq!(fixture.manager.get("site.title", None).unwrap(), json!("B"));
}

// =============================================================================
// Global Fallback
// =============================================================================

#[test]
fn test_all_scope_falls_back_to_global() {
    let mut fixture = TestFixture::new();
    let alice = User::new(1, "alice");

    fixture.manager.set("ui.theme", "global-theme", None).unwrap();
    assert_eq!(fixture.manager.get("ui.theme", Some(&alice)).unwrap(), json!("global-theme"));

    fixture.manager.set("ui.theme", "alice-theme", Some(&alice)).unwrap();
    assert_eq!(fixture.manager.get("ui.theme", Some(&alice)).unwrap(), json!("alice-theme"));
    assert_eq!(fixture.manager.get("ui.theme", None).unwrap(), json!("global-theme"));
}

#[test]
fn test_all_with_owner_fills_nulls_from_global() {
    let mut fixture = TestFixture::new();
    let alice = User::new(1, "alice");

    fixture.manager.set("ui.theme", "global-theme", None).unwrap();
    fixture.manager.set("profile.signature", "-- A", Some(&alice)).unwrap();

    let all = fixture.manager.all(Some(&alice)).unwrap();
    assert_eq!(all["ui.theme"], json!("global-theme"));
    assert_eq!(all["profile.signature"], json!("-- A"));
    assert_eq!(all["profile.page_size"], json!(20));
    assert!(!all.contains_key("site.title"));

    let global = fixture.manager.all(None).unwrap();
    assert_eq!(global.len(), 4);
    assert!(!global.contains_key("profile.signature"));
}

#[test]
fn test_owner_clear_of_all_setting_reads_global() {
    let mut fixture = TestFixture::new();
    let alice = User::new(1, "alice");

    fixture.manager.set("ui.theme", "global-theme", None).unwrap();
    fixture.manager.set("ui.theme", "mine", Some(&alice)).unwrap();
    fixture.manager.clear("ui.theme", Some(&alice)).unwrap();

    assert_eq!(fixture.manager.get("ui.theme", Some(&alice)).unwrap(), json!("global-theme"));
}

#[test]
fn test_owner_reads_declared_default_over_global() {
    let mut fixture = TestFixture::new();
    let alice = User::new(1, "alice");

    fixture.manager.set("ui.locale", "tr", None).unwrap();

    // ui.locale declares "en", which seeds alice's scope
    assert_eq!(fixture.manager.get("ui.locale", None).unwrap(), json!("tr"));
    assert_eq!(fixture.manager.get("ui.locale", Some(&alice)).unwrap(), json!("en"));
    assert_eq!(fixture.manager.all(Some(&alice)).unwrap()["ui.locale"], json!("en"));
}

// =============================================================================
// File Repository
// =============================================================================

#[test]
fn test_json_file_repository_persists_across_managers() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("settings.json");
    let alice = User::new(1, "alice");

    {
        let mut manager = SettingsManager::builder(JsonFileRepository::new(&path))
            .with_schema::<SiteSettings>()
            .build()
            .unwrap();
        manager
            .set_many([("ui.theme", json!("light")), ("ui.locale", json!("tr"))], None)
            .unwrap();
        manager.set("profile.page_size", 10, Some(&alice)).unwrap();
    }

    assert!(path.exists());

    let mut manager = SettingsManager::builder(JsonFileRepository::new(&path))
        .with_schema::<SiteSettings>()
        .build()
        .unwrap();
    assert_eq!(manager.get("ui.theme", None).unwrap(), json!("light"));
    assert_eq!(manager.get("ui.locale", None).unwrap(), json!("tr"));
    assert_eq!(manager.get("profile.page_size", Some(&alice)).unwrap(), json!(10));
}

// =============================================================================
// Lookup Strategy
// =============================================================================

#[test]
fn test_owner_scan_lookup_behaves_like_batch_lookup() {
    let repository = std::sync::Arc::new(scoped_settings::MemoryRepository::new());
    let mut manager = SettingsManager::builder(std::sync::Arc::clone(&repository))
        .with_schema::<SiteSettings>()
        .lookup(OwnerScanLookup)
        .build()
        .unwrap();
    let alice = User::new(1, "alice");

    manager.set("profile.signature", "-- A", Some(&alice)).unwrap();
    manager.all(Some(&alice)).unwrap();
    let queries_before = repository.query_count();

    manager
        .set_many(
            [("profile.signature", json!("-- B")), ("ui.theme", json!("light"))],
            Some(&alice),
        )
        .unwrap();

    assert_eq!(repository.query_count(), queries_before + 1);
    assert_eq!(repository.commit_count(), 2);
    assert_eq!(repository.rows().len(), 2);
    assert_eq!(manager.get("profile.signature", Some(&alice)).unwrap(), json!("-- B"));
}

// =============================================================================
// Shared Manager
// =============================================================================

#[test]
fn test_shared_manager_across_threads() {
    let fixture = TestFixture::new();
    let shared = SharedSettingsManager::new(fixture.manager);

    let handles: Vec<_> = (1..=4u64)
        .map(|id| {
            let shared = shared.clone();
            std::thread::spawn(move || {
                let user = User::new(id, "user");
                shared.set("profile.page_size", id * 10, Some(&user)).unwrap();
                shared.get("profile.page_size", Some(&user)).unwrap()
            })
        })
        .collect();

    for (index, handle) in handles.into_iter().enumerate() {
        let expected = (index as u64 + 1) * 10;
        assert_eq!(handle.join().unwrap(), json!(expected));
    }
    assert_eq!(fixture.repository.commit_count(), 4);
}
