// Contract tests for check creation and removal against the registry.

mod common;

use common::{CountingMarkerStore, MockProbe, MockWhois, RecordingCheckApi};
use domain_hc_core::registry::DomainRegistry;
use domain_hc_core::{EngineConfig, ReconcileEngine};
use tempfile::tempdir;

async fn registry_with(content: &str) -> (tempfile::TempDir, DomainRegistry) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("domains.txt");
    tokio::fs::write(&path, content).await.unwrap();
    let registry = DomainRegistry::load(&path).await.unwrap();
    (dir, registry)
}

fn engine(api: &RecordingCheckApi) -> ReconcileEngine {
    ReconcileEngine::new(
        Box::new(api.clone()),
        Box::new(MockProbe::new()),
        Box::new(MockWhois::Fail),
        Box::new(CountingMarkerStore::new()),
        &EngineConfig::default(),
    )
}

#[tokio::test]
async fn create_missing_resolves_bare_domains_in_place() {
    let (_dir, mut registry) =
        registry_with("# fleet\nexample.com\nsub.example.com\n").await;

    let api = RecordingCheckApi::new();
    let resolved = engine(&api).create_missing(&mut registry).await.unwrap();
    assert_eq!(resolved, 2);

    let written = tokio::fs::read_to_string(registry.path()).await.unwrap();
    assert_eq!(
        written,
        "# fleet\n\
         example.com s:example.com-status-uuid e:example.com-expiry-uuid\n\
         sub.example.com s:sub.example.com-status-uuid\n"
    );
}

#[tokio::test]
async fn create_missing_is_idempotent() {
    let (_dir, mut registry) = registry_with("example.com\n").await;

    let api = RecordingCheckApi::new();
    let eng = engine(&api);
    assert_eq!(eng.create_missing(&mut registry).await.unwrap(), 1);

    // Second run over the re-loaded file is a no-op
    let mut reloaded = DomainRegistry::load(registry.path()).await.unwrap();
    assert_eq!(eng.create_missing(&mut reloaded).await.unwrap(), 0);

    let created = api.created.lock().unwrap().clone();
    assert_eq!(created.len(), 2); // one status, one expiry, no duplicates
}

#[tokio::test]
async fn create_missing_skips_duplicate_of_existing_entry() {
    let (_dir, mut registry) =
        registry_with("example.com s:AAAA e:BBBB\nexample.com\n").await;

    let api = RecordingCheckApi::new();
    let resolved = engine(&api).create_missing(&mut registry).await.unwrap();
    assert_eq!(resolved, 0);
    assert!(api.created.lock().unwrap().is_empty());
}

#[tokio::test]
async fn create_missing_continues_after_one_domain_fails() {
    let (_dir, mut registry) = registry_with("bad.example\ngood.example\n").await;

    let api = RecordingCheckApi::new();
    api.fail_creates.lock().unwrap().push("bad.example".to_string());

    let resolved = engine(&api).create_missing(&mut registry).await.unwrap();
    assert_eq!(resolved, 1);

    let written = tokio::fs::read_to_string(registry.path()).await.unwrap();
    assert_eq!(
        written,
        "bad.example\ngood.example s:good.example-status-uuid e:good.example-expiry-uuid\n"
    );
}

#[tokio::test]
async fn subdomains_get_no_expiry_check() {
    let (_dir, mut registry) = registry_with("a.b.example.org\n").await;

    let api = RecordingCheckApi::new();
    engine(&api).create_missing(&mut registry).await.unwrap();

    let created = api.created.lock().unwrap().clone();
    assert_eq!(
        created,
        vec![("a.b.example.org".to_string(), "status".to_string())]
    );
    assert_eq!(registry.find("a.b.example.org").unwrap().expiry_check, None);
}

#[tokio::test]
async fn create_domain_rejects_already_registered() {
    let (_dir, mut registry) = registry_with("example.com s:AAAA e:BBBB\n").await;

    let api = RecordingCheckApi::new();
    let created = engine(&api)
        .create_domain(&mut registry, "example.com")
        .await
        .unwrap();
    assert!(!created);
    assert!(api.created.lock().unwrap().is_empty());
}

#[tokio::test]
async fn create_domain_rejects_tokens_that_would_not_reload() {
    let (_dir, mut registry) = registry_with("other.com s:AAAA\n").await;

    let api = RecordingCheckApi::new();
    let eng = engine(&api);
    assert!(eng.create_domain(&mut registry, "bad domain").await.is_err());
    assert!(eng.create_domain(&mut registry, "nodots").await.is_err());

    // Rejected before any remote call or file mutation
    assert!(api.created.lock().unwrap().is_empty());
    let written = tokio::fs::read_to_string(registry.path()).await.unwrap();
    assert_eq!(written, "other.com s:AAAA\n");
}

#[tokio::test]
async fn create_domain_appends_new_entry() {
    let (_dir, mut registry) = registry_with("other.com s:AAAA e:BBBB\n").await;

    let api = RecordingCheckApi::new();
    let created = engine(&api)
        .create_domain(&mut registry, "fresh.org")
        .await
        .unwrap();
    assert!(created);

    let written = tokio::fs::read_to_string(registry.path()).await.unwrap();
    assert_eq!(
        written,
        "other.com s:AAAA e:BBBB\nfresh.org s:fresh.org-status-uuid e:fresh.org-expiry-uuid\n"
    );
}

#[tokio::test]
async fn remove_unused_deletes_exactly_the_unreferenced_checks() {
    let (_dir, registry) = registry_with("example.com s:AAAA e:BBBB\n").await;

    let api = RecordingCheckApi::with_checks(vec![
        RecordingCheckApi::check("AAAA", "example.com", "status"),
        RecordingCheckApi::check("BBBB", "example.com", "domain"),
        RecordingCheckApi::check("ZZZZ", "stale.example", "status"),
    ]);

    let deleted = engine(&api).remove_unused(&registry).await.unwrap();
    assert_eq!(deleted, 1);
    assert_eq!(*api.deleted.lock().unwrap(), vec!["ZZZZ".to_string()]);

    // The registry file itself is untouched
    let written = tokio::fs::read_to_string(registry.path()).await.unwrap();
    assert_eq!(written, "example.com s:AAAA e:BBBB\n");
}

#[tokio::test]
async fn remove_unused_fails_when_listing_fails() {
    let (_dir, registry) = registry_with("example.com s:AAAA\n").await;

    let api = RecordingCheckApi::new();
    *api.fail_list.lock().unwrap() = true;

    assert!(engine(&api).remove_unused(&registry).await.is_err());
    assert!(api.deleted.lock().unwrap().is_empty());
}

#[tokio::test]
async fn remove_all_deletes_every_check_and_keeps_comments() {
    let (_dir, mut registry) =
        registry_with("# fleet\nexample.com s:AAAA e:BBBB\n").await;

    let api = RecordingCheckApi::with_checks(vec![
        RecordingCheckApi::check("AAAA", "example.com", "status"),
        RecordingCheckApi::check("BBBB", "example.com", "domain"),
    ]);

    let deleted = engine(&api).remove_all(&mut registry).await.unwrap();
    assert_eq!(deleted, 2);

    let written = tokio::fs::read_to_string(registry.path()).await.unwrap();
    assert_eq!(written, "# fleet\n");
}
