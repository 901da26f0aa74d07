use super::*;
use crate::credentials::{CredentialsError, StaticCredentialSource};
use crate::storage::MemoryStorage;
use std::sync::atomic::{AtomicUsize, Ordering};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tokio::sync::Notify;

// =============================================================================
// Mock sources
// =============================================================================

/// Counts fetches and holds each one until `release` is notified.
struct GatedSource {
    fetches: AtomicUsize,
    release: Notify,
    result: fn() -> Result<Credentials, CredentialsError>,
}

impl GatedSource {
    fn new(result: fn() -> Result<Credentials, CredentialsError>) -> Self {
        Self { fetches: AtomicUsize::new(0), release: Notify::new(), result }
    }
}

#[async_trait::async_trait]
impl CredentialSource for GatedSource {
    async fn fetch(&self) -> Result<Credentials, CredentialsError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.release.notified().await;
        (self.result)()
    }
}

struct FailingSource;

#[async_trait::async_trait]
impl CredentialSource for FailingSource {
    async fn fetch(&self) -> Result<Credentials, CredentialsError> {
        Err(CredentialsError::Request("connection refused".into()))
    }
}

fn admin_source() -> Arc<dyn CredentialSource> {
    Arc::new(StaticCredentialSource::new(Credentials::new("admin", "admin123")))
}

fn store_with(source: Arc<dyn CredentialSource>) -> (AdminStore, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new());
    let store = AdminStore::new(storage.clone(), source);
    (store, storage)
}

/// Wait until every spawned loader has parked on the gate.
async fn wait_for_fetch(source: &GatedSource) {
    while source.fetches.load(Ordering::SeqCst) == 0 {
        tokio::task::yield_now().await;
    }
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

// =============================================================================
// login / logout
// =============================================================================

#[tokio::test]
async fn fresh_store_is_logged_out() {
    let (store, _) = store_with(admin_source());
    assert!(!store.is_logged_in());
}

#[tokio::test]
async fn login_with_matching_credentials_sets_flag() {
    let (store, storage) = store_with(admin_source());
    assert!(store.login("admin", "admin123").await);
    assert!(store.is_logged_in());
    assert_eq!(storage.get(LOGGED_IN_KEY).as_deref(), Some("true"));
}

#[tokio::test]
async fn login_with_wrong_password_leaves_state_unchanged() {
    let (store, storage) = store_with(admin_source());
    assert!(!store.login("admin", "wrong").await);
    assert!(!store.is_logged_in());
    assert_eq!(storage.get(LOGGED_IN_KEY), None);

    assert!(store.login("admin", "admin123").await);
    assert!(!store.login("admin", "wrong").await);
    assert!(store.is_logged_in());
}

#[tokio::test]
async fn login_is_case_sensitive() {
    let (store, _) = store_with(admin_source());
    assert!(!store.login("ADMIN", "admin123").await);
    assert!(!store.is_logged_in());
}

#[tokio::test]
async fn logout_clears_flag() {
    let (store, storage) = store_with(admin_source());
    assert!(store.login("admin", "admin123").await);
    store.logout();
    assert!(!store.is_logged_in());
    assert_eq!(storage.get(LOGGED_IN_KEY), None);
}

#[tokio::test]
async fn only_literal_true_counts_as_logged_in() {
    let (store, storage) = store_with(admin_source());
    storage.set(LOGGED_IN_KEY, "TRUE");
    assert!(!store.is_logged_in());
    storage.set(LOGGED_IN_KEY, "1");
    assert!(!store.is_logged_in());
}

#[tokio::test]
async fn login_flag_is_independent_of_maintenance_flag() {
    let (store, _) = store_with(admin_source());
    assert!(store.toggle_maintenance_mode());

    assert!(!store.is_logged_in());
    assert!(store.login("admin", "admin123").await);
    assert!(store.is_logged_in());
    assert!(store.get_maintenance_mode());

    store.logout();
    assert!(!store.is_logged_in());
    assert!(store.get_maintenance_mode());
}

#[tokio::test]
async fn is_logged_in_has_no_side_effects() {
    let (store, storage) = store_with(admin_source());
    let _ = store.is_logged_in();
    assert_eq!(storage.get(LOGGED_IN_KEY), None);
    assert_eq!(storage.get(MAINTENANCE_KEY), None);
}

// =============================================================================
// load_credentials
// =============================================================================

#[tokio::test]
async fn load_credentials_returns_source_record() {
    let (store, _) = store_with(admin_source());
    assert_eq!(store.load_credentials().await, Credentials::new("admin", "admin123"));
}

#[tokio::test]
async fn load_credentials_failure_resolves_to_fallback() {
    let (store, _) = store_with(Arc::new(FailingSource));
    assert_eq!(store.load_credentials().await, Credentials::new("admin", "admin123"));
    assert!(store.login("admin", "admin123").await);
}

#[tokio::test]
async fn load_credentials_caches_after_first_fetch() {
    let source = Arc::new(GatedSource::new(|| Ok(Credentials::new("ops", "opspass"))));
    let (store, _) = store_with(source.clone());

    source.release.notify_one();
    assert_eq!(store.load_credentials().await, Credentials::new("ops", "opspass"));
    assert_eq!(store.load_credentials().await, Credentials::new("ops", "opspass"));
    assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn concurrent_loads_share_one_fetch() {
    let source = Arc::new(GatedSource::new(|| Ok(Credentials::new("ops", "opspass"))));
    let (store, _) = store_with(source.clone());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.load_credentials().await })
        })
        .collect();

    wait_for_fetch(&source).await;
    source.release.notify_one();

    for handle in handles {
        assert_eq!(handle.await.unwrap(), Credentials::new("ops", "opspass"));
    }
    assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn concurrent_loads_share_one_fallback() {
    let source = Arc::new(GatedSource::new(|| Err(CredentialsError::Status(500))));
    let (store, _) = store_with(source.clone());

    let loads = futures::future::join_all((0..5).map(|_| store.load_credentials()));
    let release = async {
        wait_for_fetch(&source).await;
        source.release.notify_one();
    };
    let (results, ()) = tokio::join!(loads, release);

    assert_eq!(results.len(), 5);
    assert!(results.iter().all(|c| *c == Credentials::fallback()));
    assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn separate_stores_do_not_share_cache() {
    let (a, _) = store_with(admin_source());
    let (b, _) = store_with(Arc::new(StaticCredentialSource::new(Credentials::new("other", "otherpass"))));

    assert!(a.update_credentials("admin123", "changed", "changed1").await.is_ok());
    assert_eq!(b.load_credentials().await, Credentials::new("other", "otherpass"));
}

// =============================================================================
// update_credentials
// =============================================================================

#[tokio::test]
async fn update_rejects_short_username() {
    let (store, _) = store_with(admin_source());
    let err = store.update_credentials("admin123", "ab", "newpass1").await.unwrap_err();
    assert_eq!(err, UpdateError::UsernameTooShort);
}

#[tokio::test]
async fn update_rejects_short_password() {
    let (store, _) = store_with(admin_source());
    let err = store.update_credentials("admin123", "abc", "short").await.unwrap_err();
    assert_eq!(err, UpdateError::PasswordTooShort);
}

#[tokio::test]
async fn update_rejects_wrong_password_and_keeps_cache() {
    let (store, _) = store_with(admin_source());
    let err = store.update_credentials("nope", "abc", "newpass1").await.unwrap_err();
    assert_eq!(err, UpdateError::WrongPassword);
    assert_eq!(store.load_credentials().await, Credentials::new("admin", "admin123"));
}

#[tokio::test]
async fn update_swaps_cache_and_login_uses_new_pair() {
    let (store, _) = store_with(admin_source());
    let export = store.update_credentials("admin123", "abc", "newpass1").await.unwrap();

    assert_eq!(export.credentials, Credentials::new("abc", "newpass1"));
    assert_eq!(export.file_name, "admin_credentials.json");
    assert!(store.login("abc", "newpass1").await);
    assert!(!store.login("admin", "admin123").await);
}

#[tokio::test]
async fn update_does_not_touch_login_flag() {
    let (store, _) = store_with(admin_source());
    assert!(store.login("admin", "admin123").await);
    store.update_credentials("admin123", "abc", "newpass1").await.unwrap();
    assert!(store.is_logged_in());
}

#[tokio::test]
async fn update_during_pending_load_wins() {
    let source = Arc::new(GatedSource::new(|| Ok(Credentials::new("ops", "opspass"))));
    let (store, _) = store_with(source.clone());

    let pending = {
        let store = store.clone();
        tokio::spawn(async move { store.load_credentials().await })
    };
    wait_for_fetch(&source).await;

    // Simulate an update that lands before the pending load resolves.
    *store.cache() = CacheSlot::Ready(Credentials::new("abc", "newpass1"));
    source.release.notify_one();

    assert_eq!(pending.await.unwrap(), Credentials::new("abc", "newpass1"));
    assert_eq!(store.load_credentials().await, Credentials::new("abc", "newpass1"));
}

// =============================================================================
// maintenance mode
// =============================================================================

#[test]
fn maintenance_defaults_to_false_and_materializes() {
    let (store, storage) = store_with(admin_source());
    assert!(!store.get_maintenance_mode());
    assert_eq!(storage.get(MAINTENANCE_KEY).as_deref(), Some("false"));
}

#[test]
fn maintenance_empty_value_is_reinitialized() {
    let (store, storage) = store_with(admin_source());
    storage.set(MAINTENANCE_KEY, "");
    assert!(!store.get_maintenance_mode());
    assert_eq!(storage.get(MAINTENANCE_KEY).as_deref(), Some("false"));
}

#[test]
fn maintenance_reads_existing_true() {
    let (store, storage) = store_with(admin_source());
    storage.set(MAINTENANCE_KEY, "true");
    assert!(store.get_maintenance_mode());
}

#[test]
fn toggle_returns_new_value_and_persists() {
    let (store, storage) = store_with(admin_source());
    assert!(store.toggle_maintenance_mode());
    assert_eq!(storage.get(MAINTENANCE_KEY).as_deref(), Some("true"));
    assert!(store.get_maintenance_mode());
}

#[test]
fn toggle_twice_is_identity() {
    for start in [false, true] {
        let (store, storage) = store_with(admin_source());
        storage.set(MAINTENANCE_KEY, if start { "true" } else { "false" });

        store.toggle_maintenance_mode();
        store.toggle_maintenance_mode();
        assert_eq!(store.get_maintenance_mode(), start);
    }
}

// =============================================================================
// contacts
// =============================================================================

#[test]
fn contacts_default_to_empty_and_materialize() {
    let (store, storage) = store_with(admin_source());
    assert!(store.get_contacts().is_empty());
    assert_eq!(storage.get(CONTACTS_KEY).as_deref(), Some("[]"));
}

#[test]
fn add_contact_appends_in_order_with_timestamps() {
    let (store, _) = store_with(admin_source());
    for i in 0..3 {
        store.add_contact(Contact::new(format!("User {i}"), format!("u{i}@example.com"), "web", "hello"));
    }

    let contacts = store.get_contacts();
    assert_eq!(contacts.len(), 3);
    for (i, contact) in contacts.iter().enumerate() {
        assert_eq!(contact.name, format!("User {i}"));
        assert!(OffsetDateTime::parse(&contact.timestamp, &Rfc3339).is_ok(), "bad timestamp {}", contact.timestamp);
    }
}

#[test]
fn add_contact_overwrites_caller_timestamp() {
    let (store, _) = store_with(admin_source());
    let mut contact = Contact::new("Ada", "ada@example.com", "design", "hi");
    contact.timestamp = "1999-01-01T00:00:00.000Z".into();

    let before = OffsetDateTime::now_utc() - time::Duration::seconds(1);
    let stored = store.add_contact(contact);
    let after = OffsetDateTime::now_utc() + time::Duration::seconds(1);

    let stamped = OffsetDateTime::parse(&stored.timestamp, &Rfc3339).unwrap();
    assert!(stamped >= before && stamped <= after);
    assert_eq!(store.get_contacts()[0].timestamp, stored.timestamp);
}

#[test]
fn add_contact_keeps_entries_with_null_and_extra_fields() {
    let (store, storage) = store_with(admin_source());
    storage.set(
        CONTACTS_KEY,
        r#"[{"name":"Old","email":"old@example.com","service":null,"message":"hi","timestamp":"2024-01-01T00:00:00.000Z"},
            {"name":"Older","email":"older@example.com","service":"seo","message":"yo","timestamp":"2024-01-02T00:00:00.000Z","phone":"555-0100"}]"#,
    );
    assert_eq!(store.get_contacts().len(), 2);

    store.add_contact(Contact::new("New", "new@example.com", "web", "hello"));

    let contacts = store.get_contacts();
    let names: Vec<&str> = contacts.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Old", "Older", "New"]);
    assert_eq!(contacts[0].timestamp, "2024-01-01T00:00:00.000Z");

    let raw: serde_json::Value = serde_json::from_str(&storage.get(CONTACTS_KEY).unwrap()).unwrap();
    assert_eq!(raw[1]["phone"], "555-0100");
}

#[test]
fn unreadable_contacts_are_never_overwritten() {
    let (store, storage) = store_with(admin_source());
    storage.set(CONTACTS_KEY, r#"{"not":"a list"}"#);
    assert!(store.get_contacts().is_empty());

    let stored = store.add_contact(Contact::new("Ada", "ada@example.com", "web", "hi"));
    assert!(!stored.timestamp.is_empty());
    assert_eq!(storage.get(CONTACTS_KEY).as_deref(), Some(r#"{"not":"a list"}"#));
}

#[test]
fn initialize_materializes_flags_and_contacts() {
    let (store, storage) = store_with(admin_source());
    store.initialize();
    assert_eq!(storage.get(MAINTENANCE_KEY).as_deref(), Some("false"));
    assert_eq!(storage.get(CONTACTS_KEY).as_deref(), Some("[]"));
    assert_eq!(storage.get(LOGGED_IN_KEY), None);
}

#[test]
fn initialize_preserves_existing_values() {
    let (store, storage) = store_with(admin_source());
    storage.set(MAINTENANCE_KEY, "true");
    store.add_contact(Contact::new("Ada", "ada@example.com", "web", "hi"));

    store.initialize();
    assert!(store.get_maintenance_mode());
    assert_eq!(store.get_contacts().len(), 1);
}
