//! Local session & content store.
//!
//! DESIGN
//! ======
//! `AdminStore` answers four questions for the admin panel: is the visitor
//! logged in, is maintenance mode on, which contact submissions exist, and
//! what are the admin credentials. Flags and submissions live in the
//! injected key/value medium and are materialized lazily on first read.
//! Credentials are fetched once per store and cached in memory.
//!
//! CONCURRENCY
//! ===========
//! The first `load_credentials` call installs a shared future in the cache
//! slot; callers arriving while it is pending clone and await the same
//! future, so K concurrent loads cost exactly one fetch. The slot mutex is
//! never held across an `.await`.
//!
//! Read-modify-write sequences on the medium (`add_contact`,
//! `toggle_maintenance_mode`) are not guarded against other processes
//! sharing that medium.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tracing::{error, info, warn};

use crate::contact::{Contact, now_timestamp};
use crate::credentials::{CredentialSource, Credentials, CredentialsExport, UpdateError, validate_update};
use crate::storage::KeyValueStore;

pub const LOGGED_IN_KEY: &str = "admin_logged_in";
pub const MAINTENANCE_KEY: &str = "maintenance_mode";
pub const CONTACTS_KEY: &str = "contact_submissions";

type PendingLoad = Shared<BoxFuture<'static, Credentials>>;

enum CacheSlot {
    Empty,
    Loading(PendingLoad),
    Ready(Credentials),
}

#[derive(Clone)]
pub struct AdminStore {
    storage: Arc<dyn KeyValueStore>,
    source: Arc<dyn CredentialSource>,
    cache: Arc<Mutex<CacheSlot>>,
}

impl AdminStore {
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>, source: Arc<dyn CredentialSource>) -> Self {
        Self { storage, source, cache: Arc::new(Mutex::new(CacheSlot::Empty)) }
    }

    /// Materialize the maintenance flag and contact list if absent.
    pub fn initialize(&self) {
        self.init_maintenance_mode();
        self.init_contacts();
    }

    fn cache(&self) -> MutexGuard<'_, CacheSlot> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // CREDENTIALS
    // =========================================================================

    /// Return the cached credentials, loading them on first use.
    ///
    /// Load failures resolve to [`Credentials::fallback`], which is then cached.
    pub async fn load_credentials(&self) -> Credentials {
        let pending = {
            let mut slot = self.cache();
            match &*slot {
                CacheSlot::Ready(creds) => return creds.clone(),
                CacheSlot::Loading(pending) => pending.clone(),
                CacheSlot::Empty => {
                    let pending = fetch_or_fallback(Arc::clone(&self.source)).boxed().shared();
                    *slot = CacheSlot::Loading(pending.clone());
                    pending
                }
            }
        };

        let creds = pending.await;

        let mut slot = self.cache();
        match &*slot {
            // An update landed while the load was pending; it wins.
            CacheSlot::Ready(current) => current.clone(),
            CacheSlot::Loading(_) | CacheSlot::Empty => {
                *slot = CacheSlot::Ready(creds.clone());
                creds
            }
        }
    }

    /// Check `username`/`password` against the credentials and record the login.
    pub async fn login(&self, username: &str, password: &str) -> bool {
        let creds = self.load_credentials().await;
        if !creds.matches(username, password) {
            info!(username, "admin login rejected");
            return false;
        }
        self.storage.set(LOGGED_IN_KEY, "true");
        info!(username, "admin logged in");
        true
    }

    pub fn logout(&self) {
        self.storage.remove(LOGGED_IN_KEY);
        info!("admin logged out");
    }

    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.storage.get(LOGGED_IN_KEY).as_deref() == Some("true")
    }

    /// Replace the cached credentials after verifying the current password.
    ///
    /// The credential document itself is read-only; the returned export holds
    /// the replacement document for the operator to publish.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateError`] when the current password is wrong or the new
    /// username/password are too short. The cache is untouched on error.
    pub async fn update_credentials(
        &self,
        current_password: &str,
        new_username: &str,
        new_password: &str,
    ) -> Result<CredentialsExport, UpdateError> {
        let current = self.load_credentials().await;
        let updated = validate_update(&current, current_password, new_username, new_password).inspect_err(|e| {
            info!(error = %e, "credential update rejected");
        })?;

        *self.cache() = CacheSlot::Ready(updated.clone());
        info!(username = %updated.username, "admin credentials updated in memory");
        Ok(CredentialsExport::new(updated))
    }

    // =========================================================================
    // MAINTENANCE MODE
    // =========================================================================

    fn init_maintenance_mode(&self) {
        if is_absent(self.storage.get(MAINTENANCE_KEY).as_deref()) {
            self.storage.set(MAINTENANCE_KEY, "false");
        }
    }

    #[must_use]
    pub fn get_maintenance_mode(&self) -> bool {
        self.init_maintenance_mode();
        self.storage.get(MAINTENANCE_KEY).as_deref() == Some("true")
    }

    /// Flip maintenance mode and return the new value.
    pub fn toggle_maintenance_mode(&self) -> bool {
        let next = !self.get_maintenance_mode();
        self.storage.set(MAINTENANCE_KEY, if next { "true" } else { "false" });
        info!(enabled = next, "maintenance mode toggled");
        next
    }

    // =========================================================================
    // CONTACTS
    // =========================================================================

    fn init_contacts(&self) {
        if is_absent(self.storage.get(CONTACTS_KEY).as_deref()) {
            self.storage.set(CONTACTS_KEY, "[]");
        }
    }

    fn read_contacts(&self) -> Result<Vec<Contact>, serde_json::Error> {
        self.init_contacts();
        match self.storage.get(CONTACTS_KEY) {
            Some(raw) if !raw.is_empty() => serde_json::from_str(&raw),
            _ => Ok(Vec::new()),
        }
    }

    /// All stored submissions, oldest first.
    ///
    /// A stored value that is not a list of submissions reads as empty but is
    /// left in place.
    #[must_use]
    pub fn get_contacts(&self) -> Vec<Contact> {
        self.read_contacts().unwrap_or_else(|e| {
            error!(error = %e, "stored contact submissions are unreadable; showing none");
            Vec::new()
        })
    }

    /// Stamp `contact` with the current time, append it, and persist the list.
    ///
    /// When the stored collection cannot be read, nothing is written so the
    /// existing value is never overwritten.
    pub fn add_contact(&self, mut contact: Contact) -> Contact {
        contact.timestamp = now_timestamp();
        let mut contacts = match self.read_contacts() {
            Ok(contacts) => contacts,
            Err(e) => {
                error!(error = %e, "stored contact submissions are unreadable; submission not saved");
                return contact;
            }
        };
        contacts.push(contact.clone());

        match serde_json::to_string(&contacts) {
            Ok(raw) => self.storage.set(CONTACTS_KEY, &raw),
            Err(e) => warn!(error = %e, "contact submissions could not be encoded"),
        }
        info!(total = contacts.len(), "contact submission stored");
        contact
    }
}

fn is_absent(value: Option<&str>) -> bool {
    value.is_none_or(str::is_empty)
}

async fn fetch_or_fallback(source: Arc<dyn CredentialSource>) -> Credentials {
    match source.fetch().await {
        Ok(creds) => creds,
        Err(e) => {
            error!(error = %e, "credential load failed; using fallback credentials");
            Credentials::fallback()
        }
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
