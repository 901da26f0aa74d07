//! Site admin — session, maintenance, and contact state for a static site.
//!
//! ARCHITECTURE
//! ============
//! `AdminStore` is the single source of truth for the admin panel. It owns
//! no I/O of its own: the key/value medium (`storage`) and the credential
//! document (`credentials`) are injected, so a browser build, a native
//! process, and tests each plug in their own implementations.
//!
//! `site` and `dashboard` are pure helpers the page layer calls to decide
//! redirects and to shape what the admin dashboard renders.

pub mod config;
pub mod contact;
pub mod credentials;
pub mod dashboard;
pub mod logging;
pub mod site;
pub mod storage;
pub mod store;

pub use config::StoreConfig;
pub use contact::Contact;
pub use credentials::{CredentialSource, Credentials, CredentialsError, CredentialsExport, UpdateError};
pub use dashboard::DashboardSummary;
pub use storage::KeyValueStore;
pub use store::AdminStore;
