//! Admin credential record, its sources, and update rules.
//!
//! DESIGN
//! ======
//! Credentials live in a read-only JSON document next to the site. A
//! `CredentialSource` fetches that document; the store caches whatever comes
//! back. Updates cannot write the document, so a successful update yields a
//! `CredentialsExport` for the operator to publish out-of-band.
//!
//! TRADE-OFFS
//! ==========
//! Comparison is plaintext equality against a publicly fetchable file. This
//! gates casual access to the panel, nothing more.

pub mod file;
pub mod http;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use file::FileCredentialSource;
pub use http::HttpCredentialSource;

pub const FALLBACK_USERNAME: &str = "admin";
pub const FALLBACK_PASSWORD: &str = "admin123";
pub const MIN_USERNAME_LEN: usize = 3;
pub const MIN_PASSWORD_LEN: usize = 6;
pub const EXPORT_FILE_NAME: &str = "admin_credentials.json";
pub const EXPORT_MESSAGE: &str = "Credentials updated! A file has been downloaded. Please replace \
static/data/admin_credentials.json with the downloaded file and commit to your repository.";

/// The username/password pair checked at login.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self { username: username.into(), password: password.into() }
    }

    /// The pair used when the credential document cannot be loaded.
    #[must_use]
    pub fn fallback() -> Self {
        Self::new(FALLBACK_USERNAME, FALLBACK_PASSWORD)
    }

    /// Case-sensitive exact match on both fields.
    #[must_use]
    pub fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// Why a credential document could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum CredentialsError {
    #[error("credential request failed: {0}")]
    Request(String),
    #[error("credential request returned status {0}")]
    Status(u16),
    #[error("credential file read failed: {0}")]
    Read(#[from] std::io::Error),
    #[error("credential document parse failed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Why a credential update was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum UpdateError {
    #[error("Current password is incorrect")]
    WrongPassword,
    #[error("Username must be at least 3 characters")]
    UsernameTooShort,
    #[error("Password must be at least 6 characters")]
    PasswordTooShort,
}

// =============================================================================
// SOURCE
// =============================================================================

/// Where the credential document comes from.
#[async_trait::async_trait]
pub trait CredentialSource: Send + Sync {
    async fn fetch(&self) -> Result<Credentials, CredentialsError>;
}

/// A fixed in-memory record, for embedding and tests.
#[derive(Debug, Clone)]
pub struct StaticCredentialSource {
    credentials: Credentials,
}

impl StaticCredentialSource {
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }
}

#[async_trait::async_trait]
impl CredentialSource for StaticCredentialSource {
    async fn fetch(&self) -> Result<Credentials, CredentialsError> {
        Ok(self.credentials.clone())
    }
}

/// Decode a credential document body.
pub(crate) fn parse_document(body: &[u8]) -> Result<Credentials, CredentialsError> {
    Ok(serde_json::from_slice(body)?)
}

// =============================================================================
// UPDATE
// =============================================================================

/// Check an update request against the current record.
///
/// Only the current password is verified; the current username is not.
/// Minimum lengths count Unicode scalar values (`chars()`), so an emoji
/// counts once rather than as two UTF-16 code units.
///
/// # Errors
///
/// Returns the first failed check, in order: password, username length,
/// password length.
pub fn validate_update(
    current: &Credentials,
    current_password: &str,
    new_username: &str,
    new_password: &str,
) -> Result<Credentials, UpdateError> {
    if current_password != current.password {
        return Err(UpdateError::WrongPassword);
    }
    if new_username.chars().count() < MIN_USERNAME_LEN {
        return Err(UpdateError::UsernameTooShort);
    }
    if new_password.chars().count() < MIN_PASSWORD_LEN {
        return Err(UpdateError::PasswordTooShort);
    }
    Ok(Credentials::new(new_username, new_password))
}

/// Replacement credential document produced by a successful update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialsExport {
    pub credentials: Credentials,
    pub file_name: &'static str,
    /// Pretty-printed JSON, two-space indent.
    pub contents: String,
    pub message: &'static str,
}

impl CredentialsExport {
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        let contents = serde_json::to_string_pretty(&credentials).unwrap_or_else(|_| {
            serde_json::json!({ "username": credentials.username, "password": credentials.password }).to_string()
        });
        Self { credentials, file_name: EXPORT_FILE_NAME, contents, message: EXPORT_MESSAGE }
    }

    /// Write the replacement document into `dir`, returning its path.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub async fn write_to(&self, dir: &Path) -> std::io::Result<PathBuf> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(self.file_name);
        tokio::fs::write(&path, self.contents.as_bytes()).await?;
        Ok(path)
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
