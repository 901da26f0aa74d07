//! Credential document on the local filesystem.

use std::path::{Path, PathBuf};

use super::{CredentialSource, Credentials, CredentialsError, parse_document};

#[derive(Debug, Clone)]
pub struct FileCredentialSource {
    path: PathBuf,
}

impl FileCredentialSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl CredentialSource for FileCredentialSource {
    async fn fetch(&self) -> Result<Credentials, CredentialsError> {
        let body = tokio::fs::read(&self.path).await?;
        parse_document(&body)
    }
}
