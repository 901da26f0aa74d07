//! Credential document over HTTP.

use std::time::Duration;

use super::{CredentialSource, Credentials, CredentialsError, parse_document};
use crate::config::StoreConfig;

#[derive(Debug)]
pub struct HttpCredentialSource {
    http: reqwest::Client,
    url: String,
}

impl HttpCredentialSource {
    /// Build a source for `url` with the given timeouts.
    ///
    /// # Errors
    ///
    /// Returns an error if `url` is not an absolute URL or the HTTP client
    /// cannot be constructed.
    pub fn new(url: impl Into<String>, request_timeout: Duration, connect_timeout: Duration) -> Result<Self, CredentialsError> {
        let url = url.into();
        reqwest::Url::parse(&url).map_err(|e| CredentialsError::Request(format!("invalid credentials url '{url}': {e}")))?;
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| CredentialsError::Request(e.to_string()))?;
        Ok(Self { http, url })
    }

    /// Build a source from the URL and timeouts in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured URL is not absolute or the HTTP
    /// client cannot be constructed.
    pub fn from_config(config: &StoreConfig) -> Result<Self, CredentialsError> {
        Self::new(config.credentials_url.clone(), config.request_timeout, config.connect_timeout)
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl CredentialSource for HttpCredentialSource {
    async fn fetch(&self) -> Result<Credentials, CredentialsError> {
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| CredentialsError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CredentialsError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| CredentialsError::Request(e.to_string()))?;
        parse_document(&body)
    }
}
