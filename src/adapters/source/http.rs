//! HTTP source with retry
//!
//! Keys are resolved against `source.location` as a base URL. Server errors,
//! throttling and connection failures are retried with exponential backoff;
//! other client errors fail immediately.

use super::SourceStorage;
use crate::config::SourceConfig;
use crate::domain::errors::SluiceError;
use crate::domain::ids::SourceKey;
use crate::domain::Result;
use crate::log_retry_attempt;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::ExposeSecret;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use url::Url;

/// Outcome of a single download attempt
enum AttemptError {
    /// Worth retrying
    Retryable(String),
    /// Final
    Fatal(String),
}

/// Source storage that downloads over HTTP(S)
pub struct HttpSource {
    client: Client,
    base_url: Url,
    config: SourceConfig,
}

impl HttpSource {
    /// Creates the source from configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the base URL is invalid or the client
    /// cannot be built.
    pub fn new(config: SourceConfig) -> Result<Self> {
        let mut location = config.location.clone();
        if !location.ends_with('/') {
            location.push('/');
        }
        let base_url = Url::parse(&location).map_err(|e| {
            SluiceError::Configuration(format!("Invalid source location '{}': {}", location, e))
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                SluiceError::Configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    /// URL a key resolves to
    pub fn url_for(&self, key: &SourceKey) -> Result<Url> {
        self.base_url.join(key.as_str()).map_err(|e| {
            SluiceError::SourceUnavailable(format!("Cannot resolve source key '{}': {}", key, e))
        })
    }

    async fn attempt(&self, url: &Url, destination: &Path) -> std::result::Result<u64, AttemptError> {
        let mut request = self.client.get(url.clone());
        if let Some(ref token) = self.config.auth_token {
            let token: &str = token.expose_secret().as_ref();
            request = request.bearer_auth(token);
        }

        let mut response = request
            .send()
            .await
            .map_err(|e| AttemptError::Retryable(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = format!("server returned {}", status);
            return Err(
                if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
                    AttemptError::Retryable(message)
                } else {
                    AttemptError::Fatal(message)
                },
            );
        }

        let mut file = tokio::fs::File::create(destination)
            .await
            .map_err(|e| AttemptError::Fatal(format!("cannot create local copy: {}", e)))?;
        let mut written = 0u64;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| AttemptError::Retryable(format!("body read failed: {}", e)))?
        {
            file.write_all(&chunk)
                .await
                .map_err(|e| AttemptError::Fatal(format!("cannot write local copy: {}", e)))?;
            written += chunk.len() as u64;
        }
        file.flush()
            .await
            .map_err(|e| AttemptError::Fatal(format!("cannot write local copy: {}", e)))?;

        Ok(written)
    }
}

#[async_trait]
impl SourceStorage for HttpSource {
    async fn download(&self, destination: &Path, key: &SourceKey) -> Result<()> {
        let url = self.url_for(key)?;
        let max_attempts = self.config.retry.max_retries + 1;
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.attempt(&url, destination).await {
                Ok(bytes) => {
                    tracing::debug!(url = %url, bytes, attempt, "Source file downloaded");
                    return Ok(());
                }
                Err(AttemptError::Retryable(reason)) if attempt < max_attempts => {
                    log_retry_attempt!(attempt, max_attempts, reason);
                    tokio::time::sleep(self.config.retry.delay_for_attempt(attempt)).await;
                }
                Err(AttemptError::Retryable(reason)) | Err(AttemptError::Fatal(reason)) => {
                    return Err(SluiceError::SourceUnavailable(format!(
                        "Failed to download {} after {} attempt(s): {}",
                        url, attempt, reason
                    )));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{secret_string, CsvConfig, RetryConfig, SourceBackend};
    use tempfile::TempDir;

    fn config(location: String) -> SourceConfig {
        SourceConfig {
            backend: SourceBackend::Http,
            location,
            key: None,
            timeout_seconds: 5,
            auth_token: Some(secret_string("t0ken".to_string())),
            retry: RetryConfig {
                max_retries: 2,
                initial_delay_ms: 1,
                max_delay_ms: 5,
                backoff_multiplier: 2.0,
            },
            csv: CsvConfig::default(),
        }
    }

    #[test]
    fn test_url_for_key() {
        let source = HttpSource::new(config("https://files.example.com/uploads".to_string())).unwrap();
        let url = source
            .url_for(&SourceKey::new("2025/members.csv").unwrap())
            .unwrap();
        assert_eq!(url.as_str(), "https://files.example.com/uploads/2025/members.csv");
    }

    #[tokio::test]
    async fn test_download_with_bearer_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/members.csv")
            .match_header("authorization", "Bearer t0ken")
            .with_status(200)
            .with_body("a,b\n1,2\n")
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let destination = dir.path().join("copy.csv");
        let source = HttpSource::new(config(server.url())).unwrap();
        source
            .download(&destination, &SourceKey::new("members.csv").unwrap())
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(std::fs::read_to_string(destination).unwrap(), "a,b\n1,2\n");
    }

    #[tokio::test]
    async fn test_server_errors_are_retried_then_fail() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/members.csv")
            .with_status(503)
            .expect(3)
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let source = HttpSource::new(config(server.url())).unwrap();
        let result = source
            .download(&dir.path().join("copy.csv"), &SourceKey::new("members.csv").unwrap())
            .await;

        mock.assert_async().await;
        assert!(matches!(result, Err(SluiceError::SourceUnavailable(_))));
    }

    #[tokio::test]
    async fn test_not_found_is_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/missing.csv")
            .with_status(404)
            .expect(1)
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let source = HttpSource::new(config(server.url())).unwrap();
        let result = source
            .download(&dir.path().join("copy.csv"), &SourceKey::new("missing.csv").unwrap())
            .await;

        mock.assert_async().await;
        let err = result.unwrap_err().to_string();
        assert!(err.contains("404"));
    }
}
