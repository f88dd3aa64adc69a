use std::time::{Duration, Instant};

use cruise_feed::{FetchError, FileFetcher, SupplierPath};

/// Configuration for the supplier's file delivery endpoint.
#[derive(Debug, Clone)]
pub struct SupplierClientConfig {
    /// Base URL the relative supplier paths are appended to.
    pub base_url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Per-attempt timeout. Retry scheduling is the downloader's job;
    /// this only bounds a single request.
    pub timeout: Duration,
    /// Upper bound on accepted payload size. The per-cruise files are a
    /// few hundred KB; anything wildly larger is a bad upload.
    pub max_payload_bytes: u64,
}

impl SupplierClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            username: None,
            password: None,
            timeout: Duration::from_secs(30),
            max_payload_bytes: 20 * 1024 * 1024,
        }
    }
}

/// Fetches per-cruise files from the supplier's delivery endpoint.
///
/// Files are addressed directly by resolved path — no directory listing
/// or traversal. Missing files map to [`FetchError::NotFound`];
/// connection errors, timeouts, and server-side failures map to
/// [`FetchError::Transient`].
pub struct HttpSupplierClient {
    config: SupplierClientConfig,
    client: reqwest::Client,
}

impl HttpSupplierClient {
    pub fn new(config: SupplierClientConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn file_url(&self, path: &SupplierPath) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.as_str(),
        )
    }

    fn build_request(&self, url: &str) -> reqwest::RequestBuilder {
        let mut req = self
            .client
            .get(url)
            .timeout(self.config.timeout)
            .header("User-Agent", "cruise-feed-sync");

        if let Some(username) = &self.config.username {
            req = req.basic_auth(username, self.config.password.as_deref());
        }

        req
    }
}

#[async_trait::async_trait]
impl FileFetcher for HttpSupplierClient {
    async fn fetch(&self, path: &SupplierPath) -> Result<Vec<u8>, FetchError> {
        let url = self.file_url(path);
        let started = Instant::now();

        let response = match self.build_request(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                let error = if e.is_timeout() {
                    format!("request timed out after {:?}", self.config.timeout)
                } else {
                    e.to_string()
                };
                tracing::warn!(
                    path = %path,
                    outcome = "transient",
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %error,
                    "supplier fetch"
                );
                return Err(FetchError::Transient(error));
            }
        };

        let status = response.status();
        if status.as_u16() == 404 {
            tracing::info!(
                path = %path,
                outcome = "not_found",
                elapsed_ms = started.elapsed().as_millis() as u64,
                "supplier fetch"
            );
            return Err(FetchError::NotFound);
        }

        if !status.is_success() {
            let error = format!("HTTP {status}");
            tracing::warn!(
                path = %path,
                outcome = "transient",
                elapsed_ms = started.elapsed().as_millis() as u64,
                error = %error,
                "supplier fetch"
            );
            return Err(FetchError::Transient(error));
        }

        if let Some(length) = response.content_length()
            && length > self.config.max_payload_bytes
        {
            return Err(FetchError::Transient(format!(
                "payload of {length} bytes exceeds the {} byte limit",
                self.config.max_payload_bytes,
            )));
        }

        let payload = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transient(format!("failed to read payload: {e}")))?;

        if payload.is_empty() {
            return Err(FetchError::Transient("empty payload".to_owned()));
        }
        if payload.len() as u64 > self.config.max_payload_bytes {
            return Err(FetchError::Transient(format!(
                "payload of {} bytes exceeds the {} byte limit",
                payload.len(),
                self.config.max_payload_bytes,
            )));
        }

        tracing::info!(
            path = %path,
            outcome = "success",
            bytes = payload.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "supplier fetch"
        );

        Ok(payload.to_vec())
    }
}
