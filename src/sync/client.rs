use std::future::Future;
use std::time::Duration;

use super::{SyncAck, SyncError, SyncRequest};
use crate::config::Config;

/// Bounded timeout for one push to the endpoint. A hung request resolves to
/// the error path instead of leaving the engine pending forever.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Transport seam between the sync engine and the remote endpoint.
///
/// The engine treats any error uniformly as a full-attempt failure; the
/// transport decides nothing about local state.
pub trait SyncTransport {
    fn push(
        &self,
        request: &SyncRequest,
    ) -> impl Future<Output = Result<SyncAck, SyncError>> + Send;
}

/// HTTP transport posting snapshots to a sarathi-server instance.
pub struct HttpTransport {
    client: reqwest::Client,
    server_url: String,
    api_key: Option<String>,
}

impl HttpTransport {
    pub fn new(server_url: impl Into<String>, api_key: Option<String>) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| SyncError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            server_url: server_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Creates a transport from config; fails if no server URL is set.
    pub fn from_config(config: &Config) -> Result<Self, SyncError> {
        let server_url = config.server_url.clone().ok_or(SyncError::NotConfigured)?;
        Self::new(server_url, config.api_key.clone())
    }

    fn sync_url(&self) -> String {
        format!("{}/sync", self.server_url)
    }
}

impl SyncTransport for HttpTransport {
    async fn push(&self, request: &SyncRequest) -> Result<SyncAck, SyncError> {
        let mut req = self.client.post(self.sync_url()).json(request);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let response = req
            .send()
            .await
            .map_err(|e| SyncError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SyncError::Endpoint(response.status().as_u16()));
        }

        let ack: SyncAck = response
            .json()
            .await
            .map_err(|e| SyncError::Transport(e.to_string()))?;

        if ack.status != "ok" {
            return Err(SyncError::Rejected(ack.status));
        }

        Ok(ack)
    }
}

/// Quick reachability probe against the endpoint's health route.
pub async fn check_server(server_url: &str) -> bool {
    let client = match reqwest::Client::builder().timeout(PROBE_TIMEOUT).build() {
        Ok(client) => client,
        Err(_) => return false,
    };

    let url = format!("{}/health", server_url.trim_end_matches('/'));
    match client.get(&url).send().await {
        Ok(response) => response.status().is_success(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_url_trims_trailing_slash() {
        let transport = HttpTransport::new("http://localhost:8080/", None).unwrap();
        assert_eq!(transport.sync_url(), "http://localhost:8080/sync");

        let transport = HttpTransport::new("http://localhost:8080", None).unwrap();
        assert_eq!(transport.sync_url(), "http://localhost:8080/sync");
    }

    #[test]
    fn test_from_config_requires_server_url() {
        let config = Config::default();
        assert!(matches!(
            HttpTransport::from_config(&config),
            Err(SyncError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn test_check_server_unreachable() {
        // Nothing listens on this port.
        assert!(!check_server("http://127.0.0.1:1").await);
    }
}
