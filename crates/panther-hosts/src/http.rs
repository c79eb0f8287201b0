//! [`HostDirectory`] over HTTP with `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use panther_core::{Host, Target};
use tracing::{debug, warn};
use url::Url;

use crate::directory::HostDirectory;
use crate::errors::{HostError, Result};

/// Host directory backed by the `/api/v1/host` endpoint.
#[derive(Clone, Debug)]
pub struct HttpHostDirectory {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpHostDirectory {
    /// Client for `endpoint` with a per-request `timeout`.
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("panther/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(endpoint, client))
    }

    /// Use a preconfigured client.
    pub fn with_client(endpoint: Url, client: reqwest::Client) -> Self {
        Self { client, endpoint }
    }

    /// The host endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn write(&self, method: reqwest::Method, host: &Host) -> Result<Host> {
        debug!(%method, host = host.name(), "host write");
        let response = self
            .client
            .request(method, self.endpoint.clone())
            .json(host)
            .send()
            .await?;
        let body = accept(response).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Pass through 2xx responses; turn anything else into [`HostError::Status`]
/// carrying the server's message.
async fn accept(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response
        .text()
        .await
        .unwrap_or_default()
        .trim()
        .to_string();
    warn!(status = status.as_u16(), message = %message, "host request rejected");
    Err(HostError::Status {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl HostDirectory for HttpHostDirectory {
    async fn create(&self, host: &Host) -> Result<Host> {
        self.write(reqwest::Method::POST, host).await
    }

    async fn update(&self, host: &Host) -> Result<Host> {
        self.write(reqwest::Method::PUT, host).await
    }

    async fn fetch(&self, target: &Target) -> Result<Vec<Host>> {
        let search = target.to_query();
        debug!(search = %search, "host fetch");
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("search", search.as_str())])
            .send()
            .await?;
        let body = accept(response).await?.text().await?;
        // An empty result is encoded as `null`.
        let hosts: Option<Vec<Host>> = serde_json::from_str(&body)?;
        Ok(hosts.unwrap_or_default())
    }

    async fn delete(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(HostError::MissingName);
        }
        debug!(host = name, "host delete");
        let response = self
            .client
            .delete(self.endpoint.clone())
            .query(&[("target", name)])
            .send()
            .await?;
        let _ = accept(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_with_timeout() {
        let dir = HttpHostDirectory::new(
            Url::parse("http://localhost:8080/api/v1/host").unwrap(),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(dir.endpoint().path(), "/api/v1/host");
    }

    #[tokio::test]
    async fn empty_name_is_rejected_locally() {
        // Port 9 (discard) is never contacted.
        let dir = HttpHostDirectory::with_client(
            Url::parse("http://127.0.0.1:9/api/v1/host").unwrap(),
            reqwest::Client::new(),
        );
        assert!(matches!(dir.delete("").await, Err(HostError::MissingName)));
    }
}
