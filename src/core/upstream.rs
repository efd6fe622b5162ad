use crate::domain::model::UpstreamCredentials;
use crate::domain::ports::UpstreamClient;
use crate::utils::error::{RelayError, Result};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// 以 reqwest 實作的上游客戶端
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    client: Client,
}

impl HttpUpstream {
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait::async_trait]
impl UpstreamClient for HttpUpstream {
    async fn get_json(
        &self,
        url: &Url,
        query: &[(String, String)],
        credentials: &UpstreamCredentials,
    ) -> Result<serde_json::Value> {
        let mut request = self
            .client
            .get(url.clone())
            .header(AUTHORIZATION, credentials.authorization.clone())
            .header("Version", &credentials.version)
            .header(CONTENT_TYPE, "application/json");

        if !query.is_empty() {
            request = request.query(query);
        }

        tracing::debug!("📡 GET {} ({} params)", url, query.len());
        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("📡 {} responded with {}", url, status);

        if !status.is_success() {
            return Err(RelayError::UpstreamStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| RelayError::UpstreamPayload {
            message: format!("{} returned a non-JSON body: {}", url, e),
        })
    }
}
