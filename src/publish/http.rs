//! HTTP anchor calldata service
//!
//! Asks the knowledge-store API for the calldata that anchors a content id
//! in a space: `POST {api_url}/space/{space_id}/edit/calldata` with
//! `{"cid": …, "network": …}`, answered by `{"to": …, "data": …}`.

use super::models::{AnchorPayload, Network};
use super::traits::AnchorService;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

#[derive(Serialize)]
struct CalldataRequest<'a> {
    cid: &'a str,
    network: &'static str,
}

/// [`AnchorService`] backed by the knowledge-store HTTP API.
#[derive(Clone)]
pub struct HttpAnchorService {
    client: reqwest::Client,
    api_url: String,
    network: Network,
}

impl HttpAnchorService {
    pub fn new(api_url: impl Into<String>, network: Network) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            network,
        })
    }

    fn calldata_url(&self, space_id: &str) -> String {
        format!("{}/space/{}/edit/calldata", self.api_url, space_id)
    }
}

#[async_trait]
impl AnchorService for HttpAnchorService {
    async fn anchor_payload(&self, space_id: &str, content_id: &str) -> Result<AnchorPayload> {
        let url = self.calldata_url(space_id);
        let body = CalldataRequest {
            cid: content_id,
            network: self.network.as_str(),
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Network(format!("failed to reach {}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Network(format!(
                "calldata API returned {}: {}",
                status.as_u16(),
                text
            )));
        }

        let payload: AnchorPayload = response
            .json()
            .await
            .map_err(|e| Error::Network(format!("invalid calldata response: {}", e)))?;

        tracing::debug!(space = %space_id, cid = %content_id, to = %payload.to, "Fetched anchor calldata");
        Ok(payload)
    }
}
