use anyhow::{anyhow, Context, Result};
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::debug;

use crate::api::FitnessApi;
use crate::config::export::TimeWindow;
use crate::credentials::Credential;

/// Google Fit REST v1, `users/me` scope. Responses are passed through untouched.
#[derive(Debug, Clone)]
pub struct GoogleFitClient {
    client: Client,
    base_url: Url,
    access_token: String,
}

impl GoogleFitClient {
    pub fn new(client: Client, base_url: &str, credential: &Credential) -> Result<Self> {
        let base_url = Url::parse(base_url).with_context(|| format!("invalid fitness API url '{}'", base_url))?;
        Ok(Self {
            client,
            base_url,
            access_token: credential.access_token.clone(),
        })
    }

    /// Append path segments to the base url, percent-encoding each one.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("fitness API url '{}' cannot be a base", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json(&self, url: Url) -> Result<Value> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("fitness API request failed: {}: {}", status, body));
        }
        response
            .json::<Value>()
            .await
            .context("fitness API response is not JSON")
    }
}

impl FitnessApi for GoogleFitClient {
    async fn list_data_sources(&self, data_type: &str) -> Result<Value> {
        let mut url = self.endpoint(&["users", "me", "dataSources"])?;
        url.query_pairs_mut().append_pair("dataTypeName", data_type);
        self.get_json(url).await
    }

    async fn get_dataset(&self, data_source_id: &str, window: &TimeWindow) -> Result<Value> {
        let dataset_id = window.dataset_id();
        let url = self.endpoint(&[
            "users",
            "me",
            "dataSources",
            data_source_id,
            "datasets",
            dataset_id.as_str(),
        ])?;
        self.get_json(url).await
    }
}
