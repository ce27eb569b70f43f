use crate::api::{parse_listing, IntegrationApi, Listing, INTEGRATION_TYPE};
use crate::core::error::ApiError;
use crate::core::models::Integration;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use std::time::Duration;

const TOKEN_HEADER: HeaderName = HeaderName::from_static("x-sf-token");
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct IntegrationClient {
    client: reqwest::Client,
    base_url: String,
}

impl IntegrationClient {
    /// Client for `https://{domain}` authenticating with `token`.
    pub fn new(domain: &str, token: &str) -> Result<Self> {
        Self::with_base_url(&format!("https://{}", domain.trim()), token)
    }

    pub fn with_base_url(base_url: &str, token: &str) -> Result<Self> {
        let mut token_value =
            HeaderValue::from_str(token).context("API token contains invalid characters")?;
        token_value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(TOKEN_HEADER, token_value);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn list_url(&self) -> String {
        format!("{}/v2/integration?type={}", self.base_url, INTEGRATION_TYPE)
    }

    pub fn update_url(&self, id: &str) -> String {
        format!("{}/v2/integration/{}", self.base_url, id)
    }

    /// Sends the request and returns the body of a 2xx response.
    async fn send(&self, request: reqwest::RequestBuilder, url: &str) -> Result<String, ApiError> {
        let transport = |source: reqwest::Error| ApiError::Transport {
            url: url.to_string(),
            source,
        };

        let response = request.send().await.map_err(transport)?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                url: url.to_string(),
                body,
            });
        }

        response.text().await.map_err(transport)
    }
}

#[async_trait]
impl IntegrationApi for IntegrationClient {
    async fn list_integrations(&self) -> Result<Listing, ApiError> {
        let url = self.list_url();
        tracing::debug!(url = %url, "Listing integrations");

        let body = self.send(self.client.get(&url), &url).await?;
        parse_listing(&body, &url)
    }

    async fn update_integration(&self, id: &str, body: &Integration) -> Result<(), ApiError> {
        let url = self.update_url(id);
        tracing::debug!(url = %url, "Updating integration");

        self.send(self.client.put(&url).json(body), &url).await?;
        Ok(())
    }
}
