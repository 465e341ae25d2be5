use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{SummarizeRequest, SummarizeResult};

// The service uses the same header for the login key and the access token.
const API_KEY_HEADER: &str = "X-API-Key";

const GENERIC_SUMMARIZE_ERROR: &str = "An error occurred while summarizing the video.";

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
}

pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        // Validate early so a typo in the config fails at startup, not on submit.
        Url::parse(base_url)
            .map_err(|e| AppError::Config(format!("Invalid api_base_url '{}': {}", base_url, e)))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Exchange an API key for an access token.
    ///
    /// Any non-success status is treated as an authentication failure.
    pub async fn login(&self, api_key: &str) -> Result<String> {
        let response = self
            .client
            .post(self.endpoint("login"))
            .header(API_KEY_HEADER, api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::warn!("Login rejected with status {}", response.status());
            return Err(AppError::InvalidApiKey);
        }

        let body: LoginResponse = response.json().await?;
        Ok(body.access_token)
    }

    /// Submit a summarize request with the stored access token.
    ///
    /// On a non-success status the server's `detail` message is surfaced
    /// verbatim when present.
    pub async fn summarize(
        &self,
        access_token: &str,
        request: &SummarizeRequest,
    ) -> Result<SummarizeResult> {
        let response = self
            .client
            .post(self.endpoint("summarize"))
            .header(API_KEY_HEADER, access_token)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::warn!("Summarize request failed with status {}", status);
            return Err(AppError::Api(error_detail(&error_text)));
        }

        let result: SummarizeResult = response.json().await?;
        Ok(result)
    }

    /// Ping the service's health endpoint.
    pub async fn health(&self) -> Result<String> {
        let response = self.client.get(self.endpoint("health")).send().await?;

        if !response.status().is_success() {
            return Err(AppError::Api(format!(
                "Service unhealthy: HTTP {}",
                response.status()
            )));
        }

        let body: HealthResponse = response.json().await?;
        Ok(body.status)
    }
}

/// Extract the `detail` field from an error body, falling back to a generic
/// message when the body is not the expected JSON shape.
fn error_detail(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|e| e.detail)
        .unwrap_or_else(|| GENERIC_SUMMARIZE_ERROR.to_string())
}
