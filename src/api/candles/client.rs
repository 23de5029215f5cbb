use reqwest::Client as HttpClient;
use tracing::{debug, warn};

use super::models::{ApiError, CandlesQuery, CandlesResponse};

/// Client for the market simulator's candles endpoint
pub struct CandlesClient {
    http_client: HttpClient,
    base_url: String,
}

impl CandlesClient {
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:8080";

    /// Create a client against a custom base URL
    pub fn with_base_url(base_url: String) -> Self {
        Self::with_http_client(base_url, HttpClient::new())
    }

    /// Create a client with a preconfigured reqwest client
    pub fn with_http_client(base_url: String, http_client: HttpClient) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Parse error response based on HTTP status code
    async fn handle_error_response(
        status: reqwest::StatusCode,
        response: reqwest::Response,
    ) -> ApiError {
        let status_code = status.as_u16();
        let body_text = response.text().await.unwrap_or_default();

        match status_code {
            400 => {
                // Try to parse JSON error
                if let Ok(err_json) = serde_json::from_str::<serde_json::Value>(&body_text) {
                    let message = err_json
                        .get("message")
                        .and_then(|v| v.as_str())
                        .unwrap_or(&body_text);
                    ApiError::BadRequest(message.to_string())
                } else {
                    ApiError::BadRequest(body_text.trim().to_string())
                }
            }
            404 => ApiError::NotFound(body_text),
            500..=599 => {
                warn!("Server error {}: {}", status_code, body_text);
                ApiError::ServerError(status_code, body_text)
            }
            _ => ApiError::HttpError(status_code, body_text),
        }
    }

    /// GET /api/candles
    ///
    /// Fetches candles for every symbol in the query. The payload's `success`
    /// flag is returned as-is; interpreting it is up to the caller.
    pub async fn get_candles(&self, query: &CandlesQuery) -> Result<CandlesResponse, ApiError> {
        let url = format!("{}/api/candles", self.base_url);
        debug!("GET {} symbols={:?} days={} interval={}", url, query.symbols, query.days, query.interval);

        let response = self
            .http_client
            .get(&url)
            .query(&query.to_pairs())
            .send()
            .await
            .map_err(|e| ApiError::RequestError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(Self::handle_error_response(status, response).await);
        }

        response
            .json::<CandlesResponse>()
            .await
            .map_err(|e| ApiError::DeserializationError(format!("Failed to parse response: {}", e)))
    }
}
