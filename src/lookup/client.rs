use futures::future::BoxFuture;
use reqwest::Client;
use std::time::Duration;

use crate::config::Config;
use crate::error::{AppResult, LookupError};
use crate::lookup::LookupService;
use crate::lookup::models::{LookupQuery, LookupResult};

pub const MODELS_STATIONS_PATH: &str = "/api/get-models-stations";

pub struct LookupClient {
    http_client: Client,
    base_url: String,
    timeout: Duration,
}

impl LookupClient {
    /// Build a client for the lookup service at `config.lookup_base_url`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Http` if the underlying HTTP client cannot be built.
    pub fn new(config: &Config) -> AppResult<Self> {
        let timeout = config.lookup_timeout();
        let http_client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            base_url: config.lookup_base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// Fetch the models and stations available for a customer (and model).
    ///
    /// # Errors
    ///
    /// Returns `LookupError::Network`/`Timeout` if the request cannot complete,
    /// `LookupError::Http` on a non-success status and `LookupError::Decode`
    /// if the body is not the expected JSON.
    pub async fn get_models_stations(
        &self,
        query: &LookupQuery,
    ) -> Result<LookupResult, LookupError> {
        let url = format!("{}{}", self.base_url, MODELS_STATIONS_PATH);

        tracing::debug!(
            customer = %query.customer,
            model = ?query.model,
            "Fetching models and stations"
        );

        let response = self
            .http_client
            .get(&url)
            .query(&query.query_pairs())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LookupError::Timeout(self.timeout)
                } else {
                    LookupError::Network(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(LookupError::Http {
                status: response.status().as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| LookupError::Network(format!("Failed to get response text: {e}")))?;

        let result: LookupResult = serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                body_preview = %text.chars().take(500).collect::<String>(),
                "Failed to parse get-models-stations response"
            );
            LookupError::Decode(e.to_string())
        })?;

        let counts = result.counts();
        tracing::debug!(
            customer = %query.customer,
            model = ?query.model,
            models = counts.models,
            stations = counts.stations,
            "Lookup succeeded"
        );
        Ok(result)
    }
}

impl LookupService for LookupClient {
    fn lookup<'a>(
        &'a self,
        query: &'a LookupQuery,
    ) -> BoxFuture<'a, Result<LookupResult, LookupError>> {
        Box::pin(self.get_models_stations(query))
    }
}
