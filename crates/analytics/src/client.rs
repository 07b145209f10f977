use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Url};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use slackpanel_core::MixpanelConfig;
use thiserror::Error;
use tracing::{debug, warn};

use crate::query::AnalyticsQuery;
use crate::signature::sign;

pub const API_VERSION: &str = "2.0";
pub const REQUEST_EXPIRY_SECS: i64 = 600;
const ERROR_BODY_PREVIEW_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("could not build analytics http client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    #[error("analytics request url `{url}` is invalid: {message}")]
    InvalidUrl { url: String, message: String },
    #[error("analytics request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("analytics api responded with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("analytics response was not valid json: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("analytics response did not contain a numeric `results` field")]
    MissingResults,
}

#[async_trait]
pub trait AnalyticsBackend: Send + Sync {
    async fn query(&self, query: &AnalyticsQuery) -> Result<Value, AnalyticsError>;

    async fn count(&self, query: &AnalyticsQuery) -> Result<u64, AnalyticsError> {
        let body = self.query(query).await?;
        results_count(&body)
    }
}

pub fn results_count(body: &Value) -> Result<u64, AnalyticsError> {
    let results = body.get("results").ok_or(AnalyticsError::MissingResults)?;
    results
        .as_u64()
        .or_else(|| {
            results.as_f64().filter(|value| *value >= 0.0 && value.fract() == 0.0).map(|v| v as u64)
        })
        .ok_or(AnalyticsError::MissingResults)
}

#[derive(Clone, Debug)]
pub struct AnalyticsClient {
    http: Client,
    base_url: String,
    api_key: SecretString,
    api_secret: SecretString,
}

impl AnalyticsClient {
    pub fn new(config: &MixpanelConfig) -> Result<Self, AnalyticsError> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(AnalyticsError::ClientBuild)?;

        Ok(Self {
            http,
            base_url: config.base_url.trim().trim_end_matches('/').to_owned(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        })
    }

    /// Signed request URL: `{base}/2.0/{endpoint}/?sig=...&{merged parameters}`.
    pub fn request_url(&self, query: &AnalyticsQuery, now_unix: i64) -> Result<Url, AnalyticsError> {
        let parameters = query
            .merged_parameters(self.api_key.expose_secret(), now_unix + REQUEST_EXPIRY_SECS);
        let signature = sign(
            parameters.iter().map(|(key, value)| (key.as_str(), value.as_str())),
            self.api_secret.expose_secret(),
        );

        let raw = format!("{}/{}/{}/", self.base_url, API_VERSION, query.endpoint_path());
        let mut url = Url::parse(&raw)
            .map_err(|error| AnalyticsError::InvalidUrl { url: raw.clone(), message: error.to_string() })?;

        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("sig", &signature);
            for (key, value) in &parameters {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }
}

#[async_trait]
impl AnalyticsBackend for AnalyticsClient {
    async fn query(&self, query: &AnalyticsQuery) -> Result<Value, AnalyticsError> {
        let endpoint = query.endpoint_path();
        let url = self.request_url(query, Utc::now().timestamp())?;

        debug!(
            event_name = "analytics.query.start",
            endpoint = %endpoint,
            has_selector = query.selector_expression().is_some(),
            "issuing analytics query"
        );

        // reqwest errors embed the request URL, which carries the api key.
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|error| AnalyticsError::Transport(error.without_url()))?;
        let status = response.status();
        let body =
            response.text().await.map_err(|error| AnalyticsError::Transport(error.without_url()))?;

        if !status.is_success() {
            warn!(
                event_name = "analytics.query.rejected",
                endpoint = %endpoint,
                status = status.as_u16(),
                "analytics api returned a non-success status"
            );
            return Err(AnalyticsError::Status {
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_PREVIEW_CHARS).collect(),
            });
        }

        let decoded = serde_json::from_str::<Value>(&body)?;
        debug!(event_name = "analytics.query.complete", endpoint = %endpoint, "analytics query decoded");
        Ok(decoded)
    }
}
