//! reqwest wrapper that feeds every call into the API metrics store.

use std::{sync::Arc, time::Duration, time::Instant};

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, error};

use crate::{
    error::ApiError,
    observability::{Observability, context},
};

/// Operation name under which every outgoing request is timed.
pub const API_REQUEST: &str = "api_request";

#[derive(Debug, Clone)]
pub struct InstrumentedClient {
    http: Client,
    obs: Arc<Observability>,
}

impl InstrumentedClient {
    pub fn new(obs: Arc<Observability>, user_agent: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self { http, obs })
    }

    /// GET `url` and decode the JSON body.
    ///
    /// The call runs under [`Observability::measure`] as `api_request` and is
    /// recorded under the URL path (no query string) whatever the outcome;
    /// non-2xx statuses and undecodable bodies count as failures.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let endpoint = url.path().to_owned();
        debug!(target: "http", method = "GET", url = %endpoint, "API request started: GET {endpoint}");

        let extra = context([("method", json!("GET")), ("endpoint", json!(endpoint))]);
        let started = Instant::now();
        let outcome = self.obs.measure(API_REQUEST, extra, self.fetch(url, query, &endpoint)).await;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        self.obs.api().record_call(&endpoint, elapsed_ms, outcome.is_ok());

        if let Err(err) = &outcome {
            error!(
                method = "GET",
                url = %endpoint,
                status = ?err.status(),
                error_message = %err,
                "API request failed: GET {endpoint}"
            );
        }

        outcome
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
        endpoint: &str,
    ) -> Result<T, ApiError> {
        let request_failed = |source| ApiError::Request { endpoint: endpoint.to_owned(), source };

        let res = self.http.get(url).query(query).send().await.map_err(request_failed)?;

        let status = res.status();
        let body = res.text().await.map_err(request_failed)?;

        if !status.is_success() {
            return Err(ApiError::Status {
                endpoint: endpoint.to_owned(),
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        serde_json::from_str(&body)
            .map_err(|source| ApiError::Decode { endpoint: endpoint.to_owned(), source })
    }
}

/// Append path segments to `base`. Segments are percent-encoded, so city and
/// street names with spaces or accents are safe. An empty trailing segment
/// produces a trailing slash.
pub fn endpoint_url(base: &str, segments: &[&str]) -> Result<Url, ApiError> {
    let invalid = |reason: String| ApiError::InvalidUrl { url: base.to_owned(), reason };

    let mut url = Url::parse(base).map_err(|e| invalid(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| invalid("URL cannot be a base".to_owned()))?
        .pop_if_empty()
        .extend(segments);

    Ok(url)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
