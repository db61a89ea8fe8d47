use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info};

/// Aggregated calls to one endpoint path.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMetric {
    pub endpoint: String,
    pub total_calls: u64,
    pub success_calls: u64,
    pub failed_calls: u64,
    pub total_response_time_ms: f64,
    /// `None` until the first call is recorded.
    pub average_response_time_ms: Option<f64>,
}

impl ApiMetric {
    fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_owned(),
            total_calls: 0,
            success_calls: 0,
            failed_calls: 0,
            total_response_time_ms: 0.0,
            average_response_time_ms: None,
        }
    }

    fn add(&mut self, response_time_ms: f64, success: bool) {
        self.total_calls += 1;
        self.total_response_time_ms += response_time_ms;
        self.average_response_time_ms =
            Some(self.total_response_time_ms / self.total_calls as f64);

        if success {
            self.success_calls += 1;
        } else {
            self.failed_calls += 1;
        }
    }

    pub fn success_rate(&self) -> Option<f64> {
        ratio(self.success_calls, self.total_calls)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointSummary {
    pub endpoint: String,
    pub calls: u64,
    pub success_rate: Option<f64>,
    pub avg_response_time_ms: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMetricsSummary {
    pub total_endpoints: usize,
    pub total_calls: u64,
    /// Successes over calls across every endpoint; `None` when nothing was called.
    pub success_rate: Option<f64>,
    pub endpoints: Vec<EndpointSummary>,
}

/// Per-endpoint API call statistics, kept in first-recorded order.
#[derive(Debug, Default)]
pub struct ApiMetrics {
    metrics: Mutex<Vec<ApiMetric>>,
}

impl ApiMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_call(&self, endpoint: &str, response_time_ms: f64, success: bool) {
        {
            let mut metrics = self.metrics.lock();
            let index = match metrics.iter().position(|m| m.endpoint == endpoint) {
                Some(index) => index,
                None => {
                    metrics.push(ApiMetric::new(endpoint));
                    metrics.len() - 1
                }
            };
            metrics[index].add(response_time_ms, success);
        }

        debug!(
            target: "http",
            endpoint,
            response_time_ms,
            success,
            "API call to {endpoint} completed in {response_time_ms:.2}ms with {}",
            if success { "success" } else { "failure" },
        );
    }

    pub fn get(&self, endpoint: &str) -> Option<ApiMetric> {
        self.metrics.lock().iter().find(|m| m.endpoint == endpoint).cloned()
    }

    pub fn snapshot(&self) -> Vec<ApiMetric> {
        self.metrics.lock().clone()
    }

    pub fn summary(&self) -> ApiMetricsSummary {
        let metrics = self.metrics.lock();

        let total_calls = metrics.iter().map(|m| m.total_calls).sum();
        let total_success = metrics.iter().map(|m| m.success_calls).sum();

        ApiMetricsSummary {
            total_endpoints: metrics.len(),
            total_calls,
            success_rate: ratio(total_success, total_calls),
            endpoints: metrics
                .iter()
                .map(|m| EndpointSummary {
                    endpoint: m.endpoint.clone(),
                    calls: m.total_calls,
                    success_rate: m.success_rate(),
                    avg_response_time_ms: m.average_response_time_ms,
                })
                .collect(),
        }
    }

    pub fn log_summary(&self) {
        let summary = self.summary();
        let endpoints = serde_json::to_string(&summary.endpoints).unwrap_or_default();

        info!(
            total_endpoints = summary.total_endpoints,
            total_calls = summary.total_calls,
            success_rate = ?summary.success_rate,
            endpoints = %endpoints,
            "API Metrics Summary: {} endpoints tracked",
            summary.total_endpoints,
        );
    }
}

fn ratio(part: u64, whole: u64) -> Option<f64> {
    (whole > 0).then(|| part as f64 / whole as f64)
}
