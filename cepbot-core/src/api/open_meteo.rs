use crate::{
    error::ApiError,
    http::{InstrumentedClient, endpoint_url},
    model::Forecast,
};

const HOURLY_VARIABLES: &str = "temperature_2m";

/// Open-Meteo forecast API.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    base_url: String,
    timezone: String,
    http: InstrumentedClient,
}

impl OpenMeteoClient {
    pub fn new(base_url: impl Into<String>, timezone: impl Into<String>, http: InstrumentedClient) -> Self {
        Self { base_url: base_url.into(), timezone: timezone.into(), http }
    }

    /// Hourly temperatures for the coordinates, in the configured timezone.
    pub async fn hourly_forecast(&self, latitude: f64, longitude: f64) -> Result<Forecast, ApiError> {
        let url = endpoint_url(&self.base_url, &[])?;
        let query = [
            ("latitude", latitude.to_string()),
            ("longitude", longitude.to_string()),
            ("hourly", HOURLY_VARIABLES.to_string()),
            ("timezone", self.timezone.clone()),
        ];

        self.http.get_json(url, &query).await
    }
}
