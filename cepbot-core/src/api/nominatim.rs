use crate::{
    error::ApiError,
    http::{InstrumentedClient, endpoint_url},
    model::Place,
};

const MAX_CANDIDATES: usize = 10;

/// OpenStreetMap Nominatim geocoder.
#[derive(Debug, Clone)]
pub struct NominatimClient {
    base_url: String,
    http: InstrumentedClient,
}

impl NominatimClient {
    pub fn new(base_url: impl Into<String>, http: InstrumentedClient) -> Self {
        Self { base_url: base_url.into(), http }
    }

    /// Up to ten places whose city matches `city`.
    pub async fn search_city(&self, city: &str) -> Result<Vec<Place>, ApiError> {
        let url = endpoint_url(&self.base_url, &[])?;
        let query = [
            ("city", city.trim().to_string()),
            ("format", "json".to_string()),
            ("addressdetails", "1".to_string()),
            ("limit", MAX_CANDIDATES.to_string()),
        ];

        self.http.get_json(url, &query).await
    }
}
