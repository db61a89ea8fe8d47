use crate::{
    error::ApiError,
    http::{InstrumentedClient, endpoint_url},
    model::{City, State},
};

/// IBGE locality service.
#[derive(Debug, Clone)]
pub struct IbgeClient {
    base_url: String,
    http: InstrumentedClient,
}

impl IbgeClient {
    pub fn new(base_url: impl Into<String>, http: InstrumentedClient) -> Self {
        Self { base_url: base_url.into(), http }
    }

    /// All states, ordered by name.
    pub async fn states(&self) -> Result<Vec<State>, ApiError> {
        let url = endpoint_url(&self.base_url, &["localidades", "estados"])?;
        self.http.get_json(url, &[("orderBy", "nome".to_string())]).await
    }

    /// Municipalities of one state, ordered by name.
    pub async fn cities(&self, uf: &str) -> Result<Vec<City>, ApiError> {
        let url = endpoint_url(&self.base_url, &["localidades", "estados", uf, "municipios"])?;
        self.http.get_json(url, &[("orderBy", "nome".to_string())]).await
    }
}
