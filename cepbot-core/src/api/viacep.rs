use tracing::debug;

use crate::{
    error::ApiError,
    http::{InstrumentedClient, endpoint_url},
    model::Address,
};

/// ViaCEP postal code service.
#[derive(Debug, Clone)]
pub struct ViaCepClient {
    base_url: String,
    http: InstrumentedClient,
}

impl ViaCepClient {
    pub fn new(base_url: impl Into<String>, http: InstrumentedClient) -> Self {
        Self { base_url: base_url.into(), http }
    }

    /// Address of an eight-digit CEP, or `None` when ViaCEP does not know it.
    pub async fn lookup(&self, cep: &str) -> Result<Option<Address>, ApiError> {
        let url = endpoint_url(&self.base_url, &[cep, "json", ""])?;
        let address: Address = self.http.get_json(url, &[]).await?;

        if address.is_not_found() {
            debug!(cep, "CEP not found");
            return Ok(None);
        }

        Ok(Some(address))
    }

    /// CEPs of streets in `city`/`uf` whose name contains `street`.
    pub async fn search(&self, uf: &str, city: &str, street: &str) -> Result<Vec<Address>, ApiError> {
        let url = endpoint_url(&self.base_url, &[uf, city, street.trim(), "json", ""])?;
        self.http.get_json(url, &[]).await
    }
}
