use std::sync::Arc;

use crate::{config::Config, error::ApiError, http::InstrumentedClient, observability::Observability};

pub mod ibge;
pub mod nominatim;
pub mod open_meteo;
pub mod viacep;

pub use ibge::IbgeClient;
pub use nominatim::NominatimClient;
pub use open_meteo::OpenMeteoClient;
pub use viacep::ViaCepClient;

/// The four public APIs the chatbot talks to, sharing one instrumented client.
#[derive(Debug, Clone)]
pub struct Services {
    pub ibge: IbgeClient,
    pub nominatim: NominatimClient,
    pub open_meteo: OpenMeteoClient,
    pub viacep: ViaCepClient,
}

impl Services {
    /// Construct every client from config.
    pub fn from_config(config: &Config, obs: Arc<Observability>) -> Result<Self, ApiError> {
        let endpoints = &config.endpoints;
        let http = InstrumentedClient::new(obs, &endpoints.user_agent, config.http_timeout())?;

        Ok(Self {
            ibge: IbgeClient::new(&endpoints.ibge, http.clone()),
            nominatim: NominatimClient::new(&endpoints.nominatim, http.clone()),
            open_meteo: OpenMeteoClient::new(&endpoints.open_meteo, config.timezone(), http.clone()),
            viacep: ViaCepClient::new(&endpoints.viacep, http),
        })
    }
}
