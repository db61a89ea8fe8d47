use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;

/// Brazilian state as returned by IBGE.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub id: u32,
    #[serde(rename = "nome")]
    pub name: String,
    /// Two-letter UF.
    #[serde(rename = "sigla")]
    pub uf: String,
    #[serde(rename = "regiao")]
    pub region: Region,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: u32,
    #[serde(rename = "sigla")]
    pub abbreviation: String,
    #[serde(rename = "nome")]
    pub name: String,
}

/// Municipality as returned by IBGE. Only the fields the chatbot shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub id: u64,
    #[serde(rename = "nome")]
    pub name: String,
}

/// Nominatim search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub lat: String,
    pub lon: String,
    #[serde(default)]
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub address: PlaceAddress,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceAddress {
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

impl Place {
    pub fn coordinates(&self) -> Result<(f64, f64), ApiError> {
        let invalid = || ApiError::InvalidCoordinates { lat: self.lat.clone(), lon: self.lon.clone() };
        let lat = self.lat.trim().parse().map_err(|_| invalid())?;
        let lon = self.lon.trim().parse().map_err(|_| invalid())?;
        Ok((lat, lon))
    }

    /// State when known, otherwise the country.
    pub fn region(&self) -> &str {
        self.address
            .state
            .as_deref()
            .or(self.address.country.as_deref())
            .unwrap_or_default()
    }
}

/// Open-Meteo hourly forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
    pub hourly: HourlySeries,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HourlySeries {
    /// Local times such as `2024-05-01T13:00`.
    pub time: Vec<String>,
    pub temperature_2m: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HourlyReading {
    /// `HH:MM`
    pub hour: String,
    pub temperature_c: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayForecast {
    pub date: NaiveDate,
    pub readings: Vec<HourlyReading>,
}

impl Forecast {
    /// Group the first `hours` readings by day, keeping at most `per_day`
    /// readings for each. Entries with malformed timestamps are skipped.
    pub fn upcoming(&self, hours: usize, per_day: usize) -> Vec<DayForecast> {
        let mut days: Vec<DayForecast> = Vec::new();

        let readings = self.hourly.time.iter().zip(&self.hourly.temperature_2m).take(hours);
        for (time, temperature) in readings {
            let Some((date, clock)) = time.split_once('T') else {
                continue;
            };
            let Ok(date) = NaiveDate::parse_from_str(date, "%Y-%m-%d") else {
                continue;
            };

            let reading = HourlyReading {
                hour: clock.chars().take(5).collect(),
                temperature_c: *temperature,
            };

            match days.iter_mut().find(|d| d.date == date) {
                Some(day) if day.readings.len() >= per_day => {}
                Some(day) => day.readings.push(reading),
                None => days.push(DayForecast { date, readings: vec![reading] }),
            }
        }

        days
    }
}

/// ViaCEP address.
///
/// ViaCEP answers an unknown CEP with `{"erro": true}` (older deployments send
/// the string `"true"`), so every field defaults to empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub cep: String,
    #[serde(default, rename = "logradouro")]
    pub street: String,
    #[serde(default, rename = "complemento")]
    pub complement: String,
    #[serde(default, rename = "bairro")]
    pub neighborhood: String,
    #[serde(default, rename = "localidade")]
    pub city: String,
    #[serde(default)]
    pub uf: String,
    #[serde(default, rename = "estado")]
    pub state: Option<String>,
    #[serde(default, rename = "regiao")]
    pub region: Option<String>,
    #[serde(default)]
    pub ddd: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    erro: Option<Value>,
}

impl Address {
    pub fn is_not_found(&self) -> bool {
        match &self.erro {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::String(flag)) => flag.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn state_uses_portuguese_field_names() {
        let state: State = serde_json::from_value(json!({
            "id": 35,
            "sigla": "SP",
            "nome": "São Paulo",
            "regiao": { "id": 3, "sigla": "SE", "nome": "Sudeste" }
        }))
        .unwrap();

        assert_eq!(state.uf, "SP");
        assert_eq!(state.name, "São Paulo");
        assert_eq!(state.region.name, "Sudeste");
    }

    #[test]
    fn place_coordinates_and_region() {
        let place: Place = serde_json::from_value(json!({
            "place_id": 123,
            "lat": "-23.5506507",
            "lon": "-46.6333824",
            "name": "São Paulo",
            "display_name": "São Paulo, Região Imediata de São Paulo, Brasil",
            "address": { "city": "São Paulo", "state": "São Paulo", "country": "Brasil" }
        }))
        .unwrap();

        let (lat, lon) = place.coordinates().unwrap();
        assert!((lat + 23.5506507).abs() < 1e-9);
        assert!((lon + 46.6333824).abs() < 1e-9);
        assert_eq!(place.region(), "São Paulo");
    }

    #[test]
    fn place_region_falls_back_to_country() {
        let place = Place {
            lat: "x".into(),
            lon: "1".into(),
            name: "Lisboa".into(),
            display_name: "Lisboa, Portugal".into(),
            address: PlaceAddress { country: Some("Portugal".into()), ..Default::default() },
        };

        assert_eq!(place.region(), "Portugal");
        assert!(matches!(place.coordinates(), Err(ApiError::InvalidCoordinates { .. })));
    }

    #[test]
    fn forecast_groups_by_day_with_limits() {
        let mut hourly = HourlySeries::default();
        for day in ["2024-05-01", "2024-05-02"] {
            for hour in 0..12 {
                hourly.time.push(format!("{day}T{hour:02}:00"));
                hourly.temperature_2m.push(20.0 + hour as f64);
            }
        }
        hourly.time.push("garbage".into());
        hourly.temperature_2m.push(0.0);

        let forecast = Forecast {
            latitude: 0.0,
            longitude: 0.0,
            timezone: "America/Sao_Paulo".into(),
            hourly,
        };

        let days = forecast.upcoming(24, 8);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(days[0].readings.len(), 8);
        assert_eq!(days[0].readings[3], HourlyReading { hour: "03:00".into(), temperature_c: 23.0 });
        assert_eq!(days[1].readings.len(), 8);

        let short = forecast.upcoming(3, 8);
        assert_eq!(short.len(), 1);
        assert_eq!(short[0].readings.len(), 3);
    }

    #[test]
    fn address_not_found_flag_accepts_bool_and_string() {
        let missing: Address = serde_json::from_value(json!({ "erro": true })).unwrap();
        let legacy: Address = serde_json::from_value(json!({ "erro": "true" })).unwrap();
        let found: Address = serde_json::from_value(json!({
            "cep": "01001-000",
            "logradouro": "Praça da Sé",
            "bairro": "Sé",
            "localidade": "São Paulo",
            "uf": "SP",
            "estado": "São Paulo",
            "ddd": "11"
        }))
        .unwrap();

        assert!(missing.is_not_found());
        assert!(legacy.is_not_found());
        assert!(!found.is_not_found());
        assert_eq!(found.street, "Praça da Sé");
        assert_eq!(found.ddd.as_deref(), Some("11"));
        assert_eq!(found.region, None);
    }
}
