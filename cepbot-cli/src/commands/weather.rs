use cepbot_core::{
    CommandError,
    api::{NominatimClient, OpenMeteoClient},
    model::Place,
};
use chrono::Local;
use inquire::{Select, Text};
use tracing::info;

use super::Choice;
use crate::{
    prompt::{ask, min_chars_validator},
    render,
};

/// City name, then the exact place, then the hourly forecast for it.
pub async fn forecast(
    nominatim: &NominatimClient,
    open_meteo: &OpenMeteoClient,
) -> Result<(), CommandError> {
    let answer = ask(|| Text::new("Digite o nome da cidade:").with_validator(min_chars_validator).prompt());
    let Some(city) = answer? else {
        return Ok(());
    };

    render::progress("Buscando informações sobre a cidade...");
    let places = nominatim.search_city(city.trim()).await?;

    if places.is_empty() {
        info!(city = city.trim(), "No places found");
        render::failure("Nenhuma cidade encontrada com esse nome!");
        return Ok(());
    }
    render::success(&format!("{} locais encontrados!", places.len()));

    let choices = places.into_iter().map(|place| Choice::new(place_label(&place), place)).collect();
    let Some(choice) = ask(|| Select::new("Selecione a localização exata:", choices).prompt())? else {
        return Ok(());
    };
    let place = choice.value;
    let (latitude, longitude) = place.coordinates()?;

    render::progress("Consultando previsão meteorológica...");
    let forecast = open_meteo.hourly_forecast(latitude, longitude).await?;
    render::success("Previsão obtida com sucesso!");

    let today = Local::now().date_naive();
    render::print(|out| render::write_forecast(out, &place, &forecast, today));

    Ok(())
}

fn place_label(place: &Place) -> String {
    format!("{}, {} ({})", place.name, place.region(), place.display_name)
}
