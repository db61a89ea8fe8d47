use cepbot_core::{
    CommandError,
    api::{IbgeClient, ViaCepClient},
    model::State,
    validate,
};
use inquire::{Select, Text};
use tracing::info;

use super::Choice;
use crate::{
    prompt::{ask, cep_validator, min_chars_validator},
    render,
};

/// Look up the address of a single CEP.
pub async fn lookup(viacep: &ViaCepClient) -> Result<(), CommandError> {
    let answer = ask(|| Text::new("Digite o CEP que deseja consultar:").with_validator(cep_validator).prompt());
    let Some(input) = answer? else {
        return Ok(());
    };
    let cep = validate::normalize_cep(&input)?;

    render::progress("Consultando CEP...");
    match viacep.lookup(&cep).await? {
        Some(address) => {
            render::success("CEP consultado com sucesso!");
            render::print(|out| render::write_address(out, &address));
        }
        None => {
            info!(cep = %cep, "CEP not found");
            render::failure("CEP não encontrado!");
        }
    }

    Ok(())
}

/// Find CEPs by state, city and (part of) a street name.
pub async fn search(ibge: &IbgeClient, viacep: &ViaCepClient) -> Result<(), CommandError> {
    render::progress("Carregando estados...");
    let states = ibge.states().await?;
    render::success("Estados carregados!");

    let choices = states.iter().map(state_choice).collect();
    let Some(Choice { value: uf, .. }) = ask(|| Select::new("Selecione um estado:", choices).prompt())? else {
        return Ok(());
    };

    render::progress("Carregando cidades...");
    let cities = ibge.cities(&uf).await?;
    render::success("Cidades carregadas!");

    let names = cities.into_iter().map(|city| city.name).collect();
    let Some(city) = ask(|| Select::new("Selecione uma cidade:", names).prompt())? else {
        return Ok(());
    };

    let answer = ask(|| {
        Text::new("Digite o nome da rua (ou parte dele):")
            .with_validator(min_chars_validator)
            .prompt()
    });
    let Some(street) = answer? else {
        return Ok(());
    };

    render::progress("Buscando CEPs...");
    let addresses = viacep.search(&uf, &city, &street).await?;

    if addresses.is_empty() {
        info!(uf = %uf, city = %city, street = street.trim(), "No CEPs found");
        render::failure("Nenhum CEP encontrado com esses critérios!");
        return Ok(());
    }

    render::success(&format!("{} CEPs encontrados!", addresses.len()));
    render::print(|out| render::write_address_list(out, &addresses));

    Ok(())
}

fn state_choice(state: &State) -> Choice<String> {
    Choice::new(format!("{} ({})", state.name, state.uf), state.uf.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cepbot_core::model::Region;

    #[test]
    fn state_choice_shows_name_and_yields_uf() {
        let state = State {
            id: 26,
            name: "Pernambuco".into(),
            uf: "PE".into(),
            region: Region { id: 2, abbreviation: "NE".into(), name: "Nordeste".into() },
        };

        let choice = state_choice(&state);
        assert_eq!(choice.to_string(), "Pernambuco (PE)");
        assert_eq!(choice.value, "PE");
    }
}
