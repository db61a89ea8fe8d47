//! Human-friendly console output.

use std::{
    io::{self, Write},
    time::Duration,
};

use cepbot_core::{
    model::{Address, Forecast, Place},
    validate::format_cep,
};
use chrono::{Days, NaiveDate};
use owo_colors::{AnsiColors, OwoColorize};
use tracing::warn;

pub const WELCOME: &str = "Sejam bem-vindos ao Chatbot!";

const RAINBOW: [AnsiColors; 6] = [
    AnsiColors::Red,
    AnsiColors::Yellow,
    AnsiColors::Green,
    AnsiColors::Cyan,
    AnsiColors::Blue,
    AnsiColors::Magenta,
];

const FRAME: Duration = Duration::from_millis(100);
const TOP: &str = "╔══════════════════════════════════════════════════";
const BOTTOM: &str = "╚══════════════════════════════════════════════════";

/// Forecast window shown to the user.
const FORECAST_HOURS: usize = 24;
const READINGS_PER_DAY: usize = 8;

/// Run `write` against a locked stdout. Terminal write errors are logged, not propagated.
pub fn print(write: impl FnOnce(&mut dyn Write) -> io::Result<()>) {
    let mut out = io::stdout().lock();
    let result = write(&mut out as &mut dyn Write).and_then(|()| out.flush());
    if let Err(err) = result {
        warn!("Failed to write to the terminal: {err}");
    }
}

pub fn progress(message: &str) {
    println!("{} {}", "…".dimmed(), message.dimmed());
}

pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn failure(message: &str) {
    println!("{} {}", "✖".red(), message.red());
}

/// Title with each letter in a rainbow color, shifted by `offset`.
pub fn write_welcome(out: &mut dyn Write, offset: usize) -> io::Result<()> {
    for (i, letter) in WELCOME.chars().enumerate() {
        write!(out, "{}", letter.color(RAINBOW[(i + offset) % RAINBOW.len()]).bold())?;
    }
    Ok(())
}

/// Cycle the welcome title's colors on one line for `duration`.
pub async fn animate_welcome(duration: Duration) -> anyhow::Result<()> {
    let frames = (duration.as_millis() / FRAME.as_millis()).max(1) as usize;

    for offset in 0..frames {
        if offset > 0 {
            tokio::time::sleep(FRAME).await;
        }

        let mut out = io::stdout().lock();
        write!(out, "\r")?;
        write_welcome(&mut out, offset)?;
        out.flush()?;
    }

    println!();
    Ok(())
}

/// Address card for a single CEP. Empty fields are left out.
pub fn write_address(out: &mut dyn Write, address: &Address) -> io::Result<()> {
    writeln!(out, "\n{}", "📍 Informações do CEP:".bold().blue())?;
    writeln!(out, "{TOP}")?;

    let state = match address.state.as_deref() {
        Some(name) if !name.trim().is_empty() => format!("{} - {name}", address.uf),
        _ => address.uf.clone(),
    };

    let fields = [
        ("CEP", format_cep(&address.cep)),
        ("Logradouro", address.street.clone()),
        ("Bairro", address.neighborhood.clone()),
        ("Cidade", address.city.clone()),
        ("Estado", state),
        ("Região", address.region.clone().unwrap_or_default()),
        ("Complemento", address.complement.clone()),
        ("DDD", address.ddd.clone().unwrap_or_default()),
    ];

    for (label, value) in fields.iter().filter(|(_, value)| !value.trim().is_empty()) {
        writeln!(out, "║ {}: {}", format!("{label:<12}").yellow(), value.green())?;
    }

    writeln!(out, "{BOTTOM}")
}

/// Numbered list of CEP search hits.
pub fn write_address_list(out: &mut dyn Write, addresses: &[Address]) -> io::Result<()> {
    writeln!(out, "\n{}", "📍 CEPs encontrados:".bold().blue())?;
    writeln!(out, "{TOP}")?;

    for (i, address) in addresses.iter().enumerate() {
        let position = format!("{:<3}", i + 1);
        writeln!(
            out,
            "║ {} {} - {}",
            position.yellow(),
            format_cep(&address.cep).green(),
            address.street.green()
        )?;
        writeln!(
            out,
            "║     {}, {}/{}",
            address.neighborhood.dimmed(),
            address.city.dimmed(),
            address.uf.dimmed()
        )?;

        if i + 1 < addresses.len() {
            writeln!(out, "║ {}", "─".repeat(48))?;
        }
    }

    writeln!(out, "{BOTTOM}")
}

/// Hourly temperatures for today and tomorrow. Other days in the window are skipped.
pub fn write_forecast(
    out: &mut dyn Write,
    place: &Place,
    forecast: &Forecast,
    today: NaiveDate,
) -> io::Result<()> {
    writeln!(out, "\n{}", "🌤️  Previsão do Tempo".bold().blue())?;
    writeln!(out, "{TOP}")?;
    writeln!(out, "║ {}: {}, {}", "Local".yellow(), place.name.green(), place.region().green())?;
    writeln!(out, "║ {}: {}", "Timezone".yellow(), forecast.timezone.green())?;
    writeln!(out, "║ ")?;
    writeln!(out, "║ {}", "Previsão para as próximas horas:".bold())?;

    let tomorrow = today.checked_add_days(Days::new(1));

    for day in forecast.upcoming(FORECAST_HOURS, READINGS_PER_DAY) {
        let label = if day.date == today {
            "Hoje".bold().cyan().to_string()
        } else if Some(day.date) == tomorrow {
            "Amanhã".bold().magenta().to_string()
        } else {
            continue;
        };

        writeln!(out, "║ {label} ({}):", day.date)?;
        for reading in &day.readings {
            let temperature = format!("{}°C", reading.temperature_c);
            let temperature = colorize_temperature(reading.temperature_c, &temperature);
            writeln!(out, "║   {}: {temperature}", reading.hour)?;
        }
        writeln!(out, "║ ")?;
    }

    writeln!(out, "{BOTTOM}")
}

fn colorize_temperature(celsius: f64, text: &str) -> String {
    if celsius < 15.0 {
        text.blue().to_string()
    } else if celsius > 30.0 {
        text.red().to_string()
    } else {
        text.yellow().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cepbot_core::model::{HourlySeries, PlaceAddress};

    fn rendered(write: impl FnOnce(&mut dyn Write) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        write(&mut buf as &mut dyn Write).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn place() -> Place {
        Place {
            lat: "-23.55".into(),
            lon: "-46.63".into(),
            name: "São Paulo".into(),
            display_name: "São Paulo, Brasil".into(),
            address: PlaceAddress { state: Some("São Paulo".into()), ..Default::default() },
        }
    }

    #[test]
    fn address_card_skips_empty_fields() {
        let mut address = Address::default();
        address.cep = "01001000".into();
        address.street = "Praça da Sé".into();
        address.neighborhood = "Sé".into();
        address.city = "São Paulo".into();
        address.uf = "SP".into();
        address.state = Some("São Paulo".into());

        let text = rendered(|out| write_address(out, &address));
        assert!(text.contains("01001-000"));
        assert!(text.contains("SP - São Paulo"));
        assert!(!text.contains("Complemento"));
        assert!(!text.contains("DDD"));
    }

    #[test]
    fn address_list_is_numbered_with_separators() {
        let hit = |cep: &str| {
            let mut address = Address::default();
            address.cep = cep.into();
            address.street = "Avenida Paulista".into();
            address.neighborhood = "Bela Vista".into();
            address.city = "São Paulo".into();
            address.uf = "SP".into();
            address
        };

        let text = rendered(|out| write_address_list(out, &[hit("01310-100"), hit("01311-000")]));
        assert!(text.contains("01310-100"));
        assert!(text.contains("01311-000"));
        assert_eq!(text.matches('─').count(), 48);
    }

    #[test]
    fn forecast_labels_today_and_tomorrow_only() {
        let mut hourly = HourlySeries::default();
        for (day, temperature) in [("2024-04-30", 10.0), ("2024-05-01", 12.0), ("2024-05-02", 35.0)] {
            for hour in 0..2 {
                hourly.time.push(format!("{day}T{hour:02}:00"));
                hourly.temperature_2m.push(temperature);
            }
        }
        let forecast = Forecast {
            latitude: -23.55,
            longitude: -46.63,
            timezone: "America/Sao_Paulo".into(),
            hourly,
        };

        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let text = rendered(|out| write_forecast(out, &place(), &forecast, today));

        assert!(text.contains("Hoje"));
        assert!(text.contains("(2024-05-01)"));
        assert!(text.contains("Amanhã"));
        assert!(!text.contains("2024-04-30"));
        assert!(text.contains(&"35°C".red().to_string()));
        assert!(text.contains(&"12°C".blue().to_string()));
    }

    #[test]
    fn temperature_thresholds() {
        assert_eq!(colorize_temperature(14.9, "x"), "x".blue().to_string());
        assert_eq!(colorize_temperature(15.0, "x"), "x".yellow().to_string());
        assert_eq!(colorize_temperature(30.0, "x"), "x".yellow().to_string());
        assert_eq!(colorize_temperature(30.1, "x"), "x".red().to_string());
    }

    #[test]
    fn welcome_contains_every_letter() {
        let text = rendered(|out| write_welcome(out, 0));
        for word in WELCOME.split(' ') {
            assert!(word.chars().all(|c| text.contains(c)));
        }
    }
}
