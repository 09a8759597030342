use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use movie_calendar_sync::DEFAULT_SCHEDULE_BASE_URL;
use movie_calendar_tmdb::{DEFAULT_BASE_URL, SettingSource, Settings};

use crate::CliError;

fn mask_value(s: &str) -> String {
    if s.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("{}****", s.chars().take(4).collect::<String>())
    }
}

/// Show current settings and their sources.
pub(crate) fn run_config_show() -> Result<(), CliError> {
    let path = movie_calendar_tmdb::config_path();
    let sources = movie_calendar_tmdb::setting_sources();
    let settings = Settings::load();

    log::info!(
        "{}",
        "Movie Calendar Configuration".if_supports_color(Stdout, |t| t.bold()),
    );
    crate::log_blank();

    match &path {
        Some(p) if p.exists() => {
            log::info!(
                "  Config file: {} {}",
                p.display().if_supports_color(Stdout, |t| t.cyan()),
                "(exists)".if_supports_color(Stdout, |t| t.green()),
            );
        }
        Some(p) => {
            log::info!(
                "  Config file: {} {}",
                p.display().if_supports_color(Stdout, |t| t.cyan()),
                "(not found)".if_supports_color(Stdout, |t| t.dimmed()),
            );
        }
        None => {
            log::info!(
                "  Config file: {}",
                "could not determine path".if_supports_color(Stdout, |t| t.red()),
            );
        }
    }
    crate::log_blank();

    let database = settings
        .database_path_or_default()
        .map(|p| p.display().to_string());

    let fields: &[(&str, &SettingSource, Option<String>)] = &[
        (
            "api_key",
            &sources.api_key,
            settings.api_key.as_deref().map(mask_value),
        ),
        (
            "tmdb_base_url",
            &sources.tmdb_base_url,
            Some(
                settings
                    .tmdb_base_url
                    .clone()
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            ),
        ),
        (
            "schedule_base_url",
            &sources.schedule_base_url,
            Some(
                settings
                    .schedule_base_url
                    .clone()
                    .unwrap_or_else(|| DEFAULT_SCHEDULE_BASE_URL.to_string()),
            ),
        ),
        ("database", &sources.database_path, database),
    ];

    for (name, source, value) in fields {
        let source_str = format!("({})", source);
        match value {
            Some(v) => {
                log::info!(
                    "  {} {} {}",
                    format!("{}:", name).if_supports_color(Stdout, |t| t.cyan()),
                    v,
                    source_str.if_supports_color(Stdout, |t| t.dimmed()),
                );
            }
            None => {
                log::info!(
                    "  {} {} {}",
                    format!("{}:", name).if_supports_color(Stdout, |t| t.cyan()),
                    "not set".if_supports_color(Stdout, |t| t.yellow()),
                    source_str.if_supports_color(Stdout, |t| t.dimmed()),
                );
            }
        }
    }

    if settings.api_key.is_none() {
        crate::log_blank();
        log::info!(
            "  {}",
            "Without an API key, scraped movies are stored without metadata."
                .if_supports_color(Stdout, |t| t.yellow()),
        );
    }

    Ok(())
}

/// Save a TMDb API key to the config file.
pub(crate) fn run_config_set_key(key: &str) -> Result<(), CliError> {
    let key = key.trim();
    if key.is_empty() {
        return Err(CliError::config("API key must not be empty"));
    }

    let path = movie_calendar_tmdb::save_api_key(key)
        .map_err(|e| CliError::config(format!("Failed to save API key: {}", e)))?;

    log::info!(
        "{} API key saved to {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        path.display().if_supports_color(Stdout, |t| t.cyan()),
    );
    if std::env::var(movie_calendar_tmdb::API_KEY_ENV).is_ok() {
        log::warn!(
            "  ${} is set and takes precedence over the config file.",
            movie_calendar_tmdb::API_KEY_ENV,
        );
    }
    Ok(())
}

/// Print the config file path.
pub(crate) fn run_config_path() -> Result<(), CliError> {
    match movie_calendar_tmdb::config_path() {
        Some(p) => {
            log::info!("{}", p.display());
            Ok(())
        }
        None => Err(CliError::config("Could not determine config directory")),
    }
}
