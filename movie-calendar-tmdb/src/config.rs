//! Layered settings: environment, then the per-user TOML config file.

use std::path::{Path, PathBuf};

use crate::error::TmdbError;

/// Environment variable holding the TMDb API key.
pub const API_KEY_ENV: &str = "TMDB_APIKEY";

/// Resolved settings for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub api_key: Option<String>,
    pub tmdb_base_url: Option<String>,
    pub schedule_base_url: Option<String>,
    pub database_path: Option<PathBuf>,
}

/// Where a setting's value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingSource {
    /// Loaded from an environment variable.
    EnvVar(&'static str),
    /// Loaded from the config file.
    ConfigFile,
    /// Built-in default value.
    Default,
    /// Not set anywhere.
    Missing,
}

impl std::fmt::Display for SettingSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EnvVar(var) => write!(f, "env ${}", var),
            Self::ConfigFile => write!(f, "config file"),
            Self::Default => write!(f, "default"),
            Self::Missing => write!(f, "not set"),
        }
    }
}

/// Provenance of each setting.
#[derive(Debug)]
pub struct SettingSources {
    pub api_key: SettingSource,
    pub tmdb_base_url: SettingSource,
    pub schedule_base_url: SettingSource,
    pub database_path: SettingSource,
}

/// TOML config file format.
#[derive(Debug, Default, serde::Deserialize, serde::Serialize)]
pub struct ConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tmdb: Option<TmdbSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<ScheduleSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<DatabaseSection>,
}

#[derive(Debug, Default, serde::Deserialize, serde::Serialize)]
pub struct TmdbSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

#[derive(Debug, Default, serde::Deserialize, serde::Serialize)]
pub struct ScheduleSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

#[derive(Debug, Default, serde::Deserialize, serde::Serialize)]
pub struct DatabaseSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Settings {
    /// Load settings from the environment and the user config file.
    ///
    /// Priority: env vars > config file. Unset values fall back to built-in
    /// defaults at the point of use.
    pub fn load() -> Self {
        let file = config_path().and_then(|p| read_config_file(&p));
        Self::resolve(std::env::var(API_KEY_ENV).ok(), file.as_ref())
    }

    /// Combine an environment API key with a parsed config file.
    pub fn resolve(env_api_key: Option<String>, file: Option<&ConfigFile>) -> Self {
        let tmdb = file.and_then(|f| f.tmdb.as_ref());
        Self {
            api_key: non_blank(env_api_key).or_else(|| non_blank(tmdb.and_then(|t| t.api_key.clone()))),
            tmdb_base_url: non_blank(tmdb.and_then(|t| t.base_url.clone())),
            schedule_base_url: non_blank(
                file.and_then(|f| f.schedule.as_ref())
                    .and_then(|s| s.base_url.clone()),
            ),
            database_path: file
                .and_then(|f| f.database.as_ref())
                .and_then(|d| d.path.clone()),
        }
    }

    /// Apply explicit values (e.g., from CLI args).
    pub fn with_overrides(mut self, api_key: Option<String>, database_path: Option<PathBuf>) -> Self {
        if let Some(key) = non_blank(api_key) {
            self.api_key = Some(key);
        }
        if let Some(path) = database_path {
            self.database_path = Some(path);
        }
        self
    }

    /// Configured database path, or the per-user default.
    pub fn database_path_or_default(&self) -> Option<PathBuf> {
        self.database_path.clone().or_else(default_database_path)
    }
}

/// Return the path to the config file.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("movie-calendar").join("config.toml"))
}

/// Default database location under the user data directory.
pub fn default_database_path() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("movie-calendar").join("movies.db"))
}

/// Persist the API key, keeping every other entry in the config file.
///
/// Returns the path the file was written to.
pub fn save_api_key(api_key: &str) -> Result<PathBuf, TmdbError> {
    let path = config_path().ok_or_else(|| {
        TmdbError::Config("Could not determine config directory".to_string())
    })?;
    save_api_key_to(&path, api_key)?;
    Ok(path)
}

/// Write the API key into the config file at `path`, creating it if needed.
pub fn save_api_key_to(path: &Path, api_key: &str) -> Result<(), TmdbError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut config = match std::fs::read_to_string(path) {
        Ok(content) => toml::from_str::<ConfigFile>(&content)
            .map_err(|e| TmdbError::Config(format!("Failed to parse {}: {}", path.display(), e)))?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => ConfigFile::default(),
        Err(e) => return Err(e.into()),
    };
    config.tmdb.get_or_insert_with(TmdbSection::default).api_key = Some(api_key.trim().to_string());

    let toml_str = toml::to_string_pretty(&config)
        .map_err(|e| TmdbError::Config(format!("Failed to serialize config: {}", e)))?;

    std::fs::write(path, toml_str)?;
    Ok(())
}

/// Determine where each setting is coming from.
pub fn setting_sources() -> SettingSources {
    let file = config_path().and_then(|p| read_config_file(&p));
    let env_set = std::env::var(API_KEY_ENV).is_ok_and(|v| !v.trim().is_empty());
    sources_for(env_set, file.as_ref())
}

fn sources_for(env_api_key_set: bool, file: Option<&ConfigFile>) -> SettingSources {
    let resolved = Settings::resolve(None, file);
    let from_file = |present: bool| {
        if present {
            SettingSource::ConfigFile
        } else {
            SettingSource::Default
        }
    };

    let api_key = if env_api_key_set {
        SettingSource::EnvVar(API_KEY_ENV)
    } else if resolved.api_key.is_some() {
        SettingSource::ConfigFile
    } else {
        SettingSource::Missing
    };

    SettingSources {
        api_key,
        tmdb_base_url: from_file(resolved.tmdb_base_url.is_some()),
        schedule_base_url: from_file(resolved.schedule_base_url.is_some()),
        database_path: from_file(resolved.database_path.is_some()),
    }
}

/// Read and parse a config file. Missing or malformed files yield `None`.
pub fn read_config_file(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            log::warn!("Ignoring malformed config file {}: {}", path.display(), e);
            None
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
