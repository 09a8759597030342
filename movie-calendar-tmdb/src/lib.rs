pub mod client;
pub mod config;
pub mod enrich;
pub mod error;
pub mod lookup;
pub mod provider;
pub mod types;

pub use client::{DEFAULT_BASE_URL, POSTER_BASE_URL, TmdbClient};
pub use config::{
    API_KEY_ENV, ConfigFile, SettingSource, SettingSources, Settings, config_path,
    default_database_path, save_api_key, setting_sources,
};
pub use enrich::{EnrichContext, Enricher, TmdbEnricher};
pub use error::TmdbError;
pub use lookup::LookupResult;
pub use provider::MetadataProvider;
