use std::env;
use std::path::PathBuf;

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use thiserror::Error;

const DEV_CONFIG_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../../config");
const SYSTEM_CONFIG_PATH: &str = "/etc/elastic-store/";

/// Environment variable pointing at the configuration directory.
pub const CONFIG_DIR_ENV: &str = "ELASTIC_STORE_CONFIG_DIR";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config error: {0}")]
    ConfigCompilation(#[from] config::ConfigError),

    #[error("Expected '=' separator in config override '{0}'")]
    MalformedConfigOverride(String),
}

/// Directory holding the configuration files, in order of preference: the
/// directory named by `ELASTIC_STORE_CONFIG_DIR`, the system directory, then
/// the `config` directory of this repository.
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = env::var(CONFIG_DIR_ENV) {
        return PathBuf::from(dir);
    }

    let config_dir = PathBuf::from(SYSTEM_CONFIG_PATH);
    if config_dir.exists() {
        config_dir
    } else {
        PathBuf::from(DEV_CONFIG_PATH)
    }
}

pub trait StoreConfig<'a>: Deserialize<'a> {
    const ENV_PREFIX: &'static str;

    fn file_sources() -> Vec<&'static str> {
        vec![]
    }

    fn root_key() -> Option<&'static str> {
        None
    }

    /// Builds the configuration by merging, from lowest to highest priority,
    /// the files listed in `file_sources`, the environment variables
    /// `<ENV_PREFIX>__KEY__SUBKEY` and the `key=value` overrides.
    ///
    /// With a root key, the prefix is kept as the first path segment, so it
    /// should match the root key.
    fn get(overrides: &[String]) -> Result<Self, ConfigError>
    where
        Self: Sized,
    {
        let mut override_sources = vec![];
        for value in overrides {
            if !value.contains('=') {
                return Err(ConfigError::MalformedConfigOverride(value.clone()));
            }

            // "url=http://localhost:9200" -> "elasticsearch.url=http://localhost:9200"
            let value = match Self::root_key() {
                None => value.clone(),
                Some(key) => format!("{key}.{value}"),
            };

            override_sources.push(File::from_str(&value, FileFormat::Toml));
        }

        let file_sources: Vec<File<_, _>> = Self::file_sources()
            .iter()
            .map(|path| File::from(config_dir().join(path)).required(false))
            .collect();

        let config = Config::builder()
            .add_source(file_sources)
            .add_source(
                Environment::with_prefix(Self::ENV_PREFIX)
                    .separator("__")
                    .prefix_separator("__")
                    .keep_prefix(Self::root_key().is_some()),
            )
            .add_source(override_sources)
            .build()?;

        match Self::root_key() {
            None => Ok(config.try_deserialize()?),
            Some(key) => Ok(config.get::<Self>(key)?),
        }
    }
}
