/// This module contains the definition for ctlstore configuration and command line arguments.
use elastic_store::ElasticsearchStorageConfig;
use store_config::StoreConfig;

pub use store_config::ConfigError;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");

#[derive(Debug, clap::Parser)]
#[command(
    name = "ctlstore",
    about = "Check the Elasticsearch backend and manage its indices",
    version = VERSION,
    author = AUTHORS
)]
pub struct Opts {
    /// Override settings values using key=value
    ///
    /// Keys are relative to the `elasticsearch` section, eg `url='http://localhost:9201'`.
    #[arg(short = 's', long = "setting")]
    pub settings: Vec<String>,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Connect to Elasticsearch and check its version
    Check,
    /// Create an index with the configured settings, if it does not exist
    CreateIndex { name: String },
    /// Delete an index, if it exists
    DeleteIndex { name: String },
    /// Tell whether an index exists
    IndexExists { name: String },
    /// Print the configuration
    Config,
}

/// Reads the configuration files (see `store_config::config_dir`), the
/// environment, then the command line overrides.
pub fn settings(opts: &Opts) -> Result<ElasticsearchStorageConfig, ConfigError> {
    ElasticsearchStorageConfig::get(&opts.settings)
}
