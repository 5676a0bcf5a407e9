use std::sync::Arc;

use clap::Parser;
use ctl_store::{Command, ConfigError, Opts};
use elastic_store::remote::{connection_pool_url, Remote, RemoteError};
use elastic_store::{
    ElasticClientError, ElasticsearchManager, ElasticsearchStorageConfig, StoreRegistry,
};
use snafu::{ResultExt, Snafu};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Settings (Configuration or CLI) Error: {}", source))]
    Settings { source: ConfigError },

    #[snafu(display("Elasticsearch Connection Pool {}", source))]
    ElasticsearchConnection { source: RemoteError },

    #[snafu(display("Execution Error {}", source))]
    Execution { source: ElasticClientError },

    #[snafu(display("Could not print configuration {}", source))]
    Serialization { source: serde_json::Error },
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "ctlstore=info,elastic_store=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let opts = Opts::parse();
    let settings = ctl_store::settings(&opts).context(SettingsSnafu)?;

    match opts.cmd {
        Command::Config => {
            let json = serde_json::to_string_pretty(&settings).context(SerializationSnafu)?;
            println!("{json}");
            Ok(())
        }
        Command::Check => {
            connect(settings).await?;
            Ok(())
        }
        Command::CreateIndex { name } => {
            let manager = connect(settings).await?;
            manager.create_index(&name).await.context(ExecutionSnafu)
        }
        Command::DeleteIndex { name } => {
            let manager = connect(settings).await?;
            manager.delete_index(&name).await.context(ExecutionSnafu)
        }
        Command::IndexExists { name } => {
            let manager = connect(settings).await?;
            let exists = manager.is_index_exist(&name).await.context(ExecutionSnafu)?;
            println!("{exists}");
            Ok(())
        }
    }
}

/// Connects, checking the Elasticsearch version, and builds a manager with no
/// store registered.
async fn connect(settings: ElasticsearchStorageConfig) -> Result<ElasticsearchManager, Error> {
    info!("Trying to connect to elasticsearch at {}", &settings.url);

    let client = connection_pool_url(&settings.url)
        .conn(settings.clone())
        .await
        .context(ElasticsearchConnectionSnafu)?;

    info!("Connected to elasticsearch.");

    Ok(ElasticsearchManager::with_client(
        settings,
        Arc::new(client),
        StoreRegistry::new(),
    ))
}
