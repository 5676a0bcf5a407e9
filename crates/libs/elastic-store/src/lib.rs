use elasticsearch::Elasticsearch;

pub mod client;
pub mod container;
pub mod dto;
pub mod errors;
pub mod internal;
pub mod manager;
pub mod model;
pub mod registry;
pub mod remote;
pub mod settings;
pub mod store;
pub mod store_settings;

#[cfg(test)]
pub(crate) mod testing;

pub use client::DocumentClient;
pub use container::{ContainerProvider, ElasticsearchCore, ServiceContainer};
pub use errors::{ElasticClientError, Result};
pub use manager::ElasticsearchManager;
pub use model::{Document, ElasticsearchModel};
pub use registry::StoreRegistry;
pub use settings::ElasticsearchStorageConfig;
pub use store::{BaseStore, SearchQuery, SortOrder, Store};
pub use store_settings::StoreSettings;

#[derive(Clone, Debug)]
pub struct ElasticSearchClient {
    /// Elasticsearch client
    pub client: Elasticsearch,
    /// Client configuration
    pub config: ElasticsearchStorageConfig,
}
