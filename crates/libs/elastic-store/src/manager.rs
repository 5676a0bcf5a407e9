use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::client::DocumentClient;
use crate::errors::{beautify_exception_message, ElasticClientError, Result};
use crate::registry::StoreRegistry;
use crate::settings::ElasticsearchStorageConfig;
use crate::store::{BaseStore, Store};
use crate::store_settings::StoreSettings;
use crate::ElasticSearchClient;

type SharedStore = Arc<dyn Any + Send + Sync>;

/// Builds stores from the configuration and manages the indices behind them.
///
/// Stores are created on first request and kept for the lifetime of the
/// manager, so that every caller asking for the same model type shares one
/// store.
#[derive(Debug)]
pub struct ElasticsearchManager {
    settings: ElasticsearchStorageConfig,
    client: Arc<dyn DocumentClient>,
    registry: StoreRegistry,
    stores: Mutex<HashMap<String, SharedStore>>,
}

impl ElasticsearchManager {
    /// Creates a manager talking to the Elasticsearch instance found in
    /// `settings`. No request is sent at this point.
    pub fn new(settings: ElasticsearchStorageConfig, registry: StoreRegistry) -> Result<Self> {
        let client = ElasticSearchClient::from_config(settings.clone())?;
        Ok(Self::with_client(settings, Arc::new(client), registry))
    }

    pub fn with_client(
        settings: ElasticsearchStorageConfig,
        client: Arc<dyn DocumentClient>,
        registry: StoreRegistry,
    ) -> Self {
        ElasticsearchManager {
            settings,
            client,
            registry,
            stores: Mutex::new(HashMap::new()),
        }
    }

    pub fn settings(&self) -> &ElasticsearchStorageConfig {
        &self.settings
    }

    pub fn client(&self) -> Arc<dyn DocumentClient> {
        self.client.clone()
    }

    pub fn registry(&self) -> &StoreRegistry {
        &self.registry
    }

    /// Returns the store configured for `model_type`, building it the first
    /// time: the index and the type mapping are created if needed.
    ///
    /// The `store_class` configured for `model_type` must be the name `S` was
    /// registered under.
    #[tracing::instrument(skip(self), fields(store = S::STORE_TYPE))]
    pub async fn get_store<S: Store>(&self, model_type: &str) -> Result<Arc<S>> {
        if let Some(store) = self.stores.lock().await.get(model_type).cloned() {
            return downcast_store::<S>(store, model_type);
        }

        let mapping = self.settings.model_type_mapping(model_type);

        let store_type = mapping
            .and_then(|mapping| mapping.store_class.as_deref())
            .filter(|store_type| !store_type.is_empty())
            .ok_or_else(|| ElasticClientError::UnknownStore {
                model_type: model_type.to_string(),
            })?;

        let registered = self.registry.resolve_store(model_type, store_type)?;
        if !registered.is::<S>() {
            return Err(ElasticClientError::InvalidStore {
                store_type: store_type.to_string(),
                model_type: model_type.to_string(),
                details: format!("it was requested as {}", S::STORE_TYPE),
            });
        }

        let settings = registered.settings();
        if settings.model_type() != model_type {
            return Err(ElasticClientError::InvalidStore {
                store_type: store_type.to_string(),
                model_type: model_type.to_string(),
                details: format!("it handles model \"{}\"", settings.model_type()),
            });
        }

        let index_name = mapping
            .and_then(|mapping| mapping.index_name.as_deref())
            .filter(|index_name| !index_name.is_empty())
            .ok_or_else(|| ElasticClientError::MissingIndexName(model_type.to_string()))?;

        self.create_store::<S>(model_type, index_name, settings).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn is_index_exist(&self, name: &str) -> Result<bool> {
        self.client
            .indices_exists(name)
            .await
            .map_err(|err| index_operation(&err, "ElasticsearchManager::is_index_exist"))
    }

    /// Creates the index with the configured settings, unless it already
    /// exists.
    #[tracing::instrument(skip(self))]
    pub async fn create_index(&self, name: &str) -> Result<()> {
        if self.is_index_exist(name).await? {
            debug!("index '{}' already exists", name);
            return Ok(());
        }

        let settings = self.settings.index_settings();
        self.client
            .indices_create(name, &settings)
            .await
            .map_err(|err| index_operation(&err, "ElasticsearchManager::create_index"))?;

        info!("created index '{}' with settings {}", name, settings);
        Ok(())
    }

    /// Deletes the index, if it exists.
    #[tracing::instrument(skip(self))]
    pub async fn delete_index(&self, name: &str) -> Result<()> {
        if !self.is_index_exist(name).await? {
            debug!("index '{}' does not exist", name);
            return Ok(());
        }

        self.client
            .indices_delete(name)
            .await
            .map_err(|err| index_operation(&err, "ElasticsearchManager::delete_index"))?;

        info!("deleted index '{}'", name);
        Ok(())
    }

    // Concurrent first calls for one model type may both install the mapping;
    // the first store inserted is the one every caller gets.
    async fn create_store<S: Store>(
        &self,
        model_type: &str,
        index_name: &str,
        settings: StoreSettings,
    ) -> Result<Arc<S>> {
        let doc_type = settings.doc_type();
        let type_exists = self
            .client
            .indices_exists_type(index_name, doc_type)
            .await
            .map_err(|err| index_operation(&err, "ElasticsearchManager::create_store"))?;

        if !type_exists {
            self.create_index(index_name).await?;
            self.client
                .indices_put_mapping(index_name, doc_type, settings.mappings())
                .await
                .map_err(|err| index_operation(&err, "ElasticsearchManager::create_store"))?;
            info!(
                "installed mapping of type '{}' on index '{}'",
                doc_type, index_name
            );
        }

        let store: SharedStore = Arc::new(S::new(BaseStore::new(
            settings,
            self.client.clone(),
            index_name,
        )));

        let store = self
            .stores
            .lock()
            .await
            .entry(model_type.to_string())
            .or_insert(store)
            .clone();

        info!("store {} ready for model {}", S::STORE_TYPE, model_type);
        downcast_store::<S>(store, model_type)
    }
}

fn downcast_store<S: Store>(store: SharedStore, model_type: &str) -> Result<Arc<S>> {
    store
        .downcast::<S>()
        .map_err(|_| ElasticClientError::InvalidStore {
            store_type: S::STORE_TYPE.to_string(),
            model_type: model_type.to_string(),
            details: String::from("another store type is already in use for this model"),
        })
}

fn index_operation(err: &ElasticClientError, context: &str) -> ElasticClientError {
    ElasticClientError::IndexOperation(beautify_exception_message(err, context))
}
