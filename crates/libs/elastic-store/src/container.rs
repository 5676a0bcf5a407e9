use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::debug;

use crate::client::DocumentClient;
use crate::errors::{ElasticClientError, Result};
use crate::manager::ElasticsearchManager;
use crate::registry::StoreRegistry;
use crate::settings::ElasticsearchStorageConfig;

/// Name of the shared [`ElasticsearchManager`] service.
pub const ELASTICSEARCH_MANAGER: &str = "elasticsearch_manager";

/// Name of the parameter holding the [`ElasticsearchStorageConfig`].
pub const ELASTICSEARCH_SETTINGS: &str = "elasticsearch.settings";

type Shared = Arc<dyn Any + Send + Sync>;
type Factory = Box<dyn Fn(&ServiceContainer) -> Result<Shared> + Send + Sync>;

struct ServiceEntry {
    factory: Factory,
    instance: OnceCell<Shared>,
}

/// Application context holding parameters and lazily built services.
///
/// A service is built by its factory the first time it is requested, and
/// the same instance is handed out afterwards.
#[derive(Default)]
pub struct ServiceContainer {
    parameters: HashMap<String, Shared>,
    services: HashMap<String, ServiceEntry>,
    locked: HashSet<String>,
}

impl fmt::Debug for ServiceContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceContainer")
            .field("parameters", &self.parameters.keys().collect::<Vec<_>>())
            .field("services", &self.services.keys().collect::<Vec<_>>())
            .field("locked", &self.locked)
            .finish()
    }
}

impl ServiceContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_parameter<T: Any + Send + Sync>(&mut self, name: &str, value: T) -> Result<()> {
        self.ensure_unlocked(name)?;
        self.parameters.insert(name.to_string(), Arc::new(value));
        Ok(())
    }

    /// `Ok(None)` when the parameter was never set.
    pub fn parameter<T: Any + Send + Sync>(&self, name: &str) -> Result<Option<Arc<T>>> {
        match self.parameters.get(name) {
            None => Ok(None),
            Some(value) => value
                .clone()
                .downcast::<T>()
                .map(Some)
                .map_err(|_| ElasticClientError::ServiceTypeMismatch(name.to_string())),
        }
    }

    /// Registers the factory building the service `name`, replacing any
    /// previous one unless the name is locked.
    pub fn register<T, F>(&mut self, name: &str, factory: F) -> Result<()>
    where
        T: Any + Send + Sync,
        F: Fn(&ServiceContainer) -> Result<T> + Send + Sync + 'static,
    {
        self.ensure_unlocked(name)?;
        let factory: Factory = Box::new(move |container| {
            let service: Shared = Arc::new(factory(container)?);
            Ok(service)
        });
        self.services.insert(
            name.to_string(),
            ServiceEntry {
                factory,
                instance: OnceCell::new(),
            },
        );
        Ok(())
    }

    /// Prevents any further change to `name`.
    pub fn lock(&mut self, name: &str) {
        self.locked.insert(name.to_string());
    }

    pub fn is_locked(&self, name: &str) -> bool {
        self.locked.contains(name)
    }

    pub async fn get<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>> {
        let entry = self
            .services
            .get(name)
            .ok_or_else(|| ElasticClientError::ServiceNotFound(name.to_string()))?;

        let instance = entry
            .instance
            .get_or_try_init(|| async {
                debug!("building service '{}'", name);
                (entry.factory)(self)
            })
            .await?;

        instance
            .clone()
            .downcast::<T>()
            .map_err(|_| ElasticClientError::ServiceTypeMismatch(name.to_string()))
    }

    fn ensure_unlocked(&self, name: &str) -> Result<()> {
        if self.is_locked(name) {
            Err(ElasticClientError::ServiceLocked(name.to_string()))
        } else {
            Ok(())
        }
    }
}

/// Something contributing services to a [`ServiceContainer`].
pub trait ContainerProvider {
    fn hydrate(&self, container: &mut ServiceContainer) -> Result<()>;
}

/// Provides the shared [`ElasticsearchManager`] under
/// [`ELASTICSEARCH_MANAGER`].
#[derive(Debug, Clone)]
pub struct ElasticsearchCore {
    registry: StoreRegistry,
    client: Option<Arc<dyn DocumentClient>>,
}

impl ElasticsearchCore {
    pub fn new(registry: StoreRegistry) -> Self {
        ElasticsearchCore {
            registry,
            client: None,
        }
    }

    /// The manager will use `client` instead of connecting to the configured
    /// url.
    pub fn with_client(registry: StoreRegistry, client: Arc<dyn DocumentClient>) -> Self {
        ElasticsearchCore {
            registry,
            client: Some(client),
        }
    }
}

impl ContainerProvider for ElasticsearchCore {
    fn hydrate(&self, container: &mut ServiceContainer) -> Result<()> {
        let registry = self.registry.clone();
        let client = self.client.clone();

        container.register(ELASTICSEARCH_MANAGER, move |container| {
            let settings = container
                .parameter::<ElasticsearchStorageConfig>(ELASTICSEARCH_SETTINGS)?
                .map(|settings| settings.as_ref().clone())
                .unwrap_or_default();

            match &client {
                Some(client) => Ok(ElasticsearchManager::with_client(
                    settings,
                    client.clone(),
                    registry.clone(),
                )),
                None => ElasticsearchManager::new(settings, registry.clone()),
            }
        })?;
        container.lock(ELASTICSEARCH_MANAGER);
        Ok(())
    }
}
