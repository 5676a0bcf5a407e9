use std::any::TypeId;
use std::collections::{BTreeMap, BTreeSet};

use crate::errors::{ElasticClientError, Result};
use crate::model::ElasticsearchModel;
use crate::store::Store;
use crate::store_settings::StoreSettings;

/// A store type known to the registry.
#[derive(Debug, Clone)]
pub struct RegisteredStore {
    type_id: TypeId,
    store_type: &'static str,
    model_type: &'static str,
    settings: fn() -> StoreSettings,
}

impl RegisteredStore {
    pub fn store_type(&self) -> &'static str {
        self.store_type
    }

    pub fn model_type(&self) -> &'static str {
        self.model_type
    }

    pub fn settings(&self) -> StoreSettings {
        (self.settings)()
    }

    pub fn is<S: Store>(&self) -> bool {
        self.type_id == TypeId::of::<S>()
    }
}

/// Model and store types the application knows about, looked up by the names
/// used in the configuration.
#[derive(Debug, Clone, Default)]
pub struct StoreRegistry {
    models: BTreeSet<&'static str>,
    stores: BTreeMap<&'static str, RegisteredStore>,
}

impl StoreRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_model<M: ElasticsearchModel>(&mut self) -> &mut Self {
        self.models.insert(M::MODEL_TYPE);
        self
    }

    /// Registers the store type `S` and the model it handles.
    pub fn register_store<S: Store>(&mut self) -> &mut Self {
        self.register_model::<S::Model>();
        self.stores.insert(
            S::STORE_TYPE,
            RegisteredStore {
                type_id: TypeId::of::<S>(),
                store_type: S::STORE_TYPE,
                model_type: <S::Model as ElasticsearchModel>::MODEL_TYPE,
                settings: S::settings,
            },
        );
        self
    }

    pub fn has_model(&self, name: &str) -> bool {
        self.models.contains(name)
    }

    pub fn has_store(&self, name: &str) -> bool {
        self.stores.contains_key(name)
    }

    /// Finds the store registered as `store_type`, configured for `model_type`.
    pub fn resolve_store(&self, model_type: &str, store_type: &str) -> Result<&RegisteredStore> {
        if let Some(store) = self.stores.get(store_type) {
            Ok(store)
        } else if self.has_model(store_type) {
            Err(ElasticClientError::InvalidStore {
                store_type: store_type.to_string(),
                model_type: model_type.to_string(),
                details: String::from("it is a model type, it does not implement Store"),
            })
        } else {
            Err(ElasticClientError::UnknownStore {
                model_type: model_type.to_string(),
            })
        }
    }
}
