use crate::errors::{ElasticClientError, Result};
use crate::model::ElasticsearchModel;
use crate::registry::StoreRegistry;
use crate::settings::IndexMappings;
use crate::store::Store;

/// Describes how one model is stored: which store handles it, under which
/// document type and with which field mappings.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSettings {
    model_type: String,
    store_type: String,
    doc_type: String,
    mappings: IndexMappings,
}

impl StoreSettings {
    /// Builds settings from type names, which must be known to `registry`.
    pub fn new(
        model_type: &str,
        store_type: &str,
        doc_type: &str,
        mappings: IndexMappings,
        registry: &StoreRegistry,
    ) -> Result<Self> {
        if !registry.has_model(model_type) {
            return Err(ElasticClientError::InvalidStoreSettings {
                details: format!("model {model_type} is not a registered model type"),
            });
        }

        if !registry.has_store(store_type) {
            return Err(ElasticClientError::InvalidStoreSettings {
                details: format!("store {store_type} is not a registered store type"),
            });
        }

        Ok(StoreSettings {
            model_type: model_type.to_string(),
            store_type: store_type.to_string(),
            doc_type: doc_type.to_string(),
            mappings,
        })
    }

    /// Settings of the store type `S`. Both type names come from the types
    /// themselves, so there is nothing to validate.
    pub fn of<S: Store>(doc_type: &str, mappings: IndexMappings) -> Self {
        StoreSettings {
            model_type: <S::Model as ElasticsearchModel>::MODEL_TYPE.to_string(),
            store_type: S::STORE_TYPE.to_string(),
            doc_type: doc_type.to_string(),
            mappings,
        }
    }

    pub fn model_type(&self) -> &str {
        &self.model_type
    }

    pub fn store_type(&self) -> &str {
        &self.store_type
    }

    /// Document type label sent along every request.
    pub fn doc_type(&self) -> &str {
        &self.doc_type
    }

    pub fn mappings(&self) -> &IndexMappings {
        &self.mappings
    }
}
