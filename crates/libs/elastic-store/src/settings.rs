use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;
use store_config::StoreConfig;
use url::Url;

use serde_helpers::{default_timeout, deserialize_duration, serialize_duration};

pub const DEFAULT_NUMBER_OF_SHARDS: u64 = 2;
pub const DEFAULT_NUMBER_OF_REPLICAS: u64 = 0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSettings(serde_json::Value);

impl IndexSettings {
    pub fn new(value: serde_json::Value) -> IndexSettings {
        IndexSettings(value)
    }

    pub fn as_json(&self) -> &serde_json::Value {
        &self.0
    }
}

impl Default for IndexSettings {
    fn default() -> Self {
        IndexSettings(json!({
            "number_of_shards": DEFAULT_NUMBER_OF_SHARDS,
            "number_of_replicas": DEFAULT_NUMBER_OF_REPLICAS,
        }))
    }
}

impl std::fmt::Display for IndexSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::result::Result<(), std::fmt::Error> {
        self.0.fmt(f)
    }
}

/// Field schema of one document type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexMappings(serde_json::Value);

impl IndexMappings {
    pub fn new(value: serde_json::Value) -> IndexMappings {
        IndexMappings(value)
    }

    pub fn as_json(&self) -> &serde_json::Value {
        &self.0
    }
}

impl std::fmt::Display for IndexMappings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::result::Result<(), std::fmt::Error> {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Settings used when creating an index. When absent, indices are created
    /// with 2 shards and no replica.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<IndexSettings>,
}

/// How documents of one model are stored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelTypeMapping {
    /// Name under which the store type was registered.
    #[serde(default)]
    pub store_class: Option<String>,
    #[serde(default)]
    pub index_name: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ElasticsearchStorageConfig {
    pub url: Url,
    /// Timeout in milliseconds on client calls to Elasticsearch.
    #[serde(
        default = "default_timeout",
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub timeout: Duration,
    /// Constraint on the version of Elasticsearch.
    #[serde(default = "default_version_req")]
    pub version_req: String,
    #[serde(default)]
    pub index: IndexConfig,
    /// Model type name -> store and index used for that model.
    #[serde(default)]
    pub model_type_mappings: BTreeMap<String, ModelTypeMapping>,
}

fn default_url() -> Url {
    Url::parse("http://localhost:9200").expect("static url")
}

fn default_version_req() -> String {
    String::from(">=7.0.0")
}

impl Default for ElasticsearchStorageConfig {
    fn default() -> Self {
        ElasticsearchStorageConfig {
            url: default_url(),
            timeout: default_timeout(),
            version_req: default_version_req(),
            index: IndexConfig::default(),
            model_type_mappings: BTreeMap::new(),
        }
    }
}

impl ElasticsearchStorageConfig {
    /// Settings applied to newly created indices.
    pub fn index_settings(&self) -> IndexSettings {
        self.index.settings.clone().unwrap_or_default()
    }

    /// Keys read from configuration files come back lowercased, so the lookup
    /// falls back on the lowercased model type.
    pub fn model_type_mapping(&self, model_type: &str) -> Option<&ModelTypeMapping> {
        self.model_type_mappings
            .get(model_type)
            .or_else(|| self.model_type_mappings.get(&model_type.to_lowercase()))
    }

    /// Adds (or replaces) the store and index used for a model.
    pub fn with_model_type_mapping(
        mut self,
        model_type: &str,
        store_class: &str,
        index_name: &str,
    ) -> Self {
        self.model_type_mappings.insert(
            model_type.to_string(),
            ModelTypeMapping {
                store_class: Some(store_class.to_string()),
                index_name: Some(index_name.to_string()),
            },
        );
        self
    }
}

impl StoreConfig<'_> for ElasticsearchStorageConfig {
    const ENV_PREFIX: &'static str = "ELASTICSEARCH";

    fn file_sources() -> Vec<&'static str> {
        vec!["elasticsearch.toml"]
    }

    fn root_key() -> Option<&'static str> {
        Some("elasticsearch")
    }
}
