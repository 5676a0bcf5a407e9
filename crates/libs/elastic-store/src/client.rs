use std::fmt::Debug;

use async_trait::async_trait;

use crate::dto::{
    DocumentParams, ElasticsearchGetResponse, ElasticsearchSearchResponse, SearchParams,
};
use crate::errors::Result;
use crate::model::Document;
use crate::settings::{IndexMappings, IndexSettings};

/// Requests issued to the document database. One handle is shared by the
/// manager and every store it builds.
#[async_trait]
pub trait DocumentClient: Send + Sync + Debug {
    /// Returns `None` when Elasticsearch answers 404 (missing document or
    /// missing index).
    async fn get(&self, params: &DocumentParams) -> Result<Option<ElasticsearchGetResponse>>;

    /// Creates or replaces the document addressed by `params`.
    async fn index(&self, params: &DocumentParams, body: &Document) -> Result<()>;

    async fn delete(&self, params: &DocumentParams) -> Result<()>;

    async fn search(&self, params: &SearchParams) -> Result<ElasticsearchSearchResponse>;

    async fn indices_exists(&self, index: &str) -> Result<bool>;

    async fn indices_create(&self, index: &str, settings: &IndexSettings) -> Result<()>;

    async fn indices_delete(&self, index: &str) -> Result<()>;

    async fn indices_exists_type(&self, index: &str, doc_type: &str) -> Result<bool>;

    /// Installs `mappings` for `doc_type`, the body sent is
    /// `{doc_type: mappings}`.
    async fn indices_put_mapping(
        &self,
        index: &str,
        doc_type: &str,
        mappings: &IndexMappings,
    ) -> Result<()>;
}
