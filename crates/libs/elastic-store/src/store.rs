use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use serde_helpers::{DEFAULT_SEARCH_LIMIT, DEFAULT_SEARCH_START};

use crate::client::DocumentClient;
use crate::dto::{DocumentParams, SearchParams};
use crate::errors::{ElasticClientError, Result};
use crate::model::{Document, ElasticsearchModel, ID_FIELD};
use crate::store_settings::StoreSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => f.write_str("asc"),
            SortOrder::Desc => f.write_str("desc"),
        }
    }
}

/// Paginated search over a store. The order in which sort fields are added
/// is their order of precedence.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub criteria: Option<Value>,
    pub start: i64,
    pub limit: i64,
    pub sort: Vec<(String, SortOrder)>,
}

impl Default for SearchQuery {
    fn default() -> Self {
        SearchQuery {
            criteria: None,
            start: DEFAULT_SEARCH_START,
            limit: DEFAULT_SEARCH_LIMIT,
            sort: Vec::new(),
        }
    }
}

impl SearchQuery {
    /// `criteria` is sent as is as the search request body.
    pub fn new(criteria: Value) -> Self {
        SearchQuery {
            criteria: Some(criteria),
            ..Default::default()
        }
    }

    pub fn start(mut self, start: i64) -> Self {
        self.start = start;
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    pub fn sort_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort.push((field.into(), order));
        self
    }

    /// `field:direction` tokens, in precedence order.
    pub fn sort_tokens(&self) -> Vec<String> {
        self.sort
            .iter()
            .map(|(field, order)| format!("{field}:{order}"))
            .collect()
    }
}

/// Data access over one index and document type, for the model `M`.
///
/// It is the building block of every [`Store`]: it holds no state besides its
/// settings, the shared client and the index name.
pub struct BaseStore<M> {
    settings: StoreSettings,
    client: Arc<dyn DocumentClient>,
    index_name: String,
    _model: PhantomData<fn() -> M>,
}

impl<M> fmt::Debug for BaseStore<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseStore")
            .field("settings", &self.settings)
            .field("index_name", &self.index_name)
            .finish()
    }
}

impl<M: ElasticsearchModel> BaseStore<M> {
    pub fn new(
        settings: StoreSettings,
        client: Arc<dyn DocumentClient>,
        index_name: impl Into<String>,
    ) -> Self {
        BaseStore {
            settings,
            client,
            index_name: index_name.into(),
            _model: PhantomData,
        }
    }

    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    pub fn client(&self) -> &dyn DocumentClient {
        self.client.as_ref()
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// Returns `None` when the document does not exist.
    pub async fn find(&self, id: &str) -> Result<Option<M>> {
        let params = self.compute_params(id);
        debug!("get {} from {}/{}", id, params.index, params.doc_type);

        let response = match self.client.get(&params).await? {
            Some(response) if response.found => response,
            _ => return Ok(None),
        };

        let source = with_id(response.id, response.source.unwrap_or_default());
        self.transform_to_model(source).map(Some)
    }

    /// Indexes the model under its identifier. The identifier is the
    /// addressing key and is removed from the body.
    pub async fn save(&self, model: &M) -> Result<()> {
        self.ensure_supported_model::<M>()?;

        let mut data = model.dump();
        data.remove(ID_FIELD);

        let params = self.compute_params(&model.id());
        debug!("index {} into {}/{}", params.id, params.index, params.doc_type);
        self.client.index(&params, &data).await
    }

    pub async fn delete(&self, model: &M) -> Result<()> {
        self.ensure_supported_model::<M>()?;

        let params = self.compute_params(&model.id());
        debug!("delete {} from {}/{}", params.id, params.index, params.doc_type);
        self.client.delete(&params).await
    }

    /// Models matching `query`, in the order returned by Elasticsearch.
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<M>> {
        let params = self.compute_search_params(query);
        debug!(
            "search {}/{} from {} size {} sort {:?}",
            params.index, params.doc_type, params.from, params.size, params.sort
        );

        let response = self.client.search(&params).await?;
        if response.total() == 0 {
            return Ok(Vec::new());
        }

        response
            .into_hits()
            .map(|hit| self.transform_to_model(with_id(hit.id, hit.source)))
            .collect()
    }

    /// Parameters addressing the document `id` in the bound index and type.
    pub fn compute_params(&self, id: &str) -> DocumentParams {
        DocumentParams {
            index: self.index_name.clone(),
            doc_type: self.settings.doc_type().to_string(),
            id: id.to_string(),
        }
    }

    pub fn compute_search_params(&self, query: &SearchQuery) -> SearchParams {
        SearchParams {
            index: self.index_name.clone(),
            doc_type: self.settings.doc_type().to_string(),
            from: query.start,
            size: query.limit,
            sort: query.sort_tokens(),
            body: query.criteria.clone(),
        }
    }

    pub fn transform_to_model(&self, source: Document) -> Result<M> {
        M::restore(source)
    }

    /// Fails when the model type `N` is not the one this store was set up
    /// for.
    pub fn ensure_supported_model<N: ElasticsearchModel>(&self) -> Result<()> {
        if N::MODEL_TYPE == self.settings.model_type() {
            Ok(())
        } else {
            Err(ElasticClientError::UnsupportedModel {
                store: self.settings.store_type().to_string(),
                model: N::MODEL_TYPE.to_string(),
            })
        }
    }
}

/// The stored identifier, if any, is replaced by the document key.
fn with_id(id: String, mut source: Document) -> Document {
    source.insert(ID_FIELD.to_string(), Value::String(id));
    source
}

/// A store dedicated to one model type.
///
/// Implementations wrap a [`BaseStore`] and may add their own queries on top
/// of it. The manager builds them from the configuration, through the
/// [`StoreRegistry`](crate::registry::StoreRegistry).
#[async_trait]
pub trait Store: Send + Sync + Sized + 'static {
    type Model: ElasticsearchModel;

    /// Name used for this store in the configuration (`store_class`).
    const STORE_TYPE: &'static str;

    fn settings() -> StoreSettings;

    fn new(base: BaseStore<Self::Model>) -> Self;

    fn base(&self) -> &BaseStore<Self::Model>;

    async fn find(&self, id: &str) -> Result<Option<Self::Model>> {
        self.base().find(id).await
    }

    async fn save(&self, model: &Self::Model) -> Result<()> {
        self.base().save(model).await
    }

    async fn delete(&self, model: &Self::Model) -> Result<()> {
        self.base().delete(model).await
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Self::Model>> {
        self.base().search(query).await
    }
}
