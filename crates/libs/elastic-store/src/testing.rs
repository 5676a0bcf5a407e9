//! In-memory document database and sample models for unit tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::client::DocumentClient;
use crate::dto::{
    DocumentParams, ElasticsearchGetResponse, ElasticsearchHit, ElasticsearchHits,
    ElasticsearchSearchResponse, SearchParams, TotalHits,
};
use crate::errors::{ElasticClientError, Result};
use crate::model::{Document, ElasticsearchModel};
use crate::settings::{IndexMappings, IndexSettings};
use crate::store::{BaseStore, SearchQuery, Store};
use crate::store_settings::StoreSettings;

pub fn document(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// Every request received by [`MemoryClient`].
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Get(DocumentParams),
    Index(DocumentParams, Document),
    Delete(DocumentParams),
    Search(SearchParams),
    IndicesExists(String),
    IndicesCreate(String, IndexSettings),
    IndicesDelete(String),
    IndicesExistsType(String, String),
    IndicesPutMapping(String, String, IndexMappings),
}

#[derive(Debug, Default)]
struct IndexState {
    settings: Option<IndexSettings>,
    mappings: BTreeMap<String, IndexMappings>,
    documents: BTreeMap<(String, String), Document>,
}

#[derive(Debug, Default)]
pub struct MemoryClient {
    indices: Mutex<BTreeMap<String, IndexState>>,
    requests: Mutex<Vec<Request>>,
    failure: Mutex<Option<(u16, String)>>,
    search_reply: Mutex<Option<ElasticsearchSearchResponse>>,
}

fn exception(status: u16, kind: &str, reason: &str) -> ElasticClientError {
    ElasticClientError::ElasticsearchException {
        status: Some(status),
        body: json!({
            "error": {"root_cause": [], "type": kind, "reason": reason},
            "status": status
        })
        .to_string(),
    }
}

impl MemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, predicate: impl Fn(&Request) -> bool) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| predicate(r))
            .count()
    }

    /// The next request fails with `status` and the raw `body`.
    pub fn fail_next(&self, status: u16, body: &str) {
        *self.failure.lock().unwrap() = Some((status, body.to_string()));
    }

    /// The next search answers `response` whatever the stored documents.
    pub fn reply_to_next_search(&self, response: ElasticsearchSearchResponse) {
        *self.search_reply.lock().unwrap() = Some(response);
    }

    pub fn create_empty_index(&self, index: &str) {
        self.indices
            .lock()
            .unwrap()
            .entry(index.to_string())
            .or_default();
    }

    pub fn insert_document(&self, index: &str, doc_type: &str, id: &str, source: Document) {
        self.indices
            .lock()
            .unwrap()
            .entry(index.to_string())
            .or_default()
            .documents
            .insert((doc_type.to_string(), id.to_string()), source);
    }

    pub fn document(&self, index: &str, doc_type: &str, id: &str) -> Option<Document> {
        self.indices
            .lock()
            .unwrap()
            .get(index)
            .and_then(|state| {
                state
                    .documents
                    .get(&(doc_type.to_string(), id.to_string()))
                    .cloned()
            })
    }

    pub fn index_settings(&self, index: &str) -> Option<IndexSettings> {
        self.indices
            .lock()
            .unwrap()
            .get(index)
            .and_then(|state| state.settings.clone())
    }

    pub fn mapping(&self, index: &str, doc_type: &str) -> Option<IndexMappings> {
        self.indices
            .lock()
            .unwrap()
            .get(index)
            .and_then(|state| state.mappings.get(doc_type).cloned())
    }

    fn record(&self, request: Request) -> Result<()> {
        self.requests.lock().unwrap().push(request);
        match self.failure.lock().unwrap().take() {
            Some((status, body)) => Err(ElasticClientError::ElasticsearchException {
                status: Some(status),
                body,
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DocumentClient for MemoryClient {
    async fn get(&self, params: &DocumentParams) -> Result<Option<ElasticsearchGetResponse>> {
        self.record(Request::Get(params.clone()))?;
        let indices = self.indices.lock().unwrap();
        let Some(state) = indices.get(&params.index) else {
            return Ok(None);
        };

        let key = (params.doc_type.clone(), params.id.clone());
        Ok(Some(ElasticsearchGetResponse {
            found: state.documents.contains_key(&key),
            id: params.id.clone(),
            source: state.documents.get(&key).cloned(),
        }))
    }

    async fn index(&self, params: &DocumentParams, body: &Document) -> Result<()> {
        self.record(Request::Index(params.clone(), body.clone()))?;
        self.insert_document(&params.index, &params.doc_type, &params.id, body.clone());
        Ok(())
    }

    async fn delete(&self, params: &DocumentParams) -> Result<()> {
        self.record(Request::Delete(params.clone()))?;
        let mut indices = self.indices.lock().unwrap();
        let removed = indices.get_mut(&params.index).and_then(|state| {
            state
                .documents
                .remove(&(params.doc_type.clone(), params.id.clone()))
        });

        match removed {
            Some(_) => Ok(()),
            None => Err(ElasticClientError::ElasticsearchException {
                status: Some(404),
                body: json!({"_index": params.index, "_id": params.id, "result": "not_found"})
                    .to_string(),
            }),
        }
    }

    /// Hits come in key order, the query body and the sort are not
    /// interpreted.
    async fn search(&self, params: &SearchParams) -> Result<ElasticsearchSearchResponse> {
        self.record(Request::Search(params.clone()))?;
        if let Some(response) = self.search_reply.lock().unwrap().take() {
            return Ok(response);
        }

        let indices = self.indices.lock().unwrap();
        let state = indices
            .get(&params.index)
            .ok_or_else(|| exception(404, "index_not_found_exception", "no such index"))?;

        let matching = state
            .documents
            .iter()
            .filter(|((doc_type, _), _)| doc_type == &params.doc_type)
            .collect::<Vec<_>>();

        let hits = matching
            .iter()
            .skip(params.from.max(0) as usize)
            .take(params.size.max(0) as usize)
            .map(|((_, id), source)| ElasticsearchHit {
                id: id.clone(),
                source: (*source).clone(),
            })
            .collect();

        Ok(ElasticsearchSearchResponse {
            hits: ElasticsearchHits {
                total: TotalHits::Count(matching.len() as u64),
                hits,
            },
        })
    }

    async fn indices_exists(&self, index: &str) -> Result<bool> {
        self.record(Request::IndicesExists(index.to_string()))?;
        Ok(self.indices.lock().unwrap().contains_key(index))
    }

    async fn indices_create(&self, index: &str, settings: &IndexSettings) -> Result<()> {
        self.record(Request::IndicesCreate(index.to_string(), settings.clone()))?;
        let mut indices = self.indices.lock().unwrap();
        if indices.contains_key(index) {
            return Err(exception(
                400,
                "resource_already_exists_exception",
                &format!("index [{index}] already exists"),
            ));
        }

        indices.insert(
            index.to_string(),
            IndexState {
                settings: Some(settings.clone()),
                ..Default::default()
            },
        );
        Ok(())
    }

    async fn indices_delete(&self, index: &str) -> Result<()> {
        self.record(Request::IndicesDelete(index.to_string()))?;
        match self.indices.lock().unwrap().remove(index) {
            Some(_) => Ok(()),
            None => Err(exception(
                404,
                "index_not_found_exception",
                &format!("no such index [{index}]"),
            )),
        }
    }

    async fn indices_exists_type(&self, index: &str, doc_type: &str) -> Result<bool> {
        self.record(Request::IndicesExistsType(
            index.to_string(),
            doc_type.to_string(),
        ))?;
        Ok(self
            .indices
            .lock()
            .unwrap()
            .get(index)
            .map(|state| state.mappings.contains_key(doc_type))
            .unwrap_or(false))
    }

    async fn indices_put_mapping(
        &self,
        index: &str,
        doc_type: &str,
        mappings: &IndexMappings,
    ) -> Result<()> {
        self.record(Request::IndicesPutMapping(
            index.to_string(),
            doc_type.to_string(),
            mappings.clone(),
        ))?;
        let mut indices = self.indices.lock().unwrap();
        let state = indices.get_mut(index).ok_or_else(|| {
            exception(
                404,
                "index_not_found_exception",
                &format!("no such index [{index}]"),
            )
        })?;
        state.mappings.insert(doc_type.to_string(), mappings.clone());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
}

impl User {
    pub fn new(id: &str, name: &str) -> Self {
        User {
            id: id.to_string(),
            name: name.to_string(),
        }
    }
}

impl ElasticsearchModel for User {
    const MODEL_TYPE: &'static str = "User";

    fn restore(data: Document) -> Result<Self> {
        Ok(serde_json::from_value(Value::Object(data))?)
    }

    fn id(&self) -> String {
        self.id.clone()
    }

    fn dump(&self) -> Document {
        document(json!({"id": self.id, "name": self.name}))
    }
}

#[derive(Debug)]
pub struct UserStore {
    base: BaseStore<User>,
}

impl UserStore {
    pub async fn find_by_name(&self, name: &str) -> Result<Vec<User>> {
        let query = SearchQuery::new(json!({"query": {"term": {"name": name}}}));
        self.base.search(&query).await
    }
}

impl Store for UserStore {
    type Model = User;
    const STORE_TYPE: &'static str = "UserStore";

    fn settings() -> StoreSettings {
        StoreSettings::of::<Self>(
            "user",
            IndexMappings::new(json!({"properties": {"name": {"type": "keyword"}}})),
        )
    }

    fn new(base: BaseStore<User>) -> Self {
        UserStore { base }
    }

    fn base(&self) -> &BaseStore<User> {
        &self.base
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
}

impl ElasticsearchModel for Post {
    const MODEL_TYPE: &'static str = "Post";

    fn restore(data: Document) -> Result<Self> {
        Ok(serde_json::from_value(Value::Object(data))?)
    }

    fn id(&self) -> String {
        self.id.clone()
    }

    fn dump(&self) -> Document {
        document(json!({"id": self.id, "title": self.title}))
    }
}

#[derive(Debug)]
pub struct PostStore {
    base: BaseStore<Post>,
}

impl Store for PostStore {
    type Model = Post;
    const STORE_TYPE: &'static str = "PostStore";

    fn settings() -> StoreSettings {
        StoreSettings::of::<Self>("post", IndexMappings::new(json!({"properties": {}})))
    }

    fn new(base: BaseStore<Post>) -> Self {
        PostStore { base }
    }

    fn base(&self) -> &BaseStore<Post> {
        &self.base
    }
}
