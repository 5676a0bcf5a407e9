use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::Document;

/// Addresses a single document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentParams {
    pub index: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub id: String,
}

/// Search request over one index and document type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchParams {
    pub index: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub from: i64,
    pub size: i64,
    /// `field:direction` tokens, in priority order.
    pub sort: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

/// Response similar to:
/// `{"_index": "users", "_type": "user", "_id": "42", "found": true, "_source": {...}}`
#[derive(Debug, Clone, Deserialize)]
pub struct ElasticsearchGetResponse {
    pub found: bool,
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_source", default)]
    pub source: Option<Document>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ElasticsearchSearchResponse {
    pub hits: ElasticsearchHits,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ElasticsearchHits {
    pub total: TotalHits,
    #[serde(default)]
    pub hits: Vec<ElasticsearchHit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ElasticsearchHit {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_source", default)]
    pub source: Document,
}

/// `hits.total` is a plain number with `rest_total_hits_as_int`, an object
/// otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TotalHits {
    Count(u64),
    Object { value: u64 },
}

impl TotalHits {
    pub fn value(&self) -> u64 {
        match self {
            TotalHits::Count(value) => *value,
            TotalHits::Object { value } => *value,
        }
    }
}

impl ElasticsearchSearchResponse {
    pub fn total(&self) -> u64 {
        self.hits.total.value()
    }

    pub fn into_hits(self) -> impl Iterator<Item = ElasticsearchHit> {
        self.hits.hits.into_iter()
    }
}
