use async_trait::async_trait;
use elasticsearch::http::response::Response;
use elasticsearch::indices::{
    IndicesCreateParts, IndicesDeleteParts, IndicesExistsParts, IndicesExistsTypeParts,
    IndicesPutMappingParts,
};
use elasticsearch::{DeleteParts, GetParts, IndexParts, SearchParts};
use serde_json::{json, Value};
use tracing::debug;

use crate::client::DocumentClient;
use crate::dto::{
    DocumentParams, ElasticsearchGetResponse, ElasticsearchSearchResponse, SearchParams,
};
use crate::errors::{ElasticClientError, Result};
use crate::model::Document;
use crate::settings::{IndexMappings, IndexSettings};
use crate::ElasticSearchClient;

const NOT_FOUND: u16 = 404;

// Document types are deprecated in Elasticsearch 7 but are still part of the
// addressing of every request made here.
#[allow(deprecated)]
#[async_trait]
impl DocumentClient for ElasticSearchClient {
    async fn get(&self, params: &DocumentParams) -> Result<Option<ElasticsearchGetResponse>> {
        let response = self
            .client
            .get(GetParts::IndexTypeId(
                &params.index,
                &params.doc_type,
                &params.id,
            ))
            .request_timeout(self.config.timeout)
            .send()
            .await?;

        let status = response.status_code().as_u16();
        if status == NOT_FOUND {
            debug!("document {} not found in {}", params.id, params.index);
            Ok(None)
        } else if response.status_code().is_success() {
            let body = response.json::<ElasticsearchGetResponse>().await?;
            Ok(Some(body))
        } else {
            Err(exception(response).await)
        }
    }

    async fn index(&self, params: &DocumentParams, body: &Document) -> Result<()> {
        let response = self
            .client
            .index(IndexParts::IndexTypeId(
                &params.index,
                &params.doc_type,
                &params.id,
            ))
            .body(body)
            .request_timeout(self.config.timeout)
            .send()
            .await?;

        if response.status_code().is_success() {
            Ok(())
        } else {
            Err(exception(response).await)
        }
    }

    async fn delete(&self, params: &DocumentParams) -> Result<()> {
        let response = self
            .client
            .delete(DeleteParts::IndexTypeId(
                &params.index,
                &params.doc_type,
                &params.id,
            ))
            .request_timeout(self.config.timeout)
            .send()
            .await?;

        if response.status_code().is_success() {
            Ok(())
        } else {
            Err(exception(response).await)
        }
    }

    async fn search(&self, params: &SearchParams) -> Result<ElasticsearchSearchResponse> {
        let indices = [params.index.as_str()];
        let types = [params.doc_type.as_str()];
        let sort = params.sort.iter().map(String::as_str).collect::<Vec<_>>();

        let search = self
            .client
            .search(SearchParts::IndexType(&indices, &types))
            .from(params.from)
            .size(params.size)
            // Keeps `hits.total` a plain number.
            .rest_total_hits_as_int(true)
            .request_timeout(self.config.timeout);

        let search = if sort.is_empty() {
            search
        } else {
            search.sort(&sort)
        };

        let response = match &params.body {
            Some(body) => search.body(body).send().await?,
            None => search.send().await?,
        };

        if response.status_code().is_success() {
            let body = response.json::<ElasticsearchSearchResponse>().await?;
            Ok(body)
        } else {
            Err(exception(response).await)
        }
    }

    async fn indices_exists(&self, index: &str) -> Result<bool> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index]))
            .request_timeout(self.config.timeout)
            .send()
            .await?;

        match response.status_code().as_u16() {
            NOT_FOUND => Ok(false),
            _ if response.status_code().is_success() => Ok(true),
            _ => Err(exception(response).await),
        }
    }

    async fn indices_create(&self, index: &str, settings: &IndexSettings) -> Result<()> {
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(index))
            .body(json!({ "settings": settings.as_json() }))
            .request_timeout(self.config.timeout)
            .send()
            .await?;

        if response.status_code().is_success() {
            // Response similar to:
            // {"acknowledged": true, "index": "name", "shards_acknowledged": true}
            let json = response.json::<Value>().await?;
            if acknowledged(&json)? {
                Ok(())
            } else {
                Err(ElasticClientError::IndexCreationFailed(index.to_string()))
            }
        } else {
            Err(exception(response).await)
        }
    }

    async fn indices_delete(&self, index: &str) -> Result<()> {
        let response = self
            .client
            .indices()
            .delete(IndicesDeleteParts::Index(&[index]))
            .request_timeout(self.config.timeout)
            .send()
            .await?;

        if response.status_code().is_success() {
            let json = response.json::<Value>().await?;
            if acknowledged(&json)? {
                Ok(())
            } else {
                Err(ElasticClientError::IndexDeletionFailed(index.to_string()))
            }
        } else {
            Err(exception(response).await)
        }
    }

    async fn indices_exists_type(&self, index: &str, doc_type: &str) -> Result<bool> {
        let response = self
            .client
            .indices()
            .exists_type(IndicesExistsTypeParts::IndexType(&[index], &[doc_type]))
            .request_timeout(self.config.timeout)
            .send()
            .await?;

        // A missing index is reported as a missing type.
        match response.status_code().as_u16() {
            NOT_FOUND => Ok(false),
            _ if response.status_code().is_success() => Ok(true),
            _ => Err(exception(response).await),
        }
    }

    async fn indices_put_mapping(
        &self,
        index: &str,
        doc_type: &str,
        mappings: &IndexMappings,
    ) -> Result<()> {
        let response = self
            .client
            .indices()
            .put_mapping(IndicesPutMappingParts::IndexType(&[index], doc_type))
            .include_type_name(true)
            .body(json!({ doc_type: mappings.as_json() }))
            .request_timeout(self.config.timeout)
            .send()
            .await?;

        if response.status_code().is_success() {
            let json = response.json::<Value>().await?;
            if acknowledged(&json)? {
                Ok(())
            } else {
                Err(ElasticClientError::MappingCreationFailed {
                    index: index.to_string(),
                    doc_type: doc_type.to_string(),
                })
            }
        } else {
            Err(exception(response).await)
        }
    }
}

/// Keeps the raw error body, it is parsed later only by the callers which
/// need a readable message.
async fn exception(response: Response) -> ElasticClientError {
    let status = response.status_code().as_u16();
    match response.text().await {
        Ok(body) => ElasticClientError::ElasticsearchException {
            status: Some(status),
            body,
        },
        Err(err) => ElasticClientError::from(err),
    }
}

fn acknowledged(json: &Value) -> Result<bool> {
    json.as_object()
        .ok_or(ElasticClientError::InvalidJson {
            msg: String::from("expected JSON object"),
            json: json.clone(),
        })?
        .get("acknowledged")
        .ok_or(ElasticClientError::InvalidJson {
            msg: String::from("expected 'acknowledged'"),
            json: json.clone(),
        })?
        .as_bool()
        .ok_or(ElasticClientError::InvalidJson {
            msg: String::from("expected JSON bool"),
            json: json.clone(),
        })
}
