use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ElasticClientError>;

#[derive(Debug, Error)]
pub enum ElasticClientError {
    #[error("Elasticsearch error: {0}")]
    ElasticSearchError(#[from] elasticsearch::Error),

    #[error("Elasticsearch client builder error: {0}")]
    ElasticClientBuilderError(#[from] elasticsearch::http::transport::BuildError),

    #[error("serde_json error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("Invalid json format: {msg} {json}")]
    InvalidJson { msg: String, json: Value },

    /// Non-success response, `body` is the raw error body sent back by
    /// Elasticsearch.
    #[error("Elasticsearch exception: status: {status:?}, body: {body}")]
    ElasticsearchException { status: Option<u16>, body: String },

    #[error("Failed to create elasticsearch index '{0}'")]
    IndexCreationFailed(String),

    #[error("Failed to delete elasticsearch index '{0}'")]
    IndexDeletionFailed(String),

    #[error("Failed to put mapping for type '{doc_type}' on index '{index}'")]
    MappingCreationFailed { index: String, doc_type: String },

    /// Index lifecycle failure, the message is already prefixed with the
    /// operation it comes from.
    #[error("{0}")]
    IndexOperation(String),

    #[error("Failed to find store class for model \"{model_type}\"")]
    UnknownStore { model_type: String },

    #[error("Store {store_type} cannot be used for model \"{model_type}\": {details}")]
    InvalidStore {
        store_type: String,
        model_type: String,
        details: String,
    },

    #[error("Failed to create store settings, {details}")]
    InvalidStoreSettings { details: String },

    #[error("No index name configured for model \"{0}\"")]
    MissingIndexName(String),

    #[error("{store} is not able to handle {model} model")]
    UnsupportedModel { store: String, model: String },

    #[error("Service '{0}' is locked and cannot be replaced")]
    ServiceLocked(String),

    #[error("Service '{0}' is not registered")]
    ServiceNotFound(String),

    #[error("Service '{0}' does not have the requested type")]
    ServiceTypeMismatch(String),
}

impl ElasticClientError {
    /// Errors raised while resolving stores from the configuration. They are
    /// never worth retrying.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownStore { .. }
                | Self::InvalidStore { .. }
                | Self::InvalidStoreSettings { .. }
                | Self::MissingIndexName(_)
        )
    }
}

/// Error body returned by Elasticsearch, e.g.
/// `{"error": {"type": "...", "reason": "..."}, "status": 400}`
#[derive(Debug, Deserialize)]
struct ExceptionBody {
    status: u16,
    error: ExceptionCause,
}

#[derive(Debug, Deserialize)]
struct ExceptionCause {
    #[serde(rename = "type")]
    kind: String,
    reason: String,
}

/// Turns a failure into a one line message `[context] [status] type: reason`
/// read from the Elasticsearch error body, or into a diagnostic telling why
/// that body could not be read.
pub(crate) fn beautify_exception_message(err: &ElasticClientError, context: &str) -> String {
    let prefix = format!("[{context}] ");
    match err {
        ElasticClientError::ElasticsearchException { body, .. } => {
            match serde_json::from_str::<ExceptionBody>(body) {
                Ok(raw) => format!(
                    "{prefix}[{}] {}: {}",
                    raw.status, raw.error.kind, raw.error.reason
                ),
                Err(json_err) => format!(
                    "{prefix}ElasticsearchException has been thrown, failed to beautify its message because '{json_err}' occurred while decoding '{body}'"
                ),
            }
        }
        other => format!(
            "{prefix}{other} has been thrown, failed to beautify its message because it carries no Elasticsearch error body"
        ),
    }
}
