use serde_json::{Map, Value};

use crate::errors::Result;

/// Raw document as stored in (or read from) an index.
pub type Document = Map<String, Value>;

/// Field carrying the identifier in a dumped model. It is never sent as part
/// of a document body, the identifier is the addressing key instead.
pub const ID_FIELD: &str = "id";

/// Capabilities a domain model needs to be persisted by a store.
pub trait ElasticsearchModel: Sized + Send + Sync + 'static {
    /// Name identifying the model type in the configuration
    /// (`model_type_mappings`) and in store settings.
    const MODEL_TYPE: &'static str;

    /// Rebuilds a model from a stored document, the identifier being available
    /// under the `id` key.
    fn restore(data: Document) -> Result<Self>;

    fn id(&self) -> String;

    fn dump(&self) -> Document;
}
