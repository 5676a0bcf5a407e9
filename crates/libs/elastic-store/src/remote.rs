use async_trait::async_trait;
use elasticsearch::http::headers::HeaderMap;
use elasticsearch::http::transport::{
    BuildError as TransportBuilderError, SingleNodeConnectionPool, TransportBuilder,
};
use elasticsearch::http::Method;
use elasticsearch::Elasticsearch;
use semver::{Version, VersionReq};
use serde_json::Value;
use snafu::{ResultExt, Snafu};
use tracing::info;
use url::Url;

use crate::errors::Result as ClientResult;
use crate::settings::ElasticsearchStorageConfig;
use crate::ElasticSearchClient;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Elasticsearch Transport Error: {}", source))]
    ElasticsearchTransport { source: TransportBuilderError },

    #[snafu(display("Elasticsearch Connection Error: {}", source))]
    ElasticsearchConnection { source: elasticsearch::Error },

    /// Elasticsearch Deserialization Error
    #[snafu(display("JSON Elasticsearch Deserialization Error: {}", source))]
    JsonDeserialization { source: elasticsearch::Error },

    /// Elasticsearch Exception
    #[snafu(display("Elasticsearch Exception: {}", msg))]
    ElasticsearchException { msg: String },

    /// Invalid JSON Value
    #[snafu(display("JSON Deserialization Invalid: {} {:?}", details, json))]
    JsonDeserializationInvalid { details: String, json: Value },

    /// Invalid Version Requirements
    #[snafu(display("Invalid Version Requirement Specification {}: {}", details, source))]
    VersionRequirementInvalid {
        details: String,
        source: semver::Error,
    },

    #[snafu(display("Invalid Elasticsearch Version {}: {}", details, source))]
    VersionInvalid {
        details: String,
        source: semver::Error,
    },
}

#[derive(Debug, Snafu)]
pub enum RemoteError {
    #[snafu(display("Connection Error: {}", source))]
    Connection { source: Error },
}

impl From<Error> for RemoteError {
    fn from(source: Error) -> Self {
        RemoteError::Connection { source }
    }
}

#[async_trait]
pub trait Remote {
    type Conn;
    type Config;

    async fn conn(self, config: Self::Config) -> Result<Self::Conn, RemoteError>;
}

#[async_trait]
impl Remote for SingleNodeConnectionPool {
    type Conn = ElasticSearchClient;
    type Config = ElasticsearchStorageConfig;

    /// Connects and checks that the Elasticsearch version matches
    /// `config.version_req`.
    async fn conn(self, config: Self::Config) -> Result<Self::Conn, RemoteError> {
        let version_req =
            VersionReq::parse(&config.version_req).context(VersionRequirementInvalidSnafu {
                details: &config.version_req,
            })?;

        let transport = TransportBuilder::new(self)
            .timeout(config.timeout)
            .build()
            .context(ElasticsearchTransportSnafu)?;

        let response = transport
            .send::<String, String>(
                Method::Get,
                "/",
                HeaderMap::new(),
                None, /* query_string */
                None, /* body */
                Some(config.timeout),
            )
            .await
            .context(ElasticsearchConnectionSnafu)?;

        if !response.status_code().is_success() {
            return Err(Error::ElasticsearchException {
                msg: format!("Elasticsearch Response Error ({})", response.status_code()),
            }
            .into());
        }

        // Response similar to:
        // {"name": "...", "version": {"number": "7.13.0", ...}, "tagline": "You Know, for Search"}
        let json = response
            .json::<Value>()
            .await
            .context(JsonDeserializationSnafu)?;

        let version_number = json["version"]["number"].as_str().ok_or_else(|| {
            Error::JsonDeserializationInvalid {
                details: String::from("expected 'version.number' JSON string"),
                json: json.clone(),
            }
        })?;

        let version = Version::parse(version_number).context(VersionInvalidSnafu {
            details: version_number,
        })?;

        if !version_req.matches(&version) {
            return Err(Error::ElasticsearchException {
                msg: format!(
                    "Elasticsearch Invalid version: Expected '{}', got '{}'",
                    version_req, version
                ),
            }
            .into());
        }

        info!("connected to Elasticsearch {} at {}", version, config.url);

        Ok(ElasticSearchClient {
            client: Elasticsearch::new(transport),
            config,
        })
    }
}

/// Opens a connection to elasticsearch given a url
pub fn connection_pool_url(url: &Url) -> SingleNodeConnectionPool {
    SingleNodeConnectionPool::new(url.clone())
}

impl ElasticSearchClient {
    /// Builds a client without contacting Elasticsearch: nothing is sent until
    /// the first request.
    pub fn from_config(config: ElasticsearchStorageConfig) -> ClientResult<Self> {
        let transport = TransportBuilder::new(connection_pool_url(&config.url))
            .timeout(config.timeout)
            .build()?;

        Ok(ElasticSearchClient {
            client: Elasticsearch::new(transport),
            config,
        })
    }
}
