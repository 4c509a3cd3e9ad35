//! IMT Client - Typed Lookup Clients
//!
//! Binds the lookup protocol from `imt-core` to the Interactive Model Trainer
//! REST API. Each resource kind gets a [`ResourceClient`] that sends a
//! [`Lookup`](imt_core::Lookup) to `POST {base}/all` and decodes the paged
//! [`QueryResult`](imt_core::QueryResult).

pub mod config;
pub mod error;
pub mod http;
pub mod kinds;
pub mod logging;
pub mod resource;
pub mod tasks;
pub mod transport;

pub use config::{AuthConfig, ClientConfig, ConfigError, LogConfig, QueryDefaults};
pub use error::{ApiClientError, ErrorBody};
pub use http::RestTransport;
pub use kinds::{
    DomainModels, Equivalences, Keywords, LogicalCorpora, RawCorpora, Stopwords, TopicModels,
    Topics,
};
pub use resource::{
    Creatable, NamedResource, PathStyle, Patchable, RenamePersist, Resource, ResourceClient,
};
pub use tasks::TaskClient;
pub use transport::{Method, SharedTransport, Transport, TransportRequest};

use imt_core::OrderItem;
use std::sync::Arc;

/// Entry point handing out one query client per resource kind.
#[derive(Clone)]
pub struct ApiClient {
    transport: SharedTransport,
    defaults: QueryDefaults,
    order: Vec<OrderItem>,
}

impl ApiClient {
    /// Client talking REST to the configured backend.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiClientError> {
        let transport = RestTransport::new(config)?;
        Self::with_transport(Arc::new(transport), config.query.clone())
    }

    /// Fails when the default order does not parse.
    pub fn with_transport(
        transport: SharedTransport,
        defaults: QueryDefaults,
    ) -> Result<Self, ApiClientError> {
        let order = defaults
            .order()
            .map_err(|e| ApiClientError::Config(e.to_string()))?
            .items;
        Ok(Self {
            transport,
            defaults,
            order,
        })
    }

    pub fn defaults(&self) -> &QueryDefaults {
        &self.defaults
    }

    pub fn resource<R: Resource>(&self) -> ResourceClient<R> {
        ResourceClient::from_parts(
            self.transport.clone(),
            R::BASE_PATH,
            self.defaults.clone(),
            self.order.clone(),
        )
    }

    pub fn keywords(&self) -> ResourceClient<Keywords> {
        self.resource()
    }

    pub fn stopwords(&self) -> ResourceClient<Stopwords> {
        self.resource()
    }

    pub fn equivalences(&self) -> ResourceClient<Equivalences> {
        self.resource()
    }

    pub fn raw_corpora(&self) -> ResourceClient<RawCorpora> {
        self.resource()
    }

    pub fn logical_corpora(&self) -> ResourceClient<LogicalCorpora> {
        self.resource()
    }

    pub fn topic_models(&self) -> ResourceClient<TopicModels> {
        self.resource()
    }

    pub fn domain_models(&self) -> ResourceClient<DomainModels> {
        self.resource()
    }

    /// Topics of the topic model `model`.
    pub fn topics(&self, model: &str) -> Result<ResourceClient<Topics>, ApiClientError> {
        self.topic_models().topics(model)
    }

    /// Running-task queue shared by topic and domain models.
    pub fn tasks(&self) -> TaskClient {
        TaskClient::new(self.transport.clone())
    }
}
