//! Typed query client for one resource kind.
//!
//! [`ResourceClient<R>`] binds the generic lookup protocol to one resource
//! kind `R`: the kind fixes the filter type, the item record, the base path,
//! and which CRUD endpoints exist. Every listing goes through
//! `POST {base}/all` with the lookup as the body.

use crate::config::QueryDefaults;
use crate::error::ApiClientError;
use crate::transport::{Method, SharedTransport, TransportRequest};
use imt_core::{Lookup, OrderItem, Page, QueryResult, ResourceFilter};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::marker::PhantomData;
use tracing::{debug, warn};

/// How a kind lays out its by-name endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStyle {
    /// `copy/{name}`, `delete/{name}`, `POST patch`.
    WordList,
    /// `{name}/copy`, `{name}/delete`, `PATCH {name}/patch`.
    Model,
}

/// A listable resource kind.
pub trait Resource: Send + Sync + 'static {
    /// Short name used in logs.
    const KIND: &'static str;
    /// Base path relative to the API root.
    const BASE_PATH: &'static str;
    const PATH_STYLE: PathStyle;

    type Filter: ResourceFilter;
    type Item: DeserializeOwned + Send + 'static;
}

/// Kinds that can be copied, renamed, and deleted by name.
pub trait NamedResource: Resource {}

/// Kinds created through `POST {base}/create`.
pub trait Creatable: Resource {
    type Persist: Serialize + Send + Sync;
}

/// Kinds with a patch endpoint.
pub trait Patchable: Resource {
    type Patch: Serialize + Send + Sync;
}

/// Body of a rename request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenamePersist {
    pub old_name: String,
    pub new_name: String,
}

pub struct ResourceClient<R: Resource> {
    transport: SharedTransport,
    base: String,
    defaults: QueryDefaults,
    order: Vec<OrderItem>,
    _kind: PhantomData<fn() -> R>,
}

impl<R: Resource> Clone for ResourceClient<R> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            base: self.base.clone(),
            defaults: self.defaults.clone(),
            order: self.order.clone(),
            _kind: PhantomData,
        }
    }
}

impl<R: Resource> fmt::Debug for ResourceClient<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceClient")
            .field("kind", &R::KIND)
            .field("base", &self.base)
            .finish()
    }
}

impl<R: Resource> ResourceClient<R> {
    /// Fails when the default order does not parse.
    pub fn new(transport: SharedTransport, defaults: QueryDefaults) -> Result<Self, ApiClientError> {
        Self::with_base(transport, R::BASE_PATH, defaults)
    }

    /// Client rooted at a base path other than the kind's default.
    pub fn with_base(
        transport: SharedTransport,
        base: impl Into<String>,
        defaults: QueryDefaults,
    ) -> Result<Self, ApiClientError> {
        let order = defaults
            .order()
            .map_err(|e| ApiClientError::Config(e.to_string()))?
            .items;
        Ok(Self::from_parts(transport, base, defaults, order))
    }

    /// Client from defaults whose order was already parsed.
    pub(crate) fn from_parts(
        transport: SharedTransport,
        base: impl Into<String>,
        defaults: QueryDefaults,
        order: Vec<OrderItem>,
    ) -> Self {
        Self {
            transport,
            base: base.into(),
            defaults,
            order,
            _kind: PhantomData,
        }
    }

    pub fn base_path(&self) -> &str {
        &self.base
    }

    pub fn defaults(&self) -> &QueryDefaults {
        &self.defaults
    }

    /// Parsed default order seeded into new lookups.
    pub fn default_order(&self) -> &[OrderItem] {
        &self.order
    }

    pub(crate) fn transport(&self) -> &SharedTransport {
        &self.transport
    }

    pub(crate) fn path(&self, suffix: &str) -> String {
        format!("{}/{}", self.base, suffix)
    }

    /// A lookup seeded with this client's default page size and order.
    pub fn lookup(&self) -> Lookup<R::Filter> {
        self.lookup_with(R::Filter::default())
    }

    pub fn lookup_with(&self, filter: R::Filter) -> Lookup<R::Filter> {
        Lookup::new(filter)
            .with_page(0, self.defaults.default_page_size)
            .with_order(self.order.clone())
    }

    /// Run a lookup and return one page of items.
    ///
    /// The lookup is validated against the configured maximum page size
    /// before anything is sent.
    pub async fn query(
        &self,
        lookup: &Lookup<R::Filter>,
    ) -> Result<QueryResult<R::Item>, ApiClientError> {
        lookup.validate(Some(self.defaults.max_page_size))?;
        debug!(
            kind = R::KIND,
            offset = lookup.page.offset,
            size = lookup.page.size,
            count_all = lookup.count_all(),
            "Querying resources"
        );

        let body = serde_json::to_value(lookup)?;
        let value = self
            .transport
            .post(&self.path("all"), body)
            .await
            .inspect_err(|e| warn!(kind = R::KIND, error = %e, "Query failed"))?;
        decode(value, R::KIND)
    }

    /// Total number of items matching `filter`.
    pub async fn count(&self, filter: R::Filter) -> Result<u64, ApiClientError> {
        let counting = Lookup::new(filter).total_only();
        let result = self.query(&counting).await?;
        result.total().ok_or_else(|| {
            ApiClientError::InvalidResponse(format!("{} count missing from response", R::KIND))
        })
    }

    /// Fetch every matching item by walking pages until the total is reached.
    ///
    /// Without a total in the response, walking stops at the first empty or
    /// short page.
    pub async fn query_all(
        &self,
        lookup: &Lookup<R::Filter>,
    ) -> Result<Vec<R::Item>, ApiClientError> {
        let size = if lookup.page.size == 0 {
            self.defaults.default_page_size
        } else {
            lookup.page.size
        };
        let mut page = Page::new(lookup.page.offset, size);
        let mut items = Vec::new();
        loop {
            let current = lookup.clone().with_page(page.offset, page.size).with_count_all(true);
            let result = self.query(&current).await?;
            let fetched = result.len() as u64;
            let more = result.has_more(&page).unwrap_or(fetched == page.size);
            items.extend(result.items);
            if fetched == 0 || !more {
                return Ok(items);
            }
            page = page.next();
        }
    }

    pub(crate) async fn send(
        &self,
        method: Method,
        suffix: &str,
        body: Option<Value>,
    ) -> Result<Value, ApiClientError> {
        let mut request = TransportRequest::new(method, self.path(suffix));
        if let Some(body) = body {
            request = request.with_body(body);
        }
        debug!(kind = R::KIND, method = %method, path = %request.path, "Sending request");
        self.transport
            .send(request)
            .await
            .inspect_err(|e| warn!(kind = R::KIND, method = %method, error = %e, "Request failed"))
    }
}

impl<R: NamedResource> ResourceClient<R> {
    pub async fn copy(&self, name: &str) -> Result<(), ApiClientError> {
        let name = encode_name(name)?;
        let suffix = match R::PATH_STYLE {
            PathStyle::WordList => format!("copy/{}", name),
            PathStyle::Model => format!("{}/copy", name),
        };
        self.send(Method::Post, &suffix, Some(Value::Object(Map::new())))
            .await?;
        Ok(())
    }

    /// Rename `old_name` to `new_name`. A blank new name is rejected locally.
    pub async fn rename(&self, old_name: &str, new_name: &str) -> Result<(), ApiClientError> {
        let body = rename_body(old_name, new_name)?;
        self.send(Method::Put, "rename", Some(serde_json::to_value(&body)?))
            .await?;
        Ok(())
    }

    pub async fn delete(&self, name: &str) -> Result<(), ApiClientError> {
        let name = encode_name(name)?;
        let suffix = match R::PATH_STYLE {
            PathStyle::WordList => format!("delete/{}", name),
            PathStyle::Model => format!("{}/delete", name),
        };
        self.send(Method::Delete, &suffix, None).await?;
        Ok(())
    }
}

impl<R: Creatable> ResourceClient<R> {
    pub async fn create(&self, item: &R::Persist) -> Result<(), ApiClientError> {
        self.send(Method::Post, "create", Some(serde_json::to_value(item)?))
            .await?;
        Ok(())
    }
}

impl<R: Patchable> ResourceClient<R> {
    /// Apply a partial update. `name` addresses the resource for model-style
    /// kinds; word-list style kinds identify it from the body.
    pub async fn patch(&self, name: &str, patch: &R::Patch) -> Result<(), ApiClientError> {
        let body = serde_json::to_value(patch)?;
        match R::PATH_STYLE {
            PathStyle::WordList => self.send(Method::Post, "patch", Some(body)).await?,
            PathStyle::Model => {
                let suffix = format!("{}/patch", encode_name(name)?);
                self.send(Method::Patch, &suffix, Some(body)).await?
            }
        };
        Ok(())
    }
}

/// Percent-encode a resource name for use as one path segment.
pub(crate) fn encode_name(name: &str) -> Result<String, ApiClientError> {
    if name.trim().is_empty() {
        return Err(ApiClientError::InvalidName(
            "name must not be blank".to_string(),
        ));
    }
    Ok(urlencoding::encode(name).into_owned())
}

pub(crate) fn rename_body(old_name: &str, new_name: &str) -> Result<RenamePersist, ApiClientError> {
    if old_name.trim().is_empty() {
        return Err(ApiClientError::InvalidName(
            "current name must not be blank".to_string(),
        ));
    }
    let new_name = new_name.trim();
    if new_name.is_empty() {
        return Err(ApiClientError::InvalidName(
            "new name must not be blank".to_string(),
        ));
    }
    Ok(RenamePersist {
        old_name: old_name.to_string(),
        new_name: new_name.to_string(),
    })
}

/// Decode a JSON response, treating an empty body as malformed.
pub(crate) fn decode<T: DeserializeOwned>(value: Value, what: &str) -> Result<T, ApiClientError> {
    if value.is_null() {
        return Err(ApiClientError::InvalidResponse(format!(
            "empty response for {}",
            what
        )));
    }
    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::{DomainModels, Keywords, TopicModels};
    use crate::transport::Transport;
    use async_trait::async_trait;
    use imt_core::{KeywordFilter, ModelPatch, Visibility};
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    /// Records requests and answers every one with the same body.
    struct Canned {
        response: Value,
        seen: Mutex<Vec<TransportRequest>>,
    }

    impl Canned {
        fn new(response: Value) -> Arc<Self> {
            Arc::new(Self {
                response,
                seen: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<TransportRequest> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for Canned {
        async fn send(&self, request: TransportRequest) -> Result<Value, ApiClientError> {
            self.seen.lock().unwrap().push(request);
            Ok(self.response.clone())
        }
    }

    fn defaults() -> QueryDefaults {
        QueryDefaults {
            default_page_size: 25,
            max_page_size: 50,
            default_order: vec!["-creation_date".to_string()],
        }
    }

    #[tokio::test]
    async fn query_posts_flat_lookup_to_all() {
        let transport = Canned::new(json!({ "items": [], "count": 0 }));
        let client = ResourceClient::<Keywords>::new(transport.clone(), defaults()).unwrap();
        let lookup = client.lookup_with(KeywordFilter::default().with_like("covid"));

        let result = client.query(&lookup).await.unwrap();
        assert!(result.is_empty());

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::Post);
        assert_eq!(requests[0].path, "api/keywords/all");
        let body = requests[0].body.clone().unwrap();
        assert_eq!(body["like"], json!("covid"));
        assert_eq!(body["page"], json!({ "offset": 0, "size": 25 }));
        assert_eq!(body["order"], json!({ "items": ["-creation_date"] }));
    }

    #[tokio::test]
    async fn oversized_page_is_rejected_before_sending() {
        let transport = Canned::new(json!({ "items": [] }));
        let client = ResourceClient::<Keywords>::new(transport.clone(), defaults()).unwrap();
        let lookup = client.lookup().with_page(0, 500);

        let err = client.query(&lookup).await.unwrap_err();
        assert!(matches!(err, ApiClientError::Lookup(_)));
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn malformed_default_order_is_rejected_at_construction() {
        let transport = Canned::new(json!({ "items": [] }));
        let defaults = QueryDefaults {
            default_order: vec!["-".to_string()],
            ..defaults()
        };
        let err = ResourceClient::<Keywords>::new(transport.clone(), defaults.clone()).unwrap_err();
        assert!(matches!(err, ApiClientError::Config(_)));
        assert!(err.to_string().contains("query.default_order"));
        assert!(matches!(
            crate::ApiClient::with_transport(transport, defaults),
            Err(ApiClientError::Config(_))
        ));
    }

    #[test]
    fn default_order_is_parsed_once() {
        let transport = Canned::new(json!({ "items": [] }));
        let client = ResourceClient::<Keywords>::new(transport, defaults()).unwrap();
        assert_eq!(client.default_order(), [OrderItem::desc("creation_date")].as_slice());
        assert_eq!(client.lookup().order.items, client.default_order());
    }

    #[tokio::test]
    async fn count_sends_empty_counted_page() {
        let transport = Canned::new(json!({ "items": [], "count": 42 }));
        let client = ResourceClient::<Keywords>::new(transport.clone(), defaults()).unwrap();

        let total = client.count(KeywordFilter::default()).await.unwrap();
        assert_eq!(total, 42);

        let body = transport.requests()[0].body.clone().unwrap();
        assert_eq!(body["page"]["size"], json!(0));
        assert_eq!(body["metadata"]["countAll"], json!(true));
    }

    #[tokio::test]
    async fn count_without_total_is_invalid_response() {
        let transport = Canned::new(json!({ "items": [] }));
        let client = ResourceClient::<Keywords>::new(transport, defaults()).unwrap();
        let err = client.count(KeywordFilter::default()).await.unwrap_err();
        assert!(matches!(err, ApiClientError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn null_body_is_invalid_response() {
        let transport = Canned::new(Value::Null);
        let client = ResourceClient::<Keywords>::new(transport, defaults()).unwrap();
        let err = client.query(&client.lookup()).await.unwrap_err();
        assert!(matches!(err, ApiClientError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn word_list_paths_put_name_last() {
        let transport = Canned::new(Value::Null);
        let client = ResourceClient::<Keywords>::new(transport.clone(), defaults()).unwrap();
        client.copy("my list").await.unwrap();
        client.delete("my list").await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].body, Some(json!({})));
        let paths: Vec<String> = requests.into_iter().map(|r| r.path).collect();
        assert_eq!(
            paths,
            vec!["api/keywords/copy/my%20list", "api/keywords/delete/my%20list"]
        );
    }

    #[tokio::test]
    async fn model_paths_put_name_first() {
        let transport = Canned::new(Value::Null);
        let models = ResourceClient::<TopicModels>::new(transport.clone(), defaults()).unwrap();
        models.copy("lda").await.unwrap();
        models.delete("lda").await.unwrap();

        let domains = ResourceClient::<DomainModels>::new(transport.clone(), defaults()).unwrap();
        let patch = ModelPatch {
            description: None,
            visibility: Some(Visibility::Public),
        };
        domains.patch("clf", &patch).await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].path, "api/topic-model/lda/copy");
        assert_eq!(requests[1].path, "api/topic-model/lda/delete");
        assert_eq!(requests[1].method, Method::Delete);
        assert_eq!(requests[2].path, "api/domain-model/clf/patch");
        assert_eq!(requests[2].method, Method::Patch);
    }

    #[tokio::test]
    async fn rename_rejects_blank_new_name() {
        let transport = Canned::new(Value::Null);
        let client = ResourceClient::<Keywords>::new(transport.clone(), defaults()).unwrap();

        let err = client.rename("old", "   ").await.unwrap_err();
        assert!(matches!(err, ApiClientError::InvalidName(_)));
        assert!(transport.requests().is_empty());

        client.rename("old", " new ").await.unwrap();
        let body = transport.requests()[0].body.clone().unwrap();
        assert_eq!(body, json!({ "oldName": "old", "newName": "new" }));
    }

    #[tokio::test]
    async fn query_all_walks_pages() {
        let transport = Canned::new(json!({ "items": [{ "id": uuid::Uuid::nil(), "name": "a" }], "count": 1 }));
        let client = ResourceClient::<Keywords>::new(transport.clone(), defaults()).unwrap();
        let lookup = client
            .lookup()
            .with_order([OrderItem::asc("name")])
            .with_page(0, 1);

        let items = client.query_all(&lookup).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(transport.requests().len(), 1);
    }

    /// Pages `total` unnamed records and never reports a count.
    struct Uncounted {
        total: u64,
        calls: Mutex<usize>,
    }

    #[async_trait]
    impl Transport for Uncounted {
        async fn send(&self, request: TransportRequest) -> Result<Value, ApiClientError> {
            *self.calls.lock().unwrap() += 1;
            let body = request.body.unwrap_or(Value::Null);
            let offset = body["page"]["offset"].as_u64().unwrap_or(0);
            let size = body["page"]["size"].as_u64().unwrap_or(0);
            let end = (offset + size).min(self.total);
            let items: Vec<Value> = (offset.min(end)..end)
                .map(|n| json!({ "id": uuid::Uuid::from_u128(n as u128 + 1), "name": n.to_string() }))
                .collect();
            Ok(json!({ "items": items }))
        }
    }

    #[tokio::test]
    async fn query_all_without_count_stops_at_short_page() {
        let transport = Arc::new(Uncounted {
            total: 25,
            calls: Mutex::new(0),
        });
        let client = ResourceClient::<Keywords>::new(transport.clone(), defaults()).unwrap();
        let lookup = client.lookup().with_page(0, 10);

        let items = client.query_all(&lookup).await.unwrap();
        assert_eq!(items.len(), 25);
        assert_eq!(*transport.calls.lock().unwrap(), 3);
    }

    #[tokio::test]
    async fn query_all_without_count_stops_at_empty_page() {
        let transport = Arc::new(Uncounted {
            total: 20,
            calls: Mutex::new(0),
        });
        let client = ResourceClient::<Keywords>::new(transport.clone(), defaults()).unwrap();
        let lookup = client.lookup().with_page(0, 10);

        let items = client.query_all(&lookup).await.unwrap();
        assert_eq!(items.len(), 20);
        assert_eq!(*transport.calls.lock().unwrap(), 3);
    }
}
