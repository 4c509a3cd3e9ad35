//! In-memory reference backend.
//!
//! [`InMemoryBackend`] answers [`Transport`] requests from JSON records held
//! in memory, evaluating each lookup the way the server does: filter, sort,
//! count, page, project. It records every request so tests can assert on
//! what a client actually sent.

use async_trait::async_trait;
use imt_client::{ApiClientError, Method, Transport, TransportRequest};
use imt_core::{
    BaseFilter, CorpusType, IsActive, Lookup, OrderItem, Ownership, QueryResult, ResourceId,
    Visibility, ID_FIELD,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;
use uuid::Uuid;

/// Fixed base paths served by the backend.
const BASES: &[&str] = &[
    "api/keywords",
    "api/stopwords",
    "api/equivalencies",
    "api/raw-corpus",
    "api/logical-corpus",
    "api/topic-model",
    "api/domain-model",
];

/// Raw and logical corpora share one collection.
const CORPUS_COLLECTION: &str = "corpus";

/// Every filter field any resource kind can send.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireFilter {
    #[serde(flatten)]
    base: BaseFilter,
    #[serde(flatten)]
    ownership: Ownership,
    #[serde(default)]
    visibilities: BTreeSet<Visibility>,
    #[serde(default)]
    corpus_type: Option<CorpusType>,
    #[serde(default)]
    corpus_valid_for: Option<String>,
    #[serde(default)]
    hierarchy_level: Option<u64>,
    #[serde(default)]
    word_description: Option<String>,
}

imt_core::impl_resource_filter!(WireFilter, base);

#[derive(Debug, Clone)]
struct StoredRecord {
    body: Map<String, Value>,
    state: IsActive,
    corpus_type: Option<CorpusType>,
}

impl StoredRecord {
    fn field(&self, name: &str) -> &Value {
        self.body.get(name).unwrap_or(&Value::Null)
    }

    fn str_field(&self, name: &str) -> Option<&str> {
        self.body.get(name).and_then(Value::as_str)
    }

    fn id(&self) -> Option<ResourceId> {
        self.str_field(ID_FIELD).and_then(|s| Uuid::parse_str(s).ok())
    }
}

/// Where a request path lands.
struct Route {
    collection: String,
    corpus_type: Option<CorpusType>,
    /// Field matched by `like`.
    name_field: &'static str,
    rest: String,
}

/// Reference implementation of the lookup protocol behind [`Transport`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    collections: Arc<RwLock<HashMap<String, Vec<StoredRecord>>>>,
    requests: Arc<RwLock<Vec<TransportRequest>>>,
    principal: Arc<RwLock<Option<String>>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the calling principal that `mine` resolves to.
    pub fn with_principal(self, principal: impl Into<String>) -> Self {
        *self
            .principal
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(principal.into());
        self
    }

    /// Store active records under `base` (e.g. `"api/keywords"`).
    pub fn seed<T: Serialize>(&self, base: &str, records: &[T]) {
        for record in records {
            self.insert(base, record, IsActive::Active);
        }
    }

    /// Store one record in the given lifecycle state.
    ///
    /// Panics if the record does not serialize to a JSON object.
    pub fn insert<T: Serialize>(&self, base: &str, record: &T, state: IsActive) {
        let body = match serde_json::to_value(record) {
            Ok(Value::Object(map)) => map,
            other => panic!("records must serialize to JSON objects, got {:?}", other),
        };
        let Some(route) = route(&format!("{}/all", base)) else {
            panic!("unknown base path {}", base);
        };
        self.write_collection(&route.collection, |records| {
            records.push(StoredRecord {
                body,
                state,
                corpus_type: route.corpus_type,
            })
        });
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Number of stored records under `base`, any state.
    pub fn record_count(&self, base: &str) -> usize {
        let Some(route) = route(&format!("{}/all", base)) else {
            return 0;
        };
        let collections = self
            .collections
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        collections
            .get(&route.collection)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| route.corpus_type.is_none() || r.corpus_type == route.corpus_type)
                    .count()
            })
            .unwrap_or(0)
    }

    pub fn clear(&self) {
        self.collections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.requests
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn principal(&self) -> Option<String> {
        self.principal
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn write_collection<T>(&self, collection: &str, f: impl FnOnce(&mut Vec<StoredRecord>) -> T) -> T {
        let mut collections = self
            .collections
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        f(collections.entry(collection.to_string()).or_default())
    }

    // ========================================================================
    // QUERY
    // ========================================================================

    fn query(&self, route: &Route, body: Value) -> Result<Value, ApiClientError> {
        let lookup: Lookup<WireFilter> =
            serde_json::from_value(body).map_err(|e| bad_request(&e.to_string()))?;
        let principal = self.principal();

        let collections = self
            .collections
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let mut matched: Vec<&StoredRecord> = collections
            .get(&route.collection)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| matches(r, &lookup.filter, route, principal.as_deref()))
                    .collect()
            })
            .unwrap_or_default();

        matched.sort_by(|a, b| compare(a, b, &lookup.order.items));

        let items: Vec<Value> = matched
            .into_iter()
            .map(|r| Value::Object(project(&r.body, &lookup.project.fields)))
            .collect();
        let result = QueryResult::paged(items, &lookup.page, lookup.count_all());
        debug!(
            collection = %route.collection,
            returned = result.len(),
            count = ?result.count,
            "Evaluated lookup"
        );
        Ok(serde_json::to_value(result)?)
    }

    // ========================================================================
    // CRUD
    // ========================================================================

    fn create(&self, route: &Route, body: Value) -> Result<Value, ApiClientError> {
        let Value::Object(mut body) = body else {
            return Err(bad_request("body must be an object"));
        };
        let name = body
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| bad_request("name is required"))?;
        let has_id = body
            .get(ID_FIELD)
            .and_then(Value::as_str)
            .and_then(|s| Uuid::parse_str(s).ok())
            .is_some_and(|id| !id.is_nil());
        if !has_id {
            body.insert(ID_FIELD.to_string(), json!(Uuid::now_v7()));
        }
        if !body.contains_key("creator") {
            if let Some(principal) = self.principal() {
                body.insert("creator".to_string(), json!(principal));
            }
        }
        if !body.contains_key("creation_date") {
            body.insert("creation_date".to_string(), json!(chrono::Utc::now()));
        }

        self.write_collection(&route.collection, |records| {
            if find_active(records, route, &name).is_some() {
                return Err(bad_request(&format!("{} already exists", name)));
            }
            records.push(StoredRecord {
                body,
                state: IsActive::Active,
                corpus_type: route.corpus_type,
            });
            Ok(Value::Null)
        })
    }

    fn copy(&self, route: &Route, name: &str) -> Result<Value, ApiClientError> {
        let copy_name = format!("{}-copy", name);
        self.write_collection(&route.collection, |records| {
            let index = find_active(records, route, name).ok_or_else(|| not_found(name))?;
            if find_active(records, route, &copy_name).is_some() {
                return Err(bad_request(&format!("{} already exists", copy_name)));
            }
            let mut copy = records[index].clone();
            copy.body.insert(ID_FIELD.to_string(), json!(Uuid::now_v7()));
            copy.body.insert("name".to_string(), json!(copy_name));
            records.push(copy);
            Ok(Value::Null)
        })
    }

    fn rename(&self, route: &Route, body: Value) -> Result<Value, ApiClientError> {
        let old_name = body.get("oldName").and_then(Value::as_str).unwrap_or_default();
        let new_name = body.get("newName").and_then(Value::as_str).unwrap_or_default();
        if old_name.trim().is_empty() || new_name.trim().is_empty() {
            return Err(bad_request("oldName and newName must not be blank"));
        }
        self.write_collection(&route.collection, |records| {
            if find_active(records, route, new_name).is_some() {
                return Err(bad_request(&format!("{} already exists", new_name)));
            }
            let index = find_active(records, route, old_name).ok_or_else(|| not_found(old_name))?;
            records[index]
                .body
                .insert("name".to_string(), json!(new_name));
            Ok(Value::Null)
        })
    }

    /// Merge the non-null fields of `body` into the named record.
    fn patch(&self, route: &Route, name: Option<String>, body: Value) -> Result<Value, ApiClientError> {
        let Value::Object(fields) = body else {
            return Err(bad_request("body must be an object"));
        };
        let name = name
            .or_else(|| fields.get("name").and_then(Value::as_str).map(str::to_string))
            .ok_or_else(|| bad_request("name is required"))?;
        self.write_collection(&route.collection, |records| {
            let index = find_active(records, route, &name).ok_or_else(|| not_found(&name))?;
            for (key, value) in fields {
                if key != ID_FIELD && key != "name" && !value.is_null() {
                    records[index].body.insert(key, value);
                }
            }
            Ok(Value::Null)
        })
    }

    /// Deleted records stay stored as `Inactive`.
    fn delete(&self, route: &Route, name: &str) -> Result<Value, ApiClientError> {
        self.write_collection(&route.collection, |records| {
            let index = find_active(records, route, name).ok_or_else(|| not_found(name))?;
            records[index].state = IsActive::Inactive;
            Ok(Value::Null)
        })
    }

    fn dispatch(&self, request: &TransportRequest) -> Result<Value, ApiClientError> {
        let route = route(&request.path).ok_or_else(|| not_found(&request.path))?;
        let body = request.body.clone().unwrap_or(Value::Null);
        let segments: Vec<&str> = route.rest.split('/').collect();

        match (request.method, segments.as_slice()) {
            (Method::Post, ["all"]) => self.query(&route, body),
            (Method::Post, ["create"]) => self.create(&route, body),
            (Method::Put, ["rename"]) => self.rename(&route, body),
            (Method::Post, ["patch"]) => self.patch(&route, None, body),
            (Method::Patch, [name, "patch"]) => {
                self.patch(&route, Some(decode_segment(name)?), body)
            }
            (Method::Post, ["copy", name]) | (Method::Post, [name, "copy"]) => {
                self.copy(&route, &decode_segment(name)?)
            }
            (Method::Delete, ["delete", name]) | (Method::Delete, [name, "delete"]) => {
                self.delete(&route, &decode_segment(name)?)
            }
            _ => Err(not_found(&request.path)),
        }
    }
}

#[async_trait]
impl Transport for InMemoryBackend {
    async fn send(&self, request: TransportRequest) -> Result<Value, ApiClientError> {
        self.requests
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());
        self.dispatch(&request)
    }
}

// ============================================================================
// ROUTING
// ============================================================================

fn route(path: &str) -> Option<Route> {
    let path = path.trim_start_matches('/');

    if let Some(rest) = path.strip_prefix("api/topic-model/") {
        let mut parts = rest.splitn(3, '/');
        if let (Some(model), Some("topics"), Some(rest)) = (parts.next(), parts.next(), parts.next())
        {
            return Some(Route {
                collection: format!("api/topic-model/{}/topics", model),
                corpus_type: None,
                name_field: "label",
                rest: rest.to_string(),
            });
        }
    }

    BASES.iter().find_map(|base| {
        let rest = path.strip_prefix(base)?.strip_prefix('/')?;
        let (collection, corpus_type) = match *base {
            "api/raw-corpus" => (CORPUS_COLLECTION.to_string(), Some(CorpusType::Raw)),
            "api/logical-corpus" => (CORPUS_COLLECTION.to_string(), Some(CorpusType::Logical)),
            other => (other.to_string(), None),
        };
        Some(Route {
            collection,
            corpus_type,
            name_field: "name",
            rest: rest.to_string(),
        })
    })
}

fn decode_segment(segment: &str) -> Result<String, ApiClientError> {
    urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .map_err(|e| bad_request(&e.to_string()))
}

fn find_active(records: &[StoredRecord], route: &Route, name: &str) -> Option<usize> {
    records.iter().position(|r| {
        r.state == IsActive::Active
            && (route.corpus_type.is_none() || r.corpus_type == route.corpus_type)
            && r.str_field("name") == Some(name)
    })
}

fn error_response(status: u16, message: &str) -> ApiClientError {
    let body = json!({ "code": status, "message": message });
    ApiClientError::from_body(status, &body.to_string())
}

fn bad_request(message: &str) -> ApiClientError {
    error_response(400, message)
}

fn not_found(what: &str) -> ApiClientError {
    error_response(404, &format!("{} not found", what))
}

// ============================================================================
// EVALUATION
// ============================================================================

fn contains_ignore_case(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(&needle.to_lowercase()))
}

fn matches(
    record: &StoredRecord,
    filter: &WireFilter,
    route: &Route,
    principal: Option<&str>,
) -> bool {
    let base = &filter.base;
    let id = record.id();

    if !base.ids.is_empty() && !id.is_some_and(|id| base.ids.contains(&id)) {
        return false;
    }
    if id.is_some_and(|id| base.excluded_ids.contains(&id)) {
        return false;
    }
    if let Some(like) = base.like.as_deref().filter(|l| !l.is_empty()) {
        if !contains_ignore_case(record.str_field(route.name_field), like) {
            return false;
        }
    }
    if !base.effective_is_active().contains(&record.state) {
        return false;
    }

    let creator = record.str_field("creator");
    if let Some(expected) = filter.ownership.creator.as_deref() {
        if creator != Some(expected) {
            return false;
        }
    }
    if filter.ownership.mine && (principal.is_none() || creator != principal) {
        return false;
    }

    if !filter.visibilities.is_empty() {
        let visibility = record
            .str_field("visibility")
            .and_then(|v| v.parse::<Visibility>().ok());
        if !visibility.is_some_and(|v| filter.visibilities.contains(&v)) {
            return false;
        }
    }

    if let Some(expected) = filter.corpus_type.or(route.corpus_type) {
        if record.corpus_type != Some(expected) {
            return false;
        }
    }
    if let Some(expected) = filter.corpus_valid_for.as_deref() {
        if record.str_field("valid_for") != Some(expected) {
            return false;
        }
    }
    if let Some(level) = filter.hierarchy_level {
        let actual = record.field("hierarchyLevel").as_u64().unwrap_or(0);
        if actual != level {
            return false;
        }
    }
    if let Some(fragment) = filter.word_description.as_deref() {
        if !contains_ignore_case(record.str_field("wordDescription"), fragment) {
            return false;
        }
    }
    true
}

fn rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order over JSON values; missing values sort first.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.total_cmp(&y)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Null, Value::Null) => Ordering::Equal,
        _ if rank(a) != rank(b) => rank(a).cmp(&rank(b)),
        _ => a.to_string().cmp(&b.to_string()),
    }
}

fn compare(a: &StoredRecord, b: &StoredRecord, order: &[OrderItem]) -> Ordering {
    for item in order {
        let ordering = compare_values(a.field(&item.field), b.field(&item.field));
        let ordering = if item.is_descending() {
            ordering.reverse()
        } else {
            ordering
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    compare_values(a.field(ID_FIELD), b.field(ID_FIELD))
}

fn project(body: &Map<String, Value>, fields: &BTreeSet<String>) -> Map<String, Value> {
    if fields.is_empty() {
        return body.clone();
    }
    body.iter()
        .filter(|(key, _)| key.as_str() == ID_FIELD || fields.contains(key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
