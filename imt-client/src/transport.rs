//! The seam between typed query clients and the wire.
//!
//! A [`Transport`] takes a method, a path relative to the API root, and an
//! optional JSON body, and answers with the decoded JSON response. The REST
//! implementation lives in [`crate::http`]; tests plug in an in-memory one.

use crate::error::ApiClientError;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One request as seen by a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    pub method: Method,
    /// Path relative to the API root, without a leading slash.
    pub path: String,
    pub body: Option<Value>,
}

impl TransportRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request. Success bodies are decoded as JSON; an empty body is
    /// `Value::Null`.
    async fn send(&self, request: TransportRequest) -> Result<Value, ApiClientError>;

    async fn get(&self, path: &str) -> Result<Value, ApiClientError> {
        self.send(TransportRequest::new(Method::Get, path)).await
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, ApiClientError> {
        self.send(TransportRequest::new(Method::Post, path).with_body(body))
            .await
    }

    async fn put(&self, path: &str, body: Value) -> Result<Value, ApiClientError> {
        self.send(TransportRequest::new(Method::Put, path).with_body(body))
            .await
    }

    async fn patch(&self, path: &str, body: Value) -> Result<Value, ApiClientError> {
        self.send(TransportRequest::new(Method::Patch, path).with_body(body))
            .await
    }

    async fn delete(&self, path: &str) -> Result<Value, ApiClientError> {
        self.send(TransportRequest::new(Method::Delete, path)).await
    }
}

/// Shared handle held by every resource client.
pub type SharedTransport = Arc<dyn Transport>;
