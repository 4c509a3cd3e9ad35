//! REST transport over reqwest.

use crate::config::{AuthConfig, ClientConfig};
use crate::error::ApiClientError;
use crate::transport::{Method, Transport, TransportRequest};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use std::time::Duration;

#[derive(Clone)]
pub struct RestTransport {
    client: reqwest::Client,
    base_url: String,
    auth_header: HeaderMap,
}

impl RestTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiClientError> {
        let timeout = Duration::from_millis(config.request_timeout_ms);
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        let auth_header = build_auth_headers(&config.auth)?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            auth_header,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a path relative to the API root.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn parse_response(&self, response: reqwest::Response) -> Result<Value, ApiClientError> {
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ApiClientError::from_body(status.as_u16(), &text));
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        // Log and status endpoints answer with bare text.
        Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
    }
}

#[async_trait]
impl Transport for RestTransport {
    async fn send(&self, request: TransportRequest) -> Result<Value, ApiClientError> {
        let url = self.url(&request.path);
        let builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Patch => self.client.patch(&url),
            Method::Delete => self.client.delete(&url),
        };
        let builder = builder.headers(self.auth_header.clone());
        let builder = match &request.body {
            Some(body) => builder.json(body),
            None => builder,
        };

        let response = builder.send().await?;
        self.parse_response(response).await
    }
}

fn build_auth_headers(auth: &AuthConfig) -> Result<HeaderMap, ApiClientError> {
    let mut headers = HeaderMap::new();
    if let Some(api_key) = &auth.api_key {
        headers.insert(
            HeaderName::from_static("x-api-key"),
            HeaderValue::from_str(api_key).map_err(|e| ApiClientError::Config(e.to_string()))?,
        );
    }
    if let Some(jwt) = &auth.jwt {
        let value = format!("Bearer {}", jwt);
        headers.insert(
            HeaderName::from_static("authorization"),
            HeaderValue::from_str(&value).map_err(|e| ApiClientError::Config(e.to_string()))?,
        );
    }
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_header_is_built() {
        let headers = build_auth_headers(&AuthConfig {
            api_key: Some("key-1".to_string()),
            jwt: Some("abc".to_string()),
        })
        .unwrap();
        assert_eq!(headers["authorization"], "Bearer abc");
        assert_eq!(headers["x-api-key"], "key-1");
    }

    #[test]
    fn control_characters_in_key_rejected() {
        let result = build_auth_headers(&AuthConfig {
            api_key: Some("bad\nkey".to_string()),
            jwt: None,
        });
        assert!(matches!(result, Err(ApiClientError::Config(_))));
    }
}
