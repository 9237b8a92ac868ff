//! The transport seam and the built-in reqwest implementation.
//!
//! # Design
//! `Transport` is the only I/O boundary in the crate: one async method from
//! `HttpRequest` to `HttpResponse`. The record layer never interprets
//! status codes beyond what the transport reports — `HttpClient` maps 404
//! to [`RecordError::NotFound`], any other non-2xx to
//! [`RecordError::Http`], and network-level failures to
//! [`RecordError::Transport`]. Retries, timeouts, and authentication are
//! the transport's business, not the record layer's.

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::error::RecordError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes HTTP requests on behalf of the record layer.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(&self, request: HttpRequest) -> Result<HttpResponse, RecordError>;
}

/// reqwest-backed transport.
///
/// Absolute request URLs pass through; relative ones resolve against the
/// configured base URL. Default headers are sent with every request, before
/// (and overridable by) per-request headers.
pub struct HttpClient {
    client: reqwest::Client,
    base_url: Option<Url>,
    default_headers: Vec<(String, String)>,
}

impl HttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: None,
            default_headers: Vec::new(),
        }
    }

    /// A client that resolves relative request URLs against `base_url`.
    pub fn with_base_url(base_url: &str) -> Result<Self, RecordError> {
        let base_url = Url::parse(base_url).map_err(|e| RecordError::InvalidUrl(e.to_string()))?;
        Ok(Self {
            base_url: Some(base_url),
            ..Self::new()
        })
    }

    /// Add a header sent with every request.
    pub fn with_default_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn request(&self, request: HttpRequest) -> Result<HttpResponse, RecordError> {
        let url = resolve_url(self.base_url.as_ref(), &request.url)?;

        let mut builder = self.client.request(request.method.into(), url);
        for (name, value) in &self.default_headers {
            builder = builder.header(name, value);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| RecordError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let mut headers = Vec::new();
        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                headers.push((name.to_string(), value.to_string()));
            }
        }
        let body = response
            .text()
            .await
            .map_err(|e| RecordError::Transport(e.to_string()))?;

        if status == 404 {
            return Err(RecordError::NotFound);
        }
        if !(200..300).contains(&status) {
            return Err(RecordError::Http { status, body });
        }

        let data = serde_json::from_str(&body).unwrap_or(Value::Null);
        Ok(HttpResponse {
            status,
            headers,
            data,
        })
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

fn resolve_url(base: Option<&Url>, target: &str) -> Result<Url, RecordError> {
    if target.starts_with("http://") || target.starts_with("https://") {
        return Url::parse(target).map_err(|e| RecordError::InvalidUrl(e.to_string()));
    }
    match base {
        Some(base) => base
            .join(target)
            .map_err(|e| RecordError::InvalidUrl(e.to_string())),
        None => Err(RecordError::InvalidUrl(format!(
            "relative url '{target}' requires a base url"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_urls_pass_through() {
        let url = resolve_url(None, "http://example.com/tasks/1").unwrap();
        assert_eq!(url.as_str(), "http://example.com/tasks/1");
    }

    #[test]
    fn relative_urls_resolve_against_the_base() {
        let base = Url::parse("http://example.com/api/").unwrap();
        let url = resolve_url(Some(&base), "/tasks/1").unwrap();
        assert_eq!(url.as_str(), "http://example.com/tasks/1");
        let url = resolve_url(Some(&base), "tasks/1").unwrap();
        assert_eq!(url.as_str(), "http://example.com/api/tasks/1");
    }

    #[test]
    fn relative_urls_without_a_base_are_rejected() {
        let err = resolve_url(None, "/tasks/1").unwrap_err();
        assert!(matches!(err, RecordError::InvalidUrl(_)));
    }

    #[test]
    fn methods_convert_to_reqwest() {
        assert_eq!(reqwest::Method::from(HttpMethod::Get), reqwest::Method::GET);
        assert_eq!(
            reqwest::Method::from(HttpMethod::Delete),
            reqwest::Method::DELETE
        );
    }
}
