//! Transport-agnostic HTTP request/response types.
//!
//! # Design
//! These types describe HTTP traffic as plain data. The record layer builds
//! `HttpRequest` values and consumes `HttpResponse` values; a [`Transport`]
//! implementation owns the actual round-trip. `HttpResponse::data` carries
//! the body already parsed as JSON — the only part of a response the record
//! layer looks at. All fields are owned so values can be captured, queued,
//! and replayed by mock transports.
//!
//! [`Transport`]: crate::transport::Transport

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// HTTP verb for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<(String, String)>,
    /// JSON payload, present only for operations that send the record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

/// An HTTP response with its body parsed as JSON.
///
/// `data` is `Value::Null` when the body was empty or not valid JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpResponse {
    pub status: u16,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<(String, String)>,
    #[serde(default)]
    pub data: Value,
}

impl HttpResponse {
    /// A bare 200 response around the given body.
    pub fn ok(data: Value) -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            data,
        }
    }

    /// Whether the status indicates success (2xx).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
