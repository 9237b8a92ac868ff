//! CRUD operations and their default mapping onto HTTP.
//!
//! # Design
//! `default_sync` is the single place where a CRUD intent becomes an HTTP
//! request: verb from the operation, URL from the record, payload from the
//! record's serialized form. Every derivation applies only when the caller
//! has not already specified the option, so `SyncOptions` doubles as a
//! per-call escape hatch. The function is public so custom [`SyncHandler`]
//! implementations can fall back to the base behavior.
//!
//! [`SyncHandler`]: crate::schema::SyncHandler

use serde_json::Value;

use crate::error::RecordError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::record::Record;

/// A CRUD intent issued by a record or collection operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

impl Operation {
    /// The HTTP verb this operation maps to by default.
    pub fn method(self) -> HttpMethod {
        match self {
            Operation::Create => HttpMethod::Post,
            Operation::Read => HttpMethod::Get,
            Operation::Update => HttpMethod::Put,
            Operation::Delete => HttpMethod::Delete,
        }
    }

    /// Whether the operation sends the record as the request payload.
    pub fn has_payload(self) -> bool {
        matches!(self, Operation::Create | Operation::Update)
    }
}

/// Per-call transport overrides.
///
/// Anything left unset is derived by [`default_sync`]; `headers` always
/// passes through to the transport untouched.
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    pub method: Option<HttpMethod>,
    pub url: Option<String>,
    pub data: Option<Value>,
    pub headers: Vec<(String, String)>,
}

impl SyncOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Perform a CRUD operation against the record's transport.
///
/// Derives method, url, and payload where the caller left them unset, then
/// returns the transport's result unmodified.
pub async fn default_sync(
    operation: Operation,
    record: &Record,
    options: SyncOptions,
) -> Result<HttpResponse, RecordError> {
    let SyncOptions {
        method,
        url,
        data,
        headers,
    } = options;

    let method = method.unwrap_or_else(|| operation.method());
    let url = match url {
        Some(url) => url,
        None => record.url()?,
    };
    let body = match data {
        Some(data) => Some(data),
        None if operation.has_payload() => Some(record.serialize()),
        None => None,
    };

    let request = HttpRequest {
        method,
        url,
        headers,
        body,
    };
    record.record_type().transport().request(request).await
}
