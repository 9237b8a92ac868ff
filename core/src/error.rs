//! Error types for the record layer.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers frequently distinguish
//! "the resource does not exist" from "the server returned an unexpected
//! status." All other non-2xx responses land in `Http` with the raw status
//! code and body for debugging. `MissingUrlRoot` is a configuration error:
//! it is returned synchronously from `Record::url()` rather than surfacing
//! through an async sync failure.

use std::fmt;

/// Errors returned by record lifecycle operations and transports.
#[derive(Debug)]
pub enum RecordError {
    /// The server returned 404 — the requested record does not exist.
    NotFound,

    /// The server returned a non-2xx status other than 404.
    Http { status: u16, body: String },

    /// The HTTP client failed before a response was produced (DNS, connect,
    /// protocol errors).
    Transport(String),

    /// A request URL could not be parsed, or a relative URL had no base to
    /// resolve against.
    InvalidUrl(String),

    /// The response body did not have the expected shape (mapping for a
    /// single-record fetch, sequence for a collection fetch).
    InvalidResponse(String),

    /// `url()` needed a URL root but none is configured on the type.
    MissingUrlRoot,
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordError::NotFound => write!(f, "resource not found"),
            RecordError::Http { status, body } => {
                write!(f, "HTTP {status}: {body}")
            }
            RecordError::Transport(msg) => {
                write!(f, "transport failed: {msg}")
            }
            RecordError::InvalidUrl(msg) => {
                write!(f, "invalid url: {msg}")
            }
            RecordError::InvalidResponse(msg) => {
                write!(f, "{msg}")
            }
            RecordError::MissingUrlRoot => {
                write!(f, "implement url() or specify a url root")
            }
        }
    }
}

impl std::error::Error for RecordError {}
