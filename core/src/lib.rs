//! Active-record style client for HTTP CRUD backends.
//!
//! # Overview
//! Records are schemaless field maps instantiated from a [`RecordType`],
//! the "class" carrying defaults, the identifier attribute, the URL root,
//! and behavior overrides. Instance operations (`fetch`, `save`, `destroy`)
//! map onto create/read/update/delete syncs, which the type translates into
//! HTTP requests and hands to a pluggable [`Transport`].
//!
//! # Design
//! - Types form a single-inheritance chain (`RecordType::extend`); lookups
//!   fall back to the parent for anything a child does not override.
//! - Identifier presence decides persistence: unset saves create, set saves
//!   update, and `url()` appends the encoded identifier to the URL root.
//! - The CRUD-to-HTTP derivation (`sync::default_sync`) fills method, url,
//!   and payload only where the caller's `SyncOptions` left them unset.
//! - All I/O is async and lives behind the `Transport` trait; `HttpClient`
//!   is the reqwest-backed implementation and `mock::MockTransport` the
//!   in-memory one for tests.

pub mod error;
pub mod http;
pub mod mock;
pub mod record;
pub mod schema;
pub mod sync;
pub mod transport;

pub use error::RecordError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use record::Record;
pub use schema::{RecordType, SyncHandler, TypeSpec, UrlRoot};
pub use sync::{default_sync, Operation, SyncOptions};
pub use transport::{HttpClient, Transport};
