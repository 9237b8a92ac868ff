//! Record instances and their CRUD lifecycle.
//!
//! # Design
//! A `Record` is a schemaless field map plus a handle to its [`RecordType`].
//! Whether the identifier field is set (present and non-null) decides how
//! `save` persists it: absent means create, present means update. All
//! behavior hooks (parse, serialize, url, sync) dispatch through the type,
//! so a record carries no behavior of its own beyond the built-in defaults.

use std::fmt;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::{Map, Value};

use crate::error::RecordError;
use crate::http::HttpResponse;
use crate::schema::RecordType;
use crate::sync::{Operation, SyncOptions};

/// Identifier path-segment encoding, matching JavaScript's
/// `encodeURIComponent` unreserved set.
const ID_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// An instance of domain data with CRUD lifecycle operations.
#[derive(Clone)]
pub struct Record {
    ty: RecordType,
    fields: Map<String, Value>,
}

impl Record {
    pub(crate) fn bare(ty: RecordType) -> Self {
        Self {
            ty,
            fields: Map::new(),
        }
    }

    /// The type this record was instantiated from.
    pub fn record_type(&self) -> &RecordType {
        &self.ty
    }

    /// All fields, in insertion order.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// The identifier value, if set. A null identifier counts as unset.
    pub fn id(&self) -> Option<&Value> {
        self.fields
            .get(self.ty.id_attribute())
            .filter(|id| !id.is_null())
    }

    /// Whether the record has not been persisted yet (identifier unset).
    pub fn is_new(&self) -> bool {
        self.id().is_none()
    }

    /// Shallow-merge an object's entries onto the record. Non-object values
    /// are ignored.
    pub fn merge(&mut self, values: Value) {
        if let Value::Object(values) = values {
            for (field, value) in values {
                self.fields.insert(field, value);
            }
        }
    }

    /// The default constructor body: type defaults first, then `properties`
    /// (explicit values win). Public so `init` overrides can super-call it.
    pub fn default_init(&mut self, properties: Value) {
        if let Some(defaults) = self.ty.defaults() {
            let defaults = defaults.clone();
            for (field, value) in defaults {
                self.fields.insert(field, value);
            }
        }
        self.merge(properties);
    }

    /// (Re)load the record from the backend.
    ///
    /// Issues a "read" sync; an object response body (after `parse`) is
    /// merged in place. Anything else is an invalid response shape.
    pub async fn fetch(&mut self, options: SyncOptions) -> Result<&mut Record, RecordError> {
        let response = self.sync(Operation::Read, options.clone()).await?;
        let data = self.parse(response.data, &options)?;
        match data {
            Value::Object(_) => {
                self.merge(data);
                Ok(self)
            }
            _ => Err(RecordError::InvalidResponse(
                "not a valid response type".to_string(),
            )),
        }
    }

    /// Save the record to the backend.
    ///
    /// `values` (object only; pass `Value::Null` for none) are merged before
    /// persisting. With the identifier set this is an "update" sync and the
    /// response body is returned without being merged back. Without, it is a
    /// "create" sync: an object response body is parsed and merged onto the
    /// record; a non-object body (e.g. an empty 204) leaves the fields as
    /// they are.
    pub async fn save(
        &mut self,
        values: Value,
        options: SyncOptions,
    ) -> Result<HttpResponse, RecordError> {
        self.merge(values);
        if !self.is_new() {
            return self.sync(Operation::Update, options).await;
        }
        let response = self.sync(Operation::Create, options.clone()).await?;
        if response.data.is_object() {
            let parsed = self.parse(response.data.clone(), &options)?;
            self.merge(parsed);
        }
        Ok(response)
    }

    /// Remove the record from the backend.
    ///
    /// Resolves or fails exactly as the sync does; fields are not touched.
    pub async fn destroy(&self, options: SyncOptions) -> Result<HttpResponse, RecordError> {
        self.sync(Operation::Delete, options).await
    }

    /// The record's URL.
    ///
    /// With the identifier unset, the resolved URL root as-is (the
    /// collection endpoint). With it set, root + `/` + percent-encoded
    /// identifier. Requires a root (or a type-level `url` override) —
    /// missing configuration is a synchronous [`RecordError::MissingUrlRoot`].
    pub fn url(&self) -> Result<String, RecordError> {
        if let Some(url) = self.ty.url_fn() {
            return url(self);
        }
        let root = self.ty.url_root().map(|root| root.resolve(self));
        let id = match self.id() {
            None => return root.ok_or(RecordError::MissingUrlRoot),
            Some(id) => id_segment(id),
        };
        let root = root.ok_or(RecordError::MissingUrlRoot)?;
        let separator = if root.ends_with('/') { "" } else { "/" };
        Ok(format!(
            "{root}{separator}{}",
            utf8_percent_encode(&id, ID_SEGMENT)
        ))
    }

    /// Reshape a response body before it is merged. Identity unless the
    /// type overrides it.
    pub fn parse(&self, data: Value, options: &SyncOptions) -> Result<Value, RecordError> {
        match self.ty.parse_fn() {
            Some(parse) => parse(self, data, options),
            None => Ok(data),
        }
    }

    /// The payload sent for create/update. All fields unless the type
    /// overrides it.
    pub fn serialize(&self) -> Value {
        match self.ty.serialize_fn() {
            Some(serialize) => serialize(self),
            None => Value::Object(self.fields.clone()),
        }
    }

    /// Issue a CRUD operation for this record: the type's instance-level
    /// sync override if any, else the type-level sync.
    pub async fn sync(
        &self,
        operation: Operation,
        options: SyncOptions,
    ) -> Result<HttpResponse, RecordError> {
        match self.ty.instance_sync() {
            Some(handler) => handler.sync(operation, self, options).await,
            None => self.ty.sync(operation, self, options).await,
        }
    }
}

fn id_segment(id: &Value) -> String {
    match id {
        Value::String(id) => id.clone(),
        other => other.to_string(),
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("type", &self.ty)
            .field("fields", &self.fields)
            .finish()
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.ty.same_type(&other.ty) && self.fields == other.fields
    }
}
