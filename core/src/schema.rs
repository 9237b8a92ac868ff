//! Record type descriptors: defaults, behavior overrides, and single
//! inheritance.
//!
//! # Design
//! A [`RecordType`] is the "class" a record is instantiated from: a set of
//! default field values, the identifier attribute name, the URL root of the
//! collection, and override hooks for instance behavior (init, parse,
//! serialize, url, sync) plus a type-level sync (the backend). Types form a
//! single-inheritance chain via [`RecordType::extend`]; every lookup checks
//! the type's own spec first and falls back up the chain, so a child only
//! carries what it overrides. The chain's root owns the [`Transport`].
//!
//! `RecordType` is a cheap handle (`Arc` inner) — cloning it into every
//! record is free, and pointer identity is what makes instances of a child
//! type distinguishable from the parent's.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::RecordError;
use crate::http::HttpResponse;
use crate::record::Record;
use crate::sync::{default_sync, Operation, SyncOptions};
use crate::transport::Transport;

/// Constructor override: replaces the default merge of defaults-then-
/// properties. [`Record::default_init`] remains available as the super-call.
pub type InitFn = dyn Fn(&mut Record, Value) + Send + Sync;

/// Reshapes a response body before it is merged onto a record.
pub type ParseFn =
    dyn Fn(&Record, Value, &SyncOptions) -> Result<Value, RecordError> + Send + Sync;

/// Controls the payload sent for create/update operations.
pub type SerializeFn = dyn Fn(&Record) -> Value + Send + Sync;

/// Replaces URL computation for a record.
pub type UrlFn = dyn Fn(&Record) -> Result<String, RecordError> + Send + Sync;

/// Computed form of a URL root.
pub type UrlRootFn = dyn Fn(&Record) -> String + Send + Sync;

/// Override point for how a type's CRUD operations reach a backend.
///
/// Implementations can delegate to [`default_sync`] for the base
/// CRUD-to-HTTP behavior.
#[async_trait]
pub trait SyncHandler: Send + Sync {
    async fn sync(
        &self,
        operation: Operation,
        record: &Record,
        options: SyncOptions,
    ) -> Result<HttpResponse, RecordError>;
}

/// Root location of a type's collection endpoint.
pub enum UrlRoot {
    Fixed(String),
    Computed(Arc<UrlRootFn>),
}

impl UrlRoot {
    pub(crate) fn resolve(&self, record: &Record) -> String {
        match self {
            UrlRoot::Fixed(root) => root.clone(),
            UrlRoot::Computed(compute) => compute.as_ref()(record),
        }
    }
}

/// Everything a type may declare or override.
///
/// All parts are optional; whatever is left unset falls back to the parent
/// chain (and ultimately to the built-in behavior).
#[derive(Default)]
pub struct TypeSpec {
    name: Option<String>,
    defaults: Option<Map<String, Value>>,
    id_attribute: Option<String>,
    url_root: Option<UrlRoot>,
    init: Option<Arc<InitFn>>,
    parse: Option<Arc<ParseFn>>,
    serialize: Option<Arc<SerializeFn>>,
    url: Option<Arc<UrlFn>>,
    sync: Option<Arc<dyn SyncHandler>>,
    backend: Option<Arc<dyn SyncHandler>>,
}

impl TypeSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Diagnostic name, shown by `Debug` on the type and its records.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Default field values merged into every new instance. Non-object
    /// values are ignored.
    pub fn defaults(mut self, defaults: Value) -> Self {
        if let Value::Object(defaults) = defaults {
            self.defaults = Some(defaults);
        }
        self
    }

    /// Name of the identifier field (`"id"` if never set on the chain).
    pub fn id_attribute(mut self, field: impl Into<String>) -> Self {
        self.id_attribute = Some(field.into());
        self
    }

    /// Fixed URL root for the type's collection.
    pub fn url_root(mut self, root: impl Into<String>) -> Self {
        self.url_root = Some(UrlRoot::Fixed(root.into()));
        self
    }

    /// Computed URL root, resolved per record.
    pub fn url_root_fn(
        mut self,
        compute: impl Fn(&Record) -> String + Send + Sync + 'static,
    ) -> Self {
        self.url_root = Some(UrlRoot::Computed(Arc::new(compute)));
        self
    }

    /// Constructor override (the reserved constructor slot).
    pub fn init(mut self, init: impl Fn(&mut Record, Value) + Send + Sync + 'static) -> Self {
        self.init = Some(Arc::new(init));
        self
    }

    /// Response reshaping hook applied before merges.
    pub fn parse(
        mut self,
        parse: impl Fn(&Record, Value, &SyncOptions) -> Result<Value, RecordError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.parse = Some(Arc::new(parse));
        self
    }

    /// Payload hook applied when the record is sent.
    pub fn serialize(mut self, serialize: impl Fn(&Record) -> Value + Send + Sync + 'static) -> Self {
        self.serialize = Some(Arc::new(serialize));
        self
    }

    /// URL computation override.
    pub fn url(
        mut self,
        url: impl Fn(&Record) -> Result<String, RecordError> + Send + Sync + 'static,
    ) -> Self {
        self.url = Some(Arc::new(url));
        self
    }

    /// Instance-level sync override: intercepts every operation issued by
    /// records of this type before the type-level sync is consulted.
    pub fn sync(mut self, handler: impl SyncHandler + 'static) -> Self {
        self.sync = Some(Arc::new(handler));
        self
    }

    /// Type-level sync override (the backend).
    pub fn backend(mut self, handler: impl SyncHandler + 'static) -> Self {
        self.backend = Some(Arc::new(handler));
        self
    }
}

enum Lineage {
    Root { transport: Arc<dyn Transport> },
    Child { parent: RecordType },
}

struct TypeInner {
    lineage: Lineage,
    spec: TypeSpec,
}

/// A record type: schema, behavior, and ancestry. Cheap to clone.
#[derive(Clone)]
pub struct RecordType {
    inner: Arc<TypeInner>,
}

impl RecordType {
    /// The root of a type hierarchy, bound to the transport all descendant
    /// types will sync through.
    pub fn base(transport: Arc<dyn Transport>) -> Self {
        Self {
            inner: Arc::new(TypeInner {
                lineage: Lineage::Root { transport },
                spec: TypeSpec::new(),
            }),
        }
    }

    /// Derive a new type. Instances of the child fall back to this type's
    /// behavior for anything `spec` does not override.
    pub fn extend(&self, spec: TypeSpec) -> Self {
        Self {
            inner: Arc::new(TypeInner {
                lineage: Lineage::Child {
                    parent: self.clone(),
                },
                spec,
            }),
        }
    }

    /// The parent type, for explicit super-calls.
    pub fn parent(&self) -> Option<&RecordType> {
        match &self.inner.lineage {
            Lineage::Child { parent } => Some(parent),
            Lineage::Root { .. } => None,
        }
    }

    /// Diagnostic name declared on this type (not inherited).
    pub fn name(&self) -> Option<&str> {
        self.inner.spec.name.as_deref()
    }

    /// Whether `self` and `other` are the same type (pointer identity).
    pub fn same_type(&self, other: &RecordType) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Whether `ancestor` is this type or one of its ancestors.
    pub fn descends_from(&self, ancestor: &RecordType) -> bool {
        let mut current = self;
        loop {
            if current.same_type(ancestor) {
                return true;
            }
            match current.parent() {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Chain lookup: nearest declaration wins.
    fn resolve<'a, T: ?Sized>(&'a self, pick: fn(&'a TypeSpec) -> Option<&'a T>) -> Option<&'a T> {
        let mut inner = self.inner.as_ref();
        loop {
            if let Some(found) = pick(&inner.spec) {
                return Some(found);
            }
            match &inner.lineage {
                Lineage::Child { parent } => inner = parent.inner.as_ref(),
                Lineage::Root { .. } => return None,
            }
        }
    }

    /// Name of the identifier field for this type.
    pub fn id_attribute(&self) -> &str {
        self.resolve(|spec| spec.id_attribute.as_deref())
            .unwrap_or("id")
    }

    pub(crate) fn defaults(&self) -> Option<&Map<String, Value>> {
        self.resolve(|spec| spec.defaults.as_ref())
    }

    pub(crate) fn url_root(&self) -> Option<&UrlRoot> {
        self.resolve(|spec| spec.url_root.as_ref())
    }

    pub(crate) fn init_fn(&self) -> Option<&InitFn> {
        self.resolve(|spec| spec.init.as_deref())
    }

    pub(crate) fn parse_fn(&self) -> Option<&ParseFn> {
        self.resolve(|spec| spec.parse.as_deref())
    }

    pub(crate) fn serialize_fn(&self) -> Option<&SerializeFn> {
        self.resolve(|spec| spec.serialize.as_deref())
    }

    pub(crate) fn url_fn(&self) -> Option<&UrlFn> {
        self.resolve(|spec| spec.url.as_deref())
    }

    pub(crate) fn instance_sync(&self) -> Option<&dyn SyncHandler> {
        self.resolve(|spec| spec.sync.as_deref())
    }

    pub(crate) fn backend(&self) -> Option<&dyn SyncHandler> {
        self.resolve(|spec| spec.backend.as_deref())
    }

    /// The transport owned by the chain's root.
    pub(crate) fn transport(&self) -> &dyn Transport {
        let mut inner = self.inner.as_ref();
        loop {
            match &inner.lineage {
                Lineage::Root { transport } => return transport.as_ref(),
                Lineage::Child { parent } => inner = parent.inner.as_ref(),
            }
        }
    }

    /// Construct a record of this type.
    ///
    /// The default constructor merges the chain-resolved defaults, then
    /// `properties` (explicit values win). Non-object `properties` yield a
    /// blank instance. An `init` override replaces this behavior entirely.
    pub fn instance(&self, properties: Value) -> Record {
        let mut record = Record::bare(self.clone());
        match self.init_fn() {
            Some(init) => init(&mut record, properties),
            None => record.default_init(properties),
        }
        record
    }

    /// Type-level sync: the backend override if any ancestor declares one,
    /// else the built-in CRUD-to-HTTP mapping.
    pub async fn sync(
        &self,
        operation: Operation,
        record: &Record,
        options: SyncOptions,
    ) -> Result<HttpResponse, RecordError> {
        match self.backend() {
            Some(handler) => handler.sync(operation, record, options).await,
            None => default_sync(operation, record, options).await,
        }
    }

    /// Load a single record by identifier.
    pub async fn fetch_one(
        &self,
        id: impl Into<Value>,
        options: SyncOptions,
    ) -> Result<Record, RecordError> {
        let mut record = self.instance(Value::Null);
        let id_attribute = self.id_attribute().to_string();
        record.set(id_attribute, id.into());
        record.fetch(options).await?;
        Ok(record)
    }

    /// Load the type's collection.
    ///
    /// A blank probe instance resolves the collection URL and sync
    /// behavior; each element of the (parsed) array response becomes a new
    /// instance, in response order. A non-array response is a shape error.
    pub async fn fetch_all(&self, options: SyncOptions) -> Result<Vec<Record>, RecordError> {
        let probe = self.instance(Value::Null);
        let response = probe.sync(Operation::Read, options.clone()).await?;
        let data = probe.parse(response.data, &options)?;
        match data {
            Value::Array(items) => Ok(items
                .into_iter()
                .map(|item| self.instance(item))
                .collect()),
            _ => Err(RecordError::InvalidResponse(
                "not a valid response, expecting an array".to_string(),
            )),
        }
    }
}

impl fmt::Debug for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "RecordType({name})"),
            None => write!(f, "RecordType(<anonymous>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::mock::MockTransport;

    struct RecordingBackend;

    #[async_trait]
    impl SyncHandler for RecordingBackend {
        async fn sync(
            &self,
            _operation: Operation,
            _record: &Record,
            _options: SyncOptions,
        ) -> Result<HttpResponse, RecordError> {
            Ok(HttpResponse::ok(json!({"handled": "backend"})))
        }
    }

    fn base() -> (Arc<MockTransport>, RecordType) {
        let transport = Arc::new(MockTransport::new());
        let ty = RecordType::base(transport.clone());
        (transport, ty)
    }

    #[test]
    fn id_attribute_resolves_up_the_chain() {
        let (_, root) = base();
        let parent = root.extend(TypeSpec::new().id_attribute("slug"));
        let child = parent.extend(TypeSpec::new());
        assert_eq!(child.id_attribute(), "slug");
        assert_eq!(root.id_attribute(), "id");
    }

    #[test]
    fn defaults_shadow_rather_than_merge() {
        let (_, root) = base();
        let parent = root.extend(TypeSpec::new().defaults(json!({"a": 1, "b": 2})));
        let child = parent.extend(TypeSpec::new().defaults(json!({"a": 3})));

        let record = child.instance(json!({}));
        assert_eq!(record.get("a"), Some(&json!(3)));
        assert_eq!(record.get("b"), None);
    }

    #[test]
    fn child_types_are_distinguishable_from_parents() {
        let (_, root) = base();
        let parent = root.extend(TypeSpec::new().name("Parent"));
        let child = parent.extend(TypeSpec::new().name("Child"));
        let other = root.extend(TypeSpec::new());

        let record = child.instance(json!({}));
        assert!(record.record_type().same_type(&child));
        assert!(!record.record_type().same_type(&parent));
        assert!(child.descends_from(&parent));
        assert!(child.descends_from(&root));
        assert!(!child.descends_from(&other));
        assert!(parent.descends_from(&parent));
    }

    #[test]
    fn custom_init_replaces_default_construction() {
        let (_, root) = base();
        let ty = root.extend(
            TypeSpec::new()
                .defaults(json!({"kind": "task"}))
                .init(|record, properties| {
                    record.default_init(properties);
                    record.set("initialized", true);
                }),
        );

        let record = ty.instance(json!({"title": "a"}));
        assert_eq!(record.get("kind"), Some(&json!("task")));
        assert_eq!(record.get("title"), Some(&json!("a")));
        assert_eq!(record.get("initialized"), Some(&json!(true)));
    }

    #[tokio::test]
    async fn fetch_one_targets_the_record_url() {
        let (transport, root) = base();
        transport.enqueue(Ok(HttpResponse::ok(json!({"id": 7, "title": "a"}))));

        let ty = root.extend(TypeSpec::new().url_root("/tasks"));
        let record = ty.fetch_one(7, SyncOptions::new()).await.unwrap();

        let requests = transport.take_requests();
        assert_eq!(requests[0].url, "/tasks/7");
        assert_eq!(record.get("title"), Some(&json!("a")));
        assert!(!record.is_new());
    }

    #[tokio::test]
    async fn fetch_all_preserves_response_order() {
        let (transport, root) = base();
        transport.enqueue(Ok(HttpResponse::ok(json!([{"id": 1}, {"id": 2}]))));

        let ty = root.extend(TypeSpec::new().url_root("/tasks"));
        let records = ty.fetch_all(SyncOptions::new()).await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("id"), Some(&json!(1)));
        assert_eq!(records[1].get("id"), Some(&json!(2)));
        assert!(records.iter().all(|r| r.record_type().same_type(&ty)));
    }

    #[tokio::test]
    async fn fetch_all_rejects_non_array_responses() {
        let (transport, root) = base();
        transport.enqueue(Ok(HttpResponse::ok(json!({}))));

        let ty = root.extend(TypeSpec::new().url_root("/tasks"));
        let err = ty.fetch_all(SyncOptions::new()).await.unwrap_err();
        match err {
            RecordError::InvalidResponse(msg) => {
                assert_eq!(msg, "not a valid response, expecting an array")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn fetch_all_applies_defaults_to_elements() {
        let (transport, root) = base();
        transport.enqueue(Ok(HttpResponse::ok(json!([{"id": 1}]))));

        let ty = root.extend(
            TypeSpec::new()
                .url_root("/tasks")
                .defaults(json!({"done": false})),
        );
        let records = ty.fetch_all(SyncOptions::new()).await.unwrap();
        assert_eq!(records[0].get("done"), Some(&json!(false)));
        assert_eq!(records[0].get("id"), Some(&json!(1)));
    }

    #[tokio::test]
    async fn parse_override_is_used_while_sync_is_inherited() {
        let (transport, root) = base();
        transport.enqueue(Ok(HttpResponse::ok(
            json!({"envelope": {"id": 7, "title": "a"}}),
        )));

        let ty = root.extend(
            TypeSpec::new()
                .url_root("/tasks")
                .parse(|_record, data, _options| Ok(data["envelope"].clone())),
        );
        let record = ty.fetch_one(7, SyncOptions::new()).await.unwrap();

        assert_eq!(record.get("title"), Some(&json!("a")));
        // The request still went through the inherited default sync.
        assert_eq!(transport.take_requests()[0].url, "/tasks/7");
    }

    #[tokio::test]
    async fn backend_override_intercepts_type_level_sync() {
        let (transport, root) = base();
        let ty = root.extend(
            TypeSpec::new()
                .url_root("/tasks")
                .backend(RecordingBackend),
        );

        let mut record = ty.instance(json!({"id": 7}));
        let response = record.fetch(SyncOptions::new()).await;
        assert!(response.is_ok());
        assert_eq!(record.get("handled"), Some(&json!("backend")));
        // The real transport never saw the operation.
        assert!(transport.take_requests().is_empty());
    }
}
