//! The Executor - single entry point to the store.
//!
//! The Executor turns a [`Request`] into a [`Response`]: it parses the path,
//! asks every access gate, runs validators on bodies, dispatches the verb to
//! its handler and finally tells the change sinks what was committed.

use std::collections::BTreeMap;
use std::sync::Arc;

use cantrip_core::{Method, Result, StorePath, Value};
use cantrip_engine::{DataStore, StoreConfig};
use cantrip_security::{AccessGate, AccessMode, AclGate, Principal, Validator};
use tracing::{debug, warn};

use crate::handlers::{self, Handled};
use crate::notify::ChangeSink;
use crate::request::Request;
use crate::response::Response;

/// The request executor - single entry point to the store.
///
/// Gates, validators and sinks are fixed at construction; the document
/// state lives in the [`DataStore`].
///
/// # Thread Safety
///
/// Executor is `Send + Sync` and can be shared across threads.
///
/// # Example
///
/// ```
/// use cantrip_executor::{json, DataStore, Executor, Request};
///
/// let executor = Executor::new(DataStore::in_memory(json!({})).unwrap());
///
/// let resp = executor.execute(Request::put("/").body(json!({"foo": "bar"})));
/// assert_eq!(resp.body, json!({"success": true}));
///
/// let resp = executor.execute(Request::get("/"));
/// assert_eq!(resp.body, json!({"foo": "bar"}));
/// ```
pub struct Executor {
    store: Arc<DataStore>,
    gates: Vec<Arc<dyn AccessGate>>,
    validators: Vec<Arc<dyn Validator>>,
    sinks: Vec<Arc<dyn ChangeSink>>,
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("store", &self.store)
            .field("gates", &self.gates.len())
            .field("validators", &self.validators.len())
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

impl Executor {
    /// Executor with no gates, validators or sinks
    pub fn new(store: impl Into<Arc<DataStore>>) -> Self {
        Executor {
            store: store.into(),
            gates: Vec::new(),
            validators: Vec::new(),
            sinks: Vec::new(),
        }
    }

    /// Open a store from `config` and wrap it
    pub fn open(config: StoreConfig) -> Result<Self> {
        Ok(Self::new(DataStore::open(config)?))
    }

    /// Executor that applies `mode` before any other gate
    pub fn new_with_mode(store: impl Into<Arc<DataStore>>, mode: AccessMode) -> Self {
        Self::new(store).with_gate(mode)
    }

    /// Add an access gate (builder pattern)
    ///
    /// Gates run in the order they were added; the first denial wins.
    pub fn with_gate(mut self, gate: impl AccessGate + 'static) -> Self {
        self.gates.push(Arc::new(gate));
        self
    }

    /// Add the `/_acl` table gate (builder pattern)
    pub fn with_acl(self) -> Self {
        self.with_gate(AclGate::new())
    }

    /// Add a body validator (builder pattern)
    pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validators.push(Arc::new(validator));
        self
    }

    /// Add a change sink (builder pattern)
    pub fn with_sink(mut self, sink: impl ChangeSink + 'static) -> Self {
        self.sinks.push(Arc::new(sink));
        self
    }

    /// Add an already-shared change sink (builder pattern)
    pub fn with_shared_sink(mut self, sink: Arc<dyn ChangeSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// The underlying store
    pub fn store(&self) -> &Arc<DataStore> {
        &self.store
    }

    /// Execute a request, turning any error into an error response.
    pub fn execute(&self, request: Request) -> Response {
        let method = request.method;
        let path = request.path.clone();
        match self.try_execute(request) {
            Ok(body) => Response::ok(body),
            Err(e) => {
                let response = Response::from_error(&e);
                if response.status >= 500 {
                    warn!(target: "cantrip::executor", method = %method, path = %path, error = %e, "Request failed");
                } else {
                    debug!(target: "cantrip::executor", method = %method, path = %path, status = response.status, error = %e, "Request refused");
                }
                response
            }
        }
    }

    /// Execute a list of requests in order.
    ///
    /// A failing request does not stop the ones after it.
    pub fn execute_many(&self, requests: Vec<Request>) -> Vec<Response> {
        requests.into_iter().map(|r| self.execute(r)).collect()
    }

    /// Execute a request from its textual parts.
    ///
    /// An unknown verb yields a 405 response, an unparsable body a 400.
    pub fn execute_raw(
        &self,
        method: &str,
        path: &str,
        query: BTreeMap<String, String>,
        raw_body: Option<&str>,
    ) -> Response {
        match Request::parse(method, path, query, raw_body) {
            Ok(request) => self.execute(request),
            Err(e) => {
                debug!(target: "cantrip::executor", method, path, error = %e, "Unparsable request");
                Response::from_error(&e)
            }
        }
    }

    /// Execute a request, returning the response body or the error.
    pub fn try_execute(&self, request: Request) -> Result<Value> {
        let Request {
            method,
            path,
            query,
            body,
            principal,
        } = request;
        let path = StorePath::parse(&path)?;
        self.authorize(method, &path, &principal)?;

        let handled = match method {
            Method::Get => handlers::read::get(&self.store, &path, &query)?,
            Method::Delete => handlers::write::delete(&self.store, &path)?,
            Method::Post | Method::Put | Method::Patch => {
                let body = handlers::write::require_body(method, body)?;
                self.validate(method, &path, &body)?;
                match method {
                    Method::Post => handlers::write::post(&self.store, &path, body)?,
                    Method::Put => handlers::write::put(&self.store, &path, body)?,
                    _ => handlers::write::patch(&self.store, &path, body)?,
                }
            }
        };

        let Handled { body, change } = handled;
        if let Some(value) = change {
            self.notify(method, &path, &value);
        }
        Ok(body)
    }

    fn authorize(&self, method: Method, path: &StorePath, principal: &Principal) -> Result<()> {
        if self.gates.is_empty() {
            return Ok(());
        }
        self.store.read(|document| {
            self.gates
                .iter()
                .try_for_each(|gate| gate.authorize(method, path, principal, document))
        })
    }

    fn validate(&self, method: Method, path: &StorePath, body: &Value) -> Result<()> {
        self.validators
            .iter()
            .try_for_each(|validator| validator.validate(method, path, body))
    }

    fn notify(&self, method: Method, path: &StorePath, value: &Value) {
        for sink in &self.sinks {
            sink.notify(method, path, value);
        }
    }
}
