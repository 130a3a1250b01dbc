//! The document store
//!
//! `DataStore` owns the document and serializes every write behind a
//! `parking_lot::RwLock`. Reads share the lock; the identifier index sits in
//! its own mutex because lookups refresh it. Lock order is always document
//! first, then index.
//!
//! After each committed mutation the flush scheduler is told about it while
//! the write lock is still held, so the snapshot it may capture is exactly
//! the committed state.

use cantrip_core::{value_at, Error, Method, Result, StorePath, Value};
use cantrip_durability::{DocumentFile, FlushScheduler, FlushStats};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::StoreConfig;
use crate::index::{IdentifierIndex, IndexStats};
use crate::metadata::MetadataManager;
use crate::mutation::MutationEngine;
use crate::query::QueryOptions;
use crate::resolver::resolve;

/// Path-addressable JSON document store
///
/// # Example
///
/// ```
/// use cantrip_core::{json, StorePath};
/// use cantrip_engine::{DataStore, QueryOptions};
///
/// let store = DataStore::in_memory(json!({"items": []})).unwrap();
/// let items = StorePath::parse("/items").unwrap();
/// let created = store.post(&items, json!({"name": "a"})).unwrap();
/// assert!(created["_id"].is_string());
///
/// let listed = store.get(&items, &QueryOptions::default()).unwrap();
/// assert_eq!(listed.as_array().unwrap().len(), 1);
/// ```
pub struct DataStore {
    config: StoreConfig,
    meta: MetadataManager,
    document: RwLock<Value>,
    index: Mutex<IdentifierIndex>,
    scheduler: Option<FlushScheduler>,
    closed: AtomicBool,
}

impl std::fmt::Debug for DataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataStore")
            .field("config", &self.config)
            .field("closed", &self.closed.load(Ordering::Relaxed))
            .finish()
    }
}

impl DataStore {
    /// Open a store as configured
    ///
    /// With `config.file` set, the file is loaded (or created holding `{}`)
    /// and a flush scheduler is started. Without it the store starts empty
    /// and never touches disk.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidConfig`] if the configuration fails validation
    /// - [`Error::CorruptDocument`] if the backing file is not valid JSON
    pub fn open(config: StoreConfig) -> Result<Self> {
        config.validate()?;
        match config.file.clone() {
            Some(path) => {
                let file = DocumentFile::new(path);
                let document = file.open()?;
                Self::assemble(config, document, Some(file))
            }
            None => Self::assemble(config, Value::Object(Default::default()), None),
        }
    }

    /// In-memory store over `document` with default settings
    pub fn in_memory(document: Value) -> Result<Self> {
        Self::from_document(StoreConfig::default(), document)
    }

    /// Store over an already-loaded document
    ///
    /// The document replaces whatever the configured file holds; the file,
    /// if any, is still used for flushing.
    pub fn from_document(config: StoreConfig, document: Value) -> Result<Self> {
        config.validate()?;
        if !(document.is_object() || document.is_array()) {
            return Err(Error::malformed(
                "document root must be an object or an array",
            ));
        }
        let file = config.file.clone().map(DocumentFile::new);
        Self::assemble(config, document, file)
    }

    fn assemble(config: StoreConfig, document: Value, file: Option<DocumentFile>) -> Result<Self> {
        let scheduler = match file {
            Some(file) => Some(FlushScheduler::start(file, config.save_every)?),
            None => None,
        };

        info!(
            target: "cantrip::store",
            file = ?config.file,
            save_every = config.save_every,
            id_attribute = %config.id_attribute,
            index_identifiers = config.index_identifiers,
            "Store opened"
        );

        Ok(DataStore {
            meta: MetadataManager::new(config.id_attribute.clone()),
            index: Mutex::new(IdentifierIndex::new(config.index_identifiers)),
            document: RwLock::new(document),
            scheduler,
            closed: AtomicBool::new(false),
            config,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Identifier key name
    pub fn id_attribute(&self) -> &str {
        self.meta.id_attribute()
    }

    /// Resolve `path` and refine the node for a GET response
    pub fn get(&self, path: &StorePath, options: &QueryOptions) -> Result<Value> {
        let document = self.document.read();
        let resolution = resolve(
            &document,
            path,
            self.meta.id_attribute(),
            &mut self.index.lock(),
        )?;
        let node = value_at(&document, &resolution.target)
            .ok_or_else(|| Error::not_found(path.to_string()))?;
        let options = options.clone().with_shallow(self.config.shallow);
        Ok(options.refine(node, self.config.case_sensitive_search))
    }

    /// Append a member to the collection at `path`; returns the stored member
    pub fn post(&self, path: &StorePath, body: Value) -> Result<Value> {
        self.mutate(Method::Post, path, |engine| engine.post(path, body))
    }

    /// Replace the object at `path`; returns the new value
    pub fn put(&self, path: &StorePath, body: Value) -> Result<Value> {
        self.mutate(Method::Put, path, |engine| engine.put(path, body))
    }

    /// Merge into the object at `path`; returns the merged value
    pub fn patch(&self, path: &StorePath, body: Value) -> Result<Value> {
        self.mutate(Method::Patch, path, |engine| engine.patch(path, body))
    }

    /// Remove the node at `path`; returns the removed value
    pub fn delete(&self, path: &StorePath) -> Result<Value> {
        self.mutate(Method::Delete, path, |engine| engine.delete(path))
    }

    fn mutate<F>(&self, method: Method, path: &StorePath, op: F) -> Result<Value>
    where
        F: FnOnce(&mut MutationEngine<'_>) -> Result<Value>,
    {
        let mut document = self.document.write();
        let result = {
            let mut index = self.index.lock();
            let mut engine = MutationEngine::new(&mut document, &mut index, &self.meta);
            op(&mut engine)
        };
        let value = match result {
            Ok(value) => value,
            Err(e) => {
                debug!(target: "cantrip::store", method = %method, path = %path, error = %e, "Mutation rejected");
                return Err(e);
            }
        };

        debug!(target: "cantrip::store", method = %method, path = %path, "Mutation committed");
        if let Some(scheduler) = &self.scheduler {
            scheduler.record_mutation(&document);
        }
        Ok(value)
    }

    /// Deep copy of the node at `path`, unrefined
    pub fn node(&self, path: &StorePath) -> Result<Value> {
        let document = self.document.read();
        let resolution = resolve(
            &document,
            path,
            self.meta.id_attribute(),
            &mut self.index.lock(),
        )?;
        value_at(&document, &resolution.target)
            .cloned()
            .ok_or_else(|| Error::not_found(path.to_string()))
    }

    /// Deep copy of the container of `path`; `None` for the root
    pub fn parent(&self, path: &StorePath) -> Result<Option<Value>> {
        match path.parent() {
            Some(parent) => self.node(&parent).map(Some),
            None => Ok(None),
        }
    }

    /// Deep copy of the whole document
    pub fn snapshot(&self) -> Value {
        self.document.read().clone()
    }

    /// Run `f` against the document under the read lock
    pub fn read<R>(&self, f: impl FnOnce(&Value) -> R) -> R {
        f(&*self.document.read())
    }

    /// Write the document to the backing file now
    ///
    /// No-op for an in-memory store.
    pub fn flush(&self) -> Result<()> {
        match &self.scheduler {
            Some(scheduler) => {
                let document = self.document.read();
                scheduler.flush_now(&document)
            }
            None => Ok(()),
        }
    }

    /// Flush counters, `None` for an in-memory store
    pub fn flush_stats(&self) -> Option<FlushStats> {
        self.scheduler.as_ref().map(FlushScheduler::stats)
    }

    /// Block until background flushing is idle; `true` if it got there in time
    pub fn wait_for_flush(&self, timeout: Duration) -> bool {
        self.scheduler
            .as_ref()
            .map_or(true, |scheduler| scheduler.wait_idle(timeout))
    }

    /// Identifier index counters
    pub fn index_stats(&self) -> IndexStats {
        self.index.lock().stats()
    }

    /// Stop background flushing and write the final state
    ///
    /// The final write is skipped when `save_every` is 0. Idempotent; also
    /// run on drop.
    pub fn shutdown(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let scheduler = match &self.scheduler {
            Some(scheduler) => scheduler,
            None => return Ok(()),
        };
        scheduler.shutdown();
        if scheduler.save_every() > 0 {
            self.flush()?;
        }
        info!(target: "cantrip::store", stats = ?scheduler.stats(), "Store closed");
        Ok(())
    }
}

impl Drop for DataStore {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!(target: "cantrip::store", error = %e, "Final flush failed");
        }
    }
}
