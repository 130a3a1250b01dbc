//! POST, PUT, PATCH and DELETE handlers
//!
//! POST answers with the stored member; the others answer
//! `{"success": true}`. Every handler also returns the value change sinks
//! should see.

use cantrip_core::{json, Error, Method, Result, StorePath, Value};
use cantrip_engine::DataStore;

use super::Handled;

/// Take the body of a body-carrying verb
pub fn require_body(method: Method, body: Option<Value>) -> Result<Value> {
    body.ok_or_else(|| Error::malformed(format!("{} requires a JSON body", method)))
}

/// Handle POST: append to the collection at `path`
pub fn post(store: &DataStore, path: &StorePath, body: Value) -> Result<Handled> {
    let created = store.post(path, body)?;
    Ok(Handled::write(created.clone(), created))
}

/// Handle PUT: replace the object at `path`
pub fn put(store: &DataStore, path: &StorePath, body: Value) -> Result<Handled> {
    let written = store.put(path, body)?;
    Ok(Handled::write(success(), written))
}

/// Handle PATCH: deep-merge into the object at `path`
pub fn patch(store: &DataStore, path: &StorePath, body: Value) -> Result<Handled> {
    let merged = store.patch(path, body)?;
    Ok(Handled::write(success(), merged))
}

/// Handle DELETE: remove the node at `path`
pub fn delete(store: &DataStore, path: &StorePath) -> Result<Handled> {
    let removed = store.delete(path)?;
    Ok(Handled::write(success(), removed))
}

fn success() -> Value {
    json!({"success": true})
}
