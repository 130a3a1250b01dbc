//! # Cantrip Executor
//!
//! The public API for cantrip - a path-addressable in-memory JSON document
//! store.
//!
//! This is the only crate users need to import. It provides:
//! - [`Executor`] - REST verbs in, status codes and JSON out
//! - [`Request`]/[`Response`] - the normalized transport-boundary types
//! - [`DataStore`] - direct access to the document
//!
//! ## Quick Start
//!
//! ```
//! use cantrip_executor::{json, DataStore, Executor, Request};
//!
//! let executor = Executor::new(DataStore::in_memory(json!({"items": []})).unwrap());
//!
//! let created = executor.execute(Request::post("/items").body(json!({"name": "a"})));
//! let id = created.body["_id"].as_str().unwrap().to_string();
//!
//! let fetched = executor.execute(Request::get(format!("/items/{}", id)));
//! assert_eq!(fetched.body["name"], "a");
//! ```
//!
//! ## Verbs
//!
//! | Verb | Target | Effect |
//! |------|--------|--------|
//! | **GET** | any node | read, with `shallow`, `q`, `orderby`, `offset`, `limit`, `fields` |
//! | **POST** | collection | append a member, stamping `_id` and timestamps |
//! | **PUT** | object or root | replace, keeping protected metadata |
//! | **PATCH** | object or root | deep merge, arrays replaced wholesale |
//! | **DELETE** | key or member | remove; metadata keys are refused |

#![warn(missing_docs)]

mod executor;
mod handlers;
mod notify;
mod request;
mod response;

// Test modules
#[cfg(test)]
mod tests;

// =============================================================================
// Public API - Everything users need is re-exported here
// =============================================================================

pub use executor::Executor;
pub use notify::{ChangeEvent, ChangeLog, ChangeSink};
pub use request::Request;
pub use response::Response;

pub use cantrip_core::{json, Error, ErrorKind, Map, Method, Result, StorePath, Value};
pub use cantrip_engine::{
    DataStore, FlushStats, QueryOptions, StoreConfig, ARRAY_SENTINEL, OBJECT_SENTINEL,
};
pub use cantrip_security::{
    AccessGate, AccessMode, AclGate, Principal, TextRule, TextValidator, Validator,
};
