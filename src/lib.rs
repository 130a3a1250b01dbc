//! cantrip - path-addressable in-memory JSON document store
//!
//! cantrip holds one JSON document in memory and exposes it through REST
//! verbs on slash-separated paths. Arrays are collections: their members
//! are addressed by position or by an identifier field (`_id` by default).
//!
//! # Quick Start
//!
//! ```
//! use cantripdb::{json, DataStore, Executor, Request};
//!
//! let executor = Executor::new(DataStore::in_memory(json!({})).unwrap());
//!
//! executor.execute(Request::put("/").body(json!({"foo": "bar"})));
//! assert_eq!(executor.execute(Request::get("/")).body, json!({"foo": "bar"}));
//! ```
//!
//! # Architecture
//!
//! All operations go through the [`Executor`], which consults access gates
//! and validators, then hands the verb to the [`DataStore`]. Persistence is
//! a debounced background flush of the whole document to one JSON file.
//!
//! Internal implementation details (path resolution, metadata, mutation,
//! query refinement, flushing) live in the workspace crates; only the
//! executor API is re-exported here.

// Re-export the public API from cantrip-executor
pub use cantrip_executor::*;
