//! Core types for cantrip
//!
//! This crate defines the foundational types used throughout the store:
//! - Error: the error hierarchy and its status-code mapping
//! - Method: the REST verbs
//! - StorePath / Location / Step: request paths and resolved addresses
//! - Node / NodeKind: tagged view of a JSON value for verb dispatch
//! - JSON helpers: location walking, deep merge, search text

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod json;
pub mod path;
pub mod types;

pub use error::{Error, ErrorKind, Result};
pub use json::{
    deep_merge, node_kind, search_text, value_at, value_at_mut, value_type_name, Node, NodeKind,
};
pub use path::{is_reserved_key, Location, Step, StorePath, MAX_PATH_SEGMENTS, METADATA_SIGIL};
pub use types::Method;

// serde_json is the document model; re-export so downstream crates agree on the version
pub use serde_json::{json, Map, Value};
