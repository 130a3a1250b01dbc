//! Verb handlers
//!
//! | Module | Verbs | Store operations |
//! |--------|-------|------------------|
//! | `read` | GET | `DataStore::get` with query refinement |
//! | `write` | POST, PUT, PATCH, DELETE | `DataStore::{post, put, patch, delete}` |

pub mod read;
pub mod write;

use cantrip_core::Value;

/// What a handler produced
#[derive(Debug, Clone, PartialEq)]
pub struct Handled {
    /// Response body
    pub body: Value,
    /// Value for change sinks; `None` for reads
    pub change: Option<Value>,
}

impl Handled {
    pub(crate) fn read(body: Value) -> Self {
        Handled { body, change: None }
    }

    pub(crate) fn write(body: Value, change: Value) -> Self {
        Handled {
            body,
            change: Some(change),
        }
    }
}
