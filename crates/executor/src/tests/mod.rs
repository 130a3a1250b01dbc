//! Test modules for the executor crate.

pub mod access_mode;

use crate::{DataStore, Executor, Value};

/// Executor over an in-memory store holding `document`
pub(crate) fn executor(document: Value) -> Executor {
    Executor::new(DataStore::in_memory(document).unwrap())
}
