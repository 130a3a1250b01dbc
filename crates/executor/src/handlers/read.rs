//! GET handler

use std::collections::BTreeMap;

use cantrip_core::{Result, StorePath};
use cantrip_engine::{DataStore, QueryOptions};

use super::Handled;

/// Handle GET: parse the query parameters, then resolve and refine
pub fn get(
    store: &DataStore,
    path: &StorePath,
    query: &BTreeMap<String, String>,
) -> Result<Handled> {
    let options = QueryOptions::from_params(query)?;
    store.get(path, &options).map(Handled::read)
}
