//! Document store engine for cantrip
//!
//! This crate turns a JSON document into a path-addressable store:
//! - StoreConfig: TOML-loadable settings
//! - Resolver: request path → concrete location (keys, indexes, identifiers)
//! - IdentifierIndex: per-collection identifier cache
//! - MetadataManager: identifiers, timestamps, metadata protection
//! - MutationEngine: POST / PUT / PATCH / DELETE semantics
//! - QueryOptions: GET-side projection, search, ordering, paging
//! - DataStore: locking, logging and flush scheduling around all of the above

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod index;
pub mod metadata;
pub mod mutation;
pub mod query;
pub mod resolver;
pub mod store;

pub use config::StoreConfig;
pub use index::{IdentifierIndex, IndexStats};
pub use metadata::{MetadataManager, CREATED_DATE, MODIFIED_DATE};
pub use mutation::MutationEngine;
pub use query::{OrderBy, QueryOptions, Search, ARRAY_SENTINEL, OBJECT_SENTINEL};
pub use resolver::{resolve, resolve_parent, Resolution};
pub use store::DataStore;

pub use cantrip_durability::FlushStats;
