//! Integration Tests
//!
//! End-to-end tests through the public `cantripdb` API, organized by
//! concern:
//! - scenarios: the request/response walkthroughs for each verb
//! - properties: proptest checks of the verb invariants
//! - persistence: file bootstrap, debounced flushing, reopen
//! - concurrency: many writers against one store

#[path = "../common/mod.rs"]
mod common;

mod concurrency;
mod persistence;
mod properties;
mod scenarios;
