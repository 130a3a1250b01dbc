//! Shared test utilities for the integration suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's main.rs.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Once;

pub use cantripdb::{
    json, DataStore, ErrorKind, Executor, Method, Principal, Request, Response, StoreConfig,
    Value,
};
use tempfile::TempDir;

static INIT_TRACING: Once = Once::new();

/// Route `tracing` output through the test harness so it shows up only for
/// failing tests.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

/// Executor over an in-memory store holding `document`
pub fn executor(document: Value) -> Executor {
    init_tracing();
    Executor::new(DataStore::in_memory(document).expect("in-memory store"))
}

/// Response body, panicking on an error response
pub fn ok(response: Response) -> Value {
    assert!(
        response.is_success(),
        "expected success, got {} {}",
        response.status,
        response.body
    );
    response.body
}

/// Error kind of a failed request
pub fn kind_of(executor: &Executor, request: Request) -> ErrorKind {
    executor
        .try_execute(request)
        .expect_err("request should fail")
        .kind()
}

// ============================================================================
// TestFile - a backing file in a temporary directory
// ============================================================================

/// A document file path that lives as long as the struct
pub struct TestFile {
    pub dir: TempDir,
    pub path: PathBuf,
}

impl TestFile {
    pub fn new() -> Self {
        init_tracing();
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("db.json");
        TestFile { dir, path }
    }

    /// Config pointing at this file
    pub fn config(&self) -> StoreConfig {
        StoreConfig::default().with_file(&self.path)
    }

    /// Parsed file contents
    pub fn read(&self) -> Value {
        let text = std::fs::read_to_string(&self.path).expect("read document file");
        serde_json::from_str(&text).expect("document file is JSON")
    }

    pub fn write_raw(&self, text: &str) {
        std::fs::write(&self.path, text).expect("write document file");
    }
}
