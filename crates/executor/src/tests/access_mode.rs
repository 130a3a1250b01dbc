//! Access mode tests: verify read-only mode blocks writes and allows reads.

use std::sync::Arc;

use crate::{json, AccessMode, DataStore, ErrorKind, Executor, Request};

// =============================================================================
// Helpers
// =============================================================================

/// Store with one item, shared so read-only and read-write executors can
/// be built over the same document.
fn setup_store() -> Arc<DataStore> {
    Arc::new(DataStore::in_memory(json!({"items": [{"_id": "a", "n": 1}]})).unwrap())
}

// =============================================================================
// Executor-level tests
// =============================================================================

#[test]
fn test_read_only_blocks_every_mutation() {
    let executor = Executor::new_with_mode(setup_store(), AccessMode::ReadOnly);

    for request in [
        Request::post("/items").body(json!({"n": 2})),
        Request::put("/items/a").body(json!({"n": 2})),
        Request::patch("/items/a").body(json!({"n": 2})),
        Request::delete("/items/a"),
    ] {
        let resp = executor.execute(request);
        assert_eq!(resp.status, 403);
    }
    assert_eq!(
        executor.store().snapshot(),
        json!({"items": [{"_id": "a", "n": 1}]})
    );
}

#[test]
fn test_read_only_allows_get() {
    let executor = Executor::new_with_mode(setup_store(), AccessMode::ReadOnly);
    let resp = executor.execute(Request::get("/items/a/n"));
    assert_eq!(resp.body, json!({"value": 1}));
}

#[test]
fn test_read_only_sees_writes_from_read_write_handle() {
    let store = setup_store();
    let writer = Executor::new(store.clone());
    let reader = Executor::new_with_mode(store, AccessMode::ReadOnly);

    writer.execute(Request::patch("/items/a").body(json!({"n": 7})));
    assert_eq!(reader.execute(Request::get("/items/a/n")).body, json!({"value": 7}));
}

#[test]
fn test_read_only_denial_precedes_path_resolution() {
    let executor = Executor::new_with_mode(setup_store(), AccessMode::ReadOnly);
    let err = executor
        .try_execute(Request::delete("/does/not/exist"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AccessDenied);
}
