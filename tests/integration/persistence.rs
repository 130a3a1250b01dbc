//! File bootstrap, debounced flushing and reopen

use std::time::Duration;

use crate::common::*;

const WAIT: Duration = Duration::from_secs(5);

#[test]
fn missing_file_is_created_with_empty_object() {
    let file = TestFile::new();
    let executor = Executor::open(file.config()).unwrap();
    assert!(file.path.exists());
    assert_eq!(file.read(), json!({}));
    assert_eq!(ok(executor.execute(Request::get("/"))), json!({}));
}

#[test]
fn every_mutation_is_flushed_by_default() {
    let file = TestFile::new();
    let executor = Executor::open(file.config()).unwrap();

    ok(executor.execute(Request::put("/").body(json!({"items": []}))));
    ok(executor.execute(Request::post("/items").body(json!({"_id": "a"}))));
    assert!(executor.store().wait_for_flush(WAIT));

    assert_eq!(file.read(), json!({"items": [{"_id": "a"}]}));
    let stats = executor.store().flush_stats().unwrap();
    assert_eq!(stats.mutations, 2);
    assert_eq!(stats.flush_failures, 0);
}

#[test]
fn save_every_batches_writes() {
    let file = TestFile::new();
    let executor = Executor::open(file.config().with_save_every(3)).unwrap();

    ok(executor.execute(Request::put("/").body(json!({"n": 1}))));
    ok(executor.execute(Request::patch("/").body(json!({"n": 2}))));
    assert!(executor.store().wait_for_flush(WAIT));
    assert_eq!(file.read(), json!({}));

    ok(executor.execute(Request::patch("/").body(json!({"n": 3}))));
    assert!(executor.store().wait_for_flush(WAIT));
    assert_eq!(file.read(), json!({"n": 3}));
    assert_eq!(executor.store().flush_stats().unwrap().flushes_scheduled, 1);
}

#[test]
fn save_every_zero_never_writes() {
    let file = TestFile::new();
    {
        let executor = Executor::open(file.config().with_save_every(0)).unwrap();
        ok(executor.execute(Request::put("/").body(json!({"gone": true}))));
        executor.store().shutdown().unwrap();
    }
    assert_eq!(file.read(), json!({}));
}

#[test]
fn reopen_sees_flushed_state() {
    let file = TestFile::new();
    let id = {
        let executor = Executor::open(file.config()).unwrap();
        ok(executor.execute(Request::put("/").body(json!({"users": []}))));
        let created = ok(executor.execute(Request::post("/users").body(json!({"name": "ann"}))));
        executor.store().shutdown().unwrap();
        created["_id"].as_str().unwrap().to_string()
    };

    let executor = Executor::open(file.config()).unwrap();
    assert_eq!(
        ok(executor.execute(Request::get(format!("/users/{}/name", id)))),
        json!({"value": "ann"})
    );
}

#[test]
fn corrupt_file_refuses_to_open() {
    let file = TestFile::new();
    file.write_raw("{ this is not json");
    let err = Executor::open(file.config()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);
    assert!(err.to_string().contains("Not a valid JSON document file"));
}

#[test]
fn config_loaded_from_toml() {
    let file = TestFile::new();
    let config_path = file.dir.path().join("cantrip.toml");
    std::fs::write(
        &config_path,
        format!(
            "idAttribute = \"key\"\nsaveEvery = 1\nfile = {:?}\n",
            file.path.display().to_string()
        ),
    )
    .unwrap();

    let config = StoreConfig::from_file(&config_path).unwrap();
    assert_eq!(config.id_attribute, "key");

    let executor = Executor::open(config).unwrap();
    ok(executor.execute(Request::put("/").body(json!({"things": []}))));
    let created = ok(executor.execute(Request::post("/things").body(json!({"v": 1}))));
    assert!(created["key"].is_string());
    assert!(created.get("_id").is_none());

    let fetched = ok(executor.execute(Request::get(format!(
        "/things/{}/v",
        created["key"].as_str().unwrap()
    ))));
    assert_eq!(fetched, json!({"value": 1}));
}

#[test]
fn explicit_flush_writes_immediately() {
    let file = TestFile::new();
    let executor = Executor::open(file.config().with_save_every(100)).unwrap();
    ok(executor.execute(Request::put("/").body(json!({"k": "v"}))));
    assert_eq!(file.read(), json!({}));

    executor.store().flush().unwrap();
    assert_eq!(file.read(), json!({"k": "v"}));
}
