//! Many writers and readers against one store

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use crate::common::*;

const THREADS: usize = 8;
const PER_THREAD: usize = 50;

#[test]
fn concurrent_posts_are_all_kept_with_unique_ids() {
    let executor = Arc::new(executor(json!({"events": []})));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let executor = Arc::clone(&executor);
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    let resp = executor.execute(
                        Request::post("/events").body(json!({"thread": t, "seq": i})),
                    );
                    assert!(resp.is_success());
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let events = ok(executor.execute(Request::get("/events")));
    let events = events.as_array().unwrap();
    assert_eq!(events.len(), THREADS * PER_THREAD);

    let ids: HashSet<&str> = events.iter().filter_map(|e| e["_id"].as_str()).collect();
    assert_eq!(ids.len(), THREADS * PER_THREAD);

    // each writer's members appear in the order it wrote them
    for t in 0..THREADS {
        let seqs: Vec<u64> = events
            .iter()
            .filter(|e| e["thread"] == t)
            .filter_map(|e| e["seq"].as_u64())
            .collect();
        assert_eq!(seqs, (0..PER_THREAD as u64).collect::<Vec<_>>());
    }
}

#[test]
fn readers_never_see_partial_writes() {
    let executor = Arc::new(executor(json!({"pair": {"a": 0, "b": 0}})));

    let writer = {
        let executor = Arc::clone(&executor);
        thread::spawn(move || {
            for n in 1..=200 {
                ok(executor.execute(Request::put("/pair").body(json!({"a": n, "b": n}))));
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let executor = Arc::clone(&executor);
            thread::spawn(move || {
                for _ in 0..200 {
                    let pair = ok(executor.execute(Request::get("/pair")));
                    assert_eq!(pair["a"], pair["b"]);
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(
        ok(executor.execute(Request::get("/pair"))),
        json!({"a": 200, "b": 200})
    );
}
