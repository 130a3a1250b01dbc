//! Request/response walkthroughs
//!
//! Each test starts from a small document and checks both the response to
//! a write and what a following GET sees.

use crate::common::*;

#[test]
fn put_root_then_get_root() {
    let executor = executor(json!({}));
    assert_eq!(
        ok(executor.execute(Request::put("/").body(json!({"foo": "bar"})))),
        json!({"success": true})
    );
    assert_eq!(ok(executor.execute(Request::get("/"))), json!({"foo": "bar"}));
}

#[test]
fn post_into_empty_collection() {
    let executor = executor(json!({"items": []}));
    let created = ok(executor.execute(Request::post("/items").body(json!({"name": "a"}))));

    assert!(created["_id"].is_string());
    assert!(created["_createdDate"].is_number());
    assert!(created["_modifiedDate"].is_number());
    assert_eq!(created["name"], "a");

    let items = ok(executor.execute(Request::get("/items")));
    assert_eq!(items.as_array().map(Vec::len), Some(1));
}

#[test]
fn post_with_existing_identifier_conflicts() {
    let executor = executor(json!({"items": []}));
    let created = ok(executor.execute(Request::post("/items").body(json!({"name": "a"}))));

    let resp = executor.execute(
        Request::post("/items").body(json!({"_id": created["_id"].clone(), "name": "b"})),
    );
    assert_eq!(resp.status, 400);
    assert_eq!(
        kind_of(
            &executor,
            Request::post("/items").body(json!({"_id": created["_id"].clone()}))
        ),
        ErrorKind::Conflict
    );
}

#[test]
fn delete_key_then_get_parent() {
    let executor = executor(json!({"a": {"b": 1, "c": 2}}));
    assert_eq!(
        ok(executor.execute(Request::delete("/a/b"))),
        json!({"success": true})
    );
    assert_eq!(ok(executor.execute(Request::get("/a"))), json!({"c": 2}));
}

#[test]
fn delete_identifier_is_forbidden() {
    let executor = executor(json!({"a": {"_id": "x", "n": 1}}));
    let resp = executor.execute(Request::delete("/a/_id"));
    assert_eq!(resp.status, 400);
    assert!(resp.error_message().unwrap().starts_with("Forbidden"));
    assert_eq!(
        ok(executor.execute(Request::get("/a"))),
        json!({"_id": "x", "n": 1})
    );
}

#[test]
fn member_addressed_by_ordinal_and_identifier() {
    let executor = executor(json!({"users": []}));
    let alice = ok(executor.execute(Request::post("/users").body(json!({"name": "alice"}))));
    let id = alice["_id"].as_str().unwrap().to_string();

    let by_ordinal = ok(executor.execute(Request::get("/users/0")));
    let by_id = ok(executor.execute(Request::get(format!("/users/{}", id))));
    assert_eq!(by_ordinal, by_id);

    ok(executor.execute(Request::patch(format!("/users/{}", id)).body(json!({"age": 30}))));
    assert_eq!(
        ok(executor.execute(Request::get("/users/0/age"))),
        json!({"value": 30})
    );
}

#[test]
fn errors_map_to_status_codes() {
    let executor = executor(json!({"obj": {"k": 1}, "list": []}));
    let cases = [
        (Request::get("/missing"), 404),
        (Request::post("/obj").body(json!({})), 400),
        (Request::put("/list").body(json!({})), 400),
        (Request::patch("/obj").body(json!("x")), 400),
        (Request::delete("/obj/_id"), 404),
        (Request::delete("/"), 400),
    ];
    for (request, status) in cases {
        let label = format!("{} {}", request.method, request.path);
        assert_eq!(executor.execute(request).status, status, "{}", label);
    }
    assert_eq!(
        executor
            .execute_raw("HEAD", "/", Default::default(), None)
            .status,
        405
    );
}

#[test]
fn query_refinement_end_to_end() {
    let executor = executor(json!({"books": []}));
    for (title, year) in [("Dune", 1965), ("Emma", 1815), ("Ulysses", 1922), ("Beloved", 1987)] {
        ok(executor.execute(Request::post("/books").body(json!({"title": title, "year": year}))));
    }

    let page = ok(executor.execute(
        Request::get("/books")
            .query("orderby", "year")
            .query("offset", "1")
            .query("limit", "2")
            .query("fields", "title"),
    ));
    assert_eq!(page, json!([{"title": "Ulysses"}, {"title": "Dune"}]));

    let found = ok(executor.execute(Request::get("/books").query("q", "Emma")));
    assert_eq!(found.as_array().map(Vec::len), Some(1));

    let shallow = ok(executor.execute(Request::get("/").query("shallow", "1")));
    assert_eq!(shallow, json!({"books": "[object Array]"}));
}
