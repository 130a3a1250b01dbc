//! Property tests for the verb invariants

use std::collections::BTreeMap;

use crate::common::*;
use cantripdb::Map;
use proptest::prelude::*;

fn key() -> impl Strategy<Value = String> {
    "[a-z]{1,6}"
}

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
        "[a-z ]{0,8}".prop_map(Value::from),
        Just(Value::Null),
    ]
}

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        3 => scalar(),
        1 => prop::collection::vec(scalar(), 0..4).prop_map(Value::Array),
    ]
}

fn object() -> impl Strategy<Value = Map<String, Value>> {
    prop::collection::btree_map(key(), leaf(), 0..6)
        .prop_map(|entries: BTreeMap<String, Value>| entries.into_iter().collect())
}

fn without_metadata(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(k, _)| !k.starts_with('_'))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        ),
        other => other.clone(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn put_then_get_returns_body_with_protected_metadata(
        original in object(),
        body in object(),
    ) {
        let executor = executor(json!({"items": []}));
        let created = ok(executor.execute(Request::post("/items").body(Value::Object(original))));
        let path = format!("/items/{}", created["_id"].as_str().unwrap());

        ok(executor.execute(Request::put(path.as_str()).body(Value::Object(body.clone()))));
        let stored = ok(executor.execute(Request::get(path.as_str())));

        prop_assert_eq!(without_metadata(&stored), Value::Object(body));
        prop_assert_eq!(&stored["_id"], &created["_id"]);
        prop_assert_eq!(&stored["_createdDate"], &created["_createdDate"]);
    }

    #[test]
    fn second_post_with_same_identifier_conflicts(id in "[a-z0-9]{1,12}", first in object(), second in object()) {
        let executor = executor(json!({"items": []}));
        let mut a = first;
        a.insert("_id".to_string(), Value::from(id.clone()));
        let mut b = second;
        b.insert("_id".to_string(), Value::from(id.clone()));

        ok(executor.execute(Request::post("/items").body(Value::Object(a))));
        prop_assert_eq!(
            kind_of(&executor, Request::post("/items").body(Value::Object(b))),
            ErrorKind::Conflict
        );

        let items = ok(executor.execute(Request::get("/items")));
        let bearing = items
            .as_array()
            .unwrap()
            .iter()
            .filter(|m| m["_id"] == id.as_str())
            .count();
        prop_assert_eq!(bearing, 1);
    }

    #[test]
    fn patch_keeps_absent_keys_and_replaces_arrays(stored in object(), patch in object()) {
        let executor = executor(json!({"target": Value::Object(stored.clone())}));
        ok(executor.execute(Request::patch("/target").body(Value::Object(patch.clone()))));
        let merged = ok(executor.execute(Request::get("/target")));

        for (key, value) in &stored {
            if !patch.contains_key(key) {
                prop_assert_eq!(&merged[key.as_str()], value);
            }
        }
        for (key, value) in &patch {
            // scalars and arrays in the body replace wholesale
            prop_assert_eq!(&merged[key.as_str()], value);
        }
    }

    #[test]
    fn delete_by_ordinal_matches_delete_by_identifier(count in 1usize..8, pick in 0usize..8) {
        let pick = pick % count;
        let members: Vec<Value> = (0..count)
            .map(|i| json!({"_id": format!("m{}", i), "n": i}))
            .collect();
        let document = json!({"list": members});

        let by_ordinal = executor(document.clone());
        ok(by_ordinal.execute(Request::delete(format!("/list/{}", pick))));

        let by_id = executor(document);
        ok(by_id.execute(Request::delete(format!("/list/m{}", pick))));

        prop_assert_eq!(by_ordinal.store().snapshot(), by_id.store().snapshot());
    }

    #[test]
    fn nested_collections_never_hold_repeated_identifiers(
        ids in prop::collection::vec("[a-c]", 0..5),
    ) {
        let executor = executor(json!({"items": []}));
        let comments: Vec<Value> = ids.iter().map(|id| json!({"_id": id})).collect();
        let mut distinct = ids.clone();
        distinct.sort();
        distinct.dedup();

        let resp = executor.execute(
            Request::post("/items").body(json!({"_id": "p", "comments": comments})),
        );
        if distinct.len() == ids.len() {
            prop_assert!(resp.is_success());
            let stored = ok(executor.execute(Request::get("/items/p/comments")));
            prop_assert_eq!(stored.as_array().unwrap().len(), ids.len());
        } else {
            prop_assert_eq!(resp.status, 400);
            prop_assert_eq!(executor.store().snapshot(), json!({"items": []}));
        }
    }

    #[test]
    fn one_segment_past_a_leaf_is_not_found(doc in object(), extra in key()) {
        let executor = executor(Value::Object(doc.clone()));
        for (key, value) in &doc {
            let past = format!("/{}/{}", key, extra);
            let resolves = match value {
                Value::Array(items) => extra
                    .parse::<usize>()
                    .map_or(false, |i| i < items.len()),
                _ => false,
            };
            if !resolves {
                prop_assert_eq!(kind_of(&executor, Request::get(past)), ErrorKind::NotFound);
            }
        }
        let missing = format!("/{}x/{}", extra, extra);
        if !doc.contains_key(&format!("{}x", extra)) {
            prop_assert_eq!(kind_of(&executor, Request::get(missing)), ErrorKind::NotFound);
        }
    }
}
