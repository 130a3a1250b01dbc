//! JSON tree helpers
//!
//! This module defines how the store looks at a `serde_json::Value`:
//! - [`Node`]: tagged view (object, collection, scalar) used for verb dispatch
//! - [`value_at`] / [`value_at_mut`]: walk a resolved [`Location`]
//! - [`deep_merge`]: PATCH semantics (objects merge, everything else replaces)
//! - [`search_text`]: the text form of a value used by substring search

use serde_json::{Map, Value};
use std::fmt;

use crate::path::{Location, Step};

/// Shape of a node, as seen by the verb handlers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// JSON object
    Object,
    /// JSON array; members addressed by index or identifier
    Collection,
    /// Anything else (string, number, bool, null)
    Scalar,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Object => write!(f, "object"),
            NodeKind::Collection => write!(f, "collection"),
            NodeKind::Scalar => write!(f, "scalar"),
        }
    }
}

/// Borrowed, tagged view of a node
///
/// # Examples
///
/// ```
/// use cantrip_core::{Node, NodeKind};
/// use serde_json::json;
///
/// let value = json!({"items": [1, 2]});
/// assert_eq!(Node::of(&value).kind(), NodeKind::Object);
/// assert_eq!(Node::of(&value["items"]).kind(), NodeKind::Collection);
/// assert_eq!(Node::of(&value["items"][0]).kind(), NodeKind::Scalar);
/// ```
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    /// JSON object
    Object(&'a Map<String, Value>),
    /// JSON array
    Collection(&'a Vec<Value>),
    /// Any other value
    Scalar(&'a Value),
}

impl<'a> Node<'a> {
    /// Tag a value
    pub fn of(value: &'a Value) -> Self {
        match value {
            Value::Object(map) => Node::Object(map),
            Value::Array(items) => Node::Collection(items),
            other => Node::Scalar(other),
        }
    }

    /// The shape tag
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Object(_) => NodeKind::Object,
            Node::Collection(_) => NodeKind::Collection,
            Node::Scalar(_) => NodeKind::Scalar,
        }
    }
}

/// Shape of a value
pub fn node_kind(value: &Value) -> NodeKind {
    Node::of(value).kind()
}

/// Walk a resolved location from the root
///
/// Returns `None` if any step no longer exists.
pub fn value_at<'a>(root: &'a Value, location: &Location) -> Option<&'a Value> {
    let mut current = root;
    for step in location.steps() {
        current = match (step, current) {
            (Step::Key(key), Value::Object(obj)) => obj.get(key)?,
            (Step::Index(idx), Value::Array(arr)) => arr.get(*idx)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Walk a resolved location from the root, mutably
pub fn value_at_mut<'a>(root: &'a mut Value, location: &Location) -> Option<&'a mut Value> {
    let mut current = root;
    for step in location.steps() {
        current = match (step, current) {
            (Step::Key(key), Value::Object(obj)) => obj.get_mut(key)?,
            (Step::Index(idx), Value::Array(arr)) => arr.get_mut(*idx)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Deep-merge `patch` into `target`
///
/// - both sides objects: merge key by key, recursively
/// - anything else: the patch value replaces the target value
///
/// Arrays are replaced wholesale, never merged element-wise, and `null` is
/// stored as a value rather than treated as a deletion marker.
///
/// # Examples
///
/// ```
/// use cantrip_core::deep_merge;
/// use serde_json::json;
///
/// let mut target = json!({"a": 1, "tags": ["x", "y"], "nested": {"k": 1, "j": 2}});
/// deep_merge(&mut target, &json!({"tags": ["z"], "nested": {"k": 9}}));
/// assert_eq!(target, json!({"a": 1, "tags": ["z"], "nested": {"k": 9, "j": 2}}));
/// ```
pub fn deep_merge(target: &mut Value, patch: &Value) {
    match (target, patch) {
        (Value::Object(target_obj), Value::Object(patch_obj)) => {
            for (key, value) in patch_obj {
                let nested = value.is_object()
                    && target_obj.get(key).map(Value::is_object).unwrap_or(false);
                match target_obj.get_mut(key) {
                    Some(existing) if nested => deep_merge(existing, value),
                    _ => {
                        target_obj.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (target, patch) => *target = patch.clone(),
    }
}

/// Text form of a value for substring matching
///
/// Strings are used verbatim; every other value uses its compact JSON text.
pub fn search_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Type name used in error messages
pub fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
