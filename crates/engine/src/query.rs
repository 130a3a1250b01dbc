//! Read-side refinement
//!
//! GET responses pass through [`QueryOptions::refine`], which always works
//! on a deep copy of the resolved node. Steps run in a fixed order:
//!
//! 1. shallow projection
//! 2. search filter (collections only)
//! 3. ordering (collections only)
//! 4. pagination (collections only)
//! 5. field selection
//!
//! A scalar node is wrapped as `{"value": <scalar>}`.

use cantrip_core::{json, search_text, Error, Map, Result, Value};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Placeholder for a projected-away object
pub const OBJECT_SENTINEL: &str = "[object Object]";

/// Placeholder for a projected-away array
pub const ARRAY_SENTINEL: &str = "[object Array]";

/// How `q` matches members
#[derive(Debug, Clone, PartialEq)]
pub enum Search {
    /// Every listed field must contain the given text
    Structured(Map<String, Value>),
    /// Any field must contain the text
    Text(String),
}

/// Sort key for `orderby`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    /// Member field to compare
    pub field: String,
    /// `-field` sorts descending
    pub descending: bool,
}

/// Parsed GET query parameters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    /// Replace nested objects/arrays with placeholders
    pub shallow: bool,
    /// `q`
    pub search: Option<Search>,
    /// `orderby`
    pub order_by: Option<OrderBy>,
    /// `offset`
    pub offset: Option<usize>,
    /// `limit`
    pub limit: Option<usize>,
    /// `fields`
    pub fields: Option<Vec<String>>,
}

impl QueryOptions {
    /// Parse the query map
    ///
    /// Unknown parameters are ignored. A `q` that is not a JSON object is
    /// treated as free text rather than rejected.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedInput`] if `offset` or `limit` is not a
    /// non-negative integer.
    pub fn from_params(params: &BTreeMap<String, String>) -> Result<Self> {
        let shallow = params
            .get("shallow")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(false);

        let search = params
            .get("q")
            .filter(|q| !q.is_empty())
            .map(|q| match serde_json::from_str::<Value>(q) {
                Ok(Value::Object(map)) => Search::Structured(map),
                _ => Search::Text(q.clone()),
            });

        let order_by = params.get("orderby").and_then(|raw| {
            let (field, descending) = match raw.strip_prefix('-') {
                Some(field) => (field, true),
                None => (raw.as_str(), false),
            };
            (!field.is_empty()).then(|| OrderBy {
                field: field.to_string(),
                descending,
            })
        });

        let fields = params.get("fields").and_then(|raw| {
            let list: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(str::to_string)
                .collect();
            (!list.is_empty()).then_some(list)
        });

        Ok(QueryOptions {
            shallow,
            search,
            order_by,
            offset: parse_count(params, "offset")?,
            limit: parse_count(params, "limit")?,
            fields,
        })
    }

    /// Force shallow projection on (config default)
    pub fn with_shallow(mut self, shallow: bool) -> Self {
        self.shallow |= shallow;
        self
    }

    /// Produce the response value for `node`
    pub fn refine(&self, node: &Value, case_sensitive: bool) -> Value {
        match node {
            Value::Object(map) => {
                let mut map = map.clone();
                if self.shallow {
                    project_object(&mut map);
                }
                if let Some(fields) = &self.fields {
                    select_fields(&mut map, fields);
                }
                Value::Object(map)
            }
            Value::Array(members) => {
                let mut members = members.clone();
                if self.shallow {
                    for member in members.iter_mut() {
                        project_member(member);
                    }
                }
                if let Some(search) = &self.search {
                    members.retain(|m| matches(m, search, case_sensitive));
                }
                if let Some(order) = &self.order_by {
                    members.sort_by(|a, b| {
                        let ordering = compare_field(a, b, &order.field);
                        if order.descending {
                            ordering.reverse()
                        } else {
                            ordering
                        }
                    });
                }
                let members = members
                    .into_iter()
                    .skip(self.offset.unwrap_or(0))
                    .take(self.limit.unwrap_or(usize::MAX));
                let members: Vec<Value> = match &self.fields {
                    Some(fields) => members
                        .map(|mut member| {
                            if let Value::Object(map) = &mut member {
                                select_fields(map, fields);
                            }
                            member
                        })
                        .collect(),
                    None => members.collect(),
                };
                Value::Array(members)
            }
            scalar => json!({ "value": scalar }),
        }
    }
}

fn parse_count(params: &BTreeMap<String, String>, name: &str) -> Result<Option<usize>> {
    match params.get(name) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<usize>().map(Some).map_err(|_| {
            Error::malformed(format!(
                "{} must be a non-negative integer, got {:?}",
                name, raw
            ))
        }),
    }
}

fn sentinel(value: &Value) -> Option<Value> {
    match value {
        Value::Object(_) => Some(Value::String(OBJECT_SENTINEL.to_string())),
        Value::Array(_) => Some(Value::String(ARRAY_SENTINEL.to_string())),
        _ => None,
    }
}

fn project_object(map: &mut Map<String, Value>) {
    for value in map.values_mut() {
        if let Some(placeholder) = sentinel(value) {
            *value = placeholder;
        }
    }
}

fn project_member(member: &mut Value) {
    if member.is_array() {
        *member = Value::String(ARRAY_SENTINEL.to_string());
    } else if let Value::Object(map) = member {
        project_object(map);
    }
}

fn select_fields(map: &mut Map<String, Value>, fields: &[String]) {
    map.retain(|key, _| fields.iter().any(|f| f == key));
}

fn contains(haystack: &Value, needle: &str, case_sensitive: bool) -> bool {
    let text = search_text(haystack);
    if case_sensitive {
        text.contains(needle)
    } else {
        text.to_lowercase().contains(&needle.to_lowercase())
    }
}

fn matches(member: &Value, search: &Search, case_sensitive: bool) -> bool {
    match (search, member) {
        (Search::Text(term), Value::Object(map)) => {
            map.values().any(|v| contains(v, term, case_sensitive))
        }
        (Search::Text(term), other) => contains(other, term, case_sensitive),
        (Search::Structured(criteria), Value::Object(map)) => {
            criteria.iter().all(|(key, wanted)| {
                map.get(key)
                    .map(|v| contains(v, &search_text(wanted), case_sensitive))
                    .unwrap_or(false)
            })
        }
        (Search::Structured(_), _) => false,
    }
}

fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Bool(_)) => 1,
        Some(Value::Number(_)) => 2,
        Some(Value::String(_)) => 3,
        Some(_) => 4,
    }
}

/// Total order over member fields: missing/null < bool < number < string < other
fn compare_field(a: &Value, b: &Value, field: &str) -> Ordering {
    let left = a.get(field);
    let right = b.get(field);
    match (left, right) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => match type_rank(left).cmp(&type_rank(right)) {
            Ordering::Equal if type_rank(left) == 4 => {
                search_text(left.unwrap_or(&Value::Null))
                    .cmp(&search_text(right.unwrap_or(&Value::Null)))
            }
            ordering => ordering,
        },
    }
}
