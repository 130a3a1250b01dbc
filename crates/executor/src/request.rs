//! Normalized requests from the transport boundary

use std::collections::BTreeMap;

use cantrip_core::{Error, Method, Result, Value};
use cantrip_security::Principal;
use serde::{Deserialize, Serialize};

/// One request against the store
///
/// The transport layer is expected to have split the query string and
/// decoded the body already; see [`Request::parse`] for the textual form.
///
/// # Example
///
/// ```
/// use cantrip_executor::{json, Method, Request};
///
/// let req = Request::get("/items").query("limit", "2").query("orderby", "-age");
/// assert_eq!(req.method, Method::Get);
/// assert_eq!(req.query.get("limit").map(String::as_str), Some("2"));
///
/// let req = Request::post("/items").body(json!({"name": "a"}));
/// assert!(req.body.is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Verb
    pub method: Method,
    /// Slash-separated path, `/` for the root
    pub path: String,
    /// Query parameters (GET only)
    #[serde(default)]
    pub query: BTreeMap<String, String>,
    /// Decoded body, `None` when the request had none
    #[serde(default)]
    pub body: Option<Value>,
    /// Caller identity handed to access gates
    #[serde(default)]
    pub principal: Principal,
}

impl Request {
    /// Request with no query, no body and an anonymous caller
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Request {
            method,
            path: path.into(),
            query: BTreeMap::new(),
            body: None,
            principal: Principal::anonymous(),
        }
    }

    /// `GET path`
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// `POST path`
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    /// `PUT path`
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    /// `PATCH path`
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::Patch, path)
    }

    /// `DELETE path`
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Add a query parameter (builder pattern)
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Set the body (builder pattern)
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Set the caller (builder pattern)
    pub fn principal(mut self, principal: Principal) -> Self {
        self.principal = principal;
        self
    }

    /// Build a request from its textual parts
    ///
    /// The method is matched case-insensitively. A missing or blank body
    /// means no body.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedMethod`] for a verb outside GET/POST/PUT/PATCH/DELETE
    /// - [`Error::MalformedInput`] if the body is not valid JSON
    pub fn parse(
        method: &str,
        path: &str,
        query: BTreeMap<String, String>,
        raw_body: Option<&str>,
    ) -> Result<Self> {
        let method: Method = method.trim().parse()?;
        let body = match raw_body.map(str::trim) {
            None | Some("") => None,
            Some(text) => Some(
                serde_json::from_str(text)
                    .map_err(|e| Error::malformed(format!("body is not valid JSON: {}", e)))?,
            ),
        };
        Ok(Request {
            method,
            path: path.to_string(),
            query,
            body,
            principal: Principal::anonymous(),
        })
    }
}
