//! Responses handed back to the transport boundary

use cantrip_core::{json, Error, Value};
use serde::{Deserialize, Serialize};

/// Status code plus JSON body
///
/// Failures carry `{"error": "<message>"}` with the status from
/// [`Error::status`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// HTTP-style status code
    pub status: u16,
    /// Response body
    pub body: Value,
}

impl Response {
    /// `200` with `body`
    pub fn ok(body: Value) -> Self {
        Response { status: 200, body }
    }

    /// `200 {"success": true}`
    pub fn success() -> Self {
        Self::ok(json!({"success": true}))
    }

    /// Error response
    pub fn from_error(err: &Error) -> Self {
        Response {
            status: err.status(),
            body: json!({"error": err.to_string()}),
        }
    }

    /// True for 2xx statuses
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The error message, if this is an error response
    pub fn error_message(&self) -> Option<&str> {
        if self.is_success() {
            return None;
        }
        self.body.get("error").and_then(Value::as_str)
    }
}

impl From<Error> for Response {
    fn from(err: Error) -> Self {
        Response::from_error(&err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_shape() {
        let resp = Response::from(Error::not_found("/a/b"));
        assert_eq!(resp.status, 404);
        assert!(!resp.is_success());
        assert_eq!(
            resp.error_message(),
            Some("Requested node doesn't exist: /a/b")
        );

        let resp = Response::from(Error::conflict("duplicate _id"));
        assert_eq!(resp.status, 400);
    }

    #[test]
    fn test_success_response() {
        let resp = Response::success();
        assert!(resp.is_success());
        assert_eq!(resp.body, json!({"success": true}));
        assert_eq!(resp.error_message(), None);
    }
}
