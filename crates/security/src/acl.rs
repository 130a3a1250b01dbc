//! Group-based access control stored in the document
//!
//! The ACL table lives at `/_acl`:
//!
//! ```json
//! {
//!   "_acl": {
//!     "/users":             { "POST": ["admin"] },
//!     "/users/:id/comments": { "DELETE": ["admin", "moderator"] }
//!   }
//! }
//! ```
//!
//! For each prefix of the request path, root first, every pattern of the
//! same length that matches the prefix is consulted. A pattern listing
//! groups for the request method is a restriction; sharing a group with the
//! caller grants access at once. If any restriction was seen and none
//! granted, the request is denied. No table, or no restriction, means allow.
//!
//! The table is reserved metadata: DELETE of `/_acl` is forbidden and a root
//! PUT keeps it unless the body repeats it unchanged. Edit it with PATCH.

use cantrip_core::{Error, Method, Result, StorePath, Value};
use tracing::debug;

use crate::gate::AccessGate;
use crate::pattern::UrlPattern;
use crate::principal::Principal;

/// Default key holding the ACL table at the document root
pub const ACL_KEY: &str = "_acl";

/// Access gate driven by the `/_acl` table
#[derive(Debug, Clone)]
pub struct AclGate {
    key: String,
}

impl Default for AclGate {
    fn default() -> Self {
        AclGate {
            key: ACL_KEY.to_string(),
        }
    }
}

impl AclGate {
    /// Gate reading the table at `/_acl`
    pub fn new() -> Self {
        Self::default()
    }

    /// Gate reading the table at a different root key
    pub fn with_key(key: impl Into<String>) -> Self {
        AclGate { key: key.into() }
    }
}

/// Groups a table entry allows for `method`; a bare string is one group
fn allowed_groups<'a>(rules: &'a Value, method: Method) -> Option<Vec<&'a str>> {
    match rules.get(method.as_str())? {
        Value::String(group) => Some(vec![group.as_str()]),
        Value::Array(groups) => Some(groups.iter().filter_map(Value::as_str).collect()),
        _ => None,
    }
}

impl AccessGate for AclGate {
    fn authorize(
        &self,
        method: Method,
        path: &StorePath,
        principal: &Principal,
        document: &Value,
    ) -> Result<()> {
        let table = match document.get(&self.key).and_then(Value::as_object) {
            Some(table) => table,
            None => return Ok(()),
        };
        let patterns: Vec<(UrlPattern, &Value)> = table
            .iter()
            .map(|(raw, rules)| (UrlPattern::parse(raw), rules))
            .collect();

        let mut restricted = false;
        for len in 0..=path.len() {
            for (pattern, rules) in &patterns {
                if !pattern.matches_prefix(path, len) {
                    continue;
                }
                if let Some(groups) = allowed_groups(rules, method) {
                    restricted = true;
                    if principal.in_any(groups) {
                        return Ok(());
                    }
                }
            }
        }

        if restricted {
            debug!(
                target: "cantrip::acl",
                method = %method,
                path = %path,
                user = ?principal.user,
                "Access denied"
            );
            return Err(Error::access_denied(format!("{} {}", method, path)));
        }
        Ok(())
    }
}
