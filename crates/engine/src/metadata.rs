//! System metadata: identifiers and timestamps
//!
//! Every member created through the store carries three reserved keys:
//! the configured identifier key (`_id` by default), `_createdDate` and
//! `_modifiedDate`. Timestamps are epoch milliseconds.

use cantrip_core::{is_reserved_key, value_type_name, Error, Map, Result, StorePath, Value};
use chrono::Utc;
use rustc_hash::FxHashSet;
use sha2::{Digest, Sha256};
use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};

/// Creation timestamp key
pub const CREATED_DATE: &str = "_createdDate";

/// Modification timestamp key
pub const MODIFIED_DATE: &str = "_modifiedDate";

/// Identifier length in hex characters (160 bits)
pub const ID_HEX_LEN: usize = 40;

/// Current time in epoch milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Reject a DELETE whose final segment names reserved metadata
///
/// # Errors
///
/// [`Error::Forbidden`] when the last segment starts with the metadata sigil.
pub fn guard_delete(path: &StorePath) -> Result<()> {
    if path.targets_metadata() {
        return Err(Error::forbidden(format!(
            "{} is system metadata and cannot be deleted",
            path
        )));
    }
    Ok(())
}

/// Generates identifiers and applies timestamps
#[derive(Debug)]
pub struct MetadataManager {
    id_attribute: String,
    counter: AtomicU64,
}

impl MetadataManager {
    /// Create a manager for the given identifier key
    pub fn new(id_attribute: impl Into<String>) -> Self {
        MetadataManager {
            id_attribute: id_attribute.into(),
            counter: AtomicU64::new(0),
        }
    }

    /// The identifier key name
    pub fn id_attribute(&self) -> &str {
        &self.id_attribute
    }

    /// The identifier carried by an object, if any
    pub fn id_of<'a>(&self, object: &'a Map<String, Value>) -> Option<&'a Value> {
        object.get(&self.id_attribute)
    }

    /// Generate a fresh identifier
    ///
    /// SHA-256 over (epoch nanos || process counter || 16 random bytes),
    /// truncated to 160 bits and hex-encoded.
    pub fn generate_id(&self) -> String {
        let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let sequence = self.counter.fetch_add(1, Ordering::Relaxed);
        let salt: [u8; 16] = rand::random();

        let mut hasher = Sha256::new();
        hasher.update(nanos.to_le_bytes());
        hasher.update(sequence.to_le_bytes());
        hasher.update(salt);
        let digest = hasher.finalize();

        let mut id = String::with_capacity(ID_HEX_LEN);
        for byte in &digest[..ID_HEX_LEN / 2] {
            let _ = write!(id, "{:02x}", byte);
        }
        id
    }

    /// Attach identifier and both timestamps unless an identifier is present
    ///
    /// Returns `true` if the object was stamped.
    pub fn stamp_new(&self, object: &mut Map<String, Value>) -> bool {
        if object.contains_key(&self.id_attribute) {
            return false;
        }
        let now = now_millis();
        object.insert(self.id_attribute.clone(), Value::String(self.generate_id()));
        object.insert(CREATED_DATE.to_string(), Value::from(now));
        object.insert(MODIFIED_DATE.to_string(), Value::from(now));
        true
    }

    /// Set `_modifiedDate` to now, leaving `_createdDate` alone
    pub fn stamp_modified(&self, object: &mut Map<String, Value>) {
        object.insert(MODIFIED_DATE.to_string(), Value::from(now_millis()));
    }

    /// Refresh `_modifiedDate` only if the object already carries one
    pub fn refresh_modified(&self, object: &mut Map<String, Value>) {
        if object.contains_key(MODIFIED_DATE) {
            self.stamp_modified(object);
        }
    }

    /// Stamp every object member of every collection nested in `value`
    ///
    /// Object properties are walked recursively, and so are the members
    /// themselves. Arrays nested directly in arrays are skipped. Members that
    /// already carry an identifier only get `_modifiedDate` refreshed.
    pub fn stamp_tree(&self, value: &mut Value) {
        match value {
            Value::Object(object) => {
                for child in object.values_mut() {
                    self.stamp_tree(child);
                }
            }
            Value::Array(members) => {
                for member in members.iter_mut() {
                    if let Value::Object(object) = member {
                        if !self.stamp_new(object) {
                            self.refresh_modified(object);
                        }
                        for child in object.values_mut() {
                            self.stamp_tree(child);
                        }
                    }
                }
            }
            _ => {}
        }
    }

    /// Check the identifiers a request body would write
    ///
    /// The body's own identifier and those of collection members nested
    /// anywhere inside it must be strings, and no collection in the body may
    /// repeat one.
    ///
    /// # Errors
    ///
    /// - [`Error::MalformedInput`] for an identifier that is not a string
    /// - [`Error::Conflict`] when two members of one collection share an identifier
    pub fn check_body_ids(&self, body: &Value) -> Result<()> {
        match body {
            Value::Object(object) => self.check_object_ids(object),
            other => self.check_nested_ids(other),
        }
    }

    /// [`check_body_ids`](Self::check_body_ids) for a body already known to be an object
    pub fn check_object_ids(&self, object: &Map<String, Value>) -> Result<()> {
        self.require_string_id(object)?;
        object
            .values()
            .try_for_each(|child| self.check_nested_ids(child))
    }

    fn require_string_id(&self, object: &Map<String, Value>) -> Result<()> {
        match object.get(&self.id_attribute) {
            None | Some(Value::String(_)) => Ok(()),
            Some(other) => Err(Error::malformed(format!(
                "{} must be a string, got {}",
                self.id_attribute,
                value_type_name(other)
            ))),
        }
    }

    fn check_nested_ids(&self, value: &Value) -> Result<()> {
        match value {
            Value::Object(object) => object
                .values()
                .try_for_each(|child| self.check_nested_ids(child)),
            Value::Array(members) => {
                let mut seen: FxHashSet<&str> = FxHashSet::default();
                for member in members {
                    if let Value::Object(object) = member {
                        self.require_string_id(object)?;
                        if let Some(Value::String(id)) = object.get(&self.id_attribute) {
                            if !seen.insert(id.as_str()) {
                                return Err(Error::conflict(format!(
                                    "{} {} appears twice in one collection",
                                    self.id_attribute, id
                                )));
                            }
                        }
                    }
                    self.check_nested_ids(member)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Carry stored metadata into a replacement body
    ///
    /// Reserved keys the body omits are copied over, and a stored
    /// `_createdDate` always wins over the body's. The identifier may change
    /// and `_modifiedDate` is refreshed by the caller.
    ///
    /// # Errors
    ///
    /// [`Error::Conflict`] if the body gives any other stored reserved key a
    /// different value.
    pub fn retain_protected(
        &self,
        stored: &Map<String, Value>,
        body: &mut Map<String, Value>,
    ) -> Result<()> {
        for (key, value) in stored {
            if !is_reserved_key(key) {
                continue;
            }
            if !body.contains_key(key) {
                body.insert(key.clone(), value.clone());
                continue;
            }
            if body.get(key) != Some(value) && !self.is_managed(key) {
                return Err(Error::conflict(format!(
                    "{} is reserved and cannot be changed by PUT",
                    key
                )));
            }
        }
        if let Some(created) = stored.get(CREATED_DATE) {
            body.insert(CREATED_DATE.to_string(), created.clone());
        }
        Ok(())
    }

    /// Reserved keys the store maintains itself
    fn is_managed(&self, key: &str) -> bool {
        key == self.id_attribute || key == CREATED_DATE || key == MODIFIED_DATE
    }
}

impl Default for MetadataManager {
    fn default() -> Self {
        MetadataManager::new(crate::config::DEFAULT_ID_ATTRIBUTE)
    }
}
