//! Write semantics for POST, PUT, PATCH and DELETE
//!
//! [`MutationEngine`] borrows the document, the identifier index and the
//! metadata manager for the duration of one write. Every operation resolves
//! the path first, then checks the target's shape, then mutates by
//! re-walking the resolved [`Location`] from the root.
//!
//! | Verb | Target | Effect |
//! |------|--------|--------|
//! | POST | collection | stamp (unless identified), reject duplicate id, append |
//! | PUT | object | sibling id check, replace keeping protected metadata |
//! | PATCH | object | sibling id check, deep merge |
//! | DELETE | member or key | remove from the parent |
//!
//! Every body is checked before anything is written: identifiers must be
//! strings and no collection inside the body may repeat one.
//!
//! The root is special: PUT swaps the whole document but keeps its reserved
//! keys (the `_acl` table among them), PATCH merges into it, DELETE is
//! rejected.

use cantrip_core::{
    deep_merge, is_reserved_key, node_kind, value_at, value_at_mut, value_type_name, Error,
    Location, Map, NodeKind, Result, Step, StorePath, Value,
};

use crate::index::IdentifierIndex;
use crate::metadata::{guard_delete, MetadataManager, CREATED_DATE, MODIFIED_DATE};
use crate::resolver::{resolve, Resolution};

/// One write against the document
pub struct MutationEngine<'a> {
    document: &'a mut Value,
    index: &'a mut IdentifierIndex,
    meta: &'a MetadataManager,
}

impl<'a> MutationEngine<'a> {
    /// Borrow the pieces a write needs
    pub fn new(
        document: &'a mut Value,
        index: &'a mut IdentifierIndex,
        meta: &'a MetadataManager,
    ) -> Self {
        MutationEngine {
            document,
            index,
            meta,
        }
    }

    fn resolve(&mut self, path: &StorePath) -> Result<Resolution> {
        resolve(self.document, path, self.meta.id_attribute(), self.index)
    }

    fn node_mut(&mut self, location: &Location, path: &StorePath) -> Result<&mut Value> {
        value_at_mut(self.document, location).ok_or_else(|| Error::not_found(path.to_string()))
    }

    /// Append a new member to the collection at `path`
    ///
    /// Returns the stored member.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if the path does not resolve
    /// - [`Error::InvalidOperation`] if the target is not a collection
    /// - [`Error::MalformedInput`] if the body is not an object or carries a
    ///   non-string identifier
    /// - [`Error::Conflict`] if a member already carries the body's identifier,
    ///   or a collection inside the body repeats one
    pub fn post(&mut self, path: &StorePath, body: Value) -> Result<Value> {
        let resolution = self.resolve(path)?;
        let target = value_at(self.document, &resolution.target)
            .ok_or_else(|| Error::not_found(path.to_string()))?;
        if node_kind(target) != NodeKind::Collection {
            return Err(Error::invalid_operation(format!(
                "POST requires a collection, {} is {}",
                path,
                node_kind(target)
            )));
        }
        let mut member = match body {
            Value::Object(map) => map,
            other => {
                return Err(Error::malformed(format!(
                    "POST body must be an object, got {}",
                    value_type_name(&other)
                )))
            }
        };
        self.meta.check_object_ids(&member)?;

        match self.meta.id_of(&member) {
            Some(id) => {
                let taken = target.as_array().map_or(false, |members| {
                    members
                        .iter()
                        .any(|m| m.get(self.meta.id_attribute()) == Some(id))
                });
                if taken {
                    return Err(Error::conflict(format!(
                        "{} {} already exists in {}",
                        self.meta.id_attribute(),
                        id,
                        path
                    )));
                }
            }
            None => {
                self.meta.stamp_new(&mut member);
            }
        }

        let mut member = Value::Object(member);
        self.meta.stamp_tree(&mut member);

        let stored = member.clone();
        let id = stored
            .get(self.meta.id_attribute())
            .and_then(Value::as_str)
            .map(str::to_string);
        let collection = self.node_mut(&resolution.target, path)?;
        let position = match collection {
            Value::Array(members) => {
                members.push(member);
                members.len() - 1
            }
            _ => return Err(Error::invalid_operation("collection changed shape")),
        };
        self.index
            .record_append(&resolution.target, id.as_deref(), position);
        Ok(stored)
    }

    /// Replace the object at `path`
    ///
    /// Stored reserved keys the body omits are kept and `_modifiedDate` is
    /// refreshed if the target had one. At the root the body may also be an
    /// array, provided the stored document has no reserved keys to lose.
    /// Returns the new value at `path`.
    pub fn put(&mut self, path: &StorePath, body: Value) -> Result<Value> {
        if path.is_root() {
            return self.put_root(body);
        }

        let resolution = self.resolve(path)?;
        let stored = self.object_target(&resolution, path, "PUT")?;
        let mut replacement = match body {
            Value::Object(map) => map,
            other => {
                return Err(Error::malformed(format!(
                    "PUT body must be an object, got {}",
                    value_type_name(&other)
                )))
            }
        };
        self.meta.check_object_ids(&replacement)?;
        self.check_sibling_ids(&resolution, &stored, &replacement, path)?;

        self.meta.retain_protected(&stored, &mut replacement)?;
        if stored.contains_key(MODIFIED_DATE) {
            self.meta.stamp_modified(&mut replacement);
        }
        let mut replacement = Value::Object(replacement);
        self.meta.stamp_tree(&mut replacement);

        *self.node_mut(&resolution.target, path)? = replacement.clone();
        self.invalidate_written(&resolution);
        Ok(replacement)
    }

    fn put_root(&mut self, body: Value) -> Result<Value> {
        let mut body = match body {
            Value::Object(_) | Value::Array(_) => body,
            other => {
                return Err(Error::malformed(format!(
                    "document root must be an object or array, got {}",
                    value_type_name(&other)
                )))
            }
        };
        self.meta.check_body_ids(&body)?;

        if let Value::Object(stored) = &*self.document {
            match &mut body {
                Value::Object(replacement) => {
                    self.meta.retain_protected(stored, replacement)?;
                    if stored.contains_key(MODIFIED_DATE) {
                        self.meta.stamp_modified(replacement);
                    }
                }
                _ if stored.keys().any(|key| is_reserved_key(key)) => {
                    return Err(Error::conflict(
                        "replacing the root with an array would drop its reserved keys",
                    ))
                }
                _ => {}
            }
        }
        self.meta.stamp_tree(&mut body);

        *self.document = body.clone();
        self.index.clear();
        Ok(body)
    }

    /// Deep-merge `body` into the object at `path`
    ///
    /// Nested objects merge key by key; arrays and scalars in the body
    /// replace what is stored. A stored `_createdDate` is never changed.
    /// Returns the merged value at `path`.
    pub fn patch(&mut self, path: &StorePath, body: Value) -> Result<Value> {
        let mut patch = match body {
            Value::Object(map) => map,
            other => {
                return Err(Error::malformed(format!(
                    "PATCH body must be an object, got {}",
                    value_type_name(&other)
                )))
            }
        };

        if path.is_root() {
            if !self.document.is_object() {
                return Err(Error::invalid_operation(format!(
                    "PATCH requires an object, {} is {}",
                    path,
                    node_kind(self.document)
                )));
            }
            self.meta.check_object_ids(&patch)?;
            let mut patch = Value::Object(patch);
            self.meta.stamp_tree(&mut patch);
            deep_merge(self.document, &patch);
            self.index.clear();
            return Ok(self.document.clone());
        }

        let resolution = self.resolve(path)?;
        let stored = self.object_target(&resolution, path, "PATCH")?;
        self.meta.check_object_ids(&patch)?;
        self.check_sibling_ids(&resolution, &stored, &patch, path)?;

        if stored.contains_key(CREATED_DATE) {
            patch.remove(CREATED_DATE);
        }
        if stored.contains_key(MODIFIED_DATE) {
            self.meta.stamp_modified(&mut patch);
        }
        let mut patch = Value::Object(patch);
        self.meta.stamp_tree(&mut patch);

        let target = self.node_mut(&resolution.target, path)?;
        deep_merge(target, &patch);
        let merged = target.clone();
        self.invalidate_written(&resolution);
        Ok(merged)
    }

    /// Remove the member or key at `path`
    ///
    /// Returns the removed value.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidOperation`] for the root
    /// - [`Error::NotFound`] if the path does not resolve
    /// - [`Error::Forbidden`] if the final segment is reserved metadata
    pub fn delete(&mut self, path: &StorePath) -> Result<Value> {
        if path.is_root() {
            return Err(Error::invalid_operation("the document root cannot be deleted"));
        }
        let resolution = self.resolve(path)?;
        guard_delete(path)?;

        let parent_location = resolution
            .parent
            .clone()
            .ok_or_else(|| Error::invalid_operation("the document root cannot be deleted"))?;
        let step = resolution
            .last_step()
            .cloned()
            .ok_or_else(|| Error::invalid_operation("the document root cannot be deleted"))?;

        let parent = self.node_mut(&parent_location, path)?;
        let removed = match (parent, step) {
            (Value::Array(members), Step::Index(idx)) if idx < members.len() => {
                members.remove(idx)
            }
            (Value::Object(map), Step::Key(key)) => map
                .remove(&key)
                .ok_or_else(|| Error::not_found(path.to_string()))?,
            _ => return Err(Error::not_found(path.to_string())),
        };

        match resolution.last_step() {
            Some(Step::Index(_)) => self.index.invalidate_under(&parent_location),
            _ => self.index.invalidate_under(&resolution.target),
        }
        Ok(removed)
    }

    /// The stored object at a resolved PUT/PATCH target
    fn object_target(
        &self,
        resolution: &Resolution,
        path: &StorePath,
        verb: &str,
    ) -> Result<Map<String, Value>> {
        match value_at(self.document, &resolution.target) {
            Some(Value::Object(map)) => Ok(map.clone()),
            Some(Value::Array(_)) => Err(Error::invalid_operation(format!(
                "{} cannot target collection {}; POST to add members",
                verb, path
            ))),
            Some(other) => Err(Error::invalid_operation(format!(
                "{} requires an object, {} is a {}",
                verb,
                path,
                value_type_name(other)
            ))),
            None => Err(Error::not_found(path.to_string())),
        }
    }

    /// Reject an identifier change that would collide with a sibling
    fn check_sibling_ids(
        &self,
        resolution: &Resolution,
        stored: &Map<String, Value>,
        body: &Map<String, Value>,
        path: &StorePath,
    ) -> Result<()> {
        let new_id = match self.meta.id_of(body) {
            Some(id) if self.meta.id_of(stored) != Some(id) => id,
            _ => return Ok(()),
        };
        let own_position = match resolution.last_step() {
            Some(Step::Index(idx)) => *idx,
            _ => return Ok(()),
        };
        let siblings = resolution
            .parent
            .as_ref()
            .and_then(|parent| value_at(self.document, parent))
            .and_then(Value::as_array);
        let collides = siblings.map_or(false, |members| {
            members.iter().enumerate().any(|(position, member)| {
                position != own_position && member.get(self.meta.id_attribute()) == Some(new_id)
            })
        });
        if collides {
            return Err(Error::conflict(format!(
                "{} {} is already used by a sibling of {}",
                self.meta.id_attribute(),
                new_id,
                path
            )));
        }
        Ok(())
    }

    fn invalidate_written(&mut self, resolution: &Resolution) {
        self.index.invalidate_under(&resolution.target);
        if let (Some(parent), Some(Step::Index(_))) = (&resolution.parent, resolution.last_step()) {
            self.index.invalidate(parent);
        }
    }
}
