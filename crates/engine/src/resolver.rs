//! Tree resolution
//!
//! Turns a [`StorePath`] into a [`Location`] by walking the document one
//! segment at a time:
//!
//! 1. object: the segment must be an existing key
//! 2. collection: the segment is an ordinal index when it is the canonical
//!    decimal form of an in-bounds position, otherwise it is matched against
//!    the members' identifier field
//! 3. anything else: not found
//!
//! Exact key (or index) match always wins over identifier match. The walk
//! returns no partial result: any unresolvable segment fails the whole path.

use cantrip_core::{Error, Location, Result, Step, StorePath, Value};

use crate::index::IdentifierIndex;

/// Where a path landed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Location of the addressed node
    pub target: Location,
    /// Location of its container, `None` for the root
    pub parent: Option<Location>,
}

impl Resolution {
    fn new(target: Location) -> Self {
        let parent = target.parent();
        Resolution { target, parent }
    }

    /// The step from the parent to the target
    pub fn last_step(&self) -> Option<&Step> {
        self.target.last_step()
    }
}

/// Parse `segment` as an array position
///
/// Only canonical decimal forms count: `"1"` but not `"01"` or `"+1"`.
pub fn ordinal(segment: &str, len: usize) -> Option<usize> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if segment.len() > 1 && segment.starts_with('0') {
        return None;
    }
    segment.parse::<usize>().ok().filter(|&idx| idx < len)
}

/// Resolve `path` against `document`
///
/// # Errors
///
/// [`Error::NotFound`] naming the full request path if any segment fails
/// to resolve.
pub fn resolve(
    document: &Value,
    path: &StorePath,
    id_attribute: &str,
    index: &mut IdentifierIndex,
) -> Result<Resolution> {
    let mut location = Location::root();
    let mut current = document;

    for segment in path.segments() {
        let (step, next) = match current {
            Value::Object(map) => match map.get(segment.as_str()) {
                Some(child) => (Step::Key(segment.clone()), child),
                None => return Err(Error::not_found(path.to_string())),
            },
            Value::Array(members) => {
                let position = match ordinal(segment, members.len()) {
                    Some(idx) => Some(idx),
                    None => index.lookup(&location, members, id_attribute, segment),
                };
                match position {
                    Some(idx) => (Step::Index(idx), &members[idx]),
                    None => return Err(Error::not_found(path.to_string())),
                }
            }
            _ => return Err(Error::not_found(path.to_string())),
        };
        location.push(step);
        current = next;
    }

    Ok(Resolution::new(location))
}

/// Resolve the container of `path`
///
/// Runs the same walk over the path with its final segment removed.
/// Returns `Ok(None)` for the root, which has no container.
pub fn resolve_parent(
    document: &Value,
    path: &StorePath,
    id_attribute: &str,
    index: &mut IdentifierIndex,
) -> Result<Option<Resolution>> {
    match path.parent() {
        Some(parent) => resolve(document, &parent, id_attribute, index).map(Some),
        None => Ok(None),
    }
}
