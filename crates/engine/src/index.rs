//! Per-collection identifier index
//!
//! Caches, for each collection [`Location`], a map identifier → member
//! position. The index is derived state: a cached position is checked
//! against the document before it is trusted, and a failed check falls back
//! to a linear scan that rebuilds the entry.
//!
//! # Invalidation
//!
//! Mutations invalidate the index inside the same critical section as the
//! write itself:
//!
//! | Mutation | Entries dropped |
//! |----------|-----------------|
//! | POST into C | none; C's entry is extended |
//! | PUT/PATCH at L | at or under L, plus L's parent collection |
//! | DELETE member of C | at or under C |
//! | DELETE key at L | at or under L |
//! | root replace | all |

use cantrip_core::{Location, Value};
use rustc_hash::FxHashMap;

type Positions = FxHashMap<String, usize>;

/// Identifier of a collection member, if it is an object with a string id
pub fn member_id<'a>(member: &'a Value, id_attribute: &str) -> Option<&'a str> {
    member.as_object()?.get(id_attribute)?.as_str()
}

/// Position of the first member carrying `id`, by linear scan
pub fn scan_for_id(members: &[Value], id_attribute: &str, id: &str) -> Option<usize> {
    members
        .iter()
        .position(|member| member_id(member, id_attribute) == Some(id))
}

/// Lookup counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexStats {
    /// Lookups answered from a verified cached position
    pub hits: u64,
    /// Lookups that needed a scan
    pub scans: u64,
}

/// Identifier → position cache keyed by collection location
#[derive(Debug, Default)]
pub struct IdentifierIndex {
    enabled: bool,
    entries: FxHashMap<Location, Positions>,
    stats: IndexStats,
}

impl IdentifierIndex {
    /// Create an index; a disabled index always scans
    pub fn new(enabled: bool) -> Self {
        IdentifierIndex {
            enabled,
            entries: FxHashMap::default(),
            stats: IndexStats::default(),
        }
    }

    /// Whether positions are cached
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Number of cached collections
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is cached
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True if `collection` has a cached entry
    pub fn contains(&self, collection: &Location) -> bool {
        self.entries.contains_key(collection)
    }

    /// Lookup counters
    pub fn stats(&self) -> IndexStats {
        self.stats
    }

    /// Find the position of the member of `collection` whose identifier is `id`
    ///
    /// `members` must be the current contents of the collection at
    /// `collection`.
    pub fn lookup(
        &mut self,
        collection: &Location,
        members: &[Value],
        id_attribute: &str,
        id: &str,
    ) -> Option<usize> {
        if !self.enabled {
            self.stats.scans += 1;
            return scan_for_id(members, id_attribute, id);
        }

        if let Some(&position) = self.entries.get(collection).and_then(|e| e.get(id)) {
            if members
                .get(position)
                .and_then(|m| member_id(m, id_attribute))
                == Some(id)
            {
                self.stats.hits += 1;
                return Some(position);
            }
        }

        self.stats.scans += 1;
        let positions = build_positions(members, id_attribute);
        let found = positions.get(id).copied();
        self.entries.insert(collection.clone(), positions);
        found
    }

    /// Extend a cached entry after a member was appended
    pub fn record_append(&mut self, collection: &Location, id: Option<&str>, position: usize) {
        if let (Some(entry), Some(id)) = (self.entries.get_mut(collection), id) {
            entry.entry(id.to_string()).or_insert(position);
        }
    }

    /// Drop the entry for exactly `collection`
    pub fn invalidate(&mut self, collection: &Location) {
        self.entries.remove(collection);
    }

    /// Drop every entry at or under `location`
    pub fn invalidate_under(&mut self, location: &Location) {
        if location.is_root() {
            self.entries.clear();
            return;
        }
        self.entries.retain(|key, _| !location.is_ancestor_of(key));
    }

    /// Drop everything
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

fn build_positions(members: &[Value], id_attribute: &str) -> Positions {
    let mut positions = Positions::default();
    for (position, member) in members.iter().enumerate() {
        if let Some(id) = member_id(member, id_attribute) {
            positions.entry(id.to_string()).or_insert(position);
        }
    }
    positions
}
