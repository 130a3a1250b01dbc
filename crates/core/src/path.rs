//! Path types for addressing nodes in the document
//!
//! Two kinds of paths exist:
//! - [`StorePath`]: what a client sends, slash-separated segments that may be
//!   object keys, ordinal indexes or member identifiers.
//! - [`Location`]: what the resolver produces, a sequence of concrete [`Step`]s
//!   (key or index) that can be re-walked from the root without any identifier
//!   lookups.
//!
//! Locations are plain values, never references into the document, so a
//! mutation always re-walks from the root and cannot act on a stale alias.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Maximum number of segments accepted in a request path
pub const MAX_PATH_SEGMENTS: usize = 256;

/// Reserved prefix for system metadata keys
pub const METADATA_SIGIL: char = '_';

/// True when `key` is reserved system metadata
pub fn is_reserved_key(key: &str) -> bool {
    key.starts_with(METADATA_SIGIL)
}

/// A slash-separated request path
///
/// Empty segments are discarded, so `/users//42/` and `users/42` are the
/// same path. The empty path denotes the document root.
///
/// # Examples
///
/// ```
/// use cantrip_core::StorePath;
///
/// let path = StorePath::parse("/users/42/").unwrap();
/// assert_eq!(path.segments(), &["users".to_string(), "42".to_string()]);
/// assert_eq!(path.last(), Some("42"));
/// assert_eq!(path.parent().unwrap().to_string(), "/users");
/// assert!(StorePath::parse("/").unwrap().is_root());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct StorePath {
    segments: Vec<String>,
}

impl StorePath {
    /// The root path
    pub fn root() -> Self {
        StorePath {
            segments: Vec::new(),
        }
    }

    /// Split a raw path on `/`, discarding empty segments
    ///
    /// Fails with [`Error::MalformedInput`] past [`MAX_PATH_SEGMENTS`].
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let segments: Vec<String> = raw
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if segments.len() > MAX_PATH_SEGMENTS {
            return Err(Error::malformed(format!(
                "path has {} segments, maximum is {}",
                segments.len(),
                MAX_PATH_SEGMENTS
            )));
        }
        Ok(StorePath { segments })
    }

    /// Build a path from already-split segments
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StorePath {
            segments: segments
                .into_iter()
                .map(Into::into)
                .filter(|s: &String| !s.is_empty())
                .collect(),
        }
    }

    /// The path segments
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// True for the root path
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// True for the root path
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Final segment, `None` at the root
    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// The path with its final segment removed, `None` at the root
    pub fn parent(&self) -> Option<StorePath> {
        if self.segments.is_empty() {
            None
        } else {
            let mut parent = self.clone();
            parent.segments.pop();
            Some(parent)
        }
    }

    /// Append a segment (builder pattern)
    pub fn join(mut self, segment: impl Into<String>) -> Self {
        let segment = segment.into();
        if !segment.is_empty() {
            self.segments.push(segment);
        }
        self
    }

    /// True when the final segment names reserved metadata
    pub fn targets_metadata(&self) -> bool {
        self.last().map(is_reserved_key).unwrap_or(false)
    }
}

impl FromStr for StorePath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StorePath::parse(s)
    }
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "/");
        }
        for seg in &self.segments {
            write!(f, "/{}", seg)?;
        }
        Ok(())
    }
}

/// A concrete step from a node to one of its children
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Step {
    /// Object property
    Key(String),
    /// Array position
    Index(usize),
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Key(k) => write!(f, ".{}", k),
            Step::Index(i) => write!(f, "[{}]", i),
        }
    }
}

/// A resolved address of a node, relative to the document root
///
/// # Examples
///
/// ```
/// use cantrip_core::{Location, Step};
///
/// let items = Location::root().key("items");
/// let first = items.clone().index(0);
/// assert!(items.is_ancestor_of(&first));
/// assert_eq!(first.parent(), Some(items));
/// assert_eq!(first.last_step(), Some(&Step::Index(0)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Location {
    steps: SmallVec<[Step; 8]>,
}

impl Location {
    /// The document root
    pub fn root() -> Self {
        Location {
            steps: SmallVec::new(),
        }
    }

    /// The steps from the root
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Number of steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// True at the root
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// True at the root
    pub fn is_root(&self) -> bool {
        self.steps.is_empty()
    }

    /// Append a key step (builder pattern)
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.steps.push(Step::Key(key.into()));
        self
    }

    /// Append an index step (builder pattern)
    pub fn index(mut self, idx: usize) -> Self {
        self.steps.push(Step::Index(idx));
        self
    }

    /// Push a step (mutating)
    pub fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    /// The location one step up, `None` at the root
    pub fn parent(&self) -> Option<Location> {
        if self.steps.is_empty() {
            None
        } else {
            let mut parent = self.clone();
            parent.steps.pop();
            Some(parent)
        }
    }

    /// Final step, `None` at the root
    pub fn last_step(&self) -> Option<&Step> {
        self.steps.last()
    }

    /// True if `self` is a prefix of `other` (or equal)
    pub fn is_ancestor_of(&self, other: &Location) -> bool {
        self.steps.len() <= other.steps.len()
            && self.steps.iter().zip(other.steps.iter()).all(|(a, b)| a == b)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return write!(f, "$");
        }
        write!(f, "$")?;
        for step in &self.steps {
            write!(f, "{}", step)?;
        }
        Ok(())
    }
}
