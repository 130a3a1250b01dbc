//! URL patterns with `:param` placeholders
//!
//! `/users/:id/comments` matches `/users/42/comments` and
//! `/users/abc/comments`, but neither `/users/42` nor
//! `/users/42/comments/7`: segment counts must be equal.

use cantrip_core::StorePath;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One pattern segment
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A parsed URL pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct UrlPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl UrlPattern {
    /// Parse a pattern; empty segments are discarded like in request paths
    pub fn parse(raw: &str) -> Self {
        let segments = raw
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| match s.strip_prefix(':') {
                Some(name) if is_param_name(name) => Segment::Param(name.to_string()),
                _ => Segment::Literal(s.to_string()),
            })
            .collect();
        UrlPattern {
            raw: raw.to_string(),
            segments,
        }
    }

    /// The pattern text as written
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// True for the root pattern `/`
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Match against the first `len` segments of `path`
    pub fn matches_prefix(&self, path: &StorePath, len: usize) -> bool {
        let segments = path.segments();
        if len > segments.len() || self.segments.len() != len {
            return false;
        }
        self.segments
            .iter()
            .zip(&segments[..len])
            .all(|(pattern, segment)| match pattern {
                Segment::Literal(literal) => literal == segment,
                Segment::Param(_) => true,
            })
    }

    /// Match against the whole of `path`
    pub fn matches(&self, path: &StorePath) -> bool {
        self.matches_prefix(path, path.len())
    }
}

fn is_param_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphabetic())
}

impl From<String> for UrlPattern {
    fn from(raw: String) -> Self {
        UrlPattern::parse(&raw)
    }
}

impl From<UrlPattern> for String {
    fn from(pattern: UrlPattern) -> Self {
        pattern.raw
    }
}

impl fmt::Display for UrlPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
