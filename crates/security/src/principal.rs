//! The caller behind a request

use serde::{Deserialize, Serialize};

/// Who is making a request
///
/// The transport layer fills this in; the store only looks at the groups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// User name, `None` for anonymous callers
    #[serde(default)]
    pub user: Option<String>,
    /// Groups the caller belongs to
    #[serde(default)]
    pub groups: Vec<String>,
}

impl Principal {
    /// An anonymous caller with no groups
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A named user with no groups yet
    pub fn user(name: impl Into<String>) -> Self {
        Principal {
            user: Some(name.into()),
            groups: Vec::new(),
        }
    }

    /// Add a group (builder pattern)
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.groups.push(group.into());
        self
    }

    /// True if the caller is in any of `groups`
    pub fn in_any<'a, I>(&self, groups: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        groups
            .into_iter()
            .any(|wanted| self.groups.iter().any(|g| g == wanted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_membership() {
        let p = Principal::user("ann").with_group("admin").with_group("staff");
        assert_eq!(p.user.as_deref(), Some("ann"));
        assert!(p.in_any(["guest", "staff"]));
        assert!(!p.in_any(["guest"]));
        assert!(!Principal::anonymous().in_any(["admin"]));
    }
}
