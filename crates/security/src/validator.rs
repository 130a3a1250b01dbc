//! Body validation before writes
//!
//! [`Validator`] is the seam; [`TextValidator`] is the built-in rule set for
//! string fields. A rule names a URL pattern, a field and length
//! constraints written as `"max:N"`, `"min:N"` or `"length:N"`:
//!
//! ```toml
//! [[rules]]
//! path = "/users"
//! field = "name"
//! constraints = ["min:2", "max:40"]
//! ```
//!
//! Lengths are counted in characters, not bytes.

use cantrip_core::{Error, Method, Result, StorePath, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::pattern::UrlPattern;

/// Checks a request body before POST, PUT or PATCH
pub trait Validator: Send + Sync {
    /// `Ok(())` if the body is acceptable; [`Error::ValidationFailed`] otherwise
    fn validate(&self, method: Method, path: &StorePath, body: &Value) -> Result<()>;
}

/// A single length constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextConstraint {
    /// At most N characters
    Max(usize),
    /// At least N characters
    Min(usize),
    /// Exactly N characters
    Length(usize),
}

impl TextConstraint {
    /// Check `text`, returning the failure message
    pub fn check(&self, text: &str) -> std::result::Result<(), String> {
        let len = text.chars().count();
        match *self {
            TextConstraint::Max(n) if len > n => {
                Err(format!("Text length must be at most {}", n))
            }
            TextConstraint::Min(n) if len < n => {
                Err(format!("Text length must be at least {}", n))
            }
            TextConstraint::Length(n) if len != n => Err(format!("Text length must be {}", n)),
            _ => Ok(()),
        }
    }
}

impl FromStr for TextConstraint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidConfig {
            reason: format!("invalid text constraint {:?}, expected max:N, min:N or length:N", s),
        };
        let (name, arg) = s.split_once(':').ok_or_else(invalid)?;
        let n: usize = arg.trim().parse().map_err(|_| invalid())?;
        match name.trim() {
            "max" => Ok(TextConstraint::Max(n)),
            "min" => Ok(TextConstraint::Min(n)),
            "length" => Ok(TextConstraint::Length(n)),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for TextConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextConstraint::Max(n) => write!(f, "max:{}", n),
            TextConstraint::Min(n) => write!(f, "min:{}", n),
            TextConstraint::Length(n) => write!(f, "length:{}", n),
        }
    }
}

/// Rule as written in configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRuleSpec {
    /// URL pattern the rule applies to
    pub path: String,
    /// Body field to check
    pub field: String,
    /// Constraint strings
    #[serde(default)]
    pub constraints: Vec<String>,
}

/// A compiled text rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRule {
    pattern: UrlPattern,
    field: String,
    constraints: Vec<TextConstraint>,
}

impl TextRule {
    /// Compile a rule
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfig`] if a constraint does not parse.
    pub fn new<S: AsRef<str>>(path: &str, field: &str, constraints: &[S]) -> Result<Self> {
        let constraints = constraints
            .iter()
            .map(|c| c.as_ref().parse())
            .collect::<Result<Vec<TextConstraint>>>()?;
        Ok(TextRule {
            pattern: UrlPattern::parse(path),
            field: field.to_string(),
            constraints,
        })
    }

    /// Field this rule checks
    pub fn field(&self) -> &str {
        &self.field
    }

    fn check(&self, body: &Value) -> Result<()> {
        let value = match body.get(&self.field) {
            Some(value) => value,
            None => return Ok(()),
        };
        let text = value.as_str().ok_or_else(|| {
            Error::validation(format!("{} must be a string", self.field))
        })?;
        for constraint in &self.constraints {
            constraint
                .check(text)
                .map_err(|message| Error::validation(format!("{}: {}", self.field, message)))?;
        }
        Ok(())
    }
}

/// Validator enforcing length rules on string fields
///
/// A rule applies when its pattern matches the request path and the body
/// carries the field. Fields the body omits are not checked, so PATCH can
/// send partial bodies.
#[derive(Debug, Clone, Default)]
pub struct TextValidator {
    rules: Vec<TextRule>,
}

#[derive(Deserialize)]
struct RuleFile {
    #[serde(default)]
    rules: Vec<TextRuleSpec>,
}

impl TextValidator {
    /// Empty rule set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule (builder pattern)
    pub fn with_rule(mut self, rule: TextRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Compile rules from their written form
    pub fn from_specs(specs: &[TextRuleSpec]) -> Result<Self> {
        let rules = specs
            .iter()
            .map(|spec| TextRule::new(&spec.path, &spec.field, spec.constraints.as_slice()))
            .collect::<Result<Vec<_>>>()?;
        Ok(TextValidator { rules })
    }

    /// Parse a TOML document with a `[[rules]]` array
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: RuleFile = toml::from_str(content).map_err(|e| Error::InvalidConfig {
            reason: e.to_string(),
        })?;
        Self::from_specs(&file.rules)
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True when there are no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Validator for TextValidator {
    fn validate(&self, method: Method, path: &StorePath, body: &Value) -> Result<()> {
        for rule in self.rules.iter().filter(|r| r.pattern.matches(path)) {
            if let Err(e) = rule.check(body) {
                debug!(
                    target: "cantrip::validate",
                    method = %method,
                    path = %path,
                    field = rule.field(),
                    error = %e,
                    "Body rejected"
                );
                return Err(e);
            }
        }
        Ok(())
    }
}
