//! Access control and validation gates for cantrip.
//!
//! Gates are consulted by the executor before an operation reaches the
//! store:
//!
//! - [`AccessGate`]: may this principal run this method on this path?
//!   Implemented by [`AccessMode`] (read-only switch) and [`AclGate`]
//!   (group table stored at `/_acl`).
//! - [`Validator`]: is this body acceptable for POST/PUT/PATCH?
//!   Implemented by [`TextValidator`].

#![warn(missing_docs)]

pub mod acl;
pub mod gate;
pub mod pattern;
pub mod principal;
pub mod validator;

pub use acl::{AclGate, ACL_KEY};
pub use gate::{AccessGate, AccessMode};
pub use pattern::UrlPattern;
pub use principal::Principal;
pub use validator::{TextConstraint, TextRule, TextRuleSpec, TextValidator, Validator};
