//! The access gate seam and the read-only mode

use cantrip_core::{Error, Method, Result, StorePath, Value};
use serde::{Deserialize, Serialize};

use crate::principal::Principal;

/// Decides whether a request may proceed
///
/// Gates see the document as it was before the operation, so a gate can
/// keep its own rules inside the document (see [`crate::AclGate`]).
pub trait AccessGate: Send + Sync {
    /// `Ok(())` to allow; [`Error::AccessDenied`] to refuse
    fn authorize(
        &self,
        method: Method,
        path: &StorePath,
        principal: &Principal,
        document: &Value,
    ) -> Result<()>;
}

/// Controls whether the store allows writes or is read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AccessMode {
    /// Allow both reads and writes (default).
    #[default]
    ReadWrite,
    /// Read-only mode: every mutation is denied.
    ReadOnly,
}

impl AccessMode {
    /// True if mutations are refused
    pub fn is_read_only(self) -> bool {
        self == AccessMode::ReadOnly
    }
}

impl AccessGate for AccessMode {
    fn authorize(
        &self,
        method: Method,
        path: &StorePath,
        _principal: &Principal,
        _document: &Value,
    ) -> Result<()> {
        if self.is_read_only() && method.is_mutation() {
            return Err(Error::access_denied(format!(
                "{} {} refused: store is read-only",
                method, path
            )));
        }
        Ok(())
    }
}
