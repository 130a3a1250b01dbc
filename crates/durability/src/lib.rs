//! Durability layer for cantrip
//!
//! This crate handles everything that touches disk:
//!
//! - DocumentFile: load/bootstrap the backing JSON file, atomic writes
//! - FlushScheduler: every-Nth-mutation background persistence
//!
//! The in-memory document is always the source of truth; a failed write is
//! logged and counted, never surfaced to the request that triggered it.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod file;
pub mod scheduler;

pub use file::DocumentFile;
pub use scheduler::{FlushScheduler, FlushStats};
