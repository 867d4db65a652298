//! Reelforge Core - Foundational types for the Reelforge pipeline
//!
//! This crate provides the types every other Reelforge crate depends on:
//! - `ReelError` / `Result` - Error taxonomy for the batch pipeline
//! - `ContentHash` - SHA-256 based content hashing for provenance
//! - `now_iso8601` - UTC timestamps for manifests and run summaries

mod error;
mod hash;
mod time;

pub use error::{ReelError, Result};
pub use hash::ContentHash;
pub use time::now_iso8601;
