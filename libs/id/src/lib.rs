//! # flowsched-id
//!
//! Typed identifiers for the flow scheduler.
//!
//! ## Design Principles
//!
//! - Every entity kind has its own identifier space; a `JobId` can never be
//!   passed where a `TaskId` is expected
//! - Identifiers are fixed-width numeric handles, cheap to copy and hash
//! - Jobs and resources are named by UUID strings in their descriptors; their
//!   numeric handles are derived from those strings deterministically
//!
//! ## Derivation
//!
//! A UUID-derived handle folds the 128-bit UUID into 64 bits by XOR-ing its
//! high and low halves:
//!
//! ```
//! use flowsched_id::JobId;
//!
//! let a = JobId::from_uuid_str("2f1e0b7c-5f0d-4d89-9a4b-3c1d2e3f4a5b").unwrap();
//! let b = JobId::from_uuid_str("2f1e0b7c-5f0d-4d89-9a4b-3c1d2e3f4a5b").unwrap();
//! assert_eq!(a, b);
//! ```

mod error;
mod macros;
mod types;

pub use error::IdError;
pub use types::*;

/// Re-export uuid for consumers that need to mint descriptor UUIDs
pub use uuid::Uuid;
