//! Conditional-write storage engine for boxoffice, backed by Sled.
//!
//! Sled plays the role of a key-value store that offers single-item conditional updates and
//! batched multi-item writes, and nothing more. The allocation decrement is protected by a
//! compare-and-swap; the purchase and ticket records written after it are not transactionally
//! linked to it. See [`fulfillment`](crate::fulfillment) for how a failure in between is handled.
//!
//! # Example
//!
//! ```rust,ignore
//! use boxoffice_storage_sled::SledStorageEngine;
//!
//! let storage = SledStorageEngine::with_homedir_folder(".boxoffice")?;
//! // or a throwaway database for tests
//! let storage = SledStorageEngine::new_test()?;
//! ```

mod engine;
mod error;
pub mod fulfillment;
pub mod keys;
mod record;

pub use engine::SledStorageEngine;
pub use error::SledError;
