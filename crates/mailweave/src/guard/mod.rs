//! Persistent uniqueness guard.
//!
//! A small check-and-set store that records (namespace, value) pairs and
//! refuses a value that was already recorded under the same namespace,
//! across process runs.

mod repository;

pub use repository::UniquenessStore;
