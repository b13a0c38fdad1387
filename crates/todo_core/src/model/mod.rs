//! Domain model for todo records.
//!
//! # Responsibility
//! - Define the canonical todo record shared by repository and service.
//!
//! # Invariants
//! - Every todo is identified by a caller-visible string `TodoId`.
//! - Deletion is a hard delete; there is no tombstone state.

pub mod todo;
