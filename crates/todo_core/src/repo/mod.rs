//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the data access contract used by the service layer.
//! - Isolate SQLite query details from request/response mapping.
//!
//! # Invariants
//! - Write paths enforce `Todo::validate()` before persistence.
//! - Missing rows surface as `RepoError::NotFound`, never as empty values.

pub mod todo_repo;
