//! Request/response services over repositories.
//!
//! # Responsibility
//! - Map request objects to exactly one repository call each.
//! - Keep callers (CLI, RPC layers) decoupled from storage details.

pub mod todo_service;
