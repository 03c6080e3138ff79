//! Use-case services over the persistence context.
//!
//! # Responsibility
//! - Wrap session/transaction handling into one-call CRUD entry points.
//! - Keep callers independent of the storage backend.

pub mod contact_service;
