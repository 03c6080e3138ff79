//! Repository layer: committed contact state and its storage backends.
//!
//! # Responsibility
//! - Define the contract every backend honours (`ContactRepository`).
//! - Keep storage details (SQL, in-memory layout) behind that contract.
//!
//! # Invariants
//! - Repositories only ever expose committed state.
//! - `apply` lands a whole batch of changes or none of it.
//! - Listing order is insertion order.

pub mod contact_repo;
pub mod memory_repo;
pub mod query;
pub mod sqlite_repo;
