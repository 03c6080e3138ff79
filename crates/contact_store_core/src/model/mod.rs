//! Domain model for the contact store.
//!
//! # Responsibility
//! - Define the single persisted entity kind and its validation rules.
//!
//! # Invariants
//! - `Contact::name` is the identifying key; no two stored contacts share it.

pub mod contact;
