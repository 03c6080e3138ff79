//! Transactional contact store.
//!
//! A contact (name + email) is persisted through short-lived sessions;
//! staged writes become durable only when a transaction commits.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod session;

pub use config::{BackendConfig, ConfigError, StoreConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::contact::{Contact, ContactName, ContactValidationError};
pub use repo::contact_repo::{ContactRepository, PendingChange, RepoError, RepoResult};
pub use repo::memory_repo::MemoryContactRepository;
pub use repo::query::{ContactQuery, LikePattern};
pub use repo::sqlite_repo::SqliteContactRepository;
pub use service::contact_service::ContactService;
pub use session::{Session, Transaction};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
