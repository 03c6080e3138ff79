//! Contact repository contract and shared error type.
//!
//! # Responsibility
//! - Describe committed-state reads and atomic batch writes.
//! - Define the change records a session stages before commit.
//!
//! # Invariants
//! - `Persist` of an existing name fails with `DuplicateKey`.
//! - `Merge` of an unknown name inserts it at the end of the ordering.
//! - `Remove` of an unknown name fails with `NotFound`.
//! - A failing change aborts the whole batch.

use crate::db::DbError;
use crate::model::contact::{Contact, ContactName, ContactValidationError};
use crate::repo::query::ContactQuery;
use crate::session::Session;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for contact persistence, query and transaction operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ContactValidationError),
    Db(DbError),
    NotFound(ContactName),
    DuplicateKey(ContactName),
    InvalidPattern(String),
    TransactionAlreadyActive,
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(name) => write!(f, "contact not found: {name}"),
            Self::DuplicateKey(name) => write!(f, "contact already exists: {name}"),
            Self::InvalidPattern(message) => write!(f, "invalid filter pattern: {message}"),
            Self::TransactionAlreadyActive => {
                write!(f, "a transaction is already active on this session")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ContactValidationError> for RepoError {
    fn from(value: ContactValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// One write staged by a session, applied to committed state on commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingChange {
    Persist(Contact),
    Merge(Contact),
    Remove(ContactName),
}

impl PendingChange {
    /// Key this change targets.
    pub fn name(&self) -> &str {
        match self {
            Self::Persist(contact) | Self::Merge(contact) => contact.name.as_str(),
            Self::Remove(name) => name.as_str(),
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::Persist(_) => "persist",
            Self::Merge(_) => "merge",
            Self::Remove(_) => "remove",
        }
    }
}

/// Committed-state access shared by every contact backend.
pub trait ContactRepository {
    /// Short backend label used in log events.
    fn backend_name(&self) -> &'static str;

    /// Finds one committed contact by name.
    fn find(&self, name: &str) -> RepoResult<Option<Contact>>;

    /// Lists committed contacts matching `query`, in insertion order.
    fn list(&self, query: &ContactQuery) -> RepoResult<Vec<Contact>>;

    /// Applies `changes` in order, atomically.
    fn apply(&self, changes: &[PendingChange]) -> RepoResult<()>;

    /// Opens a persistence context over this repository.
    fn open_session(&self) -> Session<'_, Self>
    where
        Self: Sized,
    {
        Session::open(self)
    }
}

/// Applies one change to an ordered, name-keyed row list.
///
/// Strict commit semantics: conflicts abort the batch.
pub(crate) fn apply_change(rows: &mut Vec<Contact>, change: &PendingChange) -> RepoResult<()> {
    let position = rows
        .iter()
        .position(|existing| existing.name == change.name());

    match (change, position) {
        (PendingChange::Persist(contact), None) => rows.push(contact.clone()),
        (PendingChange::Persist(contact), Some(_)) => {
            return Err(RepoError::DuplicateKey(contact.name.clone()));
        }
        (PendingChange::Merge(contact), Some(index)) => rows[index].email = contact.email.clone(),
        (PendingChange::Merge(contact), None) => rows.push(contact.clone()),
        (PendingChange::Remove(_), Some(index)) => {
            rows.remove(index);
        }
        (PendingChange::Remove(name), None) => return Err(RepoError::NotFound(name.clone())),
    }

    Ok(())
}
