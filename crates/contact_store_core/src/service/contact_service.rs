//! Contact CRUD use-case service.
//!
//! # Responsibility
//! - Expose `create`, `retrieve_*`, `update` and `delete` as single calls.
//! - Scope every call to its own session; writes commit in their own
//!   transaction.
//!
//! # Invariants
//! - The session is released on every exit path, including errors.
//! - A failed write leaves committed state unchanged.

use crate::model::contact::Contact;
use crate::repo::contact_repo::{ContactRepository, RepoResult};
use crate::repo::query::ContactQuery;

/// CRUD service bound to one contact repository.
pub struct ContactService<R: ContactRepository> {
    repo: R,
}

impl<R: ContactRepository> ContactService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Underlying repository, for callers that manage sessions themselves.
    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Persists a new contact in its own transaction.
    pub fn create(&self, contact: &Contact) -> RepoResult<()> {
        let mut session = self.repo.open_session();
        let mut tx = session.transaction()?;
        tx.persist(contact)?;
        tx.commit()
    }

    /// Every committed contact in insertion order.
    pub fn retrieve_all(&self) -> RepoResult<Vec<Contact>> {
        self.repo.open_session().query(&ContactQuery::all())
    }

    /// The contact with `name`, or `None` when absent.
    pub fn retrieve_with_id(&self, name: &str) -> RepoResult<Option<Contact>> {
        self.repo.open_session().find(name)
    }

    /// Contacts whose email matches the `LIKE` pattern.
    pub fn retrieve_with_filter(&self, email_pattern: &str) -> RepoResult<Vec<Contact>> {
        self.repo
            .open_session()
            .query(&ContactQuery::email_like(email_pattern))
    }

    /// Merges field changes into the stored contact with the same name.
    pub fn update(&self, contact: &Contact) -> RepoResult<Contact> {
        let mut session = self.repo.open_session();
        let mut tx = session.transaction()?;
        let merged = tx.merge(contact)?;
        tx.commit()?;
        Ok(merged)
    }

    /// Removes the stored contact with the same name.
    pub fn delete(&self, contact: &Contact) -> RepoResult<()> {
        let mut session = self.repo.open_session();
        let mut tx = session.transaction()?;
        tx.remove(&contact.name)?;
        tx.commit()
    }
}
