//! Persistence context: sessions and transactions over a repository.
//!
//! # Responsibility
//! - Stage `persist`/`merge`/`remove` calls without touching committed state.
//! - Make staged writes durable only through a committed `Transaction`.
//!
//! # Invariants
//! - Writes staged outside a committed transaction never reach the repository.
//! - Closing or dropping a session discards everything still staged.
//! - At most one transaction is active per session.
//! - Reads see committed state overlaid with this session's staged writes.

mod transaction;

pub use transaction::Transaction;

use crate::model::contact::Contact;
use crate::repo::contact_repo::{ContactRepository, PendingChange, RepoError, RepoResult};
use crate::repo::query::ContactQuery;
use log::{debug, warn};
use uuid::Uuid;

/// Short-lived unit of work bound to one repository.
pub struct Session<'r, R: ContactRepository> {
    id: Uuid,
    repo: &'r R,
    pending: Vec<PendingChange>,
    in_transaction: bool,
}

impl<'r, R: ContactRepository> Session<'r, R> {
    pub(crate) fn open(repo: &'r R) -> Self {
        let id = Uuid::new_v4();
        debug!(
            "event=session_open module=session status=ok session_id={id} backend={}",
            repo.backend_name()
        );
        Self {
            id,
            repo,
            pending: Vec::new(),
            in_transaction: false,
        }
    }

    /// Correlation id used in log events.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Number of writes staged and not yet committed.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_transaction_active(&self) -> bool {
        self.in_transaction
    }

    /// Stages a new contact.
    ///
    /// # Errors
    /// - `Validation` when the record is invalid.
    /// - `DuplicateKey` when the name is already visible to this session.
    pub fn persist(&mut self, contact: &Contact) -> RepoResult<()> {
        contact.validate()?;
        if self.find(&contact.name)?.is_some() {
            return Err(RepoError::DuplicateKey(contact.name.clone()));
        }

        self.pending.push(PendingChange::Persist(contact.clone()));
        Ok(())
    }

    /// Stages field changes for the contact with the same name.
    ///
    /// Returns the state this session now sees for that name. An unknown
    /// name is staged as an insert.
    pub fn merge(&mut self, contact: &Contact) -> RepoResult<Contact> {
        contact.validate()?;
        self.pending.push(PendingChange::Merge(contact.clone()));
        Ok(contact.clone())
    }

    /// Stages removal of the contact with `name`.
    ///
    /// # Errors
    /// - `NotFound` when no such contact is visible to this session.
    pub fn remove(&mut self, name: &str) -> RepoResult<()> {
        if self.find(name)?.is_none() {
            return Err(RepoError::NotFound(name.to_string()));
        }

        self.pending.push(PendingChange::Remove(name.to_string()));
        Ok(())
    }

    /// Finds one contact by name; absent contacts yield `Ok(None)`.
    pub fn find(&self, name: &str) -> RepoResult<Option<Contact>> {
        let mut current = self.repo.find(name)?;
        for change in self.pending.iter().filter(|change| change.name() == name) {
            current = match change {
                PendingChange::Persist(contact) => Some(contact.clone()),
                PendingChange::Merge(contact) => match current {
                    Some(mut existing) => {
                        existing.email = contact.email.clone();
                        Some(existing)
                    }
                    None => Some(contact.clone()),
                },
                PendingChange::Remove(_) => None,
            };
        }
        Ok(current)
    }

    /// Lists contacts matching `query` in insertion order.
    pub fn query(&self, query: &ContactQuery) -> RepoResult<Vec<Contact>> {
        if self.pending.is_empty() {
            return self.repo.list(query);
        }

        let mut rows = self.repo.list(&ContactQuery::all())?;
        for change in &self.pending {
            overlay_change(&mut rows, change);
        }
        query.apply_to(rows)
    }

    /// Begins a transaction; its commit makes every staged write durable.
    ///
    /// # Errors
    /// - `TransactionAlreadyActive` when a transaction is already open.
    pub fn transaction(&mut self) -> RepoResult<Transaction<'_, 'r, R>> {
        if self.in_transaction {
            return Err(RepoError::TransactionAlreadyActive);
        }
        Ok(Transaction::begin(self))
    }

    /// Closes the session, discarding any uncommitted writes.
    pub fn close(self) {}

    fn discard_pending(&mut self) -> usize {
        let discarded = self.pending.len();
        self.pending.clear();
        discarded
    }
}

/// Replays a staged change onto committed rows for reads.
///
/// Unlike commit, conflicts with rows other sessions committed in the
/// meantime are not errors here; they surface when this session commits.
fn overlay_change(rows: &mut Vec<Contact>, change: &PendingChange) {
    let position = rows
        .iter()
        .position(|existing| existing.name == change.name());

    match (change, position) {
        (PendingChange::Persist(contact), Some(index)) => rows[index] = contact.clone(),
        (PendingChange::Merge(contact), Some(index)) => rows[index].email = contact.email.clone(),
        (PendingChange::Persist(contact) | PendingChange::Merge(contact), None) => {
            rows.push(contact.clone())
        }
        (PendingChange::Remove(_), Some(index)) => {
            rows.remove(index);
        }
        (PendingChange::Remove(_), None) => {}
    }
}

impl<R: ContactRepository> Drop for Session<'_, R> {
    fn drop(&mut self) {
        let discarded = self.discard_pending();
        if discarded > 0 {
            warn!(
                "event=session_close module=session status=discarded session_id={} discarded_writes={discarded}",
                self.id
            );
        } else {
            debug!(
                "event=session_close module=session status=ok session_id={}",
                self.id
            );
        }
    }
}
