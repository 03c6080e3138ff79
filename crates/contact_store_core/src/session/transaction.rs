//! Transaction guard over a session.
//!
//! # Invariants
//! - `commit` hands every staged write to the repository as one batch.
//! - A guard that is dropped or rolled back discards every staged write.
//! - The session leaves transactional state on every exit path.

use super::Session;
use crate::repo::contact_repo::{ContactRepository, RepoResult};
use log::{debug, warn};
use std::ops::{Deref, DerefMut};
use std::time::Instant;

/// Active transaction on a [`Session`].
///
/// Dereferences to the session, so staging calls go through the guard.
pub struct Transaction<'s, 'r, R: ContactRepository> {
    session: &'s mut Session<'r, R>,
    started_at: Instant,
    finished: bool,
}

impl<'s, 'r, R: ContactRepository> Transaction<'s, 'r, R> {
    pub(super) fn begin(session: &'s mut Session<'r, R>) -> Self {
        session.in_transaction = true;
        debug!(
            "event=tx_begin module=session status=ok session_id={}",
            session.id
        );
        Self {
            session,
            started_at: Instant::now(),
            finished: false,
        }
    }

    /// Applies every staged write atomically and ends the transaction.
    ///
    /// On failure nothing is applied and the staged writes are discarded.
    pub fn commit(mut self) -> RepoResult<()> {
        self.finished = true;
        self.session.in_transaction = false;
        let changes = std::mem::take(&mut self.session.pending);

        match self.session.repo.apply(&changes) {
            Ok(()) => {
                debug!(
                    "event=tx_commit module=session status=ok session_id={} changes={} duration_ms={}",
                    self.session.id,
                    changes.len(),
                    self.started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                warn!(
                    "event=tx_commit module=session status=error session_id={} changes={} error={}",
                    self.session.id,
                    changes.len(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Discards every staged write and ends the transaction.
    pub fn rollback(mut self) {
        self.finish_rollback("explicit");
    }

    fn finish_rollback(&mut self, reason: &str) {
        self.finished = true;
        self.session.in_transaction = false;
        let discarded = self.session.discard_pending();
        debug!(
            "event=tx_rollback module=session status=ok session_id={} reason={reason} discarded_writes={discarded}",
            self.session.id
        );
    }
}

impl<'r, R: ContactRepository> Deref for Transaction<'_, 'r, R> {
    type Target = Session<'r, R>;

    fn deref(&self) -> &Self::Target {
        &*self.session
    }
}

impl<R: ContactRepository> DerefMut for Transaction<'_, '_, R> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.session
    }
}

impl<R: ContactRepository> Drop for Transaction<'_, '_, R> {
    fn drop(&mut self) {
        if !self.finished {
            self.finish_rollback("dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::model::contact::Contact;
    use crate::repo::contact_repo::{ContactRepository, RepoError};
    use crate::repo::memory_repo::MemoryContactRepository;

    #[test]
    fn dropped_transaction_rolls_back() {
        let repo = MemoryContactRepository::new();
        let mut session = repo.open_session();
        {
            let mut tx = session.transaction().unwrap();
            tx.persist(&Contact::new("Alice", "alice@test.com")).unwrap();
        }

        assert!(!session.is_transaction_active());
        assert_eq!(session.pending_len(), 0);
        assert!(repo.is_empty());
    }

    #[test]
    fn nested_transaction_is_rejected() {
        let repo = MemoryContactRepository::new();
        let mut session = repo.open_session();
        let mut tx = session.transaction().unwrap();

        assert!(matches!(
            tx.transaction(),
            Err(RepoError::TransactionAlreadyActive)
        ));
        tx.rollback();
    }

    #[test]
    fn session_is_reusable_after_commit() {
        let repo = MemoryContactRepository::new();
        let mut session = repo.open_session();

        let mut tx = session.transaction().unwrap();
        tx.persist(&Contact::new("Alice", "alice@test.com")).unwrap();
        tx.commit().unwrap();

        let mut tx = session.transaction().unwrap();
        tx.persist(&Contact::new("Bob", "bob@test.com")).unwrap();
        tx.commit().unwrap();

        assert_eq!(repo.len(), 2);
    }
}
