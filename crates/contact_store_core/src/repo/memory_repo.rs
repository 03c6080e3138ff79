//! In-process contact repository.
//!
//! # Responsibility
//! - Hold committed contacts in insertion order for a single thread.
//!
//! # Invariants
//! - Batches are applied to a scratch copy and swapped in only on success.

use crate::model::contact::Contact;
use crate::repo::contact_repo::{apply_change, ContactRepository, PendingChange, RepoResult};
use crate::repo::query::ContactQuery;
use log::debug;
use std::cell::RefCell;

/// Insertion-ordered in-memory contact repository.
#[derive(Debug, Default)]
pub struct MemoryContactRepository {
    rows: RefCell<Vec<Contact>>,
}

impl MemoryContactRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of committed contacts.
    pub fn len(&self) -> usize {
        self.rows.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.borrow().is_empty()
    }
}

impl ContactRepository for MemoryContactRepository {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn find(&self, name: &str) -> RepoResult<Option<Contact>> {
        Ok(self
            .rows
            .borrow()
            .iter()
            .find(|contact| contact.name == name)
            .cloned())
    }

    fn list(&self, query: &ContactQuery) -> RepoResult<Vec<Contact>> {
        let rows = self.rows.borrow().clone();
        query.apply_to(rows)
    }

    fn apply(&self, changes: &[PendingChange]) -> RepoResult<()> {
        let mut scratch = self.rows.borrow().clone();
        for change in changes {
            apply_change(&mut scratch, change)?;
        }

        debug!(
            "event=repo_apply module=repo backend=memory status=ok changes={} rows={}",
            changes.len(),
            scratch.len()
        );
        *self.rows.borrow_mut() = scratch;
        Ok(())
    }
}
