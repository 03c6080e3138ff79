//! SQLite-backed contact repository.
//!
//! # Responsibility
//! - Keep SQL for the `contacts` table inside the persistence boundary.
//! - Apply session batches inside one SQLite transaction.
//!
//! # Invariants
//! - Listing order is the autoincrement `id`, i.e. insertion order.
//! - A rejected change rolls the whole batch back.
//! - Constructors reject connections that skipped `db::open_db*` bootstrap.

use crate::db::migrations::{current_user_version, latest_version};
use crate::model::contact::Contact;
use crate::repo::contact_repo::{ContactRepository, PendingChange, RepoError, RepoResult};
use crate::repo::query::ContactQuery;
use log::{debug, warn};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const CONTACT_SELECT_SQL: &str = "SELECT name, email FROM contacts";

/// Contact repository over a migrated SQLite connection.
pub struct SqliteContactRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteContactRepository<'conn> {
    /// Wraps a connection returned by `open_db` / `open_db_in_memory`.
    ///
    /// # Errors
    /// - `UninitializedConnection` when the schema version is not current.
    /// - `MissingRequiredTable` when `contacts` does not exist.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let actual_version = current_user_version(conn)?;
        let expected_version = latest_version();
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }

        let has_table: bool = conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'contacts'
            );",
            [],
            |row| row.get(0),
        )?;
        if !has_table {
            return Err(RepoError::MissingRequiredTable("contacts"));
        }

        Ok(Self { conn })
    }
}

impl ContactRepository for SqliteContactRepository<'_> {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    fn find(&self, name: &str) -> RepoResult<Option<Contact>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CONTACT_SELECT_SQL} WHERE name = ?1;"))?;
        let contact = stmt.query_row([name], parse_contact_row).optional()?;
        Ok(contact)
    }

    fn list(&self, query: &ContactQuery) -> RepoResult<Vec<Contact>> {
        let mut sql = format!("{CONTACT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(pattern) = &query.email_like {
            sql.push_str(" AND email LIKE ?");
            bind_values.push(Value::Text(pattern.clone()));
        }

        sql.push_str(" ORDER BY id ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let contacts = stmt
            .query_map(params_from_iter(bind_values), parse_contact_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(contacts)
    }

    fn apply(&self, changes: &[PendingChange]) -> RepoResult<()> {
        // Dropping `tx` on an early return rolls the batch back.
        let tx = self.conn.unchecked_transaction()?;
        for change in changes {
            if let Err(err) = apply_change_sql(&tx, change) {
                warn!(
                    "event=repo_apply module=repo backend=sqlite status=error op={} error={}",
                    change.kind(),
                    err
                );
                return Err(err);
            }
        }
        tx.commit()?;

        debug!(
            "event=repo_apply module=repo backend=sqlite status=ok changes={}",
            changes.len()
        );
        Ok(())
    }
}

fn apply_change_sql(conn: &Connection, change: &PendingChange) -> RepoResult<()> {
    match change {
        PendingChange::Persist(contact) => {
            if contact_exists(conn, &contact.name)? {
                return Err(RepoError::DuplicateKey(contact.name.clone()));
            }
            insert_contact(conn, contact)
        }
        PendingChange::Merge(contact) => {
            let changed = conn.execute(
                "UPDATE contacts SET email = ?2 WHERE name = ?1;",
                params![contact.name.as_str(), contact.email.as_str()],
            )?;
            if changed == 0 {
                insert_contact(conn, contact)?;
            }
            Ok(())
        }
        PendingChange::Remove(name) => {
            let changed = conn.execute("DELETE FROM contacts WHERE name = ?1;", [name.as_str()])?;
            if changed == 0 {
                return Err(RepoError::NotFound(name.clone()));
            }
            Ok(())
        }
    }
}

fn insert_contact(conn: &Connection, contact: &Contact) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO contacts (name, email) VALUES (?1, ?2);",
        params![contact.name.as_str(), contact.email.as_str()],
    )?;
    Ok(())
}

fn contact_exists(conn: &Connection, name: &str) -> RepoResult<bool> {
    let exists = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM contacts WHERE name = ?1);",
        [name],
        |row| row.get(0),
    )?;
    Ok(exists)
}

fn parse_contact_row(row: &Row<'_>) -> rusqlite::Result<Contact> {
    Ok(Contact {
        name: row.get("name")?,
        email: row.get("email")?,
    })
}
