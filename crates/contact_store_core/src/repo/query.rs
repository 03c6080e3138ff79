//! Contact list queries and `LIKE` pattern matching.
//!
//! # Responsibility
//! - Describe list filters and pagination independently of the backend.
//! - Evaluate `LIKE` patterns in-process with the same meaning SQLite gives
//!   them under `case_sensitive_like`.
//!
//! # Invariants
//! - `%` matches any run of characters, `_` exactly one; all else is literal.
//! - Matching is case-sensitive and anchored to the whole value.
//! - Pagination applies after filtering.

use crate::model::contact::Contact;
use crate::repo::contact_repo::{RepoError, RepoResult};
use regex::Regex;

/// Filter and pagination options for listing contacts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactQuery {
    /// Optional `LIKE` pattern applied to `email`.
    pub email_like: Option<String>,
    pub limit: Option<u32>,
    pub offset: u32,
}

impl ContactQuery {
    /// Every contact, no pagination.
    pub fn all() -> Self {
        Self::default()
    }

    /// Contacts whose email matches the `LIKE` pattern.
    pub fn email_like(pattern: impl Into<String>) -> Self {
        Self {
            email_like: Some(pattern.into()),
            ..Self::default()
        }
    }

    /// Filters and paginates an insertion-ordered row list in place.
    pub(crate) fn apply_to(&self, rows: Vec<Contact>) -> RepoResult<Vec<Contact>> {
        let matcher = self
            .email_like
            .as_deref()
            .map(LikePattern::compile)
            .transpose()?;

        let filtered = rows
            .into_iter()
            .filter(|contact| {
                matcher
                    .as_ref()
                    .map_or(true, |pattern| pattern.matches(&contact.email))
            })
            .skip(self.offset as usize);

        Ok(match self.limit {
            Some(limit) => filtered.take(limit as usize).collect(),
            None => filtered.collect(),
        })
    }
}

/// Compiled SQL `LIKE` pattern.
#[derive(Debug, Clone)]
pub struct LikePattern {
    regex: Regex,
}

impl LikePattern {
    /// Compiles a `LIKE` pattern into an anchored matcher.
    ///
    /// # Errors
    /// - `InvalidPattern` when the translated expression exceeds regex limits.
    pub fn compile(pattern: &str) -> RepoResult<Self> {
        let mut translated = String::with_capacity(pattern.len() + 8);
        translated.push_str("(?s)^");
        let mut literal = [0u8; 4];
        for ch in pattern.chars() {
            match ch {
                '%' => translated.push_str(".*"),
                '_' => translated.push('.'),
                other => translated.push_str(&regex::escape(other.encode_utf8(&mut literal))),
            }
        }
        translated.push('$');

        let regex = Regex::new(&translated)
            .map_err(|err| RepoError::InvalidPattern(format!("`{pattern}`: {err}")))?;
        Ok(Self { regex })
    }

    pub fn matches(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{ContactQuery, LikePattern};
    use crate::model::contact::Contact;

    #[test]
    fn literal_pattern_is_whole_value_equality() {
        let pattern = LikePattern::compile("bob@test.com").unwrap();
        assert!(pattern.matches("bob@test.com"));
        assert!(!pattern.matches("bob@test.com.au"));
        assert!(!pattern.matches("xbob@test.com"));
    }

    #[test]
    fn dot_in_pattern_is_literal() {
        let pattern = LikePattern::compile("bob@test.com").unwrap();
        assert!(!pattern.matches("bob@testXcom"));
    }

    #[test]
    fn wildcards_match_runs_and_single_chars() {
        let percent = LikePattern::compile("%@test.com").unwrap();
        assert!(percent.matches("alice@test.com"));
        assert!(percent.matches("@test.com"));

        let underscore = LikePattern::compile("b_b@%").unwrap();
        assert!(underscore.matches("bob@test.com"));
        assert!(!underscore.matches("bb@test.com"));
    }

    #[test]
    fn matching_is_case_sensitive() {
        let pattern = LikePattern::compile("Bob@%").unwrap();
        assert!(!pattern.matches("bob@test.com"));
    }

    #[test]
    fn pagination_applies_after_filter() {
        let rows = vec![
            Contact::new("A", "a@test.com"),
            Contact::new("B", "b@other.com"),
            Contact::new("C", "c@test.com"),
            Contact::new("D", "d@test.com"),
        ];
        let query = ContactQuery {
            email_like: Some("%@test.com".to_string()),
            limit: Some(1),
            offset: 1,
        };

        let page = query.apply_to(rows).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].name, "C");
    }
}
