//! Curator identities: canonical name keys, e-mail lookup and the
//! coordinator set.
//!
//! A canonical key is `Surname,I`: the surname stripped of non-word
//! characters, a comma, and the first character of the given name. The
//! same function builds keys for the curator table and for the author
//! cells of a report, so both sides always agree.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::config::{load_table, parse_flag};
use crate::error::ConfigError;

/// Build the canonical `surname,initial` key.
///
/// Returns `None` when the given name is empty, since there is no initial
/// to key on.
pub fn canonicalize(surname: &str, given: &str) -> Option<String> {
    let initial = given.trim().chars().next()?;
    let surname: String = surname.chars().filter(|c| is_word_char(*c)).collect();
    Some(format!("{surname},{initial}"))
}

/// Word characters in the `[A-Za-z0-9_]` sense.
pub(crate) fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// A known reviewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub canonical_key: String,
    pub email: String,
    pub is_coordinator: bool,
}

impl Identity {
    pub fn new(surname: &str, given: &str, email: &str, is_coordinator: bool) -> Option<Self> {
        Some(Self {
            canonical_key: canonicalize(surname, given)?,
            email: email.trim().to_string(),
            is_coordinator,
        })
    }
}

/// One row of `curators.csv`: Coordinator, Surname, First Name, Email.
#[derive(Debug, Deserialize)]
struct CuratorRecord {
    coordinator: String,
    surname: String,
    given: String,
    email: String,
}

/// The reviewers known to a run.
///
/// Coordinator membership lives here instead of in process-wide state, so
/// every component that needs it receives the table explicitly.
#[derive(Debug, Clone, Default)]
pub struct IdentityTable {
    identities: Vec<Identity>,
    /// canonical key → e-mail. A later row with the same key wins.
    emails: HashMap<String, String>,
    /// e-mail → first canonical key seen for it, in input order.
    names: HashMap<String, String>,
    coordinator_keys: HashSet<String>,
    /// Coordinator e-mails, deduplicated, in input order.
    coordinator_emails: Vec<String>,
}

impl IdentityTable {
    /// Build a table from identities in input order.
    pub fn new(identities: impl IntoIterator<Item = Identity>) -> Self {
        let mut table = Self::default();
        for identity in identities {
            table.insert(identity);
        }
        table
    }

    fn insert(&mut self, identity: Identity) {
        self.emails
            .insert(identity.canonical_key.clone(), identity.email.clone());
        self.names
            .entry(identity.email.clone())
            .or_insert_with(|| identity.canonical_key.clone());
        if identity.is_coordinator {
            self.coordinator_keys.insert(identity.canonical_key.clone());
            if !self.coordinator_emails.contains(&identity.email) {
                self.coordinator_emails.push(identity.email.clone());
            }
        }
        self.identities.push(identity);
    }

    /// Load the curator table.
    ///
    /// A missing or unreadable file, a short row, or a row without a given
    /// name is a configuration error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut identities = Vec::new();
        for (index, record) in load_table(path)?.into_iter().enumerate() {
            let line = index + 2;
            let row: CuratorRecord = record.deserialize(None).map_err(|e| ConfigError::Table {
                path: path.to_path_buf(),
                reason: format!("line {line}: {e}"),
            })?;
            let is_coordinator = parse_flag(&row.coordinator).unwrap_or(false);
            let identity = Identity::new(&row.surname, &row.given, &row.email, is_coordinator)
                .ok_or_else(|| ConfigError::Table {
                    path: path.to_path_buf(),
                    reason: format!("line {line}: missing first name for {}", row.surname),
                })?;
            identities.push(identity);
        }

        let table = Self::new(identities);
        debug!(
            curators = table.len(),
            coordinators = table.coordinator_emails.len(),
            "Loaded curator table"
        );
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    /// E-mail for a canonical key.
    pub fn email_for(&self, canonical_key: &str) -> Option<&str> {
        self.emails.get(canonical_key).map(String::as_str)
    }

    /// First canonical key registered for an e-mail.
    pub fn name_for(&self, email: &str) -> Option<&str> {
        self.names.get(email).map(String::as_str)
    }

    pub fn is_coordinator_key(&self, canonical_key: &str) -> bool {
        self.coordinator_keys.contains(canonical_key)
    }

    pub fn is_coordinator_email(&self, email: &str) -> bool {
        self.coordinator_emails.iter().any(|e| e == email)
    }

    pub fn coordinator_emails(&self) -> &[String] {
        &self.coordinator_emails
    }

    /// File-name suffix for a recipient's documents: the recipient's
    /// canonical key with non-word characters removed, lowercased.
    ///
    /// Falls back to the e-mail's local part for addresses not in the table.
    pub fn file_suffix(&self, email: &str) -> String {
        let name = self
            .name_for(email)
            .unwrap_or_else(|| email.split('@').next().unwrap_or(email));
        name.chars()
            .filter(|c| is_word_char(*c))
            .collect::<String>()
            .to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> IdentityTable {
        IdentityTable::new([
            Identity::new("Jones", "Alice", "a.jones@x.org", true).unwrap(),
            Identity::new("Smith", "Bob", "b.smith@x.org", false).unwrap(),
            Identity::new("Smyth", "Barbara", "b.smith@x.org", false).unwrap(),
        ])
    }

    #[test]
    fn canonicalize_strips_non_word_characters() {
        assert_eq!(canonicalize("O'Brien", "James").as_deref(), Some("OBrien,J"));
        assert_eq!(canonicalize("van der Berg", "k").as_deref(), Some("vanderBerg,k"));
    }

    #[test]
    fn canonicalize_initials_collide() {
        assert_eq!(canonicalize("O'Brien", "James"), canonicalize("O'Brien", "Jane"));
    }

    #[test]
    fn canonicalize_keeps_case() {
        assert_ne!(canonicalize("smith", "J"), canonicalize("Smith", "J"));
    }

    #[test]
    fn canonicalize_requires_given_name() {
        assert_eq!(canonicalize("Smith", ""), None);
        assert_eq!(canonicalize("Smith", "   "), None);
    }

    #[test]
    fn email_lookup() {
        let table = sample();
        assert_eq!(table.email_for("Jones,A"), Some("a.jones@x.org"));
        assert_eq!(table.email_for("Smith,B"), Some("b.smith@x.org"));
        assert_eq!(table.email_for("Nobody,N"), None);
    }

    #[test]
    fn reverse_lookup_picks_first_name_for_email() {
        let table = sample();
        assert_eq!(table.name_for("b.smith@x.org"), Some("Smith,B"));
    }

    #[test]
    fn coordinator_membership() {
        let table = sample();
        assert!(table.is_coordinator_key("Jones,A"));
        assert!(!table.is_coordinator_key("Smith,B"));
        assert!(table.is_coordinator_email("a.jones@x.org"));
        assert_eq!(table.coordinator_emails(), ["a.jones@x.org".to_string()]);
    }

    #[test]
    fn coordinator_emails_deduplicated_in_input_order() {
        let table = IdentityTable::new([
            Identity::new("Zed", "Z", "z@x.org", true).unwrap(),
            Identity::new("Alpha", "A", "a@x.org", true).unwrap(),
            Identity::new("Zed", "Zoe", "z@x.org", true).unwrap(),
        ]);
        assert_eq!(table.coordinator_emails(), ["z@x.org", "a@x.org"]);
    }

    #[test]
    fn file_suffix_from_canonical_key() {
        let table = sample();
        assert_eq!(table.file_suffix("a.jones@x.org"), "jonesa");
        assert_eq!(table.file_suffix("stranger@x.org"), "stranger");
    }

    #[test]
    fn load_curator_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curators.csv");
        std::fs::write(
            &path,
            "Coordinator,Surname,First Name,Email\n\
             TRUE,Jones,Alice,a.jones@x.org\n\
             false,O'Brien,James,j.obrien@x.org\n",
        )
        .unwrap();

        let table = IdentityTable::load(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.is_coordinator_email("a.jones@x.org"));
        assert_eq!(table.email_for("OBrien,J"), Some("j.obrien@x.org"));
    }

    #[test]
    fn load_rejects_missing_first_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curators.csv");
        std::fs::write(&path, "Coordinator,Surname,First Name,Email\nfalse,Smith,,s@x.org\n").unwrap();

        let err = IdentityTable::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Table { .. }));
    }

    #[test]
    fn load_rejects_short_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curators.csv");
        std::fs::write(&path, "Coordinator,Surname,First Name,Email\nfalse,Smith\n").unwrap();

        assert!(IdentityTable::load(&path).is_err());
    }

    #[test]
    fn load_missing_file() {
        let err = IdentityTable::load(Path::new("/nonexistent/curators.csv")).unwrap_err();
        assert!(matches!(err, ConfigError::MissingFile(_)));
    }
}
