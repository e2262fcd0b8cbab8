//! Author resolver: finds the last-modifier columns of a report and turns
//! their cells into canonical identity keys.

use std::sync::LazyLock;

use regex::Regex;

use crate::identity::canonicalize;
use crate::report::{Headers, Row};

/// Last-modifier column labels, in their known spellings.
pub const AUTHOR_HEADERS: &[&str] = &["Modified", "MostRecentAuthor", "LastAuthor"];

static AUTHOR_FIELD_SEP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(", *").expect("static regex"));

/// Whether a header label names a last-modifier column.
///
/// Prefixed and indexed labels count too: `EventLastAuthor` and
/// `MostRecentAuthor_2` are author columns, `ModifiedDate` is not.
pub fn is_author_header(label: &str) -> bool {
    AUTHOR_HEADERS.iter().any(|variant| {
        label.ends_with(variant)
            || label
                .strip_prefix(variant)
                .and_then(|rest| rest.strip_prefix('_'))
                .is_some_and(|index| !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()))
    })
}

/// Canonical key for one author cell.
///
/// The cell reads `surname, given-or-initial[, anything]`. A cell without
/// the second field cannot be keyed and yields `None`.
pub fn parse_author(token: &str) -> Option<String> {
    let mut fields = AUTHOR_FIELD_SEP.split(token);
    let surname = fields.next()?;
    let given = fields.next()?;
    canonicalize(surname, given)
}

/// Author extraction for one report, with column positions resolved once
/// from the header row.
#[derive(Debug, Clone, Default)]
pub struct AuthorResolver {
    columns: Vec<usize>,
}

impl AuthorResolver {
    pub fn for_headers(headers: &Headers) -> Self {
        Self {
            columns: headers.positions(is_author_header),
        }
    }

    pub fn columns(&self) -> &[usize] {
        &self.columns
    }

    /// Distinct canonical author keys of a row, in column order.
    ///
    /// Columns past the end of a ragged row and empty cells are skipped.
    pub fn authors(&self, row: &Row) -> Vec<String> {
        let mut keys: Vec<String> = Vec::new();
        for &column in &self.columns {
            let Some(cell) = row.get(column).filter(|c| !c.trim().is_empty()) else {
                continue;
            };
            if let Some(key) = parse_author(cell)
                && !keys.contains(&key)
            {
                keys.push(key);
            }
        }
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(labels: &[&str]) -> Headers {
        Headers::new(labels.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn recognizes_author_header_variants() {
        assert!(is_author_header("Modified"));
        assert!(is_author_header("MostRecentAuthor"));
        assert!(is_author_header("LastAuthor"));
        assert!(is_author_header("MostRecentAuthor_2"));
        assert!(is_author_header("ReactionLastAuthor"));
        assert!(!is_author_header("Author"));
        assert!(!is_author_header("ModifiedDate"));
        assert!(!is_author_header("LastAuthor_x"));
        assert!(!is_author_header("LastAuthor_"));
        assert!(!is_author_header("DB_ID"));
    }

    #[test]
    fn parse_author_shapes() {
        assert_eq!(parse_author("Jones, A").as_deref(), Some("Jones,A"));
        assert_eq!(parse_author("Jones,Alice").as_deref(), Some("Jones,A"));
        assert_eq!(
            parse_author("O'Brien, James, 2019-05-01").as_deref(),
            Some("OBrien,J")
        );
    }

    #[test]
    fn parse_author_without_second_field_never_matches() {
        assert_eq!(parse_author("Jones"), None);
        assert_eq!(parse_author("Jones, "), None);
        assert_eq!(parse_author(""), None);
    }

    #[test]
    fn resolver_collects_all_author_columns() {
        let resolver =
            AuthorResolver::for_headers(&headers(&["DB_ID", "MostRecentAuthor_1", "Name", "Modified"]));
        assert_eq!(resolver.columns(), [1, 3]);

        let row: Row = ["1", "Jones, A", "x", "Smith, B, 2020"].into_iter().collect();
        assert_eq!(resolver.authors(&row), ["Jones,A", "Smith,B"]);
    }

    #[test]
    fn resolver_dedups_per_row() {
        let resolver = AuthorResolver::for_headers(&headers(&["LastAuthor", "Modified"]));
        let row: Row = ["Jones, Alice", "Jones, A, 2021-01-01"].into_iter().collect();
        assert_eq!(resolver.authors(&row), ["Jones,A"]);
    }

    #[test]
    fn resolver_tolerates_ragged_and_empty_cells() {
        let resolver = AuthorResolver::for_headers(&headers(&["DB_ID", "LastAuthor", "Modified"]));
        let short: Row = ["1"].into_iter().collect();
        assert!(resolver.authors(&short).is_empty());

        let blank: Row = ["1", "", "Smith"].into_iter().collect();
        assert!(resolver.authors(&blank).is_empty());
    }

    #[test]
    fn no_author_columns() {
        let resolver = AuthorResolver::for_headers(&headers(&["DB_ID", "Name"]));
        assert!(resolver.columns().is_empty());
        let row: Row = ["1", "Jones, A"].into_iter().collect();
        assert!(resolver.authors(&row).is_empty());
    }
}
