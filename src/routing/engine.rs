//! Routing engine: splits one report into per-recipient row lists.
//!
//! Coordinators receive every row. Everyone else receives the rows they are
//! the resolved author of. Row order within each recipient's list is the
//! report's row order.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::author::AuthorResolver;
use super::fragment::{RowFragment, RowRenderer};
use crate::identity::IdentityTable;
use crate::report::Report;

/// Rows routed to one recipient for one report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientRows {
    pub email: String,
    pub rows: Vec<Arc<RowFragment>>,
}

/// Recipient e-mail → routed rows, for a single report.
///
/// Entries are kept in creation order. Coordinators are seeded first, so
/// each of them has an entry even when the report has no rows.
#[derive(Debug, Clone, Default)]
pub struct RoutingTable {
    entries: Vec<RecipientRows>,
    index: HashMap<String, usize>,
}

impl RoutingTable {
    /// A table with one empty entry per coordinator.
    pub fn seeded<S: AsRef<str>>(coordinators: &[S]) -> Self {
        let mut table = Self::default();
        for email in coordinators {
            table.entry(email.as_ref());
        }
        table
    }

    /// The rows for `email`, creating an empty entry on first use.
    ///
    /// Calling this repeatedly for the same e-mail returns the same entry
    /// and never reorders existing ones.
    pub fn entry(&mut self, email: &str) -> &mut Vec<Arc<RowFragment>> {
        let position = match self.index.get(email) {
            Some(&position) => position,
            None => {
                self.entries.push(RecipientRows {
                    email: email.to_string(),
                    rows: Vec::new(),
                });
                let position = self.entries.len() - 1;
                self.index.insert(email.to_string(), position);
                position
            }
        };
        &mut self.entries[position].rows
    }

    pub fn rows_for(&self, email: &str) -> Option<&[Arc<RowFragment>]> {
        self.index
            .get(email)
            .map(|&position| self.entries[position].rows.as_slice())
    }

    pub fn contains(&self, email: &str) -> bool {
        self.index.contains_key(email)
    }

    pub fn recipients(&self) -> impl Iterator<Item = &RecipientRows> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Routes report rows to recipients.
pub struct Router<'a> {
    identities: &'a IdentityTable,
    link_prefix: String,
}

impl<'a> Router<'a> {
    /// `link_prefix` is prepended to identifier values to form their links.
    pub fn new(identities: &'a IdentityTable, link_prefix: impl Into<String>) -> Self {
        Self {
            identities,
            link_prefix: link_prefix.into(),
        }
    }

    pub fn route(&self, report: &Report) -> RoutingTable {
        let renderer = RowRenderer::for_headers(&report.headers, self.link_prefix.as_str());
        let resolver = AuthorResolver::for_headers(&report.headers);
        let coordinators = self.identities.coordinator_emails();
        let mut table = RoutingTable::seeded(coordinators);

        for row in &report.rows {
            let fragment = Arc::new(renderer.render(row));

            for coordinator in coordinators {
                table.entry(coordinator).push(Arc::clone(&fragment));
            }

            for author in resolver.authors(row) {
                // Coordinators already hold every row.
                if self.identities.is_coordinator_key(&author) {
                    continue;
                }
                match self.identities.email_for(&author) {
                    Some(email) => {
                        // Two authors sharing an address count once.
                        let rows = table.entry(email);
                        if !rows.last().is_some_and(|last| Arc::ptr_eq(last, &fragment)) {
                            rows.push(Arc::clone(&fragment));
                        }
                    }
                    None => debug!(
                        report = report.name.file_name(),
                        author = %author,
                        "No curator matches author"
                    ),
                }
            }
        }

        debug!(
            report = report.name.file_name(),
            rows = report.rows.len(),
            recipients = table.len(),
            "Routed report"
        );
        table
    }
}
