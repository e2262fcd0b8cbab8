//! Summary aggregator: folds the per-subdirectory `summary.tsv` files into
//! one table ordered by report title.
//!
//! Folding is last-write-wins: when two summary files list the same title,
//! the count from the later file replaces the earlier one. Counts are never
//! added together.

use std::collections::BTreeMap;

use tracing::warn;

use crate::checks::{CheckCatalog, Priority};
use crate::report::Report;
use crate::routing::{Cell, RowFragment};

/// Title of the consolidated summary document.
pub const SUMMARY_TITLE: &str = "QA Report Summary";

/// File name of the consolidated summary document.
pub const SUMMARY_DOCUMENT: &str = "summary.html";

/// Column headings of the consolidated summary document.
pub const SUMMARY_HEADINGS: [&str; 3] = ["Report", "Priority", "Issue Count"];

/// One line of the consolidated summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryEntry {
    pub report_title: String,
    pub priority: Priority,
    pub issue_count: u64,
}

impl SummaryEntry {
    pub fn to_fragment(&self) -> RowFragment {
        RowFragment::new(vec![
            Cell::text(self.report_title.as_str()),
            Cell::Priority(self.priority),
            Cell::text(self.issue_count.to_string()),
        ])
    }
}

#[derive(Debug, Clone)]
struct Tally {
    count: u64,
    priority: Option<Priority>,
}

/// Accumulates summary counts across a batch.
#[derive(Debug, Clone, Default)]
pub struct SummaryAggregator {
    tallies: BTreeMap<String, Tally>,
}

impl SummaryAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a count for a title, replacing any earlier count.
    pub fn record(&mut self, title: impl Into<String>, count: u64, priority: Option<Priority>) {
        self.tallies
            .insert(title.into(), Tally { count, priority });
    }

    /// Fold one parsed `summary.tsv`: `title, count[, priority]` per row.
    ///
    /// Rows with a missing or non-numeric count are skipped.
    pub fn add_report(&mut self, summary: &Report) {
        for row in &summary.rows {
            let Some(title) = row.get(0).filter(|t| !t.is_empty()) else {
                continue;
            };
            let Some(count) = row.get(1).and_then(|c| c.trim().parse::<u64>().ok()) else {
                warn!(
                    file = %summary.path.display(),
                    title,
                    "Skipping summary row without a numeric count"
                );
                continue;
            };
            let priority = row.get(2).and_then(|p| p.parse().ok());
            self.record(title, count, priority);
        }
    }

    pub fn len(&self) -> usize {
        self.tallies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tallies.is_empty()
    }

    /// The folded entries, ordered by title.
    ///
    /// Priority comes from the check catalog (title with spaces as
    /// underscores), then from the summary row itself, then `Medium`.
    pub fn entries(&self, catalog: &CheckCatalog) -> Vec<SummaryEntry> {
        self.tallies
            .iter()
            .map(|(title, tally)| SummaryEntry {
                report_title: title.clone(),
                priority: catalog
                    .priority(&title.replace(' ', "_"))
                    .or(tally.priority)
                    .unwrap_or_default(),
                issue_count: tally.count,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::CheckInfo;
    use crate::report::{Headers, Row};

    fn summary(rows: &[&[&str]]) -> Report {
        Report::new(
            "/qa/batch/events/summary.tsv",
            Headers::new(vec!["Report".into(), "Count".into()]),
            rows.iter()
                .map(|r| r.iter().copied().collect::<Row>())
                .collect(),
        )
    }

    #[test]
    fn later_count_replaces_earlier() {
        let mut aggregator = SummaryAggregator::new();
        aggregator.add_report(&summary(&[&["Check A", "3"]]));
        aggregator.add_report(&summary(&[&["Check A", "5"]]));

        let entries = aggregator.entries(&CheckCatalog::default());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].issue_count, 5);
    }

    #[test]
    fn entries_sorted_by_title() {
        let mut aggregator = SummaryAggregator::new();
        aggregator.add_report(&summary(&[&["Zebra", "1"], &["Alpha", "2"], &["Mid", "0"]]));

        let titles: Vec<_> = aggregator
            .entries(&CheckCatalog::default())
            .into_iter()
            .map(|e| e.report_title)
            .collect();
        assert_eq!(titles, ["Alpha", "Mid", "Zebra"]);
    }

    #[test]
    fn priority_lookup_order() {
        let catalog = CheckCatalog::new([(
            "Missing_Species".to_string(),
            CheckInfo {
                priority: Priority::Blocker,
                description: None,
            },
        )]);
        let mut aggregator = SummaryAggregator::new();
        aggregator.add_report(&summary(&[
            &["Missing Species", "4", "High"],
            &["Orphans", "2", "High"],
            &["Plain", "1"],
        ]));

        let entries = aggregator.entries(&catalog);
        let priority = |title: &str| {
            entries
                .iter()
                .find(|e| e.report_title == title)
                .map(|e| e.priority)
        };
        assert_eq!(priority("Missing Species"), Some(Priority::Blocker));
        assert_eq!(priority("Orphans"), Some(Priority::High));
        assert_eq!(priority("Plain"), Some(Priority::Medium));
    }

    #[test]
    fn non_numeric_counts_are_skipped() {
        let mut aggregator = SummaryAggregator::new();
        aggregator.add_report(&summary(&[&["Check A", "many"], &["Check B"], &["Check C", "7"]]));
        let entries = aggregator.entries(&CheckCatalog::default());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].report_title, "Check C");
    }

    #[test]
    fn fragment_carries_priority_cell() {
        let entry = SummaryEntry {
            report_title: "Check A".into(),
            priority: Priority::High,
            issue_count: 12,
        };
        assert_eq!(
            entry.to_fragment().cells,
            vec![
                Cell::text("Check A"),
                Cell::Priority(Priority::High),
                Cell::text("12"),
            ]
        );
    }
}
