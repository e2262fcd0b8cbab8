//! Parsed QA reports.
//!
//! A report is an immutable header row plus data rows, read from a
//! tab-separated file. Its file name carries the display title and
//! whether it is a diff of a prior run.

pub mod source;

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

pub use source::{Batch, discover, read_report};

/// File extension of report files.
pub const REPORT_EXTENSION: &str = "tsv";

/// Per-subdirectory summary file name.
pub const SUMMARY_FILE: &str = "summary.tsv";

const DIFF_SUFFIX: &str = "_diff.tsv";

static DISPLAY_NAME_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(_diff)?\.").expect("static regex"));

/// Naming facts derived from a report's file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReportName {
    file_name: String,
}

impl ReportName {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// The check name, e.g. `Missing_Species` for `Missing_Species_diff.tsv`.
    pub fn display_name(&self) -> &str {
        match DISPLAY_NAME_END.find(&self.file_name) {
            Some(m) => &self.file_name[..m.start()],
            None => &self.file_name,
        }
    }

    /// Human-readable title: the display name with underscores as spaces.
    pub fn title(&self) -> String {
        self.display_name().replace('_', " ")
    }

    /// Whether the report only lists issues new since the prior run.
    pub fn is_diff(&self) -> bool {
        self.file_name.ends_with(DIFF_SUFFIX)
    }

    /// File name up to the first `.`, used to name derived documents.
    pub fn base_name(&self) -> &str {
        self.file_name
            .split('.')
            .next()
            .unwrap_or(&self.file_name)
    }
}

/// The ordered header row of a report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(Vec<String>);

impl Headers {
    pub fn new(labels: Vec<String>) -> Self {
        Self(labels)
    }

    pub fn labels(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Position of the first header matching `pred`.
    pub fn position(&self, pred: impl Fn(&str) -> bool) -> Option<usize> {
        self.0.iter().position(|label| pred(label))
    }

    /// Positions of every header matching `pred`, in column order.
    pub fn positions(&self, pred: impl Fn(&str) -> bool) -> Vec<usize> {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, label)| pred(label))
            .map(|(i, _)| i)
            .collect()
    }
}

/// One data row. Rows may be shorter or longer than the header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row(Vec<String>);

impl Row {
    pub fn new(cells: Vec<String>) -> Self {
        Self(cells)
    }

    /// Cell at `index`, or `None` past the end of a ragged row.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn cells(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Row {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// A parsed report file.
#[derive(Debug, Clone)]
pub struct Report {
    pub name: ReportName,
    /// Where the report was read from.
    pub path: PathBuf,
    pub headers: Headers,
    pub rows: Vec<Row>,
}

impl Report {
    pub fn new(path: impl Into<PathBuf>, headers: Headers, rows: Vec<Row>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            name: ReportName::new(file_name),
            path,
            headers,
            rows,
        }
    }

    /// Directory holding the report file.
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }

    /// Name of the batch subdirectory the report lives in.
    pub fn subdir_name(&self) -> String {
        self.dir()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
