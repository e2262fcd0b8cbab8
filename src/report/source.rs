//! Report source: discovers the report files of a batch and parses them.
//!
//! A batch root holds one subdirectory per report group. Every `*.tsv`
//! file in a subdirectory is a report, except `summary.tsv`, which holds
//! the group's per-check issue counts. Files are visited in the order the
//! file system lists them.

use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use tokio::fs;
use tracing::debug;

use super::{Headers, REPORT_EXTENSION, Report, Row, SUMMARY_FILE};
use crate::error::ReportError;

/// The files discovered under a reports root.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    pub root: PathBuf,
    /// Report files, in enumeration order.
    pub reports: Vec<PathBuf>,
    /// Summary files, in enumeration order.
    pub summaries: Vec<PathBuf>,
}

impl Batch {
    /// The batch name: the last component of the root directory.
    pub fn name(&self) -> String {
        self.root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Walk the immediate subdirectories of `root` for report and summary files.
pub async fn discover(root: &Path) -> Result<Batch, ReportError> {
    if !fs::try_exists(root).await.unwrap_or(false) {
        return Err(ReportError::DirectoryNotFound(root.to_path_buf()));
    }

    let mut batch = Batch {
        root: root.to_path_buf(),
        ..Batch::default()
    };

    for subdir in list_dir(root).await? {
        if !fs::metadata(&subdir).await.is_ok_and(|m| m.is_dir()) {
            continue;
        }
        for file in list_dir(&subdir).await? {
            if !file.extension().is_some_and(|ext| ext == REPORT_EXTENSION) {
                continue;
            }
            if file.file_name().is_some_and(|n| n == SUMMARY_FILE) {
                batch.summaries.push(file);
            } else {
                batch.reports.push(file);
            }
        }
    }

    debug!(
        root = %root.display(),
        reports = batch.reports.len(),
        summaries = batch.summaries.len(),
        "Discovered report batch"
    );
    Ok(batch)
}

async fn list_dir(dir: &Path) -> Result<Vec<PathBuf>, ReportError> {
    let read_err = |source| ReportError::Read {
        path: dir.to_path_buf(),
        source,
    };
    let mut entries = fs::read_dir(dir).await.map_err(read_err)?;
    let mut paths = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(read_err)? {
        paths.push(entry.path());
    }
    Ok(paths)
}

/// Read and parse one report file.
pub async fn read_report(path: &Path) -> Result<Report, ReportError> {
    let content = fs::read(path).await.map_err(|source| ReportError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_report(path, &content)
}

/// Parse tab-separated report bytes. The first line is the header row;
/// values are never quoted. Fields that are not valid UTF-8 are decoded
/// lossily, so a stray Latin-1 byte only garbles its own cell.
pub fn parse_report(path: &Path, content: &[u8]) -> Result<Report, ReportError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(content);

    let mut lines = Vec::new();
    for record in reader.byte_records() {
        let record = record.map_err(|e| ReportError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        lines.push(
            record
                .iter()
                .map(|field| String::from_utf8_lossy(field).into_owned())
                .collect::<Vec<_>>(),
        );
    }

    let mut lines = lines.into_iter();
    let headers = Headers::new(lines.next().unwrap_or_default());
    let rows = lines.map(Row::new).collect();
    Ok(Report::new(path, headers, rows))
}
