//! Configuration types.
//!
//! Everything is read from environment variables. The delimited tables
//! (curators, check descriptions) live in the resources directory and are
//! loaded by [`crate::identity`] and [`crate::checks`].

use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim};
use secrecy::SecretString;

use crate::error::ConfigError;

/// The curator table file name inside the resources directory.
pub const CURATORS_FILE: &str = "curators.csv";

/// The check description/priority table file name inside the resources directory.
pub const DESCRIPTIONS_FILE: &str = "descriptions.tsv";

const DEFAULT_CHECKS_URL: &str =
    "https://docs.google.com/spreadsheets/d/1eoVAE4lKXSisxZl29fJR-9MhkUoUzTDJFz9qHRGUS1s/edit#gid=1104781337";

/// Site-level settings for a notification run.
#[derive(Debug, Clone)]
pub struct NotifyConfig {
    /// Directory holding `curators.csv` and `descriptions.tsv`.
    pub resources_dir: PathBuf,
    /// Host label override. Resolved from the OS when absent.
    pub host_name: Option<String>,
    /// Subject line of every notification message.
    pub subject: String,
    /// Prefix prepended to the reports directory name to form the database label.
    pub db_name_prefix: String,
    /// Target of the "check descriptions" pointer in each message.
    pub checks_url: String,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            resources_dir: PathBuf::from("resources"),
            host_name: None,
            subject: "Weekly QA".to_string(),
            db_name_prefix: "test_slice_".to_string(),
            checks_url: DEFAULT_CHECKS_URL.to_string(),
        }
    }
}

impl NotifyConfig {
    /// Build config from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            resources_dir: lookup("QA_NOTIFY_RESOURCES")
                .map(PathBuf::from)
                .unwrap_or(defaults.resources_dir),
            host_name: lookup("QA_NOTIFY_HOST").filter(|h| !h.trim().is_empty()),
            subject: lookup("QA_NOTIFY_SUBJECT").unwrap_or(defaults.subject),
            db_name_prefix: lookup("QA_NOTIFY_DB_PREFIX").unwrap_or(defaults.db_name_prefix),
            checks_url: lookup("QA_NOTIFY_CHECKS_URL").unwrap_or(defaults.checks_url),
        }
    }

    pub fn curators_path(&self) -> PathBuf {
        self.resources_dir.join(CURATORS_FILE)
    }

    pub fn descriptions_path(&self) -> PathBuf {
        self.resources_dir.join(DESCRIPTIONS_FILE)
    }
}

/// SMTP transport settings.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: Option<String>,
    pub password: Option<SecretString>,
    pub from_address: String,
    /// Use an implicit-TLS relay instead of a plain connection.
    pub tls: bool,
}

impl MailConfig {
    /// Build config from environment variables.
    ///
    /// `QA_MAIL_FROM` is required; everything else has a default.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let from_address = lookup("QA_MAIL_FROM")
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("QA_MAIL_FROM".into()))?;

        let smtp_host = lookup("QA_SMTP_HOST").unwrap_or_else(|| "localhost".to_string());

        let smtp_port = match lookup("QA_SMTP_PORT") {
            Some(raw) => raw.trim().parse().map_err(|e| ConfigError::InvalidValue {
                key: "QA_SMTP_PORT".into(),
                message: format!("{raw}: {e}"),
            })?,
            None => 25,
        };

        let tls = match lookup("QA_SMTP_TLS") {
            Some(raw) => parse_flag(&raw).ok_or_else(|| ConfigError::InvalidValue {
                key: "QA_SMTP_TLS".into(),
                message: format!("expected true or false, got {raw}"),
            })?,
            None => false,
        };

        let username = lookup("QA_SMTP_USERNAME").filter(|s| !s.is_empty());
        let password = lookup("QA_SMTP_PASSWORD")
            .filter(|s| !s.is_empty())
            .map(SecretString::from);

        Ok(Self {
            smtp_host,
            smtp_port,
            username,
            password,
            from_address,
            tls,
        })
    }
}

/// Read a delimited configuration table, skipping its header line.
///
/// `.csv` files are comma-separated; anything else is tab-separated.
pub(crate) fn load_table(path: &Path) -> Result<Vec<StringRecord>, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()));
    }
    let delimiter = if path.extension().is_some_and(|ext| ext == "csv") {
        b','
    } else {
        b'\t'
    };
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_path(path)
        .map_err(|e| ConfigError::Table {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    reader
        .records()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ConfigError::Table {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

/// Parse a boolean flag the way the curator table does: `true`, any case.
pub(crate) fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" | "" => Some(false),
        _ => None,
    }
}
