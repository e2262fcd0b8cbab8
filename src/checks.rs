//! QA check catalog: per-check priority and description.
//!
//! Loaded from `descriptions.tsv` (Display Name, Priority, Description).
//! Display names use underscores, matching a report's file name.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::config::load_table;
use crate::error::ConfigError;

/// How critical a check's issues are for the coming release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Priority {
    /// Must be fixed before the final slice or the release breaks.
    Blocker,
    /// Expected to be fixed before the final slice.
    High,
    /// Looked into as time allows.
    #[default]
    Medium,
}

impl Priority {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Blocker => "Blocker",
            Self::High => "High",
            Self::Medium => "Medium",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "blocker" => Ok(Self::Blocker),
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            other => Err(format!("unknown priority: {other}")),
        }
    }
}

/// Catalog entry for one QA check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckInfo {
    pub priority: Priority,
    pub description: Option<String>,
}

/// Display name → check info.
#[derive(Debug, Clone, Default)]
pub struct CheckCatalog {
    checks: HashMap<String, CheckInfo>,
}

impl CheckCatalog {
    pub fn new(checks: impl IntoIterator<Item = (String, CheckInfo)>) -> Self {
        Self {
            checks: checks.into_iter().collect(),
        }
    }

    /// Load the description table. An empty priority cell means `Medium`;
    /// an unrecognized one is a configuration error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut checks = HashMap::new();
        for (index, record) in load_table(path)?.into_iter().enumerate() {
            let Some(name) = record.get(0).filter(|n| !n.is_empty()) else {
                continue;
            };
            let priority = match record.get(1).unwrap_or("") {
                "" => Priority::default(),
                raw => raw.parse().map_err(|reason| ConfigError::Table {
                    path: path.to_path_buf(),
                    reason: format!("line {}: {reason}", index + 2),
                })?,
            };
            let description = record
                .get(2)
                .filter(|d| !d.is_empty())
                .map(str::to_string);
            checks.insert(
                name.to_string(),
                CheckInfo {
                    priority,
                    description,
                },
            );
        }
        Ok(Self { checks })
    }

    pub fn get(&self, display_name: &str) -> Option<&CheckInfo> {
        self.checks.get(display_name)
    }

    pub fn priority(&self, display_name: &str) -> Option<Priority> {
        self.get(display_name).map(|info| info.priority)
    }

    pub fn description(&self, display_name: &str) -> Option<&str> {
        self.get(display_name)
            .and_then(|info| info.description.as_deref())
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}
