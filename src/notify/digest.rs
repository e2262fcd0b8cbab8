//! Per-recipient digests: which rendered document each recipient gets for
//! each report.

use std::collections::BTreeMap;

use crate::render::DocumentRef;
use crate::report::ReportName;

/// A recipient's rendered document for one report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestItem {
    pub report: ReportName,
    /// The batch subdirectory holding both the report and the document.
    pub subdir: String,
    pub title: String,
    pub document: DocumentRef,
}

impl DigestItem {
    pub fn is_diff(&self) -> bool {
        self.report.is_diff()
    }
}

/// Report file identity: file name first so digests sort by report name.
type ItemKey = (String, String);

/// The documents routed to one recipient across a batch.
///
/// Only ever grows: inserting an item for a report already present
/// replaces its document reference but never removes an entry.
#[derive(Debug, Clone, Default)]
pub struct RecipientDigest {
    items: BTreeMap<ItemKey, DigestItem>,
}

impl RecipientDigest {
    pub fn insert(&mut self, item: DigestItem) {
        let key = (item.report.file_name().to_string(), item.subdir.clone());
        self.items.insert(key, item);
    }

    /// Items ordered by report file name.
    pub fn items(&self) -> impl Iterator<Item = &DigestItem> {
        self.items.values()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Recipient e-mail → digest, for a whole batch.
#[derive(Debug, Clone, Default)]
pub struct Notifications {
    digests: BTreeMap<String, RecipientDigest>,
}

impl Notifications {
    /// Coordinators are always notified, so their digests exist up front.
    pub fn seeded<S: AsRef<str>>(coordinators: &[S]) -> Self {
        let mut notifications = Self::default();
        for email in coordinators {
            notifications.entry(email.as_ref());
        }
        notifications
    }

    /// The digest for `email`, created empty on first use.
    pub fn entry(&mut self, email: &str) -> &mut RecipientDigest {
        self.digests.entry(email.to_string()).or_default()
    }

    pub fn get(&self, email: &str) -> Option<&RecipientDigest> {
        self.digests.get(email)
    }

    /// Digests ordered by recipient e-mail.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RecipientDigest)> {
        self.digests
            .iter()
            .map(|(email, digest)| (email.as_str(), digest))
    }

    pub fn len(&self) -> usize {
        self.digests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }
}
