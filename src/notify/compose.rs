//! Notification composer: builds each recipient's message body from their
//! digest.
//!
//! The body is a prelude, a summary link for coordinators, a "Detail" list
//! of regular reports and, when any were routed, a separate "New issues"
//! list of diff reports.

use std::fmt::Write as _;

use crate::identity::IdentityTable;
use crate::notify::digest::{DigestItem, RecipientDigest};
use crate::render::escape_html;

pub const COORDINATOR_PRELUDE: &str = "The automated QA checks issued the reports below.";

pub const NONCOORDINATOR_PRELUDE: &str =
    "You are listed as the most recent author in the automated QA reports below.";

/// Builds message bodies for one batch.
pub struct Composer<'a> {
    identities: &'a IdentityTable,
    /// Base URL of the batch, ending in `/`.
    batch_url: String,
    checks_url: String,
    /// File name of the summary document under the batch URL.
    summary_document: String,
}

impl<'a> Composer<'a> {
    pub fn new(
        identities: &'a IdentityTable,
        batch_url: impl Into<String>,
        checks_url: impl Into<String>,
        summary_document: impl Into<String>,
    ) -> Self {
        let mut batch_url = batch_url.into();
        if !batch_url.ends_with('/') {
            batch_url.push('/');
        }
        Self {
            identities,
            batch_url,
            checks_url: checks_url.into(),
            summary_document: summary_document.into(),
        }
    }

    /// The HTML body of `email`'s message.
    pub fn compose(&self, email: &str, digest: &RecipientDigest) -> String {
        let is_coordinator = self.identities.is_coordinator_email(email);
        let mut body = String::new();

        let prelude = if is_coordinator {
            COORDINATOR_PRELUDE
        } else {
            NONCOORDINATOR_PRELUDE
        };
        let _ = write!(
            body,
            "{prelude} A description of each check and hints regarding fixes can be found \
             <a href='{}'>here</a>.\n\n",
            escape_html(&self.checks_url)
        );

        if is_coordinator {
            let _ = writeln!(
                body,
                "<h3><a href='{}'>Summary</a></h3>",
                escape_html(&format!("{}{}", self.batch_url, self.summary_document))
            );
        }

        let (diffs, details): (Vec<&DigestItem>, Vec<&DigestItem>) =
            digest.items().partition(|item| item.is_diff());

        body.push_str("<h3>Detail</h3>\n<ul>");
        for item in details {
            body.push_str(&self.list_item(item, is_coordinator));
        }
        body.push_str("</ul>\n");

        if !diffs.is_empty() {
            body.push_str("<h3>New issues</h3>\n<ul>");
            for item in diffs {
                body.push_str(&self.list_item(item, is_coordinator));
            }
            body.push_str("</ul>\n");
        }

        body
    }

    fn list_item(&self, item: &DigestItem, is_coordinator: bool) -> String {
        let prefix = format!("{}{}/", self.batch_url, item.subdir);
        let mut html = format!(
            "<li><a href='{}'>{}</a>",
            escape_html(&format!("{prefix}{}", item.document.file_name())),
            escape_html(&item.title)
        );
        // Coordinators also get the raw report file.
        if is_coordinator && !item.is_diff() {
            let _ = write!(
                html,
                " (<a href='{}'>tsv</a>)",
                escape_html(&format!("{prefix}{}", item.report.file_name()))
            );
        }
        html.push_str("</li>\n");
        html
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::identity::Identity;
    use crate::render::DocumentRef;
    use crate::report::ReportName;

    const BATCH: &str = "http://qa.example.org/QAReports/2024";

    fn identities() -> IdentityTable {
        IdentityTable::new([
            Identity::new("Jones", "A", "a.jones@x.org", true).unwrap(),
            Identity::new("Smith", "B", "b.smith@x.org", false).unwrap(),
        ])
    }

    fn item(file: &str, document: &str) -> DigestItem {
        item_in("events", file, document)
    }

    fn item_in(subdir: &str, file: &str, document: &str) -> DigestItem {
        let report = ReportName::new(file);
        DigestItem {
            title: report.title(),
            report,
            subdir: subdir.into(),
            document: DocumentRef {
                path: PathBuf::from(format!("/qa/2024/events/{document}")),
            },
        }
    }

    fn digest(items: &[(&str, &str)]) -> RecipientDigest {
        let mut digest = RecipientDigest::default();
        for (file, document) in items {
            digest.insert(item(file, document));
        }
        digest
    }

    #[test]
    fn coordinator_body_has_summary_and_raw_links() {
        let ids = identities();
        let composer = Composer::new(&ids, BATCH, "https://checks.example.org", "summary.html");
        let body = composer.compose(
            "a.jones@x.org",
            &digest(&[("issues.tsv", "issues_jonesa.html")]),
        );

        assert!(body.starts_with(COORDINATOR_PRELUDE));
        assert!(body.contains("<a href='https://checks.example.org'>here</a>"));
        assert!(body.contains(
            "<h3><a href='http://qa.example.org/QAReports/2024/summary.html'>Summary</a></h3>"
        ));
        assert!(body.contains(
            "<li><a href='http://qa.example.org/QAReports/2024/events/issues_jonesa.html'>issues</a> \
             (<a href='http://qa.example.org/QAReports/2024/events/issues.tsv'>tsv</a>)</li>"
        ));
    }

    #[test]
    fn author_body_has_no_summary_or_raw_links() {
        let ids = identities();
        let composer = Composer::new(&ids, BATCH, "https://checks.example.org", "summary.html");
        let body = composer.compose(
            "b.smith@x.org",
            &digest(&[("issues.tsv", "issues_smithb.html")]),
        );

        assert!(body.starts_with(NONCOORDINATOR_PRELUDE));
        assert!(!body.contains("Summary"));
        assert!(!body.contains("tsv</a>"));
        assert!(body.contains("issues_smithb.html'>issues</a></li>"));
    }

    #[test]
    fn diff_reports_get_their_own_section() {
        let ids = identities();
        let composer = Composer::new(&ids, BATCH, "https://checks.example.org", "summary.html");
        let body = composer.compose(
            "a.jones@x.org",
            &digest(&[
                ("issues_diff.tsv", "issues_diff_jonesa.html"),
                ("issues.tsv", "issues_jonesa.html"),
            ]),
        );

        let detail = body.find("<h3>Detail</h3>").unwrap();
        let new_issues = body.find("<h3>New issues</h3>").unwrap();
        let regular = body.find("issues_jonesa.html").unwrap();
        let diff = body.find("issues_diff_jonesa.html").unwrap();
        assert!(detail < regular && regular < new_issues && new_issues < diff);
        // Diff items never carry the raw file link.
        assert!(!body.contains("issues_diff.tsv"));
    }

    #[test]
    fn no_new_issues_section_without_diffs() {
        let ids = identities();
        let composer = Composer::new(&ids, BATCH, "https://checks.example.org", "summary.html");
        let body = composer.compose("a.jones@x.org", &RecipientDigest::default());
        assert!(body.contains("<h3>Detail</h3>\n<ul></ul>"));
        assert!(!body.contains("New issues"));
    }

    #[test]
    fn link_targets_are_escaped() {
        let ids = identities();
        let composer = Composer::new(&ids, BATCH, "https://checks.example.org", "summary.html");
        let mut digest = RecipientDigest::default();
        digest.insert(item_in("curator's", "O'Hara.tsv", "O'Hara_jonesa.html"));
        let body = composer.compose("a.jones@x.org", &digest);

        assert!(body.contains(
            "<a href='http://qa.example.org/QAReports/2024/curator&#39;s/O&#39;Hara_jonesa.html'>"
        ));
        assert!(body.contains("curator&#39;s/O&#39;Hara.tsv'>tsv</a>"));
        assert!(!body.contains("O'Hara"));
    }

    #[test]
    fn detail_items_follow_report_name_order() {
        let ids = identities();
        let composer = Composer::new(&ids, BATCH, "https://checks.example.org", "summary.html");
        let body = composer.compose(
            "b.smith@x.org",
            &digest(&[("Zeta.tsv", "Zeta_smithb.html"), ("Alpha.tsv", "Alpha_smithb.html")]),
        );
        assert!(body.find("Alpha_smithb").unwrap() < body.find("Zeta_smithb").unwrap());
    }
}
