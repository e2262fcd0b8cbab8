//! The notification run.
//!
//! Reports are processed one at a time in discovery order: each is routed,
//! every recipient's slice is rendered next to the report, and the
//! recipient's digest records it. The summaries are then consolidated, and
//! finally one message per recipient is composed and dispatched in e-mail
//! order. The first unrecoverable error ends the run.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use crate::checks::CheckCatalog;
use crate::config::NotifyConfig;
use crate::error::{ConfigError, Result};
use crate::host::{host_url, resolve_host_label};
use crate::identity::IdentityTable;
use crate::notify::{Composer, DigestItem, Dispatcher, Notification, Notifications};
use crate::render::{DocumentRef, HtmlRenderer, NotificationPayload, Renderer, write_document};
use crate::report::{self, Report};
use crate::routing::Router;
use crate::summary::{SUMMARY_DOCUMENT, SUMMARY_HEADINGS, SUMMARY_TITLE, SummaryAggregator};

/// Path from the host root to the instance browser, ending at the id parameter.
const INSTANCE_BROWSER_PATH: &str = "cgi-bin/instancebrowser?DB=gk_central&ID=";

/// Path from the host root to the published report batches.
const REPORTS_URL_PATH: &str = "QAReports";

/// Counts from a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    pub reports: usize,
    pub documents: usize,
    pub messages: usize,
}

/// Labels and URLs shared by every document of a batch.
struct BatchContext {
    database_label: String,
    link_prefix: String,
}

/// Everything a run needs besides the reports themselves.
pub struct Notifier {
    config: NotifyConfig,
    identities: IdentityTable,
    catalog: CheckCatalog,
    host_label: String,
    renderer: Box<dyn Renderer>,
}

impl Notifier {
    pub fn new(
        config: NotifyConfig,
        identities: IdentityTable,
        catalog: CheckCatalog,
        host_label: impl Into<String>,
    ) -> Self {
        Self {
            config,
            identities,
            catalog,
            host_label: host_label.into(),
            renderer: Box::new(HtmlRenderer),
        }
    }

    /// Load the curator and description tables and resolve the host label.
    pub fn load(config: NotifyConfig) -> std::result::Result<Self, ConfigError> {
        let identities = IdentityTable::load(&config.curators_path())?;
        let catalog = CheckCatalog::load(&config.descriptions_path())?;
        let host_label = resolve_host_label(config.host_name.as_deref())?;
        Ok(Self::new(config, identities, catalog, host_label))
    }

    /// Swap the document renderer, e.g. for a plain-text rendition.
    pub fn with_renderer(mut self, renderer: Box<dyn Renderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn identities(&self) -> &IdentityTable {
        &self.identities
    }

    pub fn host_label(&self) -> &str {
        &self.host_label
    }

    /// Process every report under `reports_dir` and notify each recipient.
    pub async fn run(&self, reports_dir: &Path, dispatcher: &dyn Dispatcher) -> Result<RunReport> {
        let batch = report::discover(reports_dir).await?;
        let host_prefix = host_url(&self.host_label);
        let context = BatchContext {
            database_label: format!("{}{}", self.config.db_name_prefix, batch.name()),
            link_prefix: format!("{host_prefix}{INSTANCE_BROWSER_PATH}"),
        };
        let mut run = RunReport::default();

        let mut notifications = Notifications::seeded(self.identities.coordinator_emails());
        for path in &batch.reports {
            let report = report::read_report(path).await?;
            run.documents += self
                .add_notifications(&report, &context, &mut notifications)
                .await?;
            run.reports += 1;
        }

        self.consolidate_summaries(&batch.summaries, reports_dir, &context)
            .await?;
        run.documents += 1;

        let batch_url = format!("{host_prefix}{REPORTS_URL_PATH}/{}/", batch.name());
        let composer = Composer::new(
            &self.identities,
            batch_url,
            self.config.checks_url.as_str(),
            SUMMARY_DOCUMENT,
        );
        for (email, digest) in notifications.iter() {
            let notification = Notification {
                to: email.to_string(),
                subject: self.config.subject.clone(),
                body: composer.compose(email, digest),
            };
            dispatcher.send(&notification).await?;
            run.messages += 1;
        }

        info!(
            reports = run.reports,
            documents = run.documents,
            messages = run.messages,
            dispatcher = dispatcher.name(),
            "QA notification run complete"
        );
        Ok(run)
    }

    /// Route one report and write each recipient's document. Returns the
    /// number of documents written.
    async fn add_notifications(
        &self,
        report: &Report,
        context: &BatchContext,
        notifications: &mut Notifications,
    ) -> Result<usize> {
        let table = Router::new(&self.identities, context.link_prefix.as_str()).route(report);

        let display_name = report.name.display_name();
        let title = report.name.title();
        let heading = if report.name.is_diff() {
            format!("{title} New Issues")
        } else {
            title.clone()
        };
        let subdir = report.subdir_name();

        let mut written = 0;
        for recipient in table.recipients() {
            let payload = NotificationPayload {
                title: heading.clone(),
                description: self.catalog.description(display_name).map(str::to_string),
                priority: self.catalog.priority(display_name),
                headers: report.headers.labels().to_vec(),
                rows: recipient.rows.clone(),
                database_label: context.database_label.clone(),
                host_label: self.host_label.clone(),
            };
            let file_name = format!(
                "{}_{}.html",
                report.name.base_name(),
                self.identities.file_suffix(&recipient.email)
            );
            let document =
                write_document(self.renderer.as_ref(), &payload, &report.dir().join(file_name))
                    .await?;
            written += 1;

            notifications.entry(&recipient.email).insert(DigestItem {
                report: report.name.clone(),
                subdir: subdir.clone(),
                title: title.clone(),
                document,
            });
        }
        Ok(written)
    }

    /// Fold the summary files and write the consolidated summary document.
    async fn consolidate_summaries(
        &self,
        summaries: &[PathBuf],
        reports_dir: &Path,
        context: &BatchContext,
    ) -> Result<DocumentRef> {
        let mut aggregator = SummaryAggregator::new();
        for path in summaries {
            aggregator.add_report(&report::read_report(path).await?);
        }

        let payload = NotificationPayload {
            title: SUMMARY_TITLE.to_string(),
            description: None,
            priority: None,
            headers: SUMMARY_HEADINGS.iter().map(|h| h.to_string()).collect(),
            rows: aggregator
                .entries(&self.catalog)
                .iter()
                .map(|entry| Arc::new(entry.to_fragment()))
                .collect(),
            database_label: context.database_label.clone(),
            host_label: self.host_label.clone(),
        };
        let document = write_document(
            self.renderer.as_ref(),
            &payload,
            &reports_dir.join(SUMMARY_DOCUMENT),
        )
        .await?;
        info!(checks = aggregator.len(), "Wrote consolidated summary");
        Ok(document)
    }
}
