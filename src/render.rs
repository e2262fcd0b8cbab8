//! Document rendering: turns a notification payload into a self-contained
//! HTML page and writes it to disk.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs;

use crate::checks::Priority;
use crate::error::RenderError;
use crate::routing::{Cell, RowFragment};

const CREDENTIALS_HINT: &str = "When connecting to this slice database via the curator tool to check instances, \
     please use the authortool credentials.";

const STYLE: &str = "<style>
h1 + p { margin-top: 0; }
table { border-collapse: collapse; }
table, th, td { border: 1px solid black; }
hr { margin-top: 1em; }
span.Blocker { color: Crimson; }
span.High { color: DarkOrange; }
span.Medium { color: Blue; }
</style>";

/// Everything needed to render one document.
#[derive(Debug, Clone, Default)]
pub struct NotificationPayload {
    pub title: String,
    /// Trusted markup from the check catalog, inserted verbatim.
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub headers: Vec<String>,
    pub rows: Vec<Arc<RowFragment>>,
    pub database_label: String,
    pub host_label: String,
}

/// A written document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentRef {
    pub path: PathBuf,
}

impl DocumentRef {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Turns payloads into markup.
pub trait Renderer: Send + Sync {
    fn render(&self, payload: &NotificationPayload) -> String;
}

/// The stock HTML renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRenderer;

impl Renderer for HtmlRenderer {
    fn render(&self, payload: &NotificationPayload) -> String {
        let mut html = String::new();
        html.push_str("<html>\n");
        html.push_str(STYLE);
        html.push_str("<body>\n");
        let _ = writeln!(html, "<h1>{}</h1>", escape_html(&payload.title));

        if let Some(description) = &payload.description {
            let _ = writeln!(html, "<p>\n{description}\n</p>");
        }
        if let Some(priority) = payload.priority {
            let _ = writeln!(html, "<p>\nPriority: {}\n</p>", priority_span(priority));
        }

        html.push_str("<table>\n ");
        html.push_str(&header_row(&payload.headers));
        html.push('\n');
        for row in &payload.rows {
            html.push(' ');
            html.push_str(&table_row(row));
            html.push('\n');
        }
        html.push_str("</table>");
        html.push_str("<hr/>\n");
        let _ = writeln!(
            html,
            "<p>QA check trial slice database name: {} on {}. {CREDENTIALS_HINT}</p>",
            escape_html(&payload.database_label),
            escape_html(&payload.host_label),
        );
        html.push_str("</body></html>");
        html
    }
}

/// Render `payload` and write it to `path`.
pub async fn write_document(
    renderer: &dyn Renderer,
    payload: &NotificationPayload,
    path: &Path,
) -> Result<DocumentRef, RenderError> {
    let html = renderer.render(payload);
    fs::write(path, html)
        .await
        .map_err(|source| RenderError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(DocumentRef {
        path: path.to_path_buf(),
    })
}

fn header_row(headers: &[String]) -> String {
    let mut html = String::from("<tr>");
    for header in headers {
        let _ = write!(html, "<th>{}</th>", escape_html(header));
    }
    html.push_str("</tr>");
    html
}

fn table_row(row: &RowFragment) -> String {
    let mut html = String::from("<tr>");
    for cell in &row.cells {
        html.push_str("<td>");
        match cell {
            Cell::Text(text) => html.push_str(&escape_html(text)),
            Cell::Link { text, href } => {
                let _ = write!(
                    html,
                    "<a href=\"{}\">{}</a>",
                    escape_html(href),
                    escape_html(text)
                );
            }
            Cell::Priority(priority) => html.push_str(&priority_span(*priority)),
        }
        html.push_str("</td>");
    }
    html.push_str("</tr>");
    html
}

fn priority_span(priority: Priority) -> String {
    format!("<span class={0}>{0}</span>", priority.label())
}

/// Escape text for inclusion in HTML content or a quoted attribute.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
