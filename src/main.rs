use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;

use qa_notify::config::{MailConfig, NotifyConfig};
use qa_notify::notify::{Dispatcher, LogDispatcher, SmtpDispatcher};
use qa_notify::pipeline::Notifier;

#[derive(Parser, Debug)]
#[command(
    name = "qa-notify",
    version,
    about = "Format QA reports as HTML and notify the responsible curators"
)]
struct Cli {
    /// Render every document but log the messages instead of sending them.
    #[arg(long)]
    dry_run: bool,

    /// Reports root directory, one subdirectory per report group.
    reports_dir: Option<PathBuf>,

    #[arg(hide = true)]
    extra: Vec<String>,
}

#[tokio::main]
async fn main() {
    // Install rustls crypto provider before any TLS usage
    let _ = rustls::crypto::ring::default_provider().install_default();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let _ = e.print();
            std::process::exit(1);
        }
    };

    let reports_dir = match reports_dir(&cli) {
        Ok(dir) => dir,
        Err(message) => {
            eprintln!("{message}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&reports_dir, cli.dry_run).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

/// The reports directory named on the command line.
///
/// Exactly one existing directory must be given.
fn reports_dir(cli: &Cli) -> Result<PathBuf, String> {
    let Some(dir) = &cli.reports_dir else {
        return Err("Missing the reports directory command argument.".to_string());
    };
    if !cli.extra.is_empty() {
        return Err(format!("Extraneous arguments: {}", cli.extra.join(", ")));
    }
    if !dir.is_dir() {
        return Err(format!("Reports directory not found: {}", dir.display()));
    }
    Ok(dir.clone())
}

async fn run(reports_dir: &Path, dry_run: bool) -> anyhow::Result<()> {
    let dispatcher: Box<dyn Dispatcher> = if dry_run {
        Box::new(LogDispatcher)
    } else {
        let mail = MailConfig::from_env().context("Could not load the mail settings")?;
        Box::new(SmtpDispatcher::new(&mail)?)
    };

    let notifier = Notifier::load(NotifyConfig::from_env())
        .context("Could not load the notification configuration")?;

    eprintln!("📋 QA Notify v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Reports: {}", reports_dir.display());
    eprintln!("   Host: {}", notifier.host_label());
    eprintln!(
        "   Curators: {} ({} coordinators)",
        notifier.identities().len(),
        notifier.identities().coordinator_emails().len()
    );
    eprintln!("   Dispatch: {}\n", dispatcher.name());

    notifier.run(reports_dir, dispatcher.as_ref()).await?;
    Ok(())
}
