mod config;

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use dashboard_core::{
    HeadlessCharts, Notification, OverviewController, PageNavigator, PageView, PipelineReport,
    StatisticsController, UploadFile, UploadOutcome,
};
use serde_json::json;
use shared::domain::PageContext;
use tokio::sync::Notify;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::{load_settings, Settings};

#[derive(Parser, Debug)]
#[command(about = "Academic performance dashboard client")]
struct Args {
    /// Backend base URL. Overrides the config file and environment.
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    timeout_secs: Option<u64>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the overview page and print it.
    Overview,
    /// Load the statistics page and print it.
    Statistics {
        #[arg(long)]
        class: Option<String>,
    },
    Search {
        query: String,
    },
    /// Upload a score sheet, then reload the overview.
    Upload {
        path: PathBuf,
    },
}

/// Turns the page reload into a signal the CLI waits on.
#[derive(Default)]
struct ReloadSignal {
    requested: Notify,
}

impl PageNavigator for ReloadSignal {
    fn reload(&self) {
        self.requested.notify_one();
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(url) = args.server_url.clone() {
        settings.server_url = url;
    }
    if let Some(secs) = args.timeout_secs {
        settings.request_timeout_secs = secs;
    }

    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?
        .block_on(run(settings, args.command))
}

async fn run(settings: Settings, command: Command) -> Result<()> {
    info!(server_url = %settings.server_url, "dashboard starting");

    match command {
        Command::Overview => {
            let controller = overview(&settings, Arc::new(ReloadSignal::default()))?;
            log_report(&controller.load().await);
            print_page(controller.view()).await
        }
        Command::Statistics { class } => {
            let controller = StatisticsController::new(
                settings.http()?,
                PageView::new(PageContext::Statistics, HeadlessCharts::new()),
            );
            log_report(&controller.load().await);
            if let Some(class) = class {
                controller.select_class(&class).await;
            }
            print_page(controller.view()).await
        }
        Command::Search { query } => {
            let controller = overview(&settings, Arc::new(ReloadSignal::default()))?;
            if !controller.on_search_input(&query) {
                bail!("search needs at least two characters");
            }
            let deadline = settings.timings().search_debounce
                + Duration::from_secs(settings.request_timeout_secs);
            tokio::time::timeout(deadline, async {
                while !controller.search_status().settled() {
                    tokio::time::sleep(Duration::from_millis(25)).await;
                }
            })
            .await
            .context("search did not finish in time")?;
            println!(
                "{}",
                serde_json::to_string_pretty(&controller.search_status())?
            );
            Ok(())
        }
        Command::Upload { path } => {
            let file = UploadFile::from_path(&path)
                .await
                .with_context(|| format!("failed to read '{}'", path.display()))?;
            let signal = Arc::new(ReloadSignal::default());
            let controller = overview(&settings, Arc::clone(&signal) as Arc<dyn PageNavigator>)?;

            let outcome = controller.upload(file).await;
            let notices = controller.notifications().active().await;
            println!(
                "{}",
                serde_json::to_string_pretty(&upload_json(&outcome, &notices))?
            );
            if !outcome.is_accepted() {
                bail!("upload failed: {}", outcome.message());
            }

            signal.requested.notified().await;
            log_report(&controller.load().await);
            print_page(controller.view()).await
        }
    }
}

fn overview(settings: &Settings, navigator: Arc<dyn PageNavigator>) -> Result<OverviewController> {
    Ok(OverviewController::new(
        settings.http()?,
        PageView::new(PageContext::Overview, HeadlessCharts::new()),
        navigator,
        settings.timings(),
    ))
}

fn upload_json(outcome: &UploadOutcome, notices: &[Notification]) -> serde_json::Value {
    let mut body = match outcome {
        UploadOutcome::Accepted { message } => json!({ "outcome": "accepted", "message": message }),
        UploadOutcome::Rejected { status, message } => {
            json!({ "outcome": "rejected", "status": status.as_u16(), "message": message })
        }
        UploadOutcome::Failed { message } => json!({ "outcome": "failed", "message": message }),
    };
    body["notifications"] = notices
        .iter()
        .map(|notice| {
            json!({
                "icon": notice.icon(),
                "message": notice.message,
                "date": notice.date_label(),
            })
        })
        .collect();
    body
}

fn log_report(report: &PipelineReport) {
    let rendered: Vec<_> = report.rendered().collect();
    if report.all_rendered() {
        info!(tasks = ?rendered, "page loaded");
    } else {
        warn!(
            rendered = ?rendered,
            total = report.outcomes.len(),
            "page loaded with missing sections"
        );
    }
}

async fn print_page(view: &dashboard_core::SharedView) -> Result<()> {
    let snapshot = view.lock().await.snapshot();
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
