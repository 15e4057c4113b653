//! Overview page: headline metrics, the two overview charts, file upload and
//! global search.

use std::{
    sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError},
    time::Duration,
};

use reqwest::StatusCode;
use serde::Serialize;
use shared::{
    domain::Severity,
    protocol::{
        ClassDistributionResponse, DashboardDataResponse, ScoreHistogramResponse,
        CLASS_DISTRIBUTION_PATH, DASHBOARD_DATA_PATH, SCORE_HISTOGRAM_PATH,
    },
};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{
    charts::{ChartKind, ChartSpec, ChartStyle, Legend, Series},
    debounce::Debouncer,
    error::TableError,
    format,
    model::{ClassDistribution, DashboardMetrics, ScoreHistogram},
    notifications::NotificationCenter,
    pipeline::{FetchTask, Pipeline, PipelineReport},
    table::SortDirection,
    transport::{DashboardHttp, UploadFile},
    view::{LoadingOverlay, PageView, SharedView},
    PageNavigator, Timings, MIN_SEARCH_LEN,
};

pub const TOTAL_STUDENTS: &str = "totalStudents";
pub const TOTAL_CLASSES: &str = "totalClasses";
pub const AVERAGE_SCORE: &str = "averageScore";
pub const PASS_RATE: &str = "passRate";
pub const CLASS_DISTRIBUTION_CHART: &str = "classDistributionChart";
pub const SCORE_DISTRIBUTION_CHART: &str = "scoreDistributionChart";

pub const TARGETS: &[&str] = &[
    TOTAL_STUDENTS,
    TOTAL_CLASSES,
    AVERAGE_SCORE,
    PASS_RATE,
    CLASS_DISTRIBUTION_CHART,
    SCORE_DISTRIBUTION_CHART,
];

pub const UPLOAD_FAILED_MESSAGE: &str = "Có lỗi xảy ra khi tải file";
pub const UPLOAD_SUCCESS_MESSAGE: &str = "Đã tải lên thành công";

const CLASS_PALETTE: [&str; 8] = [
    "#3b82f6", "#10b981", "#f59e0b", "#ef4444", "#8b5cf6", "#06b6d4", "#84cc16", "#f97316",
];
const HISTOGRAM_FILL: [&str; 6] = [
    "#ef4444", "#f97316", "#f59e0b", "#10b981", "#3b82f6", "#8b5cf6",
];
const HISTOGRAM_BORDER: [&str; 6] = [
    "#dc2626", "#ea580c", "#d97706", "#059669", "#2563eb", "#7c3aed",
];

/// How an upload ended, as reported to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Accepted { message: String },
    /// The server answered with a non-2xx status.
    Rejected { status: StatusCode, message: String },
    /// No usable answer: transport failure or unreadable body.
    Failed { message: String },
}

impl UploadOutcome {
    pub fn message(&self) -> &str {
        match self {
            UploadOutcome::Accepted { message }
            | UploadOutcome::Rejected { message, .. }
            | UploadOutcome::Failed { message } => message,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, UploadOutcome::Accepted { .. })
    }
}

/// Sequence bookkeeping for search requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchStatus {
    pub issued: u64,
    pub completed: u64,
    /// Sequence number of the newest response applied.
    pub applied: u64,
    /// Sequence number of the newest response received, applied or failed.
    pub newest_completed: u64,
    pub last_applied_query: Option<String>,
    pub stale_dropped: u64,
    pub failed: u64,
}

impl SearchStatus {
    /// At least one request went out and none is still in flight.
    pub fn settled(&self) -> bool {
        self.issued > 0 && self.completed == self.issued
    }
}

#[derive(Default)]
struct SearchTracker {
    status: StdMutex<SearchStatus>,
}

impl SearchTracker {
    fn lock(&self) -> MutexGuard<'_, SearchStatus> {
        self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn issue(&self) -> u64 {
        let mut status = self.lock();
        status.issued += 1;
        status.issued
    }

    /// Records the response for request `seq` unless a newer request already
    /// completed, successfully or not.
    fn apply(&self, seq: u64, query: &str) -> bool {
        let mut status = self.lock();
        status.completed += 1;
        if seq < status.newest_completed {
            status.stale_dropped += 1;
            return false;
        }
        status.newest_completed = seq;
        status.applied = seq;
        status.last_applied_query = Some(query.to_string());
        true
    }

    fn fail(&self, seq: u64) {
        let mut status = self.lock();
        status.completed += 1;
        status.failed += 1;
        status.newest_completed = status.newest_completed.max(seq);
    }
}

pub struct OverviewController {
    http: DashboardHttp,
    view: SharedView,
    notifications: NotificationCenter,
    loading: LoadingOverlay,
    navigator: Arc<dyn PageNavigator>,
    search: Debouncer<String>,
    searches: Arc<SearchTracker>,
    reload_delay: Duration,
    pending_reload: StdMutex<Option<JoinHandle<()>>>,
    pipeline: Pipeline,
}

impl OverviewController {
    pub fn new(
        http: DashboardHttp,
        view: PageView,
        navigator: Arc<dyn PageNavigator>,
        timings: Timings,
    ) -> Self {
        let searches = Arc::new(SearchTracker::default());
        let search = {
            let http = http.clone();
            let searches = Arc::clone(&searches);
            Debouncer::new(timings.search_debounce, move |query: String| {
                run_search(http.clone(), Arc::clone(&searches), query)
            })
        };

        Self {
            http,
            view: view.into_shared(),
            notifications: NotificationCenter::new(timings.notification_ttl),
            loading: LoadingOverlay::default(),
            navigator,
            search,
            searches,
            reload_delay: timings.reload_delay,
            pending_reload: StdMutex::new(None),
            pipeline: overview_pipeline(),
        }
    }

    pub fn view(&self) -> &SharedView {
        &self.view
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn loading(&self) -> &LoadingOverlay {
        &self.loading
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Fetches and renders every overview section.
    pub async fn load(&self) -> PipelineReport {
        self.pipeline.run(&self.http, &self.view).await
    }

    /// Sends `file` to the backend behind the loading overlay and reports the
    /// result with exactly one notification. The overlay is hidden before the
    /// notification appears. A successful upload schedules a page reload.
    pub async fn upload(&self, file: UploadFile) -> UploadOutcome {
        info!(filename = %file.filename, bytes = file.bytes.len(), "uploading file");
        let reply = {
            let _loading = self.loading.show();
            self.http.upload(file).await
        };

        let outcome = match reply {
            Ok(reply) if reply.status.is_success() => UploadOutcome::Accepted {
                message: reply
                    .body
                    .message
                    .unwrap_or_else(|| UPLOAD_SUCCESS_MESSAGE.to_string()),
            },
            Ok(reply) => UploadOutcome::Rejected {
                status: reply.status,
                message: reply
                    .body
                    .error
                    .unwrap_or_else(|| UPLOAD_FAILED_MESSAGE.to_string()),
            },
            Err(error) => {
                warn!(error = %error, "upload failed");
                UploadOutcome::Failed {
                    message: UPLOAD_FAILED_MESSAGE.to_string(),
                }
            }
        };

        match &outcome {
            UploadOutcome::Accepted { message } => {
                info!(message = %message, "upload accepted");
                self.notifications
                    .notify(Severity::Success, message.clone())
                    .await;
                self.schedule_reload();
            }
            UploadOutcome::Rejected { status, message } => {
                warn!(status = %status, message = %message, "upload rejected");
                self.notifications
                    .notify(Severity::Error, message.clone())
                    .await;
            }
            UploadOutcome::Failed { message } => {
                self.notifications
                    .notify(Severity::Error, message.clone())
                    .await;
            }
        }
        outcome
    }

    pub fn reload_pending(&self) -> bool {
        self.lock_reload()
            .as_ref()
            .is_some_and(|reload| !reload.is_finished())
    }

    /// Feeds one keystroke's worth of search input. Every call re-arms the
    /// debounce timer; only queries of at least two characters (after
    /// trimming) reach the backend. Returns whether this input would.
    pub fn on_search_input(&self, raw: &str) -> bool {
        let query = raw.trim().to_string();
        let searchable = query.chars().count() >= MIN_SEARCH_LEN;
        self.search.call(query);
        searchable
    }

    pub fn search_status(&self) -> SearchStatus {
        self.searches.lock().clone()
    }

    pub async fn sort_table(&self, id: &str, column: usize) -> Result<SortDirection, TableError> {
        self.view.lock().await.sort_table(id, column)
    }

    fn schedule_reload(&self) {
        let navigator = Arc::clone(&self.navigator);
        let delay = self.reload_delay;
        let reload = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            info!("reloading page");
            navigator.reload();
        });
        if let Some(previous) = self.lock_reload().replace(reload) {
            previous.abort();
        }
    }

    fn lock_reload(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending_reload
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for OverviewController {
    fn drop(&mut self) {
        let pending = self
            .pending_reload
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(reload) = pending.take() {
            reload.abort();
        }
    }
}

async fn run_search(http: DashboardHttp, searches: Arc<SearchTracker>, query: String) {
    if query.chars().count() < MIN_SEARCH_LEN {
        debug!(query = %query, "search query too short");
        return;
    }

    let seq = searches.issue();
    match http.search(&query).await {
        Ok(status) => {
            if searches.apply(seq, &query) {
                info!(query = %query, seq, status = %status, "search results received");
            } else {
                warn!(query = %query, seq, "stale search response discarded");
            }
        }
        Err(error) => {
            searches.fail(seq);
            warn!(query = %query, seq, error = %error, "search failed");
        }
    }
}

fn overview_pipeline() -> Pipeline {
    Pipeline::new("overview")
        .task(
            FetchTask::<DashboardDataResponse>::new("dashboard-data", DASHBOARD_DATA_PATH)
                .render_with("metrics", render_metrics),
        )
        .task(
            FetchTask::<ClassDistributionResponse>::new(
                "class-distribution",
                CLASS_DISTRIBUTION_PATH,
            )
            .render_with("class-distribution-chart", render_class_distribution),
        )
        .task(
            FetchTask::<ScoreHistogramResponse>::new("score-histogram", SCORE_HISTOGRAM_PATH)
                .render_with("score-distribution-chart", render_score_histogram),
        )
}

fn render_metrics(metrics: &DashboardMetrics, view: &mut PageView) {
    view.set_text(TOTAL_STUDENTS, format::count(metrics.total_students));
    view.set_text(TOTAL_CLASSES, format::count(metrics.total_classes));
    view.set_text(AVERAGE_SCORE, format::fixed(metrics.average_score, 1));
    view.set_text(PASS_RATE, format::percent(metrics.pass_rate, 1));
}

fn render_class_distribution(distribution: &ClassDistribution, view: &mut PageView) {
    view.mount_chart(
        CLASS_DISTRIBUTION_CHART,
        ChartSpec {
            kind: ChartKind::Donut,
            labels: distribution.labels.clone(),
            series: vec![Series {
                label: None,
                values: distribution.values.clone(),
            }],
            style: ChartStyle {
                colors: CLASS_PALETTE.to_vec(),
                legend: Legend::Bottom,
                ..ChartStyle::default()
            },
        },
    );
}

fn render_score_histogram(histogram: &ScoreHistogram, view: &mut PageView) {
    let Some((labels, counts)) = &histogram.bins else {
        warn!("no score data");
        return;
    };
    view.mount_chart(
        SCORE_DISTRIBUTION_CHART,
        ChartSpec {
            kind: ChartKind::Bar,
            labels: labels.clone(),
            series: vec![Series {
                label: Some("Số sinh viên".to_string()),
                values: counts.clone(),
            }],
            style: ChartStyle {
                colors: HISTOGRAM_FILL.to_vec(),
                border_colors: HISTOGRAM_BORDER.to_vec(),
                begin_at_zero: true,
                tick_step: Some(1.0),
                tooltip_suffix: Some(" sinh viên"),
                ..ChartStyle::default()
            },
        },
    );
}

#[cfg(test)]
#[path = "tests/overview_tests.rs"]
mod tests;
