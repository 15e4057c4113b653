use std::time::Duration;

pub mod charts;
pub mod debounce;
pub mod error;
pub mod format;
pub mod model;
pub mod notifications;
pub mod overview;
pub mod pipeline;
pub mod statistics;
pub mod table;
pub mod transport;
pub mod validation;
pub mod view;

pub use charts::{ChartSurface, HeadlessCharts};
pub use error::{FetchError, TableError};
pub use notifications::{Notification, NotificationCenter};
pub use overview::{OverviewController, UploadOutcome};
pub use pipeline::{Pipeline, PipelineReport, TaskOutcome};
pub use statistics::StatisticsController;
pub use transport::{DashboardHttp, UploadFile};
pub use view::{LoadingOverlay, PageSnapshot, PageView, SharedView};

pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);
pub const RELOAD_DELAY: Duration = Duration::from_millis(1500);
pub const MIN_SEARCH_LEN: usize = 2;

/// Delays the controllers wait on. The defaults match what users see in the
/// browser; tests shrink them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub search_debounce: Duration,
    pub notification_ttl: Duration,
    pub reload_delay: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            search_debounce: SEARCH_DEBOUNCE,
            notification_ttl: notifications::NOTIFICATION_TTL,
            reload_delay: RELOAD_DELAY,
        }
    }
}

/// Reloads the page after a successful upload.
pub trait PageNavigator: Send + Sync {
    fn reload(&self);
}
