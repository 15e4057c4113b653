//! In-memory page model that renderers project data onto.

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use serde::Serialize;
use shared::domain::{ChartId, PageContext, RecommendationKind};
use tokio::sync::Mutex;

use crate::{
    charts::{ChartBoard, ChartSpec, ChartSurface},
    error::TableError,
    table::{SortDirection, TableModel},
};

pub type SharedView = Arc<Mutex<PageView>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatItem {
    pub label: String,
    pub value: String,
}

impl StatItem {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RankBadge {
    Gold,
    Silver,
    Bronze,
    Default,
}

impl RankBadge {
    pub fn for_rank(rank: u32) -> Self {
        match rank {
            1 => RankBadge::Gold,
            2 => RankBadge::Silver,
            3 => RankBadge::Bronze,
            _ => RankBadge::Default,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankingRow {
    pub rank: u32,
    pub badge: RankBadge,
    pub name: String,
    pub class_name: String,
    pub score: String,
    /// Drawn in the warning colour.
    pub low: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassCard {
    pub heading: &'static str,
    pub icon: &'static str,
    pub class_name: String,
    pub mean: String,
    pub pass_rate: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecommendationCard {
    pub kind: RecommendationKind,
    pub icon: &'static str,
    pub color: &'static str,
    pub title: String,
    pub message: String,
}

/// Generated markup for a container element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "panel", rename_all = "snake_case")]
pub enum Panel {
    Stats {
        items: Vec<StatItem>,
    },
    Outliers {
        count: String,
        percentage: String,
        warning: bool,
        description: &'static str,
    },
    ClassMetrics {
        best: ClassCard,
        worst: ClassCard,
        class_count: usize,
        gap: String,
    },
    Rankings {
        rows: Vec<RankingRow>,
    },
    Recommendations {
        cards: Vec<RecommendationCard>,
    },
    Empty {
        icon: &'static str,
        message: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageSnapshot {
    pub context: PageContext,
    pub texts: BTreeMap<String, String>,
    pub panels: BTreeMap<String, Panel>,
    pub options: BTreeMap<String, Vec<SelectOption>>,
    pub selections: BTreeMap<String, String>,
    pub charts: BTreeMap<String, ChartSpec>,
    pub tables: BTreeMap<String, TableModel>,
}

/// Everything a page currently shows. Writes to a target the page does not
/// contain are ignored, the way a missing element is skipped in the browser.
pub struct PageView {
    context: PageContext,
    targets: BTreeSet<String>,
    texts: BTreeMap<String, String>,
    panels: BTreeMap<String, Panel>,
    options: BTreeMap<String, Vec<SelectOption>>,
    selections: BTreeMap<String, String>,
    tables: BTreeMap<String, TableModel>,
    charts: ChartBoard,
}

impl PageView {
    /// A page containing every target its context knows about.
    pub fn new(context: PageContext, surface: Arc<dyn ChartSurface>) -> Self {
        let targets = match context {
            PageContext::Overview => crate::overview::TARGETS,
            PageContext::Statistics => crate::statistics::TARGETS,
        };
        Self::with_targets(context, surface, targets.iter().copied())
    }

    pub fn with_targets<'a>(
        context: PageContext,
        surface: Arc<dyn ChartSurface>,
        targets: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Self {
            context,
            targets: targets.into_iter().map(str::to_string).collect(),
            texts: BTreeMap::new(),
            panels: BTreeMap::new(),
            options: BTreeMap::new(),
            selections: BTreeMap::new(),
            tables: BTreeMap::new(),
            charts: ChartBoard::new(surface),
        }
    }

    pub fn without_target(mut self, target: &str) -> Self {
        self.targets.remove(target);
        self
    }

    pub fn into_shared(self) -> SharedView {
        Arc::new(Mutex::new(self))
    }

    pub fn context(&self) -> PageContext {
        self.context
    }

    pub fn has_target(&self, target: &str) -> bool {
        self.targets.contains(target)
    }

    pub fn set_text(&mut self, target: &str, value: impl Into<String>) -> bool {
        if !self.has_target(target) {
            return false;
        }
        self.texts.insert(target.to_string(), value.into());
        true
    }

    pub fn text(&self, target: &str) -> Option<&str> {
        self.texts.get(target).map(String::as_str)
    }

    pub fn set_panel(&mut self, target: &str, panel: Panel) -> bool {
        if !self.has_target(target) {
            return false;
        }
        self.panels.insert(target.to_string(), panel);
        true
    }

    pub fn panel(&self, target: &str) -> Option<&Panel> {
        self.panels.get(target)
    }

    pub fn set_options(&mut self, target: &str, options: Vec<SelectOption>) -> bool {
        if !self.has_target(target) {
            return false;
        }
        self.options.insert(target.to_string(), options);
        true
    }

    pub fn options(&self, target: &str) -> &[SelectOption] {
        self.options.get(target).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn select(&mut self, target: &str, value: impl Into<String>) -> bool {
        if !self.has_target(target) {
            return false;
        }
        self.selections.insert(target.to_string(), value.into());
        true
    }

    pub fn selection(&self, target: &str) -> Option<&str> {
        self.selections.get(target).map(String::as_str)
    }

    /// Mounts a chart, releasing whatever chart the target held before.
    pub fn mount_chart(&mut self, target: &str, spec: ChartSpec) -> Option<ChartId> {
        if !self.has_target(target) {
            return None;
        }
        Some(self.charts.replace(target, spec))
    }

    pub fn chart(&self, target: &str) -> Option<&ChartSpec> {
        self.charts.get(target).map(|chart| chart.spec())
    }

    pub fn chart_id(&self, target: &str) -> Option<ChartId> {
        self.charts.get(target).map(|chart| chart.id())
    }

    pub fn register_table(&mut self, id: impl Into<String>, table: TableModel) {
        self.tables.insert(id.into(), table);
    }

    pub fn table(&self, id: &str) -> Option<&TableModel> {
        self.tables.get(id)
    }

    pub fn sort_table(&mut self, id: &str, column: usize) -> Result<SortDirection, TableError> {
        self.tables
            .get_mut(id)
            .ok_or_else(|| TableError::UnknownTable(id.to_string()))?
            .sort_by(column)
    }

    pub fn snapshot(&self) -> PageSnapshot {
        PageSnapshot {
            context: self.context,
            texts: self.texts.clone(),
            panels: self.panels.clone(),
            options: self.options.clone(),
            selections: self.selections.clone(),
            charts: self.charts.specs(),
            tables: self.tables.clone(),
        }
    }
}

/// Blocking overlay shown while a user-triggered request is in flight. It
/// stays up until every outstanding guard is dropped.
#[derive(Debug, Clone, Default)]
pub struct LoadingOverlay {
    active: Arc<AtomicUsize>,
}

impl LoadingOverlay {
    /// Shows the overlay until the returned guard is dropped.
    pub fn show(&self) -> LoadingGuard {
        self.active.fetch_add(1, Ordering::SeqCst);
        LoadingGuard {
            active: Arc::clone(&self.active),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.active.load(Ordering::SeqCst) > 0
    }
}

#[must_use = "the overlay hides as soon as the guard is dropped"]
pub struct LoadingGuard {
    active: Arc<AtomicUsize>,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::HeadlessCharts;
    use crate::table::ColumnHeader;

    #[test]
    fn writes_to_missing_targets_are_skipped() {
        let mut view = PageView::new(PageContext::Overview, HeadlessCharts::new())
            .without_target(crate::overview::TOTAL_CLASSES);

        assert!(view.set_text(crate::overview::TOTAL_STUDENTS, "12"));
        assert!(!view.set_text(crate::overview::TOTAL_CLASSES, "3"));
        assert!(!view.set_text("nonexistent", "x"));
        assert_eq!(view.text(crate::overview::TOTAL_STUDENTS), Some("12"));
        assert_eq!(view.text(crate::overview::TOTAL_CLASSES), None);
    }

    #[test]
    fn registered_tables_sort_through_the_view() {
        let mut view = PageView::new(PageContext::Overview, HeadlessCharts::new());
        view.register_table(
            "students",
            TableModel::new(
                vec![ColumnHeader::sortable("Điểm")],
                vec![vec!["9".into()], vec!["10".into()]],
            ),
        );

        assert_eq!(view.sort_table("students", 0), Ok(SortDirection::Ascending));
        assert_eq!(
            view.table("students").expect("table").column(0),
            vec!["9", "10"]
        );
        assert_eq!(
            view.sort_table("missing", 0),
            Err(TableError::UnknownTable("missing".into()))
        );
    }

    #[test]
    fn overlay_hides_when_guard_drops() {
        let overlay = LoadingOverlay::default();
        {
            let _guard = overlay.show();
            assert!(overlay.is_visible());
        }
        assert!(!overlay.is_visible());
    }

    #[test]
    fn overlay_stays_up_until_the_last_guard_drops() {
        let overlay = LoadingOverlay::default();
        let slow = overlay.show();
        let fast = overlay.clone().show();

        drop(fast);
        assert!(overlay.is_visible());
        drop(slow);
        assert!(!overlay.is_visible());
    }

    #[test]
    fn rank_badges() {
        assert_eq!(RankBadge::for_rank(1), RankBadge::Gold);
        assert_eq!(RankBadge::for_rank(2), RankBadge::Silver);
        assert_eq!(RankBadge::for_rank(3), RankBadge::Bronze);
        assert_eq!(RankBadge::for_rank(4), RankBadge::Default);
        assert_eq!(RankBadge::for_rank(0), RankBadge::Default);
    }
}
