//! Chart descriptions and the slots that own live chart instances.

use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, PoisonError,
    },
};

use serde::Serialize;
use shared::domain::ChartId;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Donut,
    Bar,
    Line,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Legend {
    #[default]
    Hidden,
    Bottom,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub label: Option<String>,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ChartStyle {
    pub colors: Vec<&'static str>,
    pub border_colors: Vec<&'static str>,
    pub legend: Legend,
    /// Bars run along the y axis.
    pub horizontal: bool,
    pub begin_at_zero: bool,
    pub value_min: Option<f64>,
    pub value_max: Option<f64>,
    pub tick_step: Option<f64>,
    pub fill: bool,
    pub tension: Option<f64>,
    pub tooltip_suffix: Option<&'static str>,
    /// Extra tooltip line per data point, aligned with the labels.
    pub tooltip_notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub series: Vec<Series>,
    pub style: ChartStyle,
}

/// The charting backend. `mount` creates a live chart on a target element;
/// `release` disposes of it.
pub trait ChartSurface: Send + Sync {
    fn mount(&self, target: &str, spec: &ChartSpec) -> ChartId;
    fn release(&self, id: ChartId);
}

/// A live chart. Dropping it releases the instance on its surface.
pub struct MountedChart {
    id: ChartId,
    spec: ChartSpec,
    surface: Arc<dyn ChartSurface>,
}

impl MountedChart {
    pub fn id(&self) -> ChartId {
        self.id
    }

    pub fn spec(&self) -> &ChartSpec {
        &self.spec
    }
}

impl Drop for MountedChart {
    fn drop(&mut self) {
        self.surface.release(self.id);
    }
}

/// One chart slot per target element.
pub struct ChartBoard {
    surface: Arc<dyn ChartSurface>,
    mounted: BTreeMap<String, MountedChart>,
}

impl ChartBoard {
    pub fn new(surface: Arc<dyn ChartSurface>) -> Self {
        Self {
            surface,
            mounted: BTreeMap::new(),
        }
    }

    /// Mounts `spec` on `target`, releasing the chart already there first.
    pub fn replace(&mut self, target: &str, spec: ChartSpec) -> ChartId {
        if let Some(previous) = self.mounted.remove(target) {
            debug!(slot = target, chart = previous.id().0, "releasing previous chart");
            drop(previous);
        }
        let id = self.surface.mount(target, &spec);
        self.mounted.insert(
            target.to_string(),
            MountedChart {
                id,
                spec,
                surface: Arc::clone(&self.surface),
            },
        );
        id
    }

    pub fn get(&self, target: &str) -> Option<&MountedChart> {
        self.mounted.get(target)
    }

    pub fn release_all(&mut self) {
        self.mounted.clear();
    }

    pub fn specs(&self) -> BTreeMap<String, ChartSpec> {
        self.mounted
            .iter()
            .map(|(target, chart)| (target.clone(), chart.spec.clone()))
            .collect()
    }
}

/// Surface that only keeps track of which charts are alive. Used by the CLI
/// and in tests.
#[derive(Default)]
pub struct HeadlessCharts {
    next_id: AtomicU64,
    live: Mutex<BTreeMap<ChartId, String>>,
    mounted_total: AtomicU64,
    released_total: AtomicU64,
}

impl HeadlessCharts {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Targets with a live chart, in creation order.
    pub fn live_targets(&self) -> Vec<String> {
        self.live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    pub fn mounted_total(&self) -> u64 {
        self.mounted_total.load(Ordering::Relaxed)
    }

    pub fn released_total(&self) -> u64 {
        self.released_total.load(Ordering::Relaxed)
    }
}

impl ChartSurface for HeadlessCharts {
    fn mount(&self, target: &str, _spec: &ChartSpec) -> ChartId {
        let id = ChartId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        self.live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, target.to_string());
        self.mounted_total.fetch_add(1, Ordering::Relaxed);
        id
    }

    fn release(&self, id: ChartId) {
        let removed = self
            .live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
        if removed.is_some() {
            self.released_total.fetch_add(1, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(values: Vec<f64>) -> ChartSpec {
        ChartSpec {
            kind: ChartKind::Bar,
            labels: values.iter().map(|v| v.to_string()).collect(),
            series: vec![Series {
                label: None,
                values,
            }],
            style: ChartStyle::default(),
        }
    }

    #[test]
    fn replacing_a_slot_releases_the_previous_chart_first() {
        let surface = HeadlessCharts::new();
        let mut board = ChartBoard::new(surface.clone());

        let first = board.replace("scoreChart", bar(vec![1.0]));
        let second = board.replace("scoreChart", bar(vec![2.0]));

        assert_ne!(first, second);
        assert_eq!(surface.mounted_total(), 2);
        assert_eq!(surface.released_total(), 1);
        assert_eq!(surface.live_targets(), vec!["scoreChart".to_string()]);
        let current = board.get("scoreChart").expect("mounted");
        assert_eq!(current.id(), second);
        assert_eq!(current.spec().series[0].values, vec![2.0]);
    }

    #[test]
    fn dropping_the_board_releases_everything() {
        let surface = HeadlessCharts::new();
        {
            let mut board = ChartBoard::new(surface.clone());
            board.replace("a", bar(vec![1.0]));
            board.replace("b", bar(vec![1.0]));
        }
        assert!(surface.live_targets().is_empty());
        assert_eq!(surface.released_total(), 2);
    }
}
