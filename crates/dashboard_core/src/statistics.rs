//! Statistics page: detailed score analysis, per-class comparison, rankings
//! and recommendations.

use shared::{
    domain::RecommendationKind,
    protocol::{
        ClassAnalysisResponse, DetailedStatisticsResponse, RecommendationsResponse,
        TopStudentsResponse, CLASS_ANALYSIS_PATH, DETAILED_STATISTICS_PATH,
        RECOMMENDATIONS_PATH, TOP_STUDENTS_PATH,
    },
};
use tracing::{debug, info};

use crate::{
    charts::{ChartKind, ChartSpec, ChartStyle, Series},
    error::TableError,
    format,
    model::{
        ClassAnalysis, ClassSummary, DetailedStatistics, RankedStudent, Rankings, Recommendation,
    },
    pipeline::{FetchTask, Pipeline, PipelineReport},
    table::{ColumnHeader, SortDirection, TableModel},
    transport::DashboardHttp,
    view::{
        ClassCard, PageView, Panel, RankBadge, RankingRow, RecommendationCard, SelectOption,
        SharedView, StatItem,
    },
};

pub const TOTAL_STUDENTS_DETAIL: &str = "totalStudentsDetail";
pub const AVERAGE_GPA: &str = "averageGPA";
pub const PASS_RATE_DETAIL: &str = "passRateDetail";
pub const EXCELLENT_COUNT: &str = "excellentCount";
pub const DETAILED_SCORE_CHART: &str = "detailedScoreChart";
pub const SCORE_STATS: &str = "scoreStats";
pub const TREND_CHART: &str = "trendChart";
pub const STANDARD_DEVIATION: &str = "standardDeviation";
pub const COEFFICIENT_VARIATION: &str = "coefficientVariation";
pub const SKEWNESS: &str = "skewness";
pub const QUARTILE_ANALYSIS: &str = "quartileAnalysis";
pub const OUTLIER_ANALYSIS: &str = "outlierAnalysis";
pub const CLASS_FILTER: &str = "classFilter";
pub const CLASS_PERFORMANCE_CHART: &str = "classPerformanceChart";
pub const CLASS_METRICS: &str = "classMetrics";
pub const TOP_STUDENTS: &str = "topStudents";
pub const LOW_PERFORMERS: &str = "lowPerformers";
pub const RECOMMENDATIONS: &str = "recommendations";

pub const TARGETS: &[&str] = &[
    TOTAL_STUDENTS_DETAIL,
    AVERAGE_GPA,
    PASS_RATE_DETAIL,
    EXCELLENT_COUNT,
    DETAILED_SCORE_CHART,
    SCORE_STATS,
    TREND_CHART,
    STANDARD_DEVIATION,
    COEFFICIENT_VARIATION,
    SKEWNESS,
    QUARTILE_ANALYSIS,
    OUTLIER_ANALYSIS,
    CLASS_FILTER,
    CLASS_PERFORMANCE_CHART,
    CLASS_METRICS,
    TOP_STUDENTS,
    LOW_PERFORMERS,
    RECOMMENDATIONS,
];

/// Value of the filter option that shows every class.
pub const ALL_CLASSES: &str = "";

/// Share of outliers, in percent, above which the outlier panel warns.
pub const OUTLIER_WARNING_PERCENT: f64 = 5.0;

const TREND_MONTHS: [&str; 6] = ["T1", "T2", "T3", "T4", "T5", "T6"];
const TREND_FALLBACK_MEAN: f64 = 6.0;

const GRADE_PALETTE: [&str; 6] = [
    "#ef4444", "#f97316", "#f59e0b", "#10b981", "#3b82f6", "#8b5cf6",
];

pub struct StatisticsController {
    http: DashboardHttp,
    view: SharedView,
    pipeline: Pipeline,
}

impl StatisticsController {
    pub fn new(http: DashboardHttp, view: PageView) -> Self {
        Self {
            http,
            view: view.into_shared(),
            pipeline: statistics_pipeline(),
        }
    }

    pub fn view(&self) -> &SharedView {
        &self.view
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub async fn load(&self) -> PipelineReport {
        self.pipeline.run(&self.http, &self.view).await
    }

    /// Records the class picked in the filter. [`ALL_CLASSES`] clears it.
    pub async fn select_class(&self, class_name: &str) -> bool {
        info!(class = class_name, "class filter changed");
        self.view.lock().await.select(CLASS_FILTER, class_name)
    }

    pub async fn sort_table(&self, id: &str, column: usize) -> Result<SortDirection, TableError> {
        self.view.lock().await.sort_table(id, column)
    }
}

fn statistics_pipeline() -> Pipeline {
    Pipeline::new("statistics")
        .task(
            FetchTask::<DetailedStatisticsResponse>::new(
                "detailed-statistics",
                DETAILED_STATISTICS_PATH,
            )
            .render_with("detail-metrics", render_detail_metrics)
            .render_with("grade-distribution-chart", render_grade_chart)
            .render_with("score-stats", render_score_stats)
            .render_with("trend-chart", render_trend_chart)
            .render_with("advanced-metrics", render_advanced_metrics)
            .render_with("quartiles", render_quartiles)
            .render_with("outliers", render_outliers),
        )
        .task(
            FetchTask::<ClassAnalysisResponse>::new("class-analysis", CLASS_ANALYSIS_PATH)
                .render_with("class-filter", render_class_filter)
                .render_with("class-performance-chart", render_class_chart)
                .render_with("class-metrics", render_class_metrics),
        )
        .task(
            FetchTask::<TopStudentsResponse>::new("top-students", TOP_STUDENTS_PATH)
                .render_with("top-students", render_top_students)
                .render_with("low-performers", render_low_performers),
        )
        .task(
            FetchTask::<RecommendationsResponse>::new("recommendations", RECOMMENDATIONS_PATH)
                .render_with("recommendations", render_recommendations),
        )
}

fn render_detail_metrics(stats: &DetailedStatistics, view: &mut PageView) {
    let basic = stats.basic_or_default();
    let advanced = stats.advanced_or_default();
    let excellent = basic.total_students * advanced.excellent_rate / 100.0;

    view.set_text(TOTAL_STUDENTS_DETAIL, format::count(basic.total_students));
    view.set_text(AVERAGE_GPA, format::fixed(basic.mean, 2));
    view.set_text(PASS_RATE_DETAIL, format::percent(advanced.pass_rate, 1));
    view.set_text(EXCELLENT_COUNT, format::count(excellent));
}

fn render_grade_chart(stats: &DetailedStatistics, view: &mut PageView) {
    if stats.grades.is_empty() {
        debug!("no grade distribution");
        return;
    }
    view.mount_chart(
        DETAILED_SCORE_CHART,
        ChartSpec {
            kind: ChartKind::Bar,
            labels: stats.grades.iter().map(|grade| grade.label.clone()).collect(),
            series: vec![Series {
                label: Some("Số sinh viên".to_string()),
                values: stats.grades.iter().map(|grade| grade.count).collect(),
            }],
            style: ChartStyle {
                colors: GRADE_PALETTE.to_vec(),
                begin_at_zero: true,
                tooltip_notes: stats
                    .grades
                    .iter()
                    .map(|grade| format!("{}% của tổng số", format::fixed(grade.percentage, 1)))
                    .collect(),
                ..ChartStyle::default()
            },
        },
    );
}

fn render_score_stats(stats: &DetailedStatistics, view: &mut PageView) {
    let Some(basic) = stats.basic else {
        return;
    };
    view.set_panel(
        SCORE_STATS,
        Panel::Stats {
            items: vec![
                StatItem::new("Trung bình", format::fixed(basic.mean, 2)),
                StatItem::new("Trung vị", format::fixed(basic.median, 2)),
                StatItem::new("Độ lệch chuẩn", format::fixed(basic.std_dev, 2)),
                StatItem::new("Phạm vi", format::fixed(basic.range, 2)),
            ],
        },
    );
}

/// Month-by-month averages are not served yet; the line rises 0.1 per month
/// from the current mean.
fn render_trend_chart(stats: &DetailedStatistics, view: &mut PageView) {
    let mean = stats
        .basic
        .map(|basic| basic.mean)
        .filter(|mean| *mean != 0.0)
        .unwrap_or(TREND_FALLBACK_MEAN);
    view.mount_chart(
        TREND_CHART,
        ChartSpec {
            kind: ChartKind::Line,
            labels: TREND_MONTHS.iter().map(|month| month.to_string()).collect(),
            series: vec![Series {
                label: Some("Điểm trung bình".to_string()),
                values: (0..TREND_MONTHS.len())
                    .map(|index| mean + 0.1 * index as f64)
                    .collect(),
            }],
            style: ChartStyle {
                colors: vec!["rgba(59, 130, 246, 0.1)"],
                border_colors: vec!["#3b82f6"],
                fill: true,
                tension: Some(0.4),
                value_min: Some(0.0),
                value_max: Some(10.0),
                ..ChartStyle::default()
            },
        },
    );
}

fn render_advanced_metrics(stats: &DetailedStatistics, view: &mut PageView) {
    let basic = stats.basic_or_default();
    let advanced = stats.advanced_or_default();
    view.set_text(STANDARD_DEVIATION, format::fixed(basic.std_dev, 2));
    view.set_text(
        COEFFICIENT_VARIATION,
        format::percent(advanced.coefficient_variation, 1),
    );
    view.set_text(SKEWNESS, format::fixed(advanced.skewness, 3));
}

fn render_quartiles(stats: &DetailedStatistics, view: &mut PageView) {
    let Some(quartiles) = stats.quartiles else {
        return;
    };
    view.set_panel(
        QUARTILE_ANALYSIS,
        Panel::Stats {
            items: vec![
                StatItem::new("Q1 (25%)", format::fixed(quartiles.q1, 2)),
                StatItem::new("Q2 (50% - Trung vị)", format::fixed(quartiles.q2, 2)),
                StatItem::new("Q3 (75%)", format::fixed(quartiles.q3, 2)),
                StatItem::new("IQR", format::fixed(quartiles.iqr, 2)),
            ],
        },
    );
}

fn render_outliers(stats: &DetailedStatistics, view: &mut PageView) {
    let Some(advanced) = stats.advanced else {
        return;
    };
    let warning = advanced.outlier_percentage > OUTLIER_WARNING_PERCENT;
    let description = if warning {
        "Có nhiều điểm bất thường, cần kiểm tra dữ liệu."
    } else {
        "Dữ liệu khá đồng đều, ít điểm bất thường."
    };
    view.set_panel(
        OUTLIER_ANALYSIS,
        Panel::Outliers {
            count: format::count(advanced.outlier_count),
            percentage: format::percent(advanced.outlier_percentage, 1),
            warning,
            description,
        },
    );
}

fn render_class_filter(analysis: &ClassAnalysis, view: &mut PageView) {
    let options = std::iter::once(SelectOption {
        value: ALL_CLASSES.to_string(),
        label: "Tất cả lớp".to_string(),
    })
    .chain(analysis.classes.iter().map(|class| SelectOption {
        value: class.class_name.clone(),
        label: format!(
            "{} ({} SV)",
            class.class_name,
            format::count(class.student_count)
        ),
    }))
    .collect();
    view.set_options(CLASS_FILTER, options);
}

fn render_class_chart(analysis: &ClassAnalysis, view: &mut PageView) {
    view.mount_chart(
        CLASS_PERFORMANCE_CHART,
        ChartSpec {
            kind: ChartKind::Bar,
            labels: analysis
                .classes
                .iter()
                .map(|class| class.class_name.clone())
                .collect(),
            series: vec![Series {
                label: Some("Điểm trung bình".to_string()),
                values: analysis.classes.iter().map(|class| class.mean).collect(),
            }],
            style: ChartStyle {
                colors: vec!["#3b82f6"],
                horizontal: true,
                begin_at_zero: true,
                value_max: Some(10.0),
                ..ChartStyle::default()
            },
        },
    );
}

fn class_card(heading: &'static str, icon: &'static str, class: &ClassSummary) -> ClassCard {
    ClassCard {
        heading,
        icon,
        class_name: class.class_name.clone(),
        mean: format::fixed(class.mean, 2),
        pass_rate: format::percent(class.pass_rate, 1),
    }
}

fn render_class_metrics(analysis: &ClassAnalysis, view: &mut PageView) {
    let (Some(best), Some(worst)) = (analysis.classes.first(), analysis.classes.last()) else {
        debug!("no classes to compare");
        return;
    };
    view.set_panel(
        CLASS_METRICS,
        Panel::ClassMetrics {
            best: class_card("Lớp xuất sắc nhất", "trophy", best),
            worst: class_card("Lớp cần hỗ trợ", "alert-triangle", worst),
            class_count: analysis.classes.len(),
            gap: format::fixed(best.mean - worst.mean, 2),
        },
    );
}

fn ranking_rows(students: &[RankedStudent], low: bool) -> Vec<RankingRow> {
    students
        .iter()
        .map(|student| RankingRow {
            rank: student.rank,
            badge: RankBadge::for_rank(student.rank),
            name: student.name.clone(),
            class_name: student.class_name.clone(),
            score: format::fixed(student.score, 2),
            low,
        })
        .collect()
}

/// Sortable by clicking any header.
fn ranking_table(rows: &[RankingRow]) -> TableModel {
    TableModel::new(
        vec![
            ColumnHeader::sortable("Hạng"),
            ColumnHeader::sortable("Họ tên"),
            ColumnHeader::sortable("Lớp"),
            ColumnHeader::sortable("Điểm"),
        ],
        rows.iter()
            .map(|row| {
                vec![
                    row.rank.to_string(),
                    row.name.clone(),
                    row.class_name.clone(),
                    row.score.clone(),
                ]
            })
            .collect(),
    )
}

fn render_top_students(rankings: &Rankings, view: &mut PageView) {
    let rows = ranking_rows(&rankings.top, false);
    view.register_table(TOP_STUDENTS, ranking_table(&rows));
    view.set_panel(TOP_STUDENTS, Panel::Rankings { rows });
}

fn render_low_performers(rankings: &Rankings, view: &mut PageView) {
    let panel = if rankings.low.is_empty() {
        Panel::Empty {
            icon: "check-circle",
            message: "Tất cả sinh viên đều đạt điểm qua môn!",
        }
    } else {
        Panel::Rankings {
            rows: ranking_rows(&rankings.low, true),
        }
    };
    view.set_panel(LOW_PERFORMERS, panel);
}

fn recommendation_style(kind: RecommendationKind) -> (&'static str, &'static str) {
    match kind {
        RecommendationKind::Error => ("alert-circle", "#ef4444"),
        RecommendationKind::Warning => ("alert-triangle", "#f59e0b"),
        RecommendationKind::Success => ("check-circle", "#10b981"),
        RecommendationKind::Info | RecommendationKind::Unknown => ("info", "#3b82f6"),
    }
}

#[allow(clippy::ptr_arg)]
fn render_recommendations(recommendations: &Vec<Recommendation>, view: &mut PageView) {
    let panel = if recommendations.is_empty() {
        Panel::Empty {
            icon: "thumbs-up",
            message: "Tất cả các chỉ số đều ở mức tốt!",
        }
    } else {
        Panel::Recommendations {
            cards: recommendations
                .iter()
                .map(|rec| {
                    let (icon, color) = recommendation_style(rec.kind);
                    RecommendationCard {
                        kind: rec.kind,
                        icon,
                        color,
                        title: rec.title.clone(),
                        message: rec.message.clone(),
                    }
                })
                .collect(),
        }
    };
    view.set_panel(RECOMMENDATIONS, panel);
}

#[cfg(test)]
#[path = "tests/statistics_tests.rs"]
mod tests;
