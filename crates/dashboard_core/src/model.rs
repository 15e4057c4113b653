//! Render models: backend responses with every absent field filled in.

use serde::de::DeserializeOwned;
use shared::{
    domain::RecommendationKind,
    protocol::{
        AdvancedStats, BasicStats, ClassAnalysisEntry, ClassAnalysisResponse,
        ClassDistributionResponse, DashboardDataResponse, DetailedStatisticsResponse,
        GradeBucket, Quartiles, RecommendationEntry, RecommendationsResponse,
        ScoreHistogramResponse, StudentRanking, TopStudentsResponse,
    },
};

/// Turns a partial response into the model its renderers consume.
pub trait Resolve: DeserializeOwned + Send + 'static {
    type Output: Send + Sync + 'static;

    fn resolve(self) -> Self::Output;
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DashboardMetrics {
    pub total_students: f64,
    pub total_classes: f64,
    pub average_score: f64,
    pub pass_rate: f64,
}

impl Resolve for DashboardDataResponse {
    type Output = DashboardMetrics;

    fn resolve(self) -> DashboardMetrics {
        DashboardMetrics {
            total_students: self.total_students.unwrap_or(0.0),
            total_classes: self.total_classes.unwrap_or(0.0),
            average_score: self.average_score.unwrap_or(0.0),
            pass_rate: self.pass_rate.unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassDistribution {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl Resolve for ClassDistributionResponse {
    type Output = ClassDistribution;

    fn resolve(self) -> ClassDistribution {
        ClassDistribution {
            labels: self.labels.unwrap_or_default(),
            values: self.values.unwrap_or_default(),
        }
    }
}

/// The histogram is only drawn when both labels and counts arrived, so the
/// pair stays optional.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScoreHistogram {
    pub bins: Option<(Vec<String>, Vec<f64>)>,
}

impl Resolve for ScoreHistogramResponse {
    type Output = ScoreHistogram;

    fn resolve(self) -> ScoreHistogram {
        ScoreHistogram {
            bins: self.labels.zip(self.counts),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BasicSummary {
    pub total_students: f64,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub range: f64,
}

impl From<BasicStats> for BasicSummary {
    fn from(value: BasicStats) -> Self {
        Self {
            total_students: value.total_students.unwrap_or(0.0),
            mean: value.mean.unwrap_or(0.0),
            median: value.median.unwrap_or(0.0),
            std_dev: value.std_dev.unwrap_or(0.0),
            range: value.range.unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AdvancedSummary {
    pub pass_rate: f64,
    pub excellent_rate: f64,
    pub coefficient_variation: f64,
    pub skewness: f64,
    pub outlier_count: f64,
    pub outlier_percentage: f64,
}

impl From<AdvancedStats> for AdvancedSummary {
    fn from(value: AdvancedStats) -> Self {
        Self {
            pass_rate: value.pass_rate.unwrap_or(0.0),
            excellent_rate: value.excellent_rate.unwrap_or(0.0),
            coefficient_variation: value.coefficient_variation.unwrap_or(0.0),
            skewness: value.skewness.unwrap_or(0.0),
            outlier_count: value.outlier_count.unwrap_or(0.0),
            outlier_percentage: value.outlier_percentage.unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct QuartileSummary {
    pub q1: f64,
    pub q2: f64,
    pub q3: f64,
    pub iqr: f64,
}

impl From<Quartiles> for QuartileSummary {
    fn from(value: Quartiles) -> Self {
        Self {
            q1: value.q1.unwrap_or(0.0),
            q2: value.q2.unwrap_or(0.0),
            q3: value.q3.unwrap_or(0.0),
            iqr: value.iqr.unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GradeShare {
    pub label: String,
    pub count: f64,
    pub percentage: f64,
}

impl From<GradeBucket> for GradeShare {
    fn from(value: GradeBucket) -> Self {
        Self {
            label: value.label.unwrap_or_default(),
            count: value.count.unwrap_or(0.0),
            percentage: value.percentage.unwrap_or(0.0),
        }
    }
}

/// Sections stay optional where a missing section hides a whole panel.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DetailedStatistics {
    pub basic: Option<BasicSummary>,
    pub advanced: Option<AdvancedSummary>,
    pub quartiles: Option<QuartileSummary>,
    pub grades: Vec<GradeShare>,
}

impl DetailedStatistics {
    pub fn basic_or_default(&self) -> BasicSummary {
        self.basic.unwrap_or_default()
    }

    pub fn advanced_or_default(&self) -> AdvancedSummary {
        self.advanced.unwrap_or_default()
    }
}

impl Resolve for DetailedStatisticsResponse {
    type Output = DetailedStatistics;

    fn resolve(self) -> DetailedStatistics {
        DetailedStatistics {
            basic: self.basic_stats.map(BasicSummary::from),
            advanced: self.advanced_stats.map(AdvancedSummary::from),
            quartiles: self.quartiles.map(QuartileSummary::from),
            grades: self
                .grade_distribution
                .unwrap_or_default()
                .into_iter()
                .map(GradeShare::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassSummary {
    pub class_name: String,
    pub student_count: f64,
    pub mean: f64,
    pub pass_rate: f64,
}

impl From<ClassAnalysisEntry> for ClassSummary {
    fn from(value: ClassAnalysisEntry) -> Self {
        Self {
            class_name: value.class_name.unwrap_or_default(),
            student_count: value.student_count.unwrap_or(0.0),
            mean: value.mean.unwrap_or(0.0),
            pass_rate: value.pass_rate.unwrap_or(0.0),
        }
    }
}

/// Ordered best class first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassAnalysis {
    pub classes: Vec<ClassSummary>,
}

impl Resolve for ClassAnalysisResponse {
    type Output = ClassAnalysis;

    fn resolve(self) -> ClassAnalysis {
        ClassAnalysis {
            classes: self.into_iter().map(ClassSummary::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RankedStudent {
    pub rank: u32,
    pub name: String,
    pub class_name: String,
    pub score: f64,
}

impl From<StudentRanking> for RankedStudent {
    fn from(value: StudentRanking) -> Self {
        Self {
            rank: value.rank.unwrap_or(0),
            name: value.name.unwrap_or_default(),
            class_name: value.class_name.unwrap_or_default(),
            score: value.score.unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Rankings {
    pub top: Vec<RankedStudent>,
    pub low: Vec<RankedStudent>,
}

impl Resolve for TopStudentsResponse {
    type Output = Rankings;

    fn resolve(self) -> Rankings {
        let convert = |list: Option<Vec<StudentRanking>>| -> Vec<RankedStudent> {
            list.unwrap_or_default()
                .into_iter()
                .map(RankedStudent::from)
                .collect()
        };
        Rankings {
            top: convert(self.top_students),
            low: convert(self.low_performers),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub title: String,
    pub message: String,
}

impl From<RecommendationEntry> for Recommendation {
    fn from(value: RecommendationEntry) -> Self {
        Self {
            kind: value.kind.unwrap_or_default(),
            title: value.title.unwrap_or_default(),
            message: value.message.unwrap_or_default(),
        }
    }
}

impl Resolve for RecommendationsResponse {
    type Output = Vec<Recommendation>;

    fn resolve(self) -> Vec<Recommendation> {
        self.recommendations
            .unwrap_or_default()
            .into_iter()
            .map(Recommendation::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_dashboard_payload_resolves_to_zeros() {
        let metrics = DashboardDataResponse::default().resolve();
        assert_eq!(metrics, DashboardMetrics::default());
    }

    #[test]
    fn histogram_needs_both_labels_and_counts() {
        let only_labels = ScoreHistogramResponse {
            labels: Some(vec!["Giỏi".into()]),
            counts: None,
        };
        assert_eq!(only_labels.resolve().bins, None);

        let both = ScoreHistogramResponse {
            labels: Some(vec!["Giỏi".into()]),
            counts: Some(vec![4.0]),
        };
        assert_eq!(
            both.resolve().bins,
            Some((vec!["Giỏi".to_string()], vec![4.0]))
        );
    }

    #[test]
    fn detailed_sections_are_filled_field_by_field() {
        let response = DetailedStatisticsResponse {
            basic_stats: Some(BasicStats {
                mean: Some(6.5),
                ..BasicStats::default()
            }),
            advanced_stats: None,
            quartiles: None,
            grade_distribution: Some(vec![GradeBucket {
                label: Some("Khá".into()),
                count: None,
                percentage: Some(25.0),
            }]),
        };
        let resolved = response.resolve();
        let basic = resolved.basic.expect("basic present");
        assert_eq!(basic.mean, 6.5);
        assert_eq!(basic.median, 0.0);
        assert!(resolved.advanced.is_none());
        assert_eq!(resolved.advanced_or_default().pass_rate, 0.0);
        assert_eq!(resolved.grades[0].count, 0.0);
        assert_eq!(resolved.grades[0].percentage, 25.0);
    }

    #[test]
    fn recommendation_without_type_is_info() {
        let rec = Recommendation::from(RecommendationEntry::default());
        assert_eq!(rec.kind, RecommendationKind::Info);
        assert!(rec.title.is_empty());
    }
}
