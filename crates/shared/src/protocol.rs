//! Response bodies served by the statistics backend.
//!
//! Every field is optional: the backend omits sections when it has no data,
//! and older deployments leave some fields out entirely. Consumers resolve
//! these into filled render models instead of reading them directly.

use serde::{Deserialize, Serialize};

use crate::domain::RecommendationKind;

pub const UPLOAD_PATH: &str = "/upload";
pub const SEARCH_PATH: &str = "/search";
pub const DASHBOARD_DATA_PATH: &str = "/api/dashboard-data";
pub const CLASS_DISTRIBUTION_PATH: &str = "/api/chart/class_distribution";
pub const SCORE_HISTOGRAM_PATH: &str = "/api/chart/score_histogram";
pub const DETAILED_STATISTICS_PATH: &str = "/api/statistics/detailed";
pub const CLASS_ANALYSIS_PATH: &str = "/api/statistics/class-analysis";
pub const TOP_STUDENTS_PATH: &str = "/api/statistics/top-students";
pub const RECOMMENDATIONS_PATH: &str = "/api/statistics/recommendations";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardDataResponse {
    #[serde(default)]
    pub total_students: Option<f64>,
    #[serde(default)]
    pub total_classes: Option<f64>,
    #[serde(default)]
    pub average_score: Option<f64>,
    #[serde(default)]
    pub pass_rate: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassDistributionResponse {
    #[serde(default)]
    pub labels: Option<Vec<String>>,
    #[serde(default)]
    pub values: Option<Vec<f64>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreHistogramResponse {
    #[serde(default)]
    pub labels: Option<Vec<String>>,
    #[serde(default)]
    pub counts: Option<Vec<f64>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BasicStats {
    #[serde(default)]
    pub total_students: Option<f64>,
    #[serde(default)]
    pub mean: Option<f64>,
    #[serde(default)]
    pub median: Option<f64>,
    #[serde(default)]
    pub std_dev: Option<f64>,
    #[serde(default)]
    pub range: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdvancedStats {
    #[serde(default)]
    pub pass_rate: Option<f64>,
    #[serde(default)]
    pub excellent_rate: Option<f64>,
    #[serde(default)]
    pub coefficient_variation: Option<f64>,
    #[serde(default)]
    pub skewness: Option<f64>,
    #[serde(default)]
    pub outlier_count: Option<f64>,
    #[serde(default)]
    pub outlier_percentage: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Quartiles {
    #[serde(default)]
    pub q1: Option<f64>,
    #[serde(default)]
    pub q2: Option<f64>,
    #[serde(default)]
    pub q3: Option<f64>,
    #[serde(default)]
    pub iqr: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GradeBucket {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub count: Option<f64>,
    #[serde(default)]
    pub percentage: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetailedStatisticsResponse {
    #[serde(default)]
    pub basic_stats: Option<BasicStats>,
    #[serde(default)]
    pub advanced_stats: Option<AdvancedStats>,
    #[serde(default)]
    pub quartiles: Option<Quartiles>,
    #[serde(default)]
    pub grade_distribution: Option<Vec<GradeBucket>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassAnalysisEntry {
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub student_count: Option<f64>,
    #[serde(default)]
    pub mean: Option<f64>,
    #[serde(default)]
    pub pass_rate: Option<f64>,
}

/// The class-analysis endpoint answers with a bare array, ordered from the
/// best performing class to the worst.
pub type ClassAnalysisResponse = Vec<ClassAnalysisEntry>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudentRanking {
    #[serde(default)]
    pub rank: Option<u32>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "class")]
    pub class_name: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopStudentsResponse {
    #[serde(default)]
    pub top_students: Option<Vec<StudentRanking>>,
    #[serde(default)]
    pub low_performers: Option<Vec<StudentRanking>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecommendationEntry {
    #[serde(default, rename = "type")]
    pub kind: Option<RecommendationKind>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecommendationsResponse {
    #[serde(default)]
    pub recommendations: Option<Vec<RecommendationEntry>>,
}

/// Reply to a multipart upload: `message` on success, `error` otherwise.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}
