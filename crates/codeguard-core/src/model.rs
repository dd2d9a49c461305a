use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::scoring;

/// Placeholder used when the model gave a score but no usable explanation.
pub const NO_REASON: &str = "No detailed reasoning available";

/// Analysis mode. Only biases the framing of the suggestion prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalysisMode {
    #[default]
    Standard,
    QaAutomation,
    DevopsTesting,
    DeveloperReview,
}

impl AnalysisMode {
    /// Modes in which a missed quality gate fails the process.
    pub fn enforces_quality_gate(&self) -> bool {
        matches!(self, AnalysisMode::QaAutomation | AnalysisMode::DevopsTesting)
    }

    pub fn label(&self) -> &'static str {
        match self {
            AnalysisMode::Standard => "STANDARD",
            AnalysisMode::QaAutomation => "QA_AUTOMATION",
            AnalysisMode::DevopsTesting => "DEVOPS_TESTING",
            AnalysisMode::DeveloperReview => "DEVELOPER_REVIEW",
        }
    }
}

/// One of the five scored aspects of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Dimension {
    CodeQuality,
    Solid,
    DesignPatterns,
    Security,
    BugDetection,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::CodeQuality,
        Dimension::Solid,
        Dimension::DesignPatterns,
        Dimension::Security,
        Dimension::BugDetection,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Dimension::CodeQuality => "Code Quality",
            Dimension::Solid => "SOLID Principles",
            Dimension::DesignPatterns => "Design Patterns",
            Dimension::Security => "Security",
            Dimension::BugDetection => "Bug Detection",
        }
    }

    /// Weight of this dimension in the final score.
    pub fn weight(&self) -> f64 {
        match self {
            Dimension::CodeQuality => scoring::CODE_QUALITY_WEIGHT,
            Dimension::Solid => scoring::SOLID_WEIGHT,
            Dimension::DesignPatterns => scoring::DESIGN_PATTERNS_WEIGHT,
            Dimension::Security => scoring::SECURITY_WEIGHT,
            Dimension::BugDetection => scoring::BUG_DETECTION_WEIGHT,
        }
    }
}

/// A single evaluated dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreWithReason {
    pub score: f64,
    pub reason: String,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

impl ScoreWithReason {
    pub fn new(score: f64, reason: impl Into<String>) -> Self {
        Self::with_recommendations(score, reason, Vec::new())
    }

    pub fn with_recommendations(
        score: f64,
        reason: impl Into<String>,
        recommendations: Vec<String>,
    ) -> Self {
        let reason = reason.into();
        let reason = if reason.trim().is_empty() {
            NO_REASON.to_string()
        } else {
            reason
        };
        Self {
            score,
            reason,
            recommendations,
        }
    }
}

/// Severity level of a flagged issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    /// Case-insensitive parse of a model-supplied severity label.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "CRITICAL" => Some(Severity::Critical),
            "HIGH" => Some(Severity::High),
            "MEDIUM" => Some(Severity::Medium),
            "LOW" => Some(Severity::Low),
            _ => None,
        }
    }

    pub fn priority(&self) -> u8 {
        match self {
            Severity::Critical => 4,
            Severity::High => 3,
            Severity::Medium => 2,
            Severity::Low => 1,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Severity::Critical => "CRITICAL",
            Severity::High => "HIGH",
            Severity::Medium => "MEDIUM",
            Severity::Low => "LOW",
        }
    }
}

/// One problem flagged by the model. `severity` is kept as the raw label so
/// unexpected values survive into the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeIssue {
    pub severity: String,
    #[serde(rename = "type")]
    pub issue_type: String,
    pub description: String,
    pub line_number: Option<u32>,
    pub suggestion: String,
}

impl CodeIssue {
    pub fn level(&self) -> Option<Severity> {
        Severity::parse(&self.severity)
    }

    pub fn is_critical(&self) -> bool {
        self.severity.trim().eq_ignore_ascii_case("CRITICAL")
    }
}

/// Coarse complexity level reported by the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ComplexityLevel {
    Low,
    Medium,
    High,
    #[default]
    Unknown,
}

impl ComplexityLevel {
    pub fn parse(label: &str) -> Self {
        match label.trim().to_ascii_uppercase().as_str() {
            "LOW" => ComplexityLevel::Low,
            "MEDIUM" => ComplexityLevel::Medium,
            "HIGH" => ComplexityLevel::High,
            _ => ComplexityLevel::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ComplexityLevel::Low => "LOW",
            ComplexityLevel::Medium => "MEDIUM",
            ComplexityLevel::High => "HIGH",
            ComplexityLevel::Unknown => "UNKNOWN",
        }
    }
}

/// A metric value the model returned beyond the fixed set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl std::fmt::Display for MetricValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricValue::Int(v) => write!(f, "{}", v),
            MetricValue::Float(v) => write!(f, "{:.1}", v),
            MetricValue::Text(v) => write!(f, "{}", v),
        }
    }
}

/// Metrics for one file. The six named fields are always present; anything
/// else the model reported lands in `extra`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetrics {
    pub lines_of_code: i64,
    pub cyclomatic_complexity: i64,
    pub number_of_methods: i64,
    pub number_of_classes: i64,
    pub comment_ratio: f64,
    pub code_complexity: ComplexityLevel,
    #[serde(flatten)]
    pub extra: BTreeMap<String, MetricValue>,
}

impl FileMetrics {
    /// Metrics computed without the model: only the line count is known.
    pub fn local(content: &str) -> Self {
        Self {
            lines_of_code: count_lines(content),
            ..Default::default()
        }
    }

    /// Look up any metric by its report name.
    pub fn get(&self, name: &str) -> Option<MetricValue> {
        match name {
            "linesOfCode" => Some(MetricValue::Int(self.lines_of_code)),
            "cyclomaticComplexity" => Some(MetricValue::Int(self.cyclomatic_complexity)),
            "numberOfMethods" => Some(MetricValue::Int(self.number_of_methods)),
            "numberOfClasses" => Some(MetricValue::Int(self.number_of_classes)),
            "commentRatio" => Some(MetricValue::Float(self.comment_ratio)),
            "codeComplexity" => Some(MetricValue::Text(self.code_complexity.label().to_string())),
            other => self.extra.get(other).cloned(),
        }
    }
}

/// Number of newline-delimited lines in `content`.
pub fn count_lines(content: &str) -> i64 {
    content.lines().count() as i64
}

/// GREEN/YELLOW/RED tier derived from a final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QualityIndicator {
    Green,
    Yellow,
    Red,
}

impl QualityIndicator {
    pub fn from_score(score: f64) -> Self {
        if score >= scoring::HIGH_QUALITY_THRESHOLD {
            QualityIndicator::Green
        } else if score >= scoring::MEDIUM_QUALITY_THRESHOLD {
            QualityIndicator::Yellow
        } else {
            QualityIndicator::Red
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QualityIndicator::Green => "High Quality",
            QualityIndicator::Yellow => "Medium Quality",
            QualityIndicator::Red => "Low Quality",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            QualityIndicator::Green => "quality-green",
            QualityIndicator::Yellow => "quality-yellow",
            QualityIndicator::Red => "quality-red",
        }
    }
}

/// Onboarding narratives extracted when knowledge-transfer mode is on.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct KnowledgeTransfer {
    pub purpose: String,
    pub design: String,
    pub modules: String,
}

/// Complete analysis of a single file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileAnalysisResult {
    pub filename: String,
    pub filepath: String,
    pub code_quality: ScoreWithReason,
    pub solid: ScoreWithReason,
    pub design_patterns: ScoreWithReason,
    pub security: ScoreWithReason,
    pub bug_detection: ScoreWithReason,
    pub final_score: f64,
    pub quality_indicator: QualityIndicator,
    pub issues: Vec<CodeIssue>,
    pub suggestions: Vec<String>,
    pub metrics: FileMetrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub knowledge_transfer: Option<KnowledgeTransfer>,
}

/// The five dimension scores of one file, gathered before the weighted total
/// is computed.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionScores {
    pub code_quality: ScoreWithReason,
    pub solid: ScoreWithReason,
    pub design_patterns: ScoreWithReason,
    pub security: ScoreWithReason,
    pub bug_detection: ScoreWithReason,
}

impl DimensionScores {
    /// The same score and reason for every dimension.
    pub fn uniform(score: f64, reason: &str) -> Self {
        Self {
            code_quality: ScoreWithReason::new(score, reason),
            solid: ScoreWithReason::new(score, reason),
            design_patterns: ScoreWithReason::new(score, reason),
            security: ScoreWithReason::new(score, reason),
            bug_detection: ScoreWithReason::new(score, reason),
        }
    }

    pub fn final_score(&self) -> f64 {
        scoring::final_score(
            self.code_quality.score,
            self.solid.score,
            self.design_patterns.score,
            self.security.score,
            self.bug_detection.score,
        )
    }
}

impl FileAnalysisResult {
    /// Assemble a result once all five scores are known. The final score and
    /// tier are computed here and nowhere else.
    pub fn new(
        filename: impl Into<String>,
        filepath: impl Into<String>,
        scores: DimensionScores,
        metrics: FileMetrics,
    ) -> Self {
        let final_score = scores.final_score();
        Self {
            filename: filename.into(),
            filepath: filepath.into(),
            code_quality: scores.code_quality,
            solid: scores.solid,
            design_patterns: scores.design_patterns,
            security: scores.security,
            bug_detection: scores.bug_detection,
            final_score,
            quality_indicator: QualityIndicator::from_score(final_score),
            issues: Vec::new(),
            suggestions: Vec::new(),
            metrics,
            knowledge_transfer: None,
        }
    }

    pub fn score(&self, dimension: Dimension) -> &ScoreWithReason {
        match dimension {
            Dimension::CodeQuality => &self.code_quality,
            Dimension::Solid => &self.solid,
            Dimension::DesignPatterns => &self.design_patterns,
            Dimension::Security => &self.security,
            Dimension::BugDetection => &self.bug_detection,
        }
    }

    pub fn critical_count(&self) -> usize {
        self.issues.iter().filter(|i| i.is_critical()).count()
    }
}

/// Run-level statistics derived from the per-file results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub total_files: usize,
    pub average_score: f64,
    pub high_quality_files: usize,
    pub medium_quality_files: usize,
    pub low_quality_files: usize,
    pub critical_issues: usize,
    pub recommendations: Vec<String>,
}

/// The complete result of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub overall_score: f64,
    pub file_results: Vec<FileAnalysisResult>,
    pub summary: AnalysisSummary,
    pub timestamp: String,
}

impl AnalysisResult {
    /// Build the run result from the per-file results in processing order.
    pub fn from_files(file_results: Vec<FileAnalysisResult>, timestamp: String) -> Self {
        let overall_score = scoring::overall_score(&file_results);
        let summary = scoring::summarize(&file_results, overall_score);
        Self {
            overall_score,
            file_results,
            summary,
            timestamp,
        }
    }

    pub fn passes_gate(&self, threshold: f64) -> bool {
        self.overall_score >= threshold
    }

    pub fn total_lines(&self) -> i64 {
        self.file_results.iter().map(|f| f.metrics.lines_of_code).sum()
    }

    pub fn total_methods(&self) -> i64 {
        self.file_results
            .iter()
            .map(|f| f.metrics.number_of_methods)
            .sum()
    }

    pub fn average_complexity(&self) -> f64 {
        if self.file_results.is_empty() {
            return 0.0;
        }
        let total: i64 = self
            .file_results
            .iter()
            .map(|f| f.metrics.cyclomatic_complexity)
            .sum();
        total as f64 / self.file_results.len() as f64
    }
}
