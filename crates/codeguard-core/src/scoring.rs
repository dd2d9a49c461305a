//! Weighted file scores, quality tiers and run-level summary statistics.
//!
//! The weights and tier cutoffs are fixed business constants: reports from
//! different runs are only comparable while they stay exactly as they are.

use crate::model::{AnalysisSummary, FileAnalysisResult, QualityIndicator};

pub const CODE_QUALITY_WEIGHT: f64 = 0.25;
pub const SOLID_WEIGHT: f64 = 0.20;
pub const DESIGN_PATTERNS_WEIGHT: f64 = 0.15;
pub const SECURITY_WEIGHT: f64 = 0.20;
pub const BUG_DETECTION_WEIGHT: f64 = 0.20;

/// Lowest final score that counts as GREEN.
pub const HIGH_QUALITY_THRESHOLD: f64 = 85.0;
/// Lowest final score that counts as YELLOW.
pub const MEDIUM_QUALITY_THRESHOLD: f64 = 70.0;

/// Weighted final score of a file.
pub fn final_score(
    code_quality: f64,
    solid: f64,
    design_patterns: f64,
    security: f64,
    bug_detection: f64,
) -> f64 {
    (code_quality * CODE_QUALITY_WEIGHT)
        + (solid * SOLID_WEIGHT)
        + (design_patterns * DESIGN_PATTERNS_WEIGHT)
        + (security * SECURITY_WEIGHT)
        + (bug_detection * BUG_DETECTION_WEIGHT)
}

/// Mean final score across files, 0.0 when there are none.
pub fn overall_score(files: &[FileAnalysisResult]) -> f64 {
    if files.is_empty() {
        return 0.0;
    }
    files.iter().map(|f| f.final_score).sum::<f64>() / files.len() as f64
}

/// Derive the summary block. Tier counts are recomputed from each file's
/// final score rather than read from its stored indicator.
pub fn summarize(files: &[FileAnalysisResult], overall_score: f64) -> AnalysisSummary {
    let mut high = 0;
    let mut medium = 0;
    let mut low = 0;

    for file in files {
        match QualityIndicator::from_score(file.final_score) {
            QualityIndicator::Green => high += 1,
            QualityIndicator::Yellow => medium += 1,
            QualityIndicator::Red => low += 1,
        }
    }

    let critical_issues = files.iter().map(|f| f.critical_count()).sum();

    AnalysisSummary {
        total_files: files.len(),
        average_score: overall_score,
        high_quality_files: high,
        medium_quality_files: medium,
        low_quality_files: low,
        critical_issues,
        recommendations: generate_recommendations(overall_score, low),
    }
}

/// Run-level recommendations. Deterministic in the overall score and the
/// number of files below the medium threshold.
pub fn generate_recommendations(overall_score: f64, low_quality_files: usize) -> Vec<String> {
    let mut recommendations = Vec::new();

    if overall_score < MEDIUM_QUALITY_THRESHOLD {
        recommendations.push(
            "Overall code quality is below acceptable threshold. Consider comprehensive refactoring."
                .to_string(),
        );
    }

    if low_quality_files > 0 {
        recommendations.push(format!(
            "Focus on improving {} files with low quality scores.",
            low_quality_files
        ));
    }

    recommendations
        .push("Review security practices and implement recommended improvements.".to_string());
    recommendations.push("Consider implementing design patterns where appropriate.".to_string());
    recommendations.push("Ensure all code follows SOLID principles.".to_string());

    recommendations
}

/// Executive-report wording for an overall score.
pub fn quality_level(score: f64) -> &'static str {
    if score >= 90.0 {
        "Excellent"
    } else if score >= 80.0 {
        "Good"
    } else if score >= 70.0 {
        "Fair"
    } else {
        "Needs Improvement"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CodeIssue, DimensionScores, FileMetrics};

    fn file_with_score(score: f64) -> FileAnalysisResult {
        FileAnalysisResult::new(
            "A.java",
            "A.java",
            DimensionScores::uniform(score, "uniform"),
            FileMetrics::default(),
        )
    }

    #[test]
    fn test_weights_sum_to_one() {
        let sum = CODE_QUALITY_WEIGHT
            + SOLID_WEIGHT
            + DESIGN_PATTERNS_WEIGHT
            + SECURITY_WEIGHT
            + BUG_DETECTION_WEIGHT;
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_final_score_weighting() {
        let cases = [
            (80.0, 70.0, 60.0, 90.0, 50.0),
            (0.0, 0.0, 0.0, 0.0, 0.0),
            (100.0, 100.0, 100.0, 100.0, 100.0),
            (12.5, 99.0, 33.3, 0.0, 71.7),
        ];
        for (cq, s, dp, sec, bug) in cases {
            let expected = cq * 0.25 + s * 0.20 + dp * 0.15 + sec * 0.20 + bug * 0.20;
            assert!((final_score(cq, s, dp, sec, bug) - expected).abs() < 1e-9);
        }
        assert!((final_score(80.0, 70.0, 60.0, 90.0, 50.0) - 71.0).abs() < 1e-9);
    }

    #[test]
    fn test_tier_boundaries_are_inclusive_upward() {
        assert_eq!(QualityIndicator::from_score(85.0), QualityIndicator::Green);
        assert_eq!(QualityIndicator::from_score(84.999), QualityIndicator::Yellow);
        assert_eq!(QualityIndicator::from_score(70.0), QualityIndicator::Yellow);
        assert_eq!(QualityIndicator::from_score(69.999), QualityIndicator::Red);
        assert_eq!(QualityIndicator::from_score(0.0), QualityIndicator::Red);
        assert_eq!(QualityIndicator::from_score(140.0), QualityIndicator::Green);
    }

    #[test]
    fn test_overall_score_of_nothing_is_zero() {
        assert_eq!(overall_score(&[]), 0.0);
    }

    #[test]
    fn test_summary_partitions_every_file() {
        let files = vec![
            file_with_score(95.0),
            file_with_score(85.0),
            file_with_score(72.0),
            file_with_score(40.0),
            file_with_score(0.0),
        ];
        let overall = overall_score(&files);
        let summary = summarize(&files, overall);

        assert_eq!(summary.total_files, 5);
        assert_eq!(summary.high_quality_files, 2);
        assert_eq!(summary.medium_quality_files, 1);
        assert_eq!(summary.low_quality_files, 2);
        assert_eq!(
            summary.high_quality_files + summary.medium_quality_files + summary.low_quality_files,
            summary.total_files
        );
        assert!((summary.average_score - 58.4).abs() < 1e-9);
    }

    #[test]
    fn test_critical_issue_count_ignores_case() {
        let mut file = file_with_score(90.0);
        for severity in ["CRITICAL", "critical", "Critical", "HIGH", "low"] {
            file.issues.push(CodeIssue {
                severity: severity.to_string(),
                issue_type: "Bug".to_string(),
                description: "d".to_string(),
                line_number: None,
                suggestion: "s".to_string(),
            });
        }
        let summary = summarize(std::slice::from_ref(&file), 90.0);
        assert_eq!(summary.critical_issues, 3);
    }

    #[test]
    fn test_recommendations_for_low_quality_run() {
        let recs = generate_recommendations(55.0, 3);
        assert_eq!(recs.len(), 5);
        assert!(recs[0].contains("below acceptable threshold"));
        assert_eq!(recs[1], "Focus on improving 3 files with low quality scores.");
    }

    #[test]
    fn test_recommendations_for_healthy_run() {
        let recs = generate_recommendations(88.0, 0);
        assert_eq!(recs.len(), 3);
        assert!(recs[0].contains("security"));
    }

    #[test]
    fn test_quality_level() {
        assert_eq!(quality_level(95.0), "Excellent");
        assert_eq!(quality_level(80.0), "Good");
        assert_eq!(quality_level(70.0), "Fair");
        assert_eq!(quality_level(10.0), "Needs Improvement");
    }
}
