use crate::error::Result;
use crate::model::AnalysisResult;

/// Pretty-printed `{overallScore, fileResults, summary, timestamp}` document.
pub fn render(result: &AnalysisResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}
