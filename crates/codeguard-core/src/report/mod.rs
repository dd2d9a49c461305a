//! Report rendering: JSON, technical and executive HTML, per-file detail
//! pages and knowledge-transfer documents.

pub mod html;
pub mod json;
pub mod kt;

use crate::error::Result;
use crate::model::AnalysisResult;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const JSON_REPORT: &str = "analysis-report.json";
pub const TECHNICAL_REPORT: &str = "technical-report.html";
pub const EXECUTIVE_REPORT: &str = "executive-report.html";
pub const ANALYSIS_DIR: &str = "analysis";

/// Which audience the HTML reports are written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportType {
    Technical,
    NonTechnical,
    #[default]
    Both,
}

impl ReportType {
    pub fn includes_technical(&self) -> bool {
        matches!(self, ReportType::Technical | ReportType::Both)
    }

    pub fn includes_executive(&self) -> bool {
        matches!(self, ReportType::NonTechnical | ReportType::Both)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Html,
    Json,
}

/// Write the reports for `result` into `out_dir` and return the paths
/// written. JSON output ignores the report type.
pub fn write_reports(
    result: &AnalysisResult,
    out_dir: &Path,
    report_type: ReportType,
    format: ReportFormat,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)?;
    tracing::info!(
        "writing {:?} {:?} reports to {}",
        report_type,
        format,
        out_dir.display()
    );

    let mut written = Vec::new();
    match format {
        ReportFormat::Json => {
            written.push(write_file(out_dir, JSON_REPORT, &json::render(result)?)?);
        }
        ReportFormat::Html => {
            if report_type.includes_technical() {
                written.push(write_file(
                    out_dir,
                    TECHNICAL_REPORT,
                    &html::render_technical(result),
                )?);

                let analysis_dir = out_dir.join(ANALYSIS_DIR);
                fs::create_dir_all(&analysis_dir)?;
                let pages = html::detail_page_names(&result.file_results);
                for (file, page) in result.file_results.iter().zip(&pages) {
                    written.push(write_file(
                        &analysis_dir,
                        page,
                        &html::render_file_detail(file),
                    )?);
                }
            }
            if report_type.includes_executive() {
                written.push(write_file(
                    out_dir,
                    EXECUTIVE_REPORT,
                    &html::render_executive(result),
                )?);
            }
        }
    }

    Ok(written)
}

fn write_file(dir: &Path, name: &str, content: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, content)?;
    tracing::debug!("wrote {}", path.display());
    Ok(path)
}
