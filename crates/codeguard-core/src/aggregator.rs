//! Runs the analyzer over a list of files and folds the results into one
//! [`AnalysisResult`].

use crate::analyzer::{FileAnalyzer, SourceFile};
use crate::model::{AnalysisResult, FileAnalysisResult};
use chrono::Local;
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};

/// Local wall-clock time, ISO-8601 without offset.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub struct AnalysisAggregator {
    analyzer: FileAnalyzer,
    concurrency: usize,
}

impl AnalysisAggregator {
    /// Files are analyzed one at a time unless [`Self::with_concurrency`]
    /// says otherwise.
    pub fn new(analyzer: FileAnalyzer) -> Self {
        Self {
            analyzer,
            concurrency: 1,
        }
    }

    /// Keep up to `concurrency` files in flight. Results still come back in
    /// input order.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn analyzer(&self) -> &FileAnalyzer {
        &self.analyzer
    }

    /// Analyze every readable file in `paths`. Unreadable files are logged
    /// and left out of the result entirely.
    pub async fn run(&self, paths: &[PathBuf]) -> AnalysisResult {
        let total = paths.len();
        tracing::info!(
            "analyzing {} files ({} at a time)",
            total,
            self.concurrency
        );

        let file_results: Vec<FileAnalysisResult> = stream::iter(paths.iter().enumerate())
            .map(|(index, path)| self.analyze_path(path, index + 1, total))
            .buffered(self.concurrency)
            .filter_map(|result| async move { result })
            .collect()
            .await;

        let skipped = total - file_results.len();
        if skipped > 0 {
            tracing::warn!("{} of {} files could not be read", skipped, total);
        }

        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        AnalysisResult::from_files(file_results, timestamp)
    }

    async fn analyze_path(
        &self,
        path: &Path,
        position: usize,
        total: usize,
    ) -> Option<FileAnalysisResult> {
        let source = match SourceFile::load(path).await {
            Ok(source) => source,
            Err(e) => {
                tracing::warn!("skipping unreadable file {}: {}", path.display(), e);
                return None;
            }
        };

        tracing::info!("[{}/{}] {}", position, total, path.display());
        Some(self.analyzer.analyze(&source).await)
    }
}
