//! Per-file analysis: metrics, five isolated dimension scores, issues,
//! suggestions and optional knowledge-transfer narratives.
//!
//! A file always yields a [`FileAnalysisResult`]. Failed calls degrade to
//! neutral values; a file whose every dimension call failed, or whose
//! analysis panicked, gets the zero-scored fallback result.

use crate::client::{CallError, ModelClient};
use crate::error::Result;
use crate::language::detect_language;
use crate::model::{
    AnalysisMode, CodeIssue, Dimension, DimensionScores, FileAnalysisResult, FileMetrics,
    KnowledgeTransfer, ScoreWithReason,
};
use crate::parser::{self, NEUTRAL_SCORE};
use crate::prompt::{self, KtSection};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A file loaded into memory, ready to be sent to the model.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub content: String,
    pub language: &'static str,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        let path = path.into();
        let language = detect_language(&path);
        Self {
            path,
            content: content.into(),
            language,
        }
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        Ok(Self::new(path, content))
    }

    pub fn filename(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    pub fn filepath(&self) -> String {
        self.path.display().to_string()
    }
}

/// Why a file fell back to the zero-scored result.
#[derive(Debug, Error)]
enum FileFailure {
    #[error("every dimension call failed, last error: {0}")]
    AllDimensionsFailed(CallError),

    #[error("analysis panicked: {0}")]
    Panicked(String),
}

/// Text used for a narrative the model could not produce.
pub fn kt_placeholder(section: KtSection) -> String {
    format!("Unable to generate {} information.", section.slug())
}

/// Fallback for a file whose analysis could not complete: zero scores with
/// the error as reason, locally counted metrics and nothing else.
pub fn fallback_result(source: &SourceFile, error: &str) -> FileAnalysisResult {
    let reason = format!("Analysis failed: {}", error);
    FileAnalysisResult::new(
        source.filename(),
        source.filepath(),
        DimensionScores::uniform(0.0, &reason),
        FileMetrics::local(&source.content),
    )
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Analyzes one file at a time against a shared [`ModelClient`].
#[derive(Clone)]
pub struct FileAnalyzer {
    client: ModelClient,
    mode: AnalysisMode,
    knowledge_transfer: bool,
}

impl FileAnalyzer {
    pub fn new(client: ModelClient, mode: AnalysisMode) -> Self {
        Self {
            client,
            mode,
            knowledge_transfer: false,
        }
    }

    /// Also request the purpose/design/modules narratives for every file.
    pub fn with_knowledge_transfer(mut self, enabled: bool) -> Self {
        self.knowledge_transfer = enabled;
        self
    }

    pub fn client(&self) -> &ModelClient {
        &self.client
    }

    /// Analyze `source`. Never fails; see the module docs for the fallbacks.
    pub async fn analyze(&self, source: &SourceFile) -> FileAnalysisResult {
        tracing::info!("analyzing {} ({})", source.filepath(), source.language);

        let outcome = AssertUnwindSafe(self.analyze_file(source))
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Err(FileFailure::Panicked(panic_message(payload))));

        match outcome {
            Ok(result) => {
                tracing::debug!(
                    "{} scored {:.1} ({:?})",
                    result.filename,
                    result.final_score,
                    result.quality_indicator
                );
                result
            }
            Err(failure) => {
                tracing::error!("analysis of {} failed: {}", source.filepath(), failure);
                fallback_result(source, &failure.to_string())
            }
        }
    }

    async fn analyze_file(
        &self,
        source: &SourceFile,
    ) -> std::result::Result<FileAnalysisResult, FileFailure> {
        let metrics = self.extract_metrics(source).await;

        let mut failures = Vec::new();
        let scores = DimensionScores {
            code_quality: self.score(Dimension::CodeQuality, source, &mut failures).await,
            solid: self.score(Dimension::Solid, source, &mut failures).await,
            design_patterns: self
                .score(Dimension::DesignPatterns, source, &mut failures)
                .await,
            security: self.score(Dimension::Security, source, &mut failures).await,
            bug_detection: self
                .score(Dimension::BugDetection, source, &mut failures)
                .await,
        };

        if failures.len() == Dimension::ALL.len() {
            if let Some(last) = failures.pop() {
                return Err(FileFailure::AllDimensionsFailed(last));
            }
        }

        let mut result =
            FileAnalysisResult::new(source.filename(), source.filepath(), scores, metrics);
        result.issues = self.identify_issues(source).await;
        result.suggestions = self.suggest(source).await;

        if self.knowledge_transfer {
            result.knowledge_transfer = Some(self.knowledge_transfer(source).await);
        }

        Ok(result)
    }

    async fn extract_metrics(&self, source: &SourceFile) -> FileMetrics {
        let prompt = prompt::metrics_prompt(&source.content, source.language);
        match self.client.complete(&prompt).await {
            Ok(text) => parser::parse_metrics(&text, &source.content).into_value(),
            Err(e) => {
                tracing::warn!("metrics for {} unavailable: {}", source.filepath(), e);
                FileMetrics::local(&source.content)
            }
        }
    }

    /// One dimension score. A failed call becomes the neutral score with the
    /// error as reason and is recorded in `failures`.
    async fn score(
        &self,
        dimension: Dimension,
        source: &SourceFile,
        failures: &mut Vec<CallError>,
    ) -> ScoreWithReason {
        let prompt = prompt::score_prompt(dimension, &source.content, source.language);
        match self.client.complete(&prompt).await {
            Ok(text) => {
                let parsed = parser::parse_score(&text);
                tracing::debug!(
                    "{} {}: {} ({})",
                    source.filename(),
                    dimension.label(),
                    parsed.value().score,
                    parsed.tier()
                );
                parsed.into_value()
            }
            Err(e) => {
                tracing::warn!(
                    "{} analysis of {} failed: {}",
                    dimension.label(),
                    source.filepath(),
                    e
                );
                let score = ScoreWithReason::new(NEUTRAL_SCORE, format!("Analysis failed: {}", e));
                failures.push(e);
                score
            }
        }
    }

    async fn identify_issues(&self, source: &SourceFile) -> Vec<CodeIssue> {
        let prompt = prompt::issues_prompt(&source.content, source.language);
        match self.client.complete(&prompt).await {
            Ok(text) => parser::parse_issues(&text).into_value(),
            Err(e) => {
                tracing::warn!("issues for {} unavailable: {}", source.filepath(), e);
                Vec::new()
            }
        }
    }

    async fn suggest(&self, source: &SourceFile) -> Vec<String> {
        let prompt = prompt::suggestions_prompt(&source.content, source.language, self.mode);
        match self.client.complete(&prompt).await {
            Ok(text) => parser::parse_suggestions(&text).into_value(),
            Err(e) => {
                tracing::warn!("suggestions for {} unavailable: {}", source.filepath(), e);
                Vec::new()
            }
        }
    }

    async fn knowledge_transfer(&self, source: &SourceFile) -> KnowledgeTransfer {
        KnowledgeTransfer {
            purpose: self.narrative(KtSection::Purpose, source).await,
            design: self.narrative(KtSection::Design, source).await,
            modules: self.narrative(KtSection::Modules, source).await,
        }
    }

    async fn narrative(&self, section: KtSection, source: &SourceFile) -> String {
        let prompt = prompt::kt_prompt(section, &source.content, source.language);
        match self.client.complete(&prompt).await {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                tracing::warn!(
                    "{} narrative for {} unavailable: {}",
                    section.slug(),
                    source.filepath(),
                    e
                );
                kt_placeholder(section)
            }
        }
    }
}
