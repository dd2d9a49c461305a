pub mod aggregator;
pub mod analyzer;
pub mod client;
pub mod config;
pub mod discovery;
pub mod error;
pub mod language;
pub mod model;
pub mod parser;
pub mod prompt;
pub mod report;
pub mod scoring;

pub use aggregator::AnalysisAggregator;
pub use analyzer::{FileAnalyzer, SourceFile};
pub use client::{
    BackendError, CallError, FailureClass, ModelBackend, ModelClient, OpenAiBackend, RetryPolicy,
};
pub use config::{AppConfig, ModelConfig};
pub use error::{CodeGuardError, Result};
pub use model::{
    AnalysisMode, AnalysisResult, AnalysisSummary, CodeIssue, Dimension, FileAnalysisResult,
    FileMetrics, QualityIndicator, ScoreWithReason,
};
pub use report::{ReportFormat, ReportType};
