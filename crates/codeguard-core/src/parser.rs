//! Turns raw model text into typed values.
//!
//! Every parse returns a value. [`Parsed`] records which tier produced it:
//! the structured JSON reading, a heuristic salvage, or the neutral default.

use crate::model::{CodeIssue, ComplexityLevel, FileMetrics, MetricValue, ScoreWithReason};
use regex::Regex;
use serde_json::{Map, Value};

pub const NEUTRAL_SCORE: f64 = 50.0;
pub const SALVAGED_REASON: &str = "Unable to parse detailed reasoning from response";
pub const DEFAULT_REASON: &str = "Unable to analyze - using default score";

/// Outcome of parsing one response.
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed<T> {
    /// The response had the requested JSON shape.
    Structured(T),
    /// Not the requested shape, but something usable was recovered.
    Salvaged(T),
    /// Nothing usable; the documented default.
    Defaulted(T),
}

impl<T> Parsed<T> {
    pub fn value(&self) -> &T {
        match self {
            Parsed::Structured(v) | Parsed::Salvaged(v) | Parsed::Defaulted(v) => v,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Parsed::Structured(v) | Parsed::Salvaged(v) | Parsed::Defaulted(v) => v,
        }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, Parsed::Structured(_))
    }

    pub fn tier(&self) -> &'static str {
        match self {
            Parsed::Structured(_) => "structured",
            Parsed::Salvaged(_) => "salvaged",
            Parsed::Defaulted(_) => "default",
        }
    }
}

/// Models often wrap JSON in a markdown fence; drop it before parsing.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end().trim_end_matches("```").trim()
}

/// Body of the first fenced block anywhere in `text`.
fn fenced_block(text: &str) -> Option<&str> {
    let re = Regex::new(r"(?s)```[A-Za-z0-9_-]*[ \t]*\r?\n(.*?)```").ok()?;
    re.captures(text)?.get(1).map(|m| m.as_str().trim())
}

/// First complete JSON object or array embedded in prose. Trailing text
/// after the value is ignored.
fn embedded_json(text: &str) -> Option<Value> {
    text.char_indices()
        .filter(|(_, c)| *c == '{' || *c == '[')
        .find_map(|(start, _)| {
            serde_json::Deserializer::from_str(&text[start..])
                .into_iter::<Value>()
                .next()?
                .ok()
        })
}

/// Reads the reply as JSON: the whole reply, then a fenced block found
/// anywhere, then the first embedded object or array.
fn parse_json(text: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str(strip_code_fence(text)) {
        return Some(value);
    }
    if let Some(value) = fenced_block(text).and_then(|block| serde_json::from_str(block).ok()) {
        return Some(value);
    }
    embedded_json(text)
}

/// First decimal number appearing anywhere in `text`.
fn first_number(text: &str) -> Option<f64> {
    let re = Regex::new(r"\d+(?:\.\d+)?").ok()?;
    re.find(text)?.as_str().parse().ok()
}

/// JSON scalar as text; `None` for null and missing values.
fn as_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse().ok(),
        _ => None,
    }
}

fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f.round() as i64))
        }
        _ => None,
    }
}

fn structured_score(text: &str) -> Option<ScoreWithReason> {
    let value = parse_json(text)?;
    let object = value.as_object()?;
    let score = as_f64(object.get("score")?)?;
    let reason = as_text(object.get("reason")).unwrap_or_default();
    let recommendations = match object.get("recommendations") {
        Some(Value::Array(items)) => items.iter().filter_map(|v| as_text(Some(v))).collect(),
        _ => Vec::new(),
    };
    Some(ScoreWithReason::with_recommendations(
        score,
        reason,
        recommendations,
    ))
}

/// Parse a `{"score", "reason", "recommendations"}` response.
///
/// Falls back to the first number in the text, then to the neutral score.
pub fn parse_score(text: &str) -> Parsed<ScoreWithReason> {
    if let Some(score) = structured_score(text) {
        return Parsed::Structured(score);
    }

    tracing::warn!("could not parse score and reason from response: {}", text);
    match first_number(text) {
        Some(score) => Parsed::Salvaged(ScoreWithReason::new(score, SALVAGED_REASON)),
        None => {
            tracing::warn!("could not parse any score from response: {}", text);
            Parsed::Defaulted(ScoreWithReason::new(NEUTRAL_SCORE, DEFAULT_REASON))
        }
    }
}

fn issue_from(value: &Value) -> Option<CodeIssue> {
    let object = value.as_object()?;
    let line_number = object
        .get("lineNumber")
        .and_then(as_i64)
        .and_then(|n| u32::try_from(n).ok());
    Some(CodeIssue {
        severity: as_text(object.get("severity"))?,
        issue_type: as_text(object.get("type"))?,
        description: as_text(object.get("description"))?,
        line_number,
        suggestion: as_text(object.get("suggestion"))?,
    })
}

/// Parse a JSON array of issue objects. Any malformed element rejects the
/// whole response.
pub fn parse_issues(text: &str) -> Parsed<Vec<CodeIssue>> {
    let issues = parse_json(text).and_then(|value| match value {
        Value::Array(items) => items.iter().map(issue_from).collect::<Option<Vec<_>>>(),
        _ => None,
    });
    match issues {
        Some(issues) => Parsed::Structured(issues),
        None => {
            tracing::warn!("could not parse issues from response: {}", text);
            Parsed::Defaulted(Vec::new())
        }
    }
}

/// Parse a JSON array of strings.
pub fn parse_suggestions(text: &str) -> Parsed<Vec<String>> {
    let suggestions = parse_json(text).and_then(|value| match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect::<Option<Vec<_>>>(),
        _ => None,
    });
    match suggestions {
        Some(suggestions) => Parsed::Structured(suggestions),
        None => {
            tracing::warn!("could not parse suggestions from response: {}", text);
            Parsed::Defaulted(Vec::new())
        }
    }
}

const NAMED_METRICS: [&str; 6] = [
    "linesOfCode",
    "cyclomaticComplexity",
    "numberOfMethods",
    "numberOfClasses",
    "commentRatio",
    "codeComplexity",
];

/// Best-effort typing of a metric outside the fixed set.
fn coerce_metric(value: &Value) -> Option<MetricValue> {
    match value {
        Value::Null => None,
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(MetricValue::Int(i)),
            None => n.as_f64().map(|f| {
                if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                    MetricValue::Int(f as i64)
                } else {
                    MetricValue::Float(f)
                }
            }),
        },
        Value::String(s) => {
            let trimmed = s.trim();
            if let Ok(i) = trimmed.parse::<i64>() {
                Some(MetricValue::Int(i))
            } else if let Ok(f) = trimmed.parse::<f64>() {
                Some(MetricValue::Float(f))
            } else {
                Some(MetricValue::Text(s.clone()))
            }
        }
        other => Some(MetricValue::Text(other.to_string())),
    }
}

fn metrics_from(object: &Map<String, Value>) -> FileMetrics {
    let int = |key: &str| object.get(key).and_then(as_i64).unwrap_or(0);

    let extra = object
        .iter()
        .filter(|(key, _)| !NAMED_METRICS.contains(&key.as_str()))
        .filter_map(|(key, value)| coerce_metric(value).map(|v| (key.clone(), v)))
        .collect();

    FileMetrics {
        lines_of_code: int("linesOfCode"),
        cyclomatic_complexity: int("cyclomaticComplexity"),
        number_of_methods: int("numberOfMethods"),
        number_of_classes: int("numberOfClasses"),
        comment_ratio: object.get("commentRatio").and_then(as_f64).unwrap_or(0.0),
        code_complexity: object
            .get("codeComplexity")
            .and_then(|v| v.as_str())
            .map(ComplexityLevel::parse)
            .unwrap_or_default(),
        extra,
    }
}

/// Parse a metrics object. On failure the line count is computed from
/// `source` and everything else takes its default.
pub fn parse_metrics(text: &str, source: &str) -> Parsed<FileMetrics> {
    match parse_json(text) {
        Some(Value::Object(object)) => Parsed::Structured(metrics_from(&object)),
        _ => {
            tracing::warn!("could not parse metrics from response: {}", text);
            Parsed::Defaulted(FileMetrics::local(source))
        }
    }
}
