use crate::language::CODE_EXTENSIONS;
use crate::model::{AnalysisResult, CodeIssue, Dimension, FileAnalysisResult, ScoreWithReason};
use crate::report::{ANALYSIS_DIR, TECHNICAL_REPORT};
use crate::scoring;
use std::cmp::Reverse;
use std::collections::HashSet;

const STYLE: &str = r#"
        * { box-sizing: border-box; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: #f8fafc;
            color: #1e293b;
            line-height: 1.6;
            margin: 0;
            padding: 2rem;
        }
        .container { max-width: 1200px; margin: 0 auto; }
        .header { margin-bottom: 2rem; padding-bottom: 1rem; border-bottom: 2px solid #e2e8f0; }
        .header h1 { font-size: 2rem; margin: 0; }
        .subtitle { color: #64748b; }
        .stats-grid {
            display: grid;
            grid-template-columns: repeat(auto-fit, minmax(180px, 1fr));
            gap: 1rem;
            margin-bottom: 2rem;
        }
        .stat-card {
            background: #ffffff;
            padding: 1.25rem;
            border-radius: 0.75rem;
            border: 1px solid #e2e8f0;
        }
        .stat-label { font-size: 0.875rem; color: #64748b; }
        .stat-value { font-size: 1.75rem; font-weight: 700; color: #3b82f6; }
        .section {
            background: #ffffff;
            padding: 1.5rem 2rem;
            border-radius: 0.75rem;
            border: 1px solid #e2e8f0;
            margin-bottom: 2rem;
        }
        table { width: 100%; border-collapse: collapse; }
        th, td { padding: 0.5rem 0.75rem; border-bottom: 1px solid #e2e8f0; text-align: left; }
        th { background: #f1f5f9; }
        a { color: #2563eb; text-decoration: none; font-weight: 600; }
        .tooltip { position: relative; cursor: help; }
        .tooltip .tooltiptext {
            visibility: hidden;
            width: 320px;
            background: #1e293b;
            color: #f8fafc;
            padding: 0.5rem;
            border-radius: 0.375rem;
            position: absolute;
            z-index: 1;
            bottom: 125%;
            left: 0;
            font-size: 0.8rem;
            font-weight: normal;
        }
        .tooltip:hover .tooltiptext { visibility: visible; }
        .quality-green { color: #16a34a; font-weight: 600; }
        .quality-yellow { color: #d97706; font-weight: 600; }
        .quality-red { color: #dc2626; font-weight: 600; }
        .score-excellent { color: #16a34a; }
        .score-good { color: #65a30d; }
        .score-fair { color: #d97706; }
        .score-poor { color: #dc2626; }
        .severity-critical { color: #dc2626; font-weight: 700; }
        .severity-high { color: #f97316; font-weight: 700; }
        .severity-medium { color: #d97706; }
        .severity-low { color: #10b981; }
        .footer { color: #64748b; font-size: 0.875rem; text-align: center; }
"#;

/// Escape text for embedding in HTML content or attribute values.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// File-system and URL safe stem for a per-file page.
pub fn sanitize_file_name(filename: &str) -> String {
    let stem = match filename.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && (ext == "h" || CODE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())) =>
        {
            stem
        }
        _ => filename,
    };
    stem.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

pub fn detail_page_name(filename: &str) -> String {
    format!("{}-analysis.html", sanitize_file_name(filename))
}

/// Detail page name for each file, in order. A name already taken by an
/// earlier file gets a numeric suffix, so files sharing a name (every
/// `mod.rs` or `pom.xml` of a workspace) keep separate pages.
pub fn detail_page_names(files: &[FileAnalysisResult]) -> Vec<String> {
    let mut taken = HashSet::new();
    files
        .iter()
        .map(|file| {
            let stem = sanitize_file_name(&file.filename);
            let mut name = detail_page_name(&file.filename);
            let mut n = 2;
            while !taken.insert(name.clone()) {
                name = format!("{}-{}-analysis.html", stem, n);
                n += 1;
            }
            name
        })
        .collect()
}

pub fn score_class(score: f64) -> &'static str {
    if score >= 90.0 {
        "score-excellent"
    } else if score >= 80.0 {
        "score-good"
    } else if score >= 70.0 {
        "score-fair"
    } else {
        "score-poor"
    }
}

/// Known severities are shown normalized; anything else as the model wrote it.
fn severity_label(issue: &CodeIssue) -> String {
    issue
        .level()
        .map(|level| level.symbol().to_string())
        .unwrap_or_else(|| issue.severity.trim().to_string())
}

fn severity_class(label: &str) -> String {
    format!("severity-{}", sanitize_file_name(&label.to_ascii_lowercase()))
}

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{style}</style>
</head>
<body>
    <div class="container">
{body}
    </div>
</body>
</html>
"#,
        title = escape_html(title),
        style = STYLE,
        body = body,
    )
}

fn stat_card(label: &str, value: &str) -> String {
    format!(
        r#"            <div class="stat-card"><div class="stat-label">{}</div><div class="stat-value">{}</div></div>
"#,
        label, value
    )
}

fn bullet_list(items: &[String]) -> String {
    if items.is_empty() {
        return "<p class=\"subtitle\">None.</p>".to_string();
    }
    let items: String = items
        .iter()
        .map(|item| format!("<li>{}</li>", escape_html(item)))
        .collect();
    format!("<ul>{}</ul>", items)
}

fn score_cell(score: &ScoreWithReason) -> String {
    format!(
        r#"<td class="tooltip {}">{:.1}<span class="tooltiptext">{}</span></td>"#,
        score_class(score.score),
        score.score,
        escape_html(&score.reason)
    )
}

/// Developer-facing report: summary cards, per-file scores with reason
/// tooltips, metrics and run recommendations.
pub fn render_technical(result: &AnalysisResult) -> String {
    let summary = &result.summary;

    let mut cards = String::new();
    cards.push_str(&stat_card("Overall Score", &format!("{:.1}", result.overall_score)));
    cards.push_str(&stat_card("Total Files", &summary.total_files.to_string()));
    cards.push_str(&stat_card("Total Lines", &result.total_lines().to_string()));
    cards.push_str(&stat_card("Total Functions", &result.total_methods().to_string()));
    cards.push_str(&stat_card(
        "Avg Complexity",
        &format!("{:.1}", result.average_complexity()),
    ));
    cards.push_str(&stat_card(
        "High Quality Files",
        &summary.high_quality_files.to_string(),
    ));
    cards.push_str(&stat_card(
        "Critical Issues",
        &summary.critical_issues.to_string(),
    ));

    let headers: String = Dimension::ALL
        .iter()
        .map(|d| format!("<th>{}</th>", d.label()))
        .collect();

    let mut score_rows = String::new();
    let pages = detail_page_names(&result.file_results);
    for (file, page) in result.file_results.iter().zip(&pages) {
        let cells: String = Dimension::ALL
            .iter()
            .map(|d| score_cell(file.score(*d)))
            .collect();
        score_rows.push_str(&format!(
            r#"                <tr><td><a href="{dir}/{page}">{name}</a></td>{cells}<td class="{class}">{final_score:.1}</td><td><span class="{tier_class}">{tier}</span></td></tr>
"#,
            dir = ANALYSIS_DIR,
            page = page,
            name = escape_html(&file.filename),
            cells = cells,
            class = score_class(file.final_score),
            final_score = file.final_score,
            tier_class = file.quality_indicator.css_class(),
            tier = file.quality_indicator.label(),
        ));
    }

    let mut metric_rows = String::new();
    for file in &result.file_results {
        let m = &file.metrics;
        metric_rows.push_str(&format!(
            "                <tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{:.1}</td><td>{}</td></tr>\n",
            escape_html(&file.filename),
            m.lines_of_code,
            m.number_of_methods,
            m.number_of_classes,
            m.cyclomatic_complexity,
            m.comment_ratio,
            m.code_complexity.label(),
        ));
    }

    let body = format!(
        r#"        <div class="header">
            <h1>Code Guard Technical Report</h1>
            <div class="subtitle">Generated {timestamp}</div>
        </div>
        <div class="stats-grid">
{cards}        </div>
        <div class="section">
            <h2>File Analysis Results</h2>
            <table>
                <thead><tr><th>Filename</th>{headers}<th>Final Score</th><th>Quality</th></tr></thead>
                <tbody>
{score_rows}                </tbody>
            </table>
            <p class="subtitle">Hover over a score for the reasoning behind it. Click a file name for its detailed analysis.</p>
        </div>
        <div class="section">
            <h2>File Metrics Overview</h2>
            <table>
                <thead><tr><th>Filename</th><th>Lines of Code</th><th>Functions</th><th>Classes</th><th>Cyclomatic Complexity</th><th>Comment Ratio (%)</th><th>Complexity Level</th></tr></thead>
                <tbody>
{metric_rows}                </tbody>
            </table>
        </div>
        <div class="section">
            <h2>Recommendations</h2>
            {recommendations}
        </div>"#,
        timestamp = escape_html(&result.timestamp),
        cards = cards,
        headers = headers,
        score_rows = score_rows,
        metric_rows = metric_rows,
        recommendations = bullet_list(&summary.recommendations),
    );

    page("Code Guard Technical Report", &body)
}

fn dimension_section(dimension: Dimension, score: &ScoreWithReason) -> String {
    format!(
        r#"        <div class="section">
            <h2>{label} <span class="{class}">{score:.1}</span></h2>
            <p>{reason}</p>
            <h3>Recommendations</h3>
            {recommendations}
        </div>
"#,
        label = dimension.label(),
        class = score_class(score.score),
        score = score.score,
        reason = escape_html(&score.reason),
        recommendations = bullet_list(&score.recommendations),
    )
}

/// Detail page for one file, linked from the technical report.
pub fn render_file_detail(file: &FileAnalysisResult) -> String {
    let sections: String = Dimension::ALL
        .iter()
        .map(|d| dimension_section(*d, file.score(*d)))
        .collect();

    let issues = if file.issues.is_empty() {
        "<p class=\"subtitle\">No issues reported.</p>".to_string()
    } else {
        // Most severe first; unrecognized labels last, model order otherwise.
        let mut ordered: Vec<&CodeIssue> = file.issues.iter().collect();
        ordered.sort_by_key(|issue| Reverse(issue.level().map_or(0, |level| level.priority())));
        let rows: String = ordered
            .into_iter()
            .map(|issue| {
                let label = severity_label(issue);
                format!(
                    "<tr><td class=\"{}\">{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                    severity_class(&label),
                    escape_html(&label),
                    escape_html(&issue.issue_type),
                    issue
                        .line_number
                        .map(|n| n.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    escape_html(&issue.description),
                    escape_html(&issue.suggestion),
                )
            })
            .collect();
        format!(
            "<table><thead><tr><th>Severity</th><th>Type</th><th>Line</th><th>Description</th><th>Suggestion</th></tr></thead><tbody>{}</tbody></table>",
            rows
        )
    };

    let mut metric_rows = String::new();
    for name in [
        "linesOfCode",
        "cyclomaticComplexity",
        "numberOfMethods",
        "numberOfClasses",
        "commentRatio",
        "codeComplexity",
    ]
    .into_iter()
    .map(str::to_string)
    .chain(file.metrics.extra.keys().cloned())
    {
        if let Some(value) = file.metrics.get(&name) {
            metric_rows.push_str(&format!(
                "<tr><td>{}</td><td>{}</td></tr>",
                escape_html(&name),
                escape_html(&value.to_string())
            ));
        }
    }

    let body = format!(
        r#"        <div class="header">
            <h1>{name}</h1>
            <div class="subtitle">{path}</div>
            <p><a href="../{back}">Back to technical report</a></p>
        </div>
        <div class="stats-grid">
{final_card}{tier_card}        </div>
{sections}        <div class="section">
            <h2>Issues</h2>
            {issues}
        </div>
        <div class="section">
            <h2>Suggestions</h2>
            {suggestions}
        </div>
        <div class="section">
            <h2>Metrics</h2>
            <table><tbody>{metric_rows}</tbody></table>
        </div>"#,
        name = escape_html(&file.filename),
        path = escape_html(&file.filepath),
        back = TECHNICAL_REPORT,
        final_card = stat_card("Final Score", &format!("{:.1}", file.final_score)),
        tier_card = stat_card(
            "Quality",
            &format!(
                r#"<span class="{}">{}</span>"#,
                file.quality_indicator.css_class(),
                file.quality_indicator.label()
            ),
        ),
        sections = sections,
        issues = issues,
        suggestions = bullet_list(&file.suggestions),
        metric_rows = metric_rows,
    );

    page(&format!("{} - Detailed Analysis", file.filename), &body)
}

/// Non-technical summary for stakeholders.
pub fn render_executive(result: &AnalysisResult) -> String {
    let summary = &result.summary;
    let level = scoring::quality_level(result.overall_score);

    let mut cards = String::new();
    cards.push_str(&stat_card(
        "Overall Quality",
        &format!(
            r#"<span class="{}">{:.1}</span>"#,
            score_class(result.overall_score),
            result.overall_score
        ),
    ));
    cards.push_str(&stat_card("Quality Level", level));
    cards.push_str(&stat_card("Files Reviewed", &summary.total_files.to_string()));
    cards.push_str(&stat_card(
        "Critical Issues",
        &summary.critical_issues.to_string(),
    ));

    let body = format!(
        r#"        <div class="header">
            <h1>Code Quality Executive Summary</h1>
            <div class="subtitle">Generated {timestamp}</div>
        </div>
        <div class="stats-grid">
{cards}        </div>
        <div class="section">
            <h2>Quality Distribution</h2>
            <table>
                <tbody>
                    <tr><td><span class="quality-green">High Quality</span></td><td>{high}</td></tr>
                    <tr><td><span class="quality-yellow">Medium Quality</span></td><td>{medium}</td></tr>
                    <tr><td><span class="quality-red">Low Quality</span></td><td>{low}</td></tr>
                </tbody>
            </table>
        </div>
        <div class="section">
            <h2>Key Recommendations</h2>
            {recommendations}
        </div>
        <p class="footer">Overall quality is rated <strong>{level}</strong>. See the technical report for file-level detail.</p>"#,
        timestamp = escape_html(&result.timestamp),
        cards = cards,
        high = summary.high_quality_files,
        medium = summary.medium_quality_files,
        low = summary.low_quality_files,
        recommendations = bullet_list(&summary.recommendations),
        level = level,
    );

    page("Code Quality Executive Summary", &body)
}
