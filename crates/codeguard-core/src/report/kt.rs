//! Knowledge-transfer documents: per-file narratives merged by section and
//! condensed into one onboarding page per section.

use crate::client::ModelClient;
use crate::error::Result;
use crate::model::{AnalysisResult, KnowledgeTransfer};
use crate::prompt::{self, KtSection};
use crate::report::html::escape_html;
use std::fs;
use std::path::{Path, PathBuf};

pub const KT_DIR: &str = "kt";
pub const NO_DATA: &str = "No data from the model.";

/// One summary per section.
#[derive(Debug, Clone, PartialEq)]
pub struct KtSummaries {
    pub purpose: String,
    pub design: String,
    pub modules: String,
}

impl KtSummaries {
    pub fn get(&self, section: KtSection) -> &str {
        match section {
            KtSection::Purpose => &self.purpose,
            KtSection::Design => &self.design,
            KtSection::Modules => &self.modules,
        }
    }
}

fn narrative(kt: &KnowledgeTransfer, section: KtSection) -> &str {
    match section {
        KtSection::Purpose => &kt.purpose,
        KtSection::Design => &kt.design,
        KtSection::Modules => &kt.modules,
    }
}

/// Non-blank narratives of one section, in file order, one per line.
pub fn merge_section(result: &AnalysisResult, section: KtSection) -> String {
    result
        .file_results
        .iter()
        .filter_map(|file| file.knowledge_transfer.as_ref())
        .map(|kt| narrative(kt, section))
        .filter(|text| !text.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn summary_failure(section: KtSection) -> String {
    format!(
        "Unable to generate {} summary due to a model error.",
        section.slug()
    )
}

async fn summarize_section(
    client: &ModelClient,
    result: &AnalysisResult,
    section: KtSection,
) -> String {
    let merged = merge_section(result, section);
    if merged.trim().is_empty() {
        return NO_DATA.to_string();
    }

    match client
        .complete(&prompt::kt_summary_prompt(section, &merged))
        .await
    {
        Ok(text) => text.trim().to_string(),
        Err(e) => {
            tracing::warn!("{} summary failed: {}", section.slug(), e);
            summary_failure(section)
        }
    }
}

/// One model call per section with narratives; empty sections make no call.
pub async fn summarize(client: &ModelClient, result: &AnalysisResult) -> KtSummaries {
    KtSummaries {
        purpose: summarize_section(client, result, KtSection::Purpose).await,
        design: summarize_section(client, result, KtSection::Design).await,
        modules: summarize_section(client, result, KtSection::Modules).await,
    }
}

const STYLE: &str = r#"
        body { font-family: -apple-system, 'Segoe UI', Roboto, sans-serif; margin: 0; background: #f8fafc; color: #1e293b; }
        nav { background: #1e293b; padding: 1rem 2rem; }
        nav a { color: #f8fafc; margin-right: 1.5rem; text-decoration: none; font-weight: 600; }
        main { max-width: 960px; margin: 2rem auto; background: #ffffff; padding: 2rem; border-radius: 0.75rem; border: 1px solid #e2e8f0; }
        .summary { white-space: pre-wrap; line-height: 1.7; }
"#;

fn nav() -> String {
    let links: String = KtSection::ALL
        .iter()
        .map(|s| format!(r#"<a href="{}.html">{}</a>"#, s.slug(), escape_html(s.nav_label())))
        .collect();
    format!(r#"<nav><a href="index.html">Home</a>{}</nav>"#, links)
}

fn kt_page(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{title} - Code Guard</title>
    <style>{style}</style>
</head>
<body>
    {nav}
    <main>
        <h1>{title}</h1>
        {content}
    </main>
</body>
</html>
"#,
        title = escape_html(title),
        style = STYLE,
        nav = nav(),
        content = content,
    )
}

pub fn render_index() -> String {
    let items: String = KtSection::ALL
        .iter()
        .map(|s| format!(r#"<li><a href="{}.html">{}</a></li>"#, s.slug(), s.title()))
        .collect();
    kt_page(
        "Knowledge Transfer (KT) Documentation",
        &format!(
            "<p>Onboarding notes for new team members, generated from the analyzed sources.</p><ul>{}</ul>",
            items
        ),
    )
}

pub fn render_section(section: KtSection, summary: &str) -> String {
    kt_page(
        section.title(),
        &format!(r#"<div class="summary">{}</div>"#, escape_html(summary)),
    )
}

/// Write `kt/index.html` and one page per section under `out_dir`.
pub fn write_kt_docs(summaries: &KtSummaries, out_dir: &Path) -> Result<Vec<PathBuf>> {
    let dir = out_dir.join(KT_DIR);
    fs::create_dir_all(&dir)?;

    let mut written = Vec::new();
    let index = dir.join("index.html");
    fs::write(&index, render_index())?;
    written.push(index);

    for section in KtSection::ALL {
        let path = dir.join(format!("{}.html", section.slug()));
        fs::write(&path, render_section(section, summaries.get(section)))?;
        written.push(path);
    }

    tracing::info!("knowledge transfer docs written to {}", dir.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::ScriptedBackend;
    use crate::client::{BackendError, RetryPolicy};
    use crate::report::testing;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_merge_skips_blank_narratives() {
        let result = testing::result();

        assert_eq!(
            merge_section(&result, KtSection::Purpose),
            "UserService.java manages accounts.\nutil.py manages accounts."
        );
        assert_eq!(merge_section(&result, KtSection::Design), "");
        assert_eq!(merge_section(&result, KtSection::Modules), "");
    }

    #[tokio::test]
    async fn test_summarize_calls_only_for_data() {
        let backend = Arc::new(ScriptedBackend::new(vec![Ok(
            " Account management service. ".to_string()
        )]));
        let client = ModelClient::new(backend.clone(), RetryPolicy::immediate(1));

        let summaries = summarize(&client, &testing::result()).await;

        assert_eq!(summaries.purpose, "Account management service.");
        assert_eq!(summaries.design, NO_DATA);
        assert_eq!(summaries.modules, NO_DATA);
        assert_eq!(backend.call_count(), 1);
        assert!(backend.prompts()[0].contains("util.py manages accounts."));
    }

    #[tokio::test]
    async fn test_failed_summary_uses_placeholder() {
        let backend = Arc::new(ScriptedBackend::always(Err(BackendError::http(
            403, "denied",
        ))));
        let client = ModelClient::new(backend, RetryPolicy::immediate(3));

        let summaries = summarize(&client, &testing::result()).await;
        assert_eq!(summaries.purpose, summary_failure(KtSection::Purpose));
    }

    #[test]
    fn test_write_kt_docs() {
        let dir = TempDir::new().unwrap();
        let summaries = KtSummaries {
            purpose: "Serves <customers>".to_string(),
            design: NO_DATA.to_string(),
            modules: NO_DATA.to_string(),
        };

        let written = write_kt_docs(&summaries, dir.path()).unwrap();
        assert_eq!(written.len(), 4);

        let purpose = fs::read_to_string(dir.path().join("kt/purpose.html")).unwrap();
        assert!(purpose.contains("Serves &lt;customers&gt;"));
        assert!(purpose.contains(KtSection::Purpose.title()));
        let index = fs::read_to_string(dir.path().join("kt/index.html")).unwrap();
        assert!(index.contains("modules.html"));
    }
}
