//! Fixed prompts for every model request. Each prompt embeds the file content
//! verbatim and names the JSON shape it expects back.

use crate::model::{AnalysisMode, Dimension};

/// One of the knowledge-transfer narratives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KtSection {
    Purpose,
    Design,
    Modules,
}

impl KtSection {
    pub const ALL: [KtSection; 3] = [KtSection::Purpose, KtSection::Design, KtSection::Modules];

    pub fn title(&self) -> &'static str {
        match self {
            KtSection::Purpose => "Purpose, Key Goals, and Stakeholders",
            KtSection::Design => "High-Level System Design, Tech Stack, and Component Interactions",
            KtSection::Modules => "Functional Overview of Each Module and Key Business Logic",
        }
    }

    pub fn nav_label(&self) -> &'static str {
        match self {
            KtSection::Purpose => "Purpose & Goals",
            KtSection::Design => "System Design",
            KtSection::Modules => "Modules & Business Logic",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            KtSection::Purpose => "purpose",
            KtSection::Design => "design",
            KtSection::Modules => "modules",
        }
    }
}

fn score_focus(dimension: Dimension) -> (&'static str, &'static str) {
    match dimension {
        Dimension::CodeQuality => (
            "Analyze the following {lang} code for overall quality including readability, \
             maintainability, and documentation. Provide a score from 0-100 where 100 is \
             excellent quality.",
            "improve code quality",
        ),
        Dimension::Solid => (
            "Evaluate how well the following {lang} code follows SOLID principles (Single \
             Responsibility, Open/Closed, Liskov Substitution, Interface Segregation, Dependency \
             Inversion). Return a score from 0-100.",
            "improve SOLID compliance",
        ),
        Dimension::DesignPatterns => (
            "Analyze the following {lang} code for proper use of design patterns and \
             architectural decisions. Consider if appropriate patterns are used and if they're \
             implemented correctly. Return a score from 0-100.",
            "improve design patterns usage",
        ),
        Dimension::Security => (
            "Analyze the following {lang} code for security vulnerabilities and best practices. \
             Look for common security issues like injection flaws, insecure data handling, etc. \
             Return a score from 0-100 where 100 is very secure.",
            "improve security",
        ),
        Dimension::BugDetection => (
            "Analyze the following {lang} code for likely bugs: null dereferences, off-by-one \
             errors, resource leaks, unhandled errors, race conditions and incorrect logic. \
             Return a score from 0-100 where 100 means no likely bugs were found.",
            "fix or prevent the bugs found",
        ),
    }
}

/// Prompt for one scored dimension. Expects `{"score", "reason", "recommendations"}`.
pub fn score_prompt(dimension: Dimension, code: &str, language: &str) -> String {
    let (focus, goal) = score_focus(dimension);
    format!(
        "{}\n\n\
         Code:\n{}\n\n\
         Return as JSON with keys:\n\
         - 'score' (number 0-100)\n\
         - 'reason' (detailed explanation for the score)\n\
         - 'recommendations' (array of 4-5 concise actionable recommendations to {})",
        focus.replace("{lang}", language),
        code,
        goal
    )
}

/// Expects a JSON array of issue objects.
pub fn issues_prompt(code: &str, language: &str) -> String {
    format!(
        "Identify specific issues in the following {} code. For each issue, provide:\n\
         - Severity (CRITICAL, HIGH, MEDIUM, LOW)\n\
         - Type (e.g., Security, Performance, Maintainability)\n\
         - Description\n\
         - Line number (if applicable)\n\
         - Suggestion for fix\n\n\
         Code:\n{}\n\n\
         Return as JSON array with objects containing: severity, type, description, lineNumber, suggestion",
        language, code
    )
}

/// Framing sentence that biases suggestions toward the analysis mode.
pub fn mode_framing(mode: AnalysisMode) -> &'static str {
    match mode {
        AnalysisMode::Standard => "Provide general improvement suggestions.",
        AnalysisMode::QaAutomation => "Focus on testability and quality assurance aspects.",
        AnalysisMode::DevopsTesting => "Focus on deployment readiness and operational concerns.",
        AnalysisMode::DeveloperReview => "Focus on code review and improvement suggestions.",
    }
}

/// Expects a JSON array of strings.
pub fn suggestions_prompt(code: &str, language: &str, mode: AnalysisMode) -> String {
    format!(
        "Provide specific suggestions to improve the following {} code. {}\n\n\
         Code:\n{}\n\n\
         Return suggestions as a JSON array of strings.",
        language,
        mode_framing(mode),
        code
    )
}

/// Expects a JSON object with the six fixed metric keys.
pub fn metrics_prompt(code: &str, language: &str) -> String {
    format!(
        "Extract code metrics from the following {} code including:\n\
         - Lines of code\n\
         - Cyclomatic complexity estimate\n\
         - Number of methods/functions\n\
         - Number of classes\n\
         - Comment ratio (percentage 0-100)\n\
         - Overall complexity level (LOW, MEDIUM or HIGH)\n\n\
         Code:\n{}\n\n\
         Return as JSON object with keys: linesOfCode (integer), cyclomaticComplexity (integer), \
         numberOfMethods (integer), numberOfClasses (integer), commentRatio (number), \
         codeComplexity (string).",
        language, code
    )
}

/// Per-file knowledge-transfer narrative. Free text answer.
pub fn kt_prompt(section: KtSection, code: &str, language: &str) -> String {
    let ask = match section {
        KtSection::Purpose => {
            "Describe the purpose of the following {lang} code, the key goals it serves and the \
             stakeholders who depend on it, for a new team member."
        }
        KtSection::Design => {
            "Describe the design of the following {lang} code: its responsibilities, the tech \
             stack it relies on and how its components interact, for a new team member."
        }
        KtSection::Modules => {
            "Describe the modules, classes and dependencies in the following {lang} code and the \
             key business logic each one implements, for a new team member."
        }
    };
    format!(
        "{}\n\nCode:\n{}\n\nAnswer in a few concise paragraphs of plain text.",
        ask.replace("{lang}", language),
        code
    )
}

/// Merge per-file narratives of one section into a single onboarding summary.
pub fn kt_summary_prompt(section: KtSection, merged: &str) -> String {
    format!(
        "The following notes were collected from several source files of one project. \
         Summarize them into a single onboarding document section titled \"{}\". Remove \
         duplication and keep it concise.\n\nNotes:\n{}\n\nAnswer in plain text.",
        section.title(),
        merged
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const CODE: &str = "public class Calc {\n    int add(int a, int b) { return a + b; }\n}\n";

    #[test]
    fn every_score_prompt_embeds_code_and_shape() {
        for dimension in Dimension::ALL {
            let prompt = score_prompt(dimension, CODE, "Java");
            assert!(prompt.contains(CODE), "{:?} prompt lost the code", dimension);
            assert!(prompt.contains("Java"));
            assert!(!prompt.contains("{lang}"));
            assert!(prompt.contains("'score'"));
            assert!(prompt.contains("'reason'"));
            assert!(prompt.contains("'recommendations'"));
        }
    }

    #[test]
    fn score_prompts_differ_per_dimension() {
        let security = score_prompt(Dimension::Security, CODE, "Java");
        let solid = score_prompt(Dimension::Solid, CODE, "Java");
        assert!(security.contains("security vulnerabilities"));
        assert!(solid.contains("SOLID"));
        assert_ne!(security, solid);
    }

    #[test]
    fn prompts_are_deterministic() {
        assert_eq!(issues_prompt(CODE, "Java"), issues_prompt(CODE, "Java"));
        assert_eq!(metrics_prompt(CODE, "Go"), metrics_prompt(CODE, "Go"));
    }

    #[test]
    fn extraction_prompts_name_their_shape() {
        let issues = issues_prompt(CODE, "Java");
        assert!(issues.contains(CODE));
        assert!(issues.contains("severity, type, description, lineNumber, suggestion"));

        let metrics = metrics_prompt(CODE, "Java");
        assert!(metrics.contains(CODE));
        for key in [
            "linesOfCode",
            "cyclomaticComplexity",
            "numberOfMethods",
            "numberOfClasses",
            "commentRatio",
            "codeComplexity",
        ] {
            assert!(metrics.contains(key), "metrics prompt missing {}", key);
        }
    }

    #[test]
    fn suggestion_prompt_carries_mode_framing() {
        let modes = [
            AnalysisMode::Standard,
            AnalysisMode::QaAutomation,
            AnalysisMode::DevopsTesting,
            AnalysisMode::DeveloperReview,
        ];
        for mode in modes {
            let prompt = suggestions_prompt(CODE, "Java", mode);
            assert!(prompt.contains(CODE));
            assert!(prompt.contains(mode_framing(mode)));
            assert!(prompt.contains("JSON array of strings"));
        }
        assert!(suggestions_prompt(CODE, "Java", AnalysisMode::QaAutomation).contains("testability"));
    }

    #[test]
    fn kt_prompts_embed_code() {
        for section in KtSection::ALL {
            let prompt = kt_prompt(section, CODE, "Python");
            assert!(prompt.contains(CODE));
            assert!(prompt.contains("Python"));
        }
        assert!(kt_summary_prompt(KtSection::Design, "notes").contains(KtSection::Design.title()));
    }
}
