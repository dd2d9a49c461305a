use std::path::Path;

/// Extensions of source files worth sending for analysis.
pub const CODE_EXTENSIONS: &[&str] = &[
    "java", "js", "ts", "py", "cpp", "cc", "c", "cs", "php", "rb", "go", "kt", "scala", "rs",
];

/// Best-effort language label keyed on file extension.
pub fn detect_language(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("java") => "Java",
        Some("js") => "JavaScript",
        Some("ts") => "TypeScript",
        Some("py") => "Python",
        Some("cpp") | Some("cc") => "C++",
        Some("c") => "C",
        Some("cs") => "C#",
        Some("php") => "PHP",
        Some("rb") => "Ruby",
        Some("go") => "Go",
        Some("kt") => "Kotlin",
        Some("scala") => "Scala",
        Some("rs") => "Rust",
        _ => "Unknown",
    }
}

pub fn is_code_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| CODE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}
