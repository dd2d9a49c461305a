use codeguard_core::model::{AnalysisMode, AnalysisResult, FileAnalysisResult, QualityIndicator};
use codeguard_core::scoring;
use colored::*;
use std::path::{Path, PathBuf};

fn tier_label(indicator: QualityIndicator) -> ColoredString {
    match indicator {
        QualityIndicator::Green => "GREEN".green().bold(),
        QualityIndicator::Yellow => "YELLOW".yellow().bold(),
        QualityIndicator::Red => "RED".red().bold(),
    }
}

fn colored_score(score: f64) -> ColoredString {
    let text = format!("{:.1}", score);
    match QualityIndicator::from_score(score) {
        QualityIndicator::Green => text.green().bold(),
        QualityIndicator::Yellow => text.yellow().bold(),
        QualityIndicator::Red => text.red().bold(),
    }
}

pub fn print_banner(file_count: usize, mode: AnalysisMode) {
    println!();
    println!(
        "{}",
        format!(
            " Code Guard v{}: analyzing {} file{}",
            env!("CARGO_PKG_VERSION"),
            file_count,
            if file_count == 1 { "" } else { "s" }
        )
        .bold()
    );
    println!(" {} Mode: {}", "|-".dimmed(), mode.label().cyan());
    println!();
}

fn print_file_line(file: &FileAnalysisResult) {
    let critical = file.critical_count();
    println!(
        " {} {:<40} {:>6}  {}{}",
        "|-".dimmed(),
        file.filepath,
        colored_score(file.final_score),
        tier_label(file.quality_indicator),
        if critical > 0 {
            format!("  {} critical", critical).red().to_string()
        } else {
            String::new()
        }
    );
}

/// Print per-file scores and the run summary.
pub fn print_analysis_summary(result: &AnalysisResult) {
    println!(" {}", "Files".bold().underline());
    for file in &result.file_results {
        print_file_line(file);
    }
    println!();

    println!(" {}", "=".repeat(60).dimmed());
    println!();

    let summary = &result.summary;
    println!(" {}", "Summary".bold().underline());
    println!(
        " {} Overall score:    {} ({})",
        "|-".dimmed(),
        colored_score(result.overall_score),
        scoring::quality_level(result.overall_score).cyan()
    );
    println!(
        " {} Files analyzed:   {}",
        "|-".dimmed(),
        summary.total_files
    );
    println!(
        " {} Quality tiers:    {} high, {} medium, {} low",
        "|-".dimmed(),
        summary.high_quality_files.to_string().green(),
        summary.medium_quality_files.to_string().yellow(),
        summary.low_quality_files.to_string().red()
    );
    println!(
        " {} Critical issues:  {}",
        "|-".dimmed(),
        if summary.critical_issues > 0 {
            summary.critical_issues.to_string().red().bold().to_string()
        } else {
            "0".to_string()
        }
    );
    println!();

    if !summary.recommendations.is_empty() {
        println!(" {}", "Recommendations".bold().underline());
        for (i, recommendation) in summary.recommendations.iter().enumerate() {
            println!(" {}. {}", i + 1, recommendation);
        }
        println!();
    }
}

/// Print the quality-gate outcome.
pub fn print_quality_gate(result: &AnalysisResult, threshold: f64, mode: AnalysisMode) {
    if result.passes_gate(threshold) {
        println!(
            " {} Quality gate passed: {:.1} >= {:.1}",
            "OK".green().bold(),
            result.overall_score,
            threshold
        );
    } else if mode.enforces_quality_gate() {
        println!(
            " {} Quality gate failed: {:.1} < {:.1}",
            "FAIL".red().bold(),
            result.overall_score,
            threshold
        );
    } else {
        println!(
            " {} Overall score {:.1} is below the threshold of {:.1}",
            "WARN".yellow().bold(),
            result.overall_score,
            threshold
        );
    }
    println!();
}

pub fn print_written(out_dir: &Path, paths: &[PathBuf]) {
    println!(
        " {} {} report file{} written to {}",
        "OK".green().bold(),
        paths.len(),
        if paths.len() == 1 { "" } else { "s" },
        out_dir.display().to_string().cyan()
    );
}
