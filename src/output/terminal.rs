//! Terminal output formatting with colors and box drawing.

use colored::Colorize;

use crate::result::{ChiSquareReport, Verdict};

/// Format a report for human-readable terminal output.
pub fn format_report(report: &ChiSquareReport) -> String {
    let summary = &report.summary;
    let mut output = String::new();
    let sep = "\u{2500}".repeat(62);

    output.push_str(&format!("sky-covariance: {}\n", report.case));
    output.push_str(&sep);
    output.push_str("\n\n");

    let strategy = report.strategy.map_or("loaded", |s| s.as_str());
    output.push_str(&format!("  Inverse:  {strategy}\n"));
    output.push_str(&format!("  Pixels:   {}\n", summary.degrees_of_freedom));
    output.push_str(&format!("  Trials:   {} (seed {})\n", summary.trials, summary.seed));
    output.push('\n');

    output.push_str(&format!("  {}\n\n", format_verdict(summary.verdict())));
    output.push_str(&format!(
        "    Mean \u{03c7}\u{00b2}:  {:.3} \u{00b1} {:.3} (expected {})\n",
        summary.mean, summary.std_error, summary.degrees_of_freedom
    ));
    output.push_str(&format!(
        "    Variance: {:.3} (expected {})\n",
        summary.variance,
        2 * summary.degrees_of_freedom
    ));
    output.push_str(&format!("    z-score:  {:+.2}\n", summary.z_score));
    output.push('\n');

    output.push_str(&sep);
    output.push('\n');
    output
}

fn format_verdict(verdict: Verdict) -> String {
    match verdict {
        Verdict::Consistent => "\u{2713} Inverse consistent with covariance".green().bold().to_string(),
        Verdict::Marginal => "\u{26A0} Marginal agreement; rerun with more trials".yellow().bold().to_string(),
        Verdict::Inconsistent => "\u{2717} Chi-square mean far from pixel count".red().bold().to_string(),
        Verdict::Undetermined => "? Too few trials to judge".yellow().to_string(),
    }
}
