//! Output formatting and reporting

use colored::*;
use similar::{ChangeTag, TextDiff};
use std::path::Path;
use std::time::Duration;

/// Counts gathered over one run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub files_checked: usize,
    /// Files whose rendering differs from the source, or that failed a
    /// round-trip check
    pub files_changed: usize,
    /// Files that could not be read or parsed
    pub files_failed: usize,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_failures(&self) -> bool {
        self.files_failed > 0
    }

    pub fn is_clean(&self) -> bool {
        self.files_changed == 0 && self.files_failed == 0
    }
}

/// Summary printed after `fmt`.
pub fn print_format_summary(summary: &RunSummary, check: bool, elapsed: Duration) {
    println!();
    println!("{}", "Format Summary".bold().underline());
    println!("  Files checked: {}", summary.files_checked);

    if summary.files_changed == 0 {
        println!("  {} All files are formatted correctly", "✓".green());
    } else if check {
        println!(
            "  {} {} file(s) would be reformatted",
            "✗".yellow(),
            summary.files_changed.to_string().yellow()
        );
    } else {
        println!(
            "  {} Applied formatting to {} file(s)",
            "✓".green(),
            summary.files_changed.to_string().green()
        );
    }

    if summary.has_failures() {
        println!(
            "  {} {} file(s) could not be processed",
            "✗".red(),
            summary.files_failed.to_string().red()
        );
    }

    println!("  Completed in {}", utils::format_duration(elapsed));
}

/// Summary printed after `check`.
pub fn print_check_summary(summary: &RunSummary, elapsed: Duration) {
    println!();
    println!("{}", "Round-trip Summary".bold().underline());
    println!("  Files checked: {}", summary.files_checked);

    if summary.is_clean() {
        println!("  {} Every file round-trips", "✓".green());
    } else {
        if summary.files_changed > 0 {
            println!(
                "  {} {} file(s) do not round-trip",
                "✗".red(),
                summary.files_changed.to_string().red()
            );
        }
        if summary.has_failures() {
            println!(
                "  {} {} file(s) could not be processed",
                "✗".red(),
                summary.files_failed.to_string().red()
            );
        }
    }

    println!("  Completed in {}", utils::format_duration(elapsed));
}

/// Unified diff between a file and its rendering, colored per line.
pub fn render_diff(path: &Path, original: &str, formatted: &str) -> String {
    let diff = TextDiff::from_lines(original, formatted);
    let mut out = String::new();
    out.push_str(&format!("--- {}\n", path.display()).red().to_string());
    out.push_str(&format!("+++ {}\n", path.display()).green().to_string());

    for group in diff.grouped_ops(3) {
        for op in group {
            for change in diff.iter_changes(&op) {
                let line = format!("{}{}", sign(change.tag()), change.value());
                let line = match change.tag() {
                    ChangeTag::Delete => line.red().to_string(),
                    ChangeTag::Insert => line.green().to_string(),
                    ChangeTag::Equal => line,
                };
                out.push_str(&line);
                if change.missing_newline() {
                    out.push('\n');
                }
            }
        }
    }
    out
}

/// Sign column of a unified diff.
fn sign(tag: ChangeTag) -> char {
    match tag {
        ChangeTag::Delete => '-',
        ChangeTag::Insert => '+',
        ChangeTag::Equal => ' ',
    }
}

pub mod utils {
    use std::time::Duration;

    /// Format duration in human-readable format
    pub fn format_duration(duration: Duration) -> String {
        let total_ms = duration.as_millis();

        if total_ms < 1000 {
            format!("{total_ms}ms")
        } else if total_ms < 60_000 {
            format!("{:.1}s", total_ms as f64 / 1000.0)
        } else {
            let minutes = total_ms / 60_000;
            let seconds = (total_ms % 60_000) as f64 / 1000.0;
            format!("{minutes}m {seconds:.1}s")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(utils::format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(utils::format_duration(Duration::from_millis(1500)), "1.5s");
        assert_eq!(utils::format_duration(Duration::from_millis(61_000)), "1m 1.0s");
    }

    #[test]
    fn test_render_diff_marks_changed_lines() {
        colored::control::set_override(false);
        let diff = render_diff(Path::new("a.py"), "x = 1,\ny = 2\n", "x = (1,)\ny = 2\n");
        assert!(diff.starts_with("--- a.py\n+++ a.py\n"));
        assert!(diff.contains("-x = 1,\n"));
        assert!(diff.contains("+x = (1,)\n"));
        assert!(diff.contains(" y = 2\n"));
    }

    #[test]
    fn test_summary_state() {
        let mut summary = RunSummary::new();
        assert!(summary.is_clean());
        summary.files_failed = 1;
        assert!(summary.has_failures());
        assert!(!summary.is_clean());
    }
}
