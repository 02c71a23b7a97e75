//! Human-readable progress and summary on stdout.

use std::path::Path;
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use scrape_core::RunReport;
use scrape_engine::{EngineEvent, ItemOutcome, ItemReport, ProgressSink};

const RULE_WIDTH: usize = 60;

/// Prints one status line per finished item.
pub struct ConsoleSink;

impl ProgressSink for ConsoleSink {
    fn emit(&self, event: EngineEvent) {
        match event {
            EngineEvent::PageScanned { page, found } => {
                println!("  {page}: found {found} images");
            }
            EngineEvent::ItemFinished(report) => println!("{}", status_line(&report)),
        }
    }
}

pub fn status_line(report: &ItemReport) -> String {
    match &report.outcome {
        ItemOutcome::Saved(path) => format!("    ✓ {}", display_name(path)),
        ItemOutcome::Skipped(path) => format!("    ⊙ Exists: {}", display_name(path)),
        ItemOutcome::Failed(reason) => format!("    ✗ {}: {}", report.url, reason),
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub fn banner(title: &str, total: usize) {
    println!("{}", "=".repeat(RULE_WIDTH));
    println!("{title}");
    println!("{}", "=".repeat(RULE_WIDTH));
    println!("Items to process: {total}");
}

pub fn section(category: &str, count: usize) {
    println!();
    println!("{} ({count})", category.to_uppercase());
    println!("{}", "-".repeat(RULE_WIDTH / 2));
}

pub fn print_summary(report: &RunReport, output: &Path, elapsed: Duration) {
    println!();
    println!("{}", "=".repeat(RULE_WIDTH));
    println!("SUMMARY");
    println!("{}", "=".repeat(RULE_WIDTH));
    for line in report.summary_lines() {
        println!("{line}");
    }
    println!();
    println!("Output directory: {}", output.display());
    println!(
        "Finished at {} after {:.1}s",
        Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        elapsed.as_secs_f64()
    );
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn report(outcome: ItemOutcome) -> ItemReport {
        ItemReport {
            url: "https://example.com/a.png".to_string(),
            outcome,
        }
    }

    #[test]
    fn status_lines_use_distinct_markers() {
        let saved = status_line(&report(ItemOutcome::Saved(PathBuf::from("out/main/000_a.png"))));
        assert_eq!(saved, "    ✓ 000_a.png");

        let skipped = status_line(&report(ItemOutcome::Skipped(PathBuf::from("out/a.png"))));
        assert_eq!(skipped, "    ⊙ Exists: a.png");

        let failed = status_line(&report(ItemOutcome::Failed("http status 404".into())));
        assert_eq!(failed, "    ✗ https://example.com/a.png: http status 404");
    }
}
