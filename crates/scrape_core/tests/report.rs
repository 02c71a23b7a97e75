use std::sync::Once;

use pretty_assertions::assert_eq;
use scrape_core::{ItemResult, RunReport};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

#[test]
fn skipped_items_count_as_success() {
    init_logging();
    let mut report = RunReport::new();
    report.record("main", "a.png", ItemResult::Saved);
    report.record("main", "b.png", ItemResult::Skipped);

    let totals = report.totals();
    assert_eq!(totals.attempted, 2);
    assert_eq!(totals.succeeded(), 2);
    assert_eq!(totals.failed, 0);
    assert!(report.failures().is_empty());
}

#[test]
fn a_failure_increments_the_counter_by_exactly_one() {
    init_logging();
    let mut report = RunReport::new();
    report.record("help", "one", ItemResult::Saved);
    let before = report.totals().failed;

    report.record(
        "help",
        "two",
        ItemResult::Failed {
            reason: "http status 404".to_string(),
        },
    );

    assert_eq!(report.totals().failed, before + 1);
    assert_eq!(report.failures().len(), 1);
    assert_eq!(report.failures()[0].label, "two");
    assert_eq!(report.failures()[0].reason, "http status 404");
}

#[test]
fn categories_keep_first_seen_order() {
    init_logging();
    let mut report = RunReport::new();
    report.begin_category("main");
    report.begin_category("help");
    report.record("features", "x", ItemResult::Saved);
    report.record("main", "y", ItemResult::Saved);

    let names: Vec<_> = report
        .categories()
        .iter()
        .map(|t| t.category.as_str())
        .collect();
    assert_eq!(names, vec!["main", "help", "features"]);
    assert_eq!(report.categories()[1].attempted, 0);
}

#[test]
fn summary_lists_counts_and_failed_items() {
    init_logging();
    let mut report = RunReport::new();
    report.record("c2c", "Canon QuickStart", ItemResult::Saved);
    report.record("c2c", "Nikon QuickStart", ItemResult::Skipped);
    report.record(
        "c2c",
        "Leica QuickStart",
        ItemResult::Failed {
            reason: "timeout".to_string(),
        },
    );

    let lines = report.summary_lines();
    assert_eq!(lines[0], "Total attempted: 3");
    assert_eq!(lines[1], "Succeeded: 2 (1 already present)");
    assert_eq!(lines[2], "Failed: 1");
    assert!(lines.contains(&"  c2c/: 3 attempted, 2 succeeded, 1 failed".to_string()));
    assert_eq!(
        lines.last().unwrap(),
        "  - [c2c] Leica QuickStart: timeout"
    );
}
