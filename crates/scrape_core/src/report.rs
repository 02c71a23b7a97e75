/// Terminal state of one item as far as the run counters are concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemResult {
    Saved,
    /// The artifact was already on disk; counts as a success.
    Skipped,
    Failed { reason: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryTally {
    pub category: String,
    pub attempted: usize,
    pub saved: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl CategoryTally {
    fn new(category: &str) -> Self {
        Self {
            category: category.to_string(),
            ..Default::default()
        }
    }

    pub fn succeeded(&self) -> usize {
        self.saved + self.skipped
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedItem {
    pub category: String,
    pub label: String,
    pub reason: String,
}

/// Run-level counters, owned by whoever drives the pipeline.
///
/// Categories are kept in the order they were first seen so the summary reads
/// in manifest order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    tallies: Vec<CategoryTally>,
    failures: Vec<FailedItem>,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a category so it shows up in the summary even with no items.
    pub fn begin_category(&mut self, category: &str) {
        self.tally_mut(category);
    }

    pub fn record(&mut self, category: &str, label: &str, result: ItemResult) {
        let tally = self.tally_mut(category);
        tally.attempted += 1;
        match result {
            ItemResult::Saved => tally.saved += 1,
            ItemResult::Skipped => tally.skipped += 1,
            ItemResult::Failed { reason } => {
                tally.failed += 1;
                self.failures.push(FailedItem {
                    category: category.to_string(),
                    label: label.to_string(),
                    reason,
                });
            }
        }
    }

    pub fn categories(&self) -> &[CategoryTally] {
        &self.tallies
    }

    pub fn failures(&self) -> &[FailedItem] {
        &self.failures
    }

    pub fn totals(&self) -> CategoryTally {
        self.tallies
            .iter()
            .fold(CategoryTally::new("total"), |mut acc, t| {
                acc.attempted += t.attempted;
                acc.saved += t.saved;
                acc.skipped += t.skipped;
                acc.failed += t.failed;
                acc
            })
    }

    /// Human-readable summary, one line per entry, without decoration.
    pub fn summary_lines(&self) -> Vec<String> {
        let totals = self.totals();
        let mut lines = vec![
            format!("Total attempted: {}", totals.attempted),
            format!(
                "Succeeded: {} ({} already present)",
                totals.succeeded(),
                totals.skipped
            ),
            format!("Failed: {}", totals.failed),
        ];

        if !self.tallies.is_empty() {
            lines.push(String::new());
            for t in &self.tallies {
                lines.push(format!(
                    "  {}/: {} attempted, {} succeeded, {} failed",
                    t.category,
                    t.attempted,
                    t.succeeded(),
                    t.failed
                ));
            }
        }

        if !self.failures.is_empty() {
            lines.push(String::new());
            lines.push("Failed items:".to_string());
            for f in &self.failures {
                lines.push(format!("  - [{}] {}: {}", f.category, f.label, f.reason));
            }
        }
        lines
    }

    fn tally_mut(&mut self, category: &str) -> &mut CategoryTally {
        let idx = match self.tallies.iter().position(|t| t.category == category) {
            Some(idx) => idx,
            None => {
                self.tallies.push(CategoryTally::new(category));
                self.tallies.len() - 1
            }
        };
        &mut self.tallies[idx]
    }
}
