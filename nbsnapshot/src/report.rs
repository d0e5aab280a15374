//! Batch summary printed after all notebooks were handled.

use crate::batch::ItemOutcome;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchReport {
    /// Notebooks written to the snapshot directory, in processing order.
    pub processed: Vec<String>,
    pub up_to_date: Vec<String>,
    pub out_of_order: Vec<String>,
    pub failed: Vec<String>,
}

impl BatchReport {
    pub fn record(&mut self, file_name: &str, outcome: &ItemOutcome) {
        let bucket = match outcome {
            ItemOutcome::Snapshotted => &mut self.processed,
            ItemOutcome::UpToDate => &mut self.up_to_date,
            ItemOutcome::OutOfOrder(_) => &mut self.out_of_order,
            ItemOutcome::ExecutionFailed(_) => &mut self.failed,
        };
        bucket.push(file_name.to_string());
    }

    /// Summary lines for stdout.
    pub fn render(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if self.processed.is_empty() {
            lines.push("snapshot: no notebooks written (rerun with -v for details)".to_string());
        } else {
            lines.push(format!(
                "snapshot: {} notebook(s) written:",
                self.processed.len()
            ));
            for name in &self.processed {
                lines.push(format!("  {name}"));
            }
        }
        for (count, label) in [
            (self.up_to_date.len(), "already up to date"),
            (self.out_of_order.len(), "not executed in order"),
            (self.failed.len(), "failed to execute"),
        ] {
            if count > 0 {
                lines.push(format!("snapshot: {count} {label}"));
            }
        }
        lines
    }
}
