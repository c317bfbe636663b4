//! Rendering of a collected snapshot for humans (a table) or machines (JSON).

use common::util::time::format_duration;
use getset::Getters;
use metrics::{CollectionError, MetricField, MetricsSnapshot};
use owo_colors::OwoColorize;
use prettytable::{row, Table};
use serde::Serialize;
use std::fmt::Write;
use std::time::Duration;

const ROWS: [(MetricField, &str, &str); 3] = [
    (MetricField::Cpu, "CPU usage", "%"),
    (MetricField::Memory, "Free memory", " MB"),
    (MetricField::Disk, "Free disk space", " MB"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Getters)]
#[getset(get = "pub")]
pub struct ErrorEntry {
    field: MetricField,
    message: String,
}

impl From<&CollectionError> for ErrorEntry {
    fn from(err: &CollectionError) -> Self {
        Self {
            field: err.field(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Getters)]
#[getset(get = "pub")]
pub struct StatusReport {
    #[serde(flatten)]
    snapshot: MetricsSnapshot,
    errors: Vec<ErrorEntry>,
    #[serde(skip)]
    elapsed: Duration,
}

impl StatusReport {
    pub fn new(snapshot: MetricsSnapshot, errors: &[CollectionError], elapsed: Duration) -> Self {
        Self {
            snapshot,
            errors: errors.iter().map(ErrorEntry::from).collect(),
            elapsed,
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Fields left unpopulated, in measurement order.
    pub fn failed_fields(&self) -> Vec<MetricField> {
        let mut fields: Vec<MetricField> = self.errors.iter().map(|entry| entry.field).collect();
        fields.dedup();
        fields
    }

    fn failed(&self, field: MetricField) -> bool {
        self.errors.iter().any(|entry| entry.field == field)
    }

    pub fn render_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// A table of the three metrics, followed by one line per error.
    /// Fields that failed show `-` rather than their zero value.
    pub fn render_text(&self) -> String {
        let mut table = Table::new();
        table.set_format(*prettytable::format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(row!["Metric", "Value", "Status"]);

        for (field, label, unit) in ROWS {
            if self.failed(field) {
                table.add_row(row![label, "-", "unavailable".red().to_string()]);
            } else {
                let value = format!("{:.2}{}", self.snapshot.value(field), unit);
                table.add_row(row![label, value, "ok".green().to_string()]);
            }
        }

        let mut out = table.to_string();
        for entry in &self.errors {
            let _ = writeln!(out, "{} [{}] {}", "error".red(), entry.field, entry.message);
        }
        let _ = write!(out, "collected in {}", format_duration(self.elapsed));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions_sorted::assert_eq_sorted;
    use std::path::PathBuf;

    fn snapshot() -> MetricsSnapshot {
        MetricsSnapshot::builder()
            .free_memory_mb(512.0)
            .free_space_mb(1024.5)
            .build()
    }

    fn errors() -> Vec<CollectionError> {
        vec![CollectionError::ProcessNotFound(31337)]
    }

    #[test]
    fn json_flattens_snapshot_and_lists_errors() {
        let report = StatusReport::new(snapshot(), &errors(), Duration::from_millis(1_010));

        let json: serde_json::Value =
            serde_json::from_str(&report.render_json().unwrap()).unwrap();
        assert_eq_sorted!(
            json,
            serde_json::json!({
                "cpu_percentage": 0.0,
                "free_memory_mb": 512.0,
                "free_space_mb": 1024.5,
                "errors": [
                    { "field": "cpu", "message": "no running process with id 31337" }
                ],
            })
        );
    }

    #[test]
    fn text_marks_failed_fields() {
        let report = StatusReport::new(snapshot(), &errors(), Duration::from_millis(1_010));
        let text = report.render_text();

        assert!(text.contains("512.00 MB"), "{text}");
        assert!(text.contains("1024.50 MB"), "{text}");
        assert!(!text.contains("0.00%"), "{text}");
        assert!(text.contains("unavailable"), "{text}");
        assert!(text.contains("[cpu] no running process with id 31337"), "{text}");
        assert!(text.ends_with("collected in 1.010s"), "{text}");
    }

    #[test]
    fn summary_skips_failed_fields() {
        let report = StatusReport::new(snapshot(), &errors(), Duration::ZERO);

        assert_eq!(report.failed_fields(), vec![MetricField::Cpu]);
        let summary = report.snapshot().summary(&report.failed_fields());
        assert_eq!(summary, "CPU: -, Free Memory: 512.00MB, Free Space: 1024.50MB");

        let clean = StatusReport::new(snapshot(), &[], Duration::ZERO);
        assert!(clean.failed_fields().is_empty());
    }

    #[test]
    fn clean_report_has_no_errors() {
        let errors = [CollectionError::DiskQuery {
            path: PathBuf::from("/srv"),
            reason: "ENOENT".into(),
        }];
        assert!(StatusReport::new(snapshot(), &errors, Duration::ZERO).has_errors());

        let report = StatusReport::new(snapshot(), &[], Duration::ZERO);
        assert!(!report.has_errors());
        assert!(!report.render_text().contains("unavailable"));
    }
}
