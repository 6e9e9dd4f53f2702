use itertools::Itertools;

use super::record::{ExecutionRecord, RunMode, RunStatus, StepStatus};

/// Formats execution records into human-readable text.
pub struct TraceFormatter;

impl TraceFormatter {
    /// Render a record as a multi-line report: envelope, numbered steps, and
    /// the terminal output when one was produced.
    pub fn format_record(record: &ExecutionRecord) -> String {
        let mode = match record.mode {
            RunMode::Test => "test",
            RunMode::Run => "run",
        };
        let status = match record.status {
            RunStatus::Ok => "ok",
            RunStatus::Error => "error",
        };

        let header = format!(
            "Execution {} ({}) finished {} in {}ms",
            record.id, mode, status, record.duration_ms
        );

        let width = record
            .steps
            .iter()
            .map(|s| s.node_id.len())
            .max()
            .unwrap_or(0);
        let steps = record
            .steps
            .iter()
            .enumerate()
            .map(|(index, step)| {
                let marker = match step.status {
                    StepStatus::Ok => "ok   ",
                    StepStatus::Error => "error",
                };
                format!(
                    "  [{:>3}] {} {:width$}  {}",
                    index + 1,
                    marker,
                    step.node_id,
                    step.message,
                )
            })
            .join("\n");

        let mut report = format!("{}\n{}", header, steps);
        if let Some(output) = &record.output {
            report.push_str(&format!("\nOutput: {}", output));
        }
        report
    }
}
