use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Whether a run was a dry test or a live execution. Only the envelope and
/// credit accounting look at this; dispatch never branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Test,
    Run,
}

/// Overall outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Ok,
    Error,
}

/// Outcome of a single node visit. A step-level error does not by itself
/// abort the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Ok,
    Error,
}

/// One append-only audit-log entry produced by visiting a node. Never mutated
/// after being written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionStep {
    pub ts: String,
    pub node_id: String,
    pub label: String,
    pub kind: String,
    pub status: StepStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// The complete, returned result of one engine run: envelope plus the ordered
/// step trace. Finalized and returned exactly once, whatever the outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub id: String,
    pub mode: RunMode,
    pub status: RunStatus,
    pub started_at: String,
    pub finished_at: String,
    pub duration_ms: i64,
    pub steps: Vec<ExecutionStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
}

impl ExecutionRecord {
    /// Credits consumed by this run: every step bills one credit (minimum
    /// one), live runs bill double.
    pub fn credit_cost(&self) -> u64 {
        let steps = self.steps.len().max(1) as u64;
        match self.mode {
            RunMode::Run => steps * 2,
            RunMode::Test => steps,
        }
    }
}

/// Newest-first list of recent executions, capped so stored flows do not grow
/// without bound.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionHistory {
    cap: usize,
    records: Vec<ExecutionRecord>,
}

impl ExecutionHistory {
    pub const DEFAULT_CAP: usize = 50;

    pub fn new() -> Self {
        Self::with_cap(Self::DEFAULT_CAP)
    }

    /// A history that retains at most `cap` records.
    pub fn with_cap(cap: usize) -> Self {
        Self {
            cap,
            records: Vec::new(),
        }
    }

    /// Insert a record at the front, dropping the oldest beyond the cap.
    pub fn push(&mut self, record: ExecutionRecord) {
        self.records.insert(0, record);
        self.records.truncate(self.cap);
    }

    pub fn records(&self) -> &[ExecutionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for ExecutionHistory {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn to_iso(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn now_iso() -> String {
    to_iso(Utc::now())
}
