//! The run loop: a strict sequential queue consumer over the flow graph.
//!
//! One run owns its context, loop cursors and step log outright, so
//! concurrent runs never share mutable state. There are no suspension points;
//! every handler completes synchronously.

use std::collections::VecDeque;

use ahash::AHashMap;
use chrono::Utc;
use serde_json::{Value, json};
use tracing::{debug, trace};
use uuid::Uuid;

use crate::capability::{Capabilities, MockCapabilities};
use crate::config::ConfigResolver;
use crate::context::Context;
use crate::error::CapabilityError;
use crate::flow::FlowDefinition;
use crate::graph::{FlowGraph, FlowNode};
use crate::rng::SeededRng;
use crate::trace::record::{
    self, ExecutionRecord, ExecutionStep, RunMode, RunStatus, StepStatus,
};

mod dispatch;

/// Hard budget on node visits per run. Cyclic graphs terminate here instead
/// of looping forever.
pub const STEP_BUDGET: usize = 200;

/// Iteration cursor for one loop node, created lazily on its first visit and
/// kept for the lifetime of the run.
pub(crate) struct LoopCursor {
    pub(crate) idx: usize,
    pub(crate) items: Vec<Value>,
}

/// Everything owned by a single run.
pub(crate) struct RunState {
    pub(crate) queue: VecDeque<String>,
    pub(crate) start_id: String,
    pub(crate) ctx: Context,
    pub(crate) rng: SeededRng,
    pub(crate) loop_cursors: AHashMap<String, LoopCursor>,
    pub(crate) steps: Vec<ExecutionStep>,
}

impl RunState {
    pub(crate) fn log(
        &mut self,
        node: &FlowNode,
        status: StepStatus,
        message: impl Into<String>,
        data: Option<Value>,
    ) {
        self.steps.push(ExecutionStep {
            ts: record::now_iso(),
            node_id: node.id.clone(),
            label: node.display_label().to_string(),
            kind: node.kind_key.clone(),
            status,
            message: message.into(),
            data,
        });
    }
}

fn synthetic_step(tag: &str, message: String) -> ExecutionStep {
    ExecutionStep {
        ts: record::now_iso(),
        node_id: tag.to_string(),
        label: tag.to_string(),
        kind: tag.to_string(),
        status: StepStatus::Error,
        message,
        data: None,
    }
}

/// Walks an automation graph and produces a deterministic, auditable
/// execution trace.
///
/// An engine is built once per flow and can run it repeatedly; every call to
/// [`Engine::run`] starts from a fresh context and queue.
pub struct Engine {
    graph: FlowGraph,
    configs: ConfigResolver,
    mode: RunMode,
    seed: Option<u64>,
    capabilities: Box<dyn Capabilities>,
}

impl Engine {
    /// Start building an engine for a flow definition.
    pub fn builder(flow: FlowDefinition) -> EngineBuilder {
        EngineBuilder::new(flow)
    }

    /// Execute the flow once and return the complete record. This never
    /// panics or escapes with an error: faults are folded into the record.
    pub fn run(&mut self) -> ExecutionRecord {
        let started = Utc::now();
        let exec_id = Uuid::new_v4().to_string();

        let Some(start_id) = self.graph.start_node().map(|n| n.id.clone()) else {
            debug!("flow has no nodes, nothing to execute");
            let finished = Utc::now();
            return ExecutionRecord {
                id: exec_id,
                mode: self.mode,
                status: RunStatus::Error,
                started_at: record::to_iso(started),
                finished_at: record::to_iso(finished),
                duration_ms: (finished - started).num_milliseconds(),
                steps: vec![synthetic_step("(none)", "Flow has no nodes".to_string())],
                output: None,
            };
        };

        let seed = self.seed.unwrap_or(started.timestamp_millis() as u64);
        debug!(start = %start_id, seed, "starting flow run");

        let mut run = RunState {
            queue: VecDeque::from([start_id.clone()]),
            start_id,
            ctx: Context::new(),
            rng: SeededRng::new(seed),
            loop_cursors: AHashMap::new(),
            steps: Vec::new(),
        };

        let (status, output) = match self.drive(&mut run) {
            Ok(Some(output)) => (RunStatus::Ok, Some(output)),
            Ok(None) => (
                RunStatus::Ok,
                Some(json!({ "ok": true, "note": "Reached end of queue" })),
            ),
            Err(fault) => {
                run.steps.push(synthetic_step("(engine)", fault.to_string()));
                (RunStatus::Error, None)
            }
        };

        let finished = Utc::now();
        debug!(steps = run.steps.len(), "flow run finished");
        ExecutionRecord {
            id: exec_id,
            mode: self.mode,
            status,
            started_at: record::to_iso(started),
            finished_at: record::to_iso(finished),
            duration_ms: (finished - started).num_milliseconds(),
            steps: run.steps,
            output,
        }
    }

    fn drive(&mut self, run: &mut RunState) -> Result<Option<Value>, CapabilityError> {
        let mut visits = 0;
        while visits < STEP_BUDGET {
            let Some(node_id) = run.queue.pop_front() else {
                break;
            };
            visits += 1;

            // Dangling edges enqueue ids with no node; skip them silently.
            let Some(node) = self.graph.node(&node_id) else {
                continue;
            };
            let node = node.clone();
            trace!(node = %node.id, kind = %node.kind_key, "visiting node");

            // The entry node fans out to every outgoing edge, however it is
            // reached.
            if node.id == run.start_id {
                run.log(&node, StepStatus::Ok, "Trigger received", None);
                for edge in self.graph.outgoing(&node.id) {
                    run.queue.push_back(edge.to.clone());
                }
                continue;
            }

            let config = self.configs.resolve(&node.id);
            if let Some(output) = self.dispatch(run, &node, &config)? {
                return Ok(Some(output));
            }
        }
        Ok(None)
    }
}

/// Configures and assembles an [`Engine`].
pub struct EngineBuilder {
    flow: FlowDefinition,
    node_configs: AHashMap<String, Value>,
    template_config: Value,
    mode: RunMode,
    seed: Option<u64>,
    capabilities: Box<dyn Capabilities>,
}

impl EngineBuilder {
    pub fn new(flow: FlowDefinition) -> Self {
        Self {
            flow,
            node_configs: AHashMap::new(),
            template_config: Value::Null,
            mode: RunMode::Test,
            seed: None,
            capabilities: Box::new(MockCapabilities),
        }
    }

    /// Per-node configuration objects keyed by node id.
    pub fn with_node_configs(mut self, configs: AHashMap<String, Value>) -> Self {
        self.node_configs = configs;
        self
    }

    /// Legacy template block consulted when a node has no explicit entry.
    pub fn with_template_config(mut self, template: Value) -> Self {
        self.template_config = template;
        self
    }

    pub fn with_mode(mut self, mode: RunMode) -> Self {
        self.mode = mode;
        self
    }

    /// Fix the seed for chance-based branches. Defaults to the run's start
    /// timestamp in milliseconds when unset.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Install side-effecting capability implementations in place of the
    /// no-op defaults.
    pub fn with_capabilities(mut self, capabilities: Box<dyn Capabilities>) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn build(self) -> Engine {
        Engine {
            graph: FlowGraph::new(&self.flow),
            configs: ConfigResolver::new(self.node_configs, self.template_config),
            mode: self.mode,
            seed: self.seed,
            capabilities: self.capabilities,
        }
    }
}
