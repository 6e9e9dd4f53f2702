//! Per-kind node handlers. Each handler performs its (possibly mocked) side
//! effect, writes zero or more context keys, logs exactly one step (two on a
//! loop node's initializing visit), and enqueues the chosen successors.

use serde_json::{Value, json};

use super::{Engine, LoopCursor, RunState};
use crate::capability::{CallRequest, CallVariable};
use crate::error::CapabilityError;
use crate::graph::{FlowNode, NodeKind};
use crate::trace::record::StepStatus;
use crate::value;

/// Stand-in contact rows used when a sheet node has no mock data configured.
fn placeholder_contacts() -> Vec<Value> {
    vec![
        json!({ "name": "Ada", "phone": "+17545550101" }),
        json!({ "name": "Bruno", "phone": "+17545550102" }),
        json!({ "name": "Cami", "phone": "+17545550103" }),
    ]
}

/// First value among `keys` that the editor runtime would consider truthy.
fn first_truthy<'a>(item: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| item.get(key))
        .find(|v| value::is_truthy(v))
}

impl Engine {
    /// Run one node. A returned value is the terminal output; the run stops
    /// immediately, abandoning whatever is still queued.
    pub(super) fn dispatch(
        &mut self,
        run: &mut RunState,
        node: &FlowNode,
        config: &Value,
    ) -> Result<Option<Value>, CapabilityError> {
        match node.kind {
            NodeKind::Sheets => self.run_sheets(run, node, config)?,
            NodeKind::Loop => self.run_loop(run, node, config),
            NodeKind::Code => self.run_code(run, node),
            NodeKind::Call => self.run_call(run, node, config)?,
            NodeKind::Wait => self.run_wait(run, node, config)?,
            NodeKind::Conditional { error_gate } => {
                self.run_conditional(run, node, config, error_gate)
            }
            NodeKind::Output => return Ok(Some(self.run_output(run, node, config))),
            NodeKind::Passthrough => {
                run.log(node, StepStatus::Ok, "Executed", None);
                self.advance(run, &node.id, &[]);
            }
        }
        Ok(None)
    }

    /// Enqueue the target of the preferred edge out of `node_id`, if any.
    fn advance(&self, run: &mut RunState, node_id: &str, preferred: &[&str]) {
        if let Some(edge) = self.graph.next_from(node_id, preferred) {
            run.queue.push_back(edge.to.clone());
        }
    }

    fn run_sheets(
        &mut self,
        run: &mut RunState,
        node: &FlowNode,
        config: &Value,
    ) -> Result<(), CapabilityError> {
        let rows = match self.capabilities.fetch_rows(&node.id, config)? {
            Some(rows) => rows,
            None => match config.get("mock_rows") {
                Some(Value::Array(rows)) => rows.clone(),
                _ => placeholder_contacts(),
            },
        };
        let preview: Vec<Value> = rows.iter().take(3).cloned().collect();
        run.ctx.set("rows", Value::Array(rows.clone()));
        run.log(
            node,
            StepStatus::Ok,
            format!("Fetched {} rows (mock)", rows.len()),
            Some(json!({ "rows_preview": preview })),
        );
        self.advance(run, &node.id, &[]);
        Ok(())
    }

    fn run_loop(&self, run: &mut RunState, node: &FlowNode, config: &Value) {
        let (current, idx, total);
        if let Some(cursor) = run.loop_cursors.get(&node.id) {
            current = cursor.items.get(cursor.idx).cloned();
            idx = cursor.idx;
            total = cursor.items.len();
        } else {
            // First visit: seed the cursor from context rows, configured
            // items, or the built-in fallback.
            let items = match run.ctx.get("rows") {
                Some(Value::Array(rows)) => rows.clone(),
                _ => match config.get("items") {
                    Some(Value::Array(items)) => items.clone(),
                    _ => vec![json!(1), json!(2), json!(3)],
                },
            };
            run.log(
                node,
                StepStatus::Ok,
                format!("Loop initialized ({} items)", items.len()),
                None,
            );
            current = items.first().cloned();
            idx = 0;
            total = items.len();
            run.loop_cursors
                .insert(node.id.clone(), LoopCursor { idx: 0, items });
        }

        if let Some(item) = current {
            run.ctx.set("item", item.clone());
            run.log(
                node,
                StepStatus::Ok,
                format!("Loop item {}/{}", idx + 1, total),
                Some(json!({ "item": item })),
            );
            if let Some(cursor) = run.loop_cursors.get_mut(&node.id) {
                cursor.idx += 1;
            }
            self.advance(run, &node.id, &["loop"]);
        } else {
            run.log(node, StepStatus::Ok, "Loop done", None);
            self.advance(run, &node.id, &["done"]);
        }
    }

    fn run_code(&self, run: &mut RunState, node: &FlowNode) {
        // Only the contact-parsing transform is built in; arbitrary user code
        // is never evaluated.
        if node.display_label().to_lowercase().contains("parse_contact") {
            let item = run.ctx.get("item").cloned().unwrap_or(Value::Null);
            let phone_raw = first_truthy(&item, &["phone", "Phone", "telefono"])
                .map(value::to_display_string)
                .unwrap_or_default();
            let format_phone: String = phone_raw
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '+')
                .collect();
            let name = first_truthy(&item, &["name", "Name"])
                .map(value::to_display_string)
                .unwrap_or_default();
            let parsed = json!({ "name": name, "phone": phone_raw, "formatPhone": format_phone });
            run.ctx.set("parse_contact", parsed.clone());
            run.log(node, StepStatus::Ok, "Parsed contact", Some(parsed));
        } else {
            run.log(node, StepStatus::Ok, "Code executed (mock)", None);
        }
        self.advance(run, &node.id, &[]);
    }

    fn run_call(
        &mut self,
        run: &mut RunState,
        node: &FlowNode,
        config: &Value,
    ) -> Result<(), CapabilityError> {
        let resolve = |field: &str, placeholder: &str| match config.get(field) {
            Some(v) if value::is_truthy(v) => run.ctx.interpolate(&value::to_display_string(v)),
            _ => placeholder.to_string(),
        };
        let from = resolve("from_number", "(from)");
        let to = resolve("to_number", "(to)");
        let agent_id = resolve("agent_id", "(agent)");

        let variables = match config.get("variables") {
            Some(Value::Array(vars)) => vars
                .iter()
                .map(|v| CallVariable {
                    key: v.get("key").cloned().unwrap_or(Value::Null),
                    value: run.ctx.interpolate(&match v.get("value") {
                        Some(val) if value::is_truthy(val) => value::to_display_string(val),
                        _ => String::new(),
                    }),
                })
                .collect(),
            _ => Vec::new(),
        };

        let request = CallRequest {
            from,
            to,
            agent_id,
            variables,
        };
        self.capabilities.place_call(&request)?;

        let call = serde_json::to_value(&request).unwrap_or(Value::Null);
        run.ctx.set("last_call", call.clone());
        run.log(
            node,
            StepStatus::Ok,
            format!("Outbound call (mock) to {}", request.to),
            Some(call),
        );
        self.advance(run, &node.id, &[]);
        Ok(())
    }

    fn run_wait(
        &mut self,
        run: &mut RunState,
        node: &FlowNode,
        config: &Value,
    ) -> Result<(), CapabilityError> {
        let configured = config
            .get("time_in_seconds")
            .filter(|v| value::is_truthy(v))
            .or_else(|| config.get("seconds").filter(|v| value::is_truthy(v)));
        let mut seconds = configured.map(value::to_number).unwrap_or(1.0);
        if !seconds.is_finite() {
            seconds = 1.0;
        }
        self.capabilities.wait(seconds)?;
        run.log(
            node,
            StepStatus::Ok,
            format!("Wait {}s (mock)", value::format_f64(seconds)),
            None,
        );
        self.advance(run, &node.id, &[]);
        Ok(())
    }

    fn run_conditional(
        &self,
        run: &mut RunState,
        node: &FlowNode,
        config: &Value,
        error_gate: bool,
    ) {
        let mut error_rate = config.get("error_rate").map(value::to_number).unwrap_or(0.0);
        if !error_rate.is_finite() {
            error_rate = 0.0;
        }
        // Only error gates consult the generator; plain conditionals always
        // take the false branch.
        let is_error = error_gate && run.rng.next_f64() < error_rate;
        let branch = if is_error { "true" } else { "false" };
        run.log(
            node,
            StepStatus::Ok,
            format!("Branch {}", branch.to_uppercase()),
            None,
        );
        self.advance(run, &node.id, &[branch]);
    }

    fn run_output(&self, run: &mut RunState, node: &FlowNode, config: &Value) -> Value {
        let output = match config.get("response") {
            Some(v) if !v.is_null() => v.clone(),
            _ => run
                .ctx
                .get("last_call")
                .cloned()
                .unwrap_or_else(|| json!({ "ok": true })),
        };
        run.log(node, StepStatus::Ok, "Flow finished", Some(output.clone()));
        output
    }
}
