//! Tests for the run loop: start resolution, dispatch, branching, loop
//! iteration, the step budget and fault capture.
mod common;
use common::*;
use flujo::prelude::*;
use serde_json::json;

#[test]
fn test_empty_flow_short_circuits() {
    let mut engine = Engine::builder(FlowDefinition::default()).build();
    let record = engine.run();

    assert_eq!(record.status, RunStatus::Error);
    assert_eq!(record.steps.len(), 1);
    assert_eq!(record.steps[0].node_id, "(none)");
    assert_eq!(record.steps[0].status, StepStatus::Error);
    assert_eq!(record.steps[0].message, "Flow has no nodes");
    assert!(record.output.is_none());
}

#[test]
fn test_sheets_default_rows_and_output_fallback() {
    let mut engine = Engine::builder(sheets_flow()).build();
    let record = engine.run();

    assert_eq!(record.status, RunStatus::Ok);
    let messages: Vec<&str> = record.steps.iter().map(|s| s.message.as_str()).collect();
    assert_eq!(
        messages,
        vec!["Trigger received", "Fetched 3 rows (mock)", "Flow finished"]
    );

    // the built-in placeholder contacts surface in the fetch step payload
    let preview = record.steps[1]
        .data
        .as_ref()
        .and_then(|d| d.get("rows_preview"))
        .and_then(|p| p.as_array())
        .expect("fetch step carries a preview");
    assert_eq!(preview.len(), 3);
    assert_eq!(preview[0], json!({ "name": "Ada", "phone": "+17545550101" }));

    // no response config and no call: the output falls back to the marker
    assert_eq!(record.output, Some(json!({ "ok": true })));
}

#[test]
fn test_sheets_mock_rows_config() {
    let mut configs = AHashMap::new();
    configs.insert(
        "get_rows".to_string(),
        json!({ "mock_rows": [{ "name": "Zoe", "phone": "+15550009999" }] }),
    );
    let mut engine = Engine::builder(sheets_flow())
        .with_node_configs(configs)
        .build();
    let record = engine.run();

    assert_eq!(record.steps[1].message, "Fetched 1 rows (mock)");
}

#[test]
fn test_loop_iterates_configured_items() {
    let mut configs = AHashMap::new();
    configs.insert("iterate".to_string(), json!({ "items": [1, 2, 3] }));
    let mut engine = Engine::builder(loop_flow())
        .with_node_configs(configs)
        .build();
    let record = engine.run();

    assert_eq!(record.status, RunStatus::Ok);
    let messages: Vec<&str> = record.steps.iter().map(|s| s.message.as_str()).collect();
    assert_eq!(
        messages,
        vec![
            "Trigger received",
            "Loop initialized (3 items)",
            "Loop item 1/3",
            "Executed",
            "Loop item 2/3",
            "Executed",
            "Loop item 3/3",
            "Executed",
            "Loop done",
            "Flow finished",
        ]
    );
}

#[test]
fn test_loop_fallback_items() {
    // no rows in context, no configured items: the loop runs 1, 2, 3
    let mut engine = Engine::builder(loop_flow()).build();
    let record = engine.run();

    let item_steps: Vec<&ExecutionStep> = record
        .steps
        .iter()
        .filter(|s| s.message.starts_with("Loop item"))
        .collect();
    assert_eq!(item_steps.len(), 3);
    assert_eq!(item_steps[0].data, Some(json!({ "item": 1 })));
    assert_eq!(item_steps[2].data, Some(json!({ "item": 3 })));
}

#[test]
fn test_parse_contact_phone_formatting() {
    let flow = FlowDefinition {
        nodes: vec![
            node("start", "Start", "scheduled task"),
            node("iterate", "Loop contacts", "logic"),
            node("parse", "parse_contact", "code"),
            node("end", "Finish", "output"),
        ],
        edges: vec![
            edge("start", "iterate"),
            labeled_edge("iterate", "parse", "loop"),
            edge("parse", "iterate"),
            labeled_edge("iterate", "end", "done"),
        ],
    };
    let mut configs = AHashMap::new();
    configs.insert(
        "iterate".to_string(),
        json!({ "items": [{ "name": "Ada", "phone": "+1 (754) 555-0101" }] }),
    );
    let mut engine = Engine::builder(flow).with_node_configs(configs).build();
    let record = engine.run();

    let parsed = record
        .steps
        .iter()
        .find(|s| s.message == "Parsed contact")
        .and_then(|s| s.data.clone())
        .expect("contact step carries the parsed payload");
    assert_eq!(parsed["formatPhone"], json!("+17545550101"));
    assert_eq!(parsed["phone"], json!("+1 (754) 555-0101"));
    assert_eq!(parsed["name"], json!("Ada"));
}

#[test]
fn test_parse_contact_alternate_keys() {
    let flow = FlowDefinition {
        nodes: vec![
            node("start", "Start", "scheduled task"),
            node("iterate", "Loop contacts", "logic"),
            node("parse", "parse_contact", "code"),
            node("end", "Finish", "output"),
        ],
        edges: vec![
            edge("start", "iterate"),
            labeled_edge("iterate", "parse", "loop"),
            edge("parse", "iterate"),
            labeled_edge("iterate", "end", "done"),
        ],
    };
    let mut configs = AHashMap::new();
    configs.insert(
        "iterate".to_string(),
        json!({ "items": [{ "Name": "Bruno", "telefono": "754-555-0102" }] }),
    );
    let mut engine = Engine::builder(flow).with_node_configs(configs).build();
    let record = engine.run();

    let parsed = record
        .steps
        .iter()
        .find(|s| s.message == "Parsed contact")
        .and_then(|s| s.data.clone())
        .expect("contact step carries the parsed payload");
    assert_eq!(parsed["formatPhone"], json!("7545550102"));
    assert_eq!(parsed["name"], json!("Bruno"));
}

#[test]
fn test_call_interpolates_context() {
    let flow = FlowDefinition {
        nodes: vec![
            node("start", "Start", "scheduled task"),
            node("iterate", "Loop contacts", "logic"),
            node("parse", "parse_contact", "code"),
            node("call", "Call contact", "voice agent"),
            node("end", "Finish", "output"),
        ],
        edges: vec![
            edge("start", "iterate"),
            labeled_edge("iterate", "parse", "loop"),
            edge("parse", "call"),
            edge("call", "iterate"),
            labeled_edge("iterate", "end", "done"),
        ],
    };
    let mut configs = AHashMap::new();
    configs.insert(
        "iterate".to_string(),
        json!({ "items": [{ "name": "Cami", "phone": "+1 754 555 0103" }] }),
    );
    configs.insert(
        "call".to_string(),
        json!({
            "from_number": "+15550000001",
            "to_number": "{{parse_contact.formatPhone}}",
            "agent_id": "agent-7",
            "variables": [{ "key": "name", "value": "{{parse_contact.name}}" }],
        }),
    );
    let mut engine = Engine::builder(flow).with_node_configs(configs).build();
    let record = engine.run();

    let call = record
        .steps
        .iter()
        .find(|s| s.message.starts_with("Outbound call"))
        .expect("call step logged");
    assert_eq!(call.message, "Outbound call (mock) to +17545550103");
    let data = call.data.as_ref().expect("call step carries the request");
    assert_eq!(data["from"], json!("+15550000001"));
    assert_eq!(data["agent_id"], json!("agent-7"));
    assert_eq!(data["variables"][0]["value"], json!("Cami"));

    // the terminal output falls back to the last call
    assert_eq!(record.output.as_ref().map(|o| &o["to"]), Some(&json!("+17545550103")));
}

#[test]
fn test_call_placeholders_without_config() {
    let flow = FlowDefinition {
        nodes: vec![
            node("start", "Start", "scheduled task"),
            node("ring", "Call", "voice agent"),
            node("end", "Finish", "output"),
        ],
        edges: vec![edge("start", "ring"), edge("ring", "end")],
    };
    let mut engine = Engine::builder(flow).build();
    let record = engine.run();

    let output = record.output.expect("call output recorded");
    assert_eq!(output["from"], json!("(from)"));
    assert_eq!(output["to"], json!("(to)"));
    assert_eq!(output["agent_id"], json!("(agent)"));
    assert_eq!(output["variables"], json!([]));
}

#[test]
fn test_wait_seconds_resolution() {
    let flow = FlowDefinition {
        nodes: vec![
            node("start", "Start", "scheduled task"),
            node("wait", "Pause", "time"),
            node("end", "Finish", "output"),
        ],
        edges: vec![edge("start", "wait"), edge("wait", "end")],
    };

    // no config defaults to one second
    let mut engine = Engine::builder(flow.clone()).build();
    let record = engine.run();
    assert_eq!(record.steps[1].message, "Wait 1s (mock)");

    // time_in_seconds wins over seconds; non-numeric values coerce to 1
    let mut configs = AHashMap::new();
    configs.insert("wait".to_string(), json!({ "time_in_seconds": 30, "seconds": 5 }));
    let mut engine = Engine::builder(flow.clone()).with_node_configs(configs).build();
    assert_eq!(engine.run().steps[1].message, "Wait 30s (mock)");

    let mut configs = AHashMap::new();
    configs.insert("wait".to_string(), json!({ "seconds": "abc" }));
    let mut engine = Engine::builder(flow).with_node_configs(configs).build();
    assert_eq!(engine.run().steps[1].message, "Wait 1s (mock)");
}

#[test]
fn test_plain_conditional_always_false() {
    let mut engine = Engine::builder(gate_flow("quality check conditional")).build();
    let record = engine.run();

    let branch = record
        .steps
        .iter()
        .find(|s| s.message.starts_with("Branch"))
        .expect("gate step logged");
    assert_eq!(branch.message, "Branch FALSE");
    // the false edge leads straight to the output node
    assert_eq!(record.steps.last().map(|s| s.message.as_str()), Some("Flow finished"));
}

#[test]
fn test_error_gate_with_certain_rate() {
    let mut configs = AHashMap::new();
    configs.insert("gate".to_string(), json!({ "error_rate": 1 }));
    let mut engine = Engine::builder(gate_flow("if_error"))
        .with_node_configs(configs)
        .build();
    let record = engine.run();

    let branch = record
        .steps
        .iter()
        .find(|s| s.message.starts_with("Branch"))
        .expect("gate step logged");
    assert_eq!(branch.message, "Branch TRUE");
}

#[test]
fn test_error_gate_seeded_reproducibility() {
    let run_with_seed = |seed: u64| {
        let mut configs = AHashMap::new();
        configs.insert("gate".to_string(), json!({ "error_rate": 0.5 }));
        let mut engine = Engine::builder(gate_flow("if_error"))
            .with_node_configs(configs)
            .with_seed(seed)
            .build();
        let record = engine.run();
        record
            .steps
            .iter()
            .find(|s| s.message.starts_with("Branch"))
            .map(|s| s.message.clone())
            .expect("gate step logged")
    };

    // identical seeds decide identically, every time
    for seed in [7u64, 99, 1234567, 987654321] {
        assert_eq!(run_with_seed(seed), run_with_seed(seed));
    }
}

#[test]
fn test_cyclic_flow_stops_at_budget() {
    let mut engine = Engine::builder(cyclic_flow()).build();
    let record = engine.run();

    assert_eq!(record.status, RunStatus::Ok);
    assert_eq!(record.steps.len(), STEP_BUDGET);
    assert_eq!(
        record.output,
        Some(json!({ "ok": true, "note": "Reached end of queue" }))
    );
}

#[test]
fn test_start_fans_out_to_all_edges() {
    let flow = FlowDefinition {
        nodes: vec![
            node("start", "Start", "scheduled task"),
            node("left", "Left branch", ""),
            node("right", "Right branch", ""),
        ],
        edges: vec![edge("start", "left"), edge("start", "right")],
    };
    let mut engine = Engine::builder(flow).build();
    let record = engine.run();

    let visited: Vec<&str> = record.steps.iter().map(|s| s.node_id.as_str()).collect();
    assert_eq!(visited, vec!["start", "left", "right"]);
}

#[test]
fn test_dangling_edges_are_skipped() {
    let flow = FlowDefinition {
        nodes: vec![node("start", "Start", "scheduled task"), node("a", "A", "")],
        edges: vec![edge("start", "ghost"), edge("start", "a")],
    };
    let mut engine = Engine::builder(flow).build();
    let record = engine.run();

    // the ghost target is skipped silently; the trace is just shorter
    assert_eq!(record.status, RunStatus::Ok);
    let visited: Vec<&str> = record.steps.iter().map(|s| s.node_id.as_str()).collect();
    assert_eq!(visited, vec!["start", "a"]);
}

#[test]
fn test_output_response_config_wins() {
    let mut configs = AHashMap::new();
    configs.insert("end".to_string(), json!({ "response": { "sent": 3 } }));
    let mut engine = Engine::builder(sheets_flow())
        .with_node_configs(configs)
        .build();
    let record = engine.run();

    assert_eq!(record.output, Some(json!({ "sent": 3 })));
    // queued work after the output node is abandoned
    assert_eq!(record.steps.last().map(|s| s.message.as_str()), Some("Flow finished"));
}

#[test]
fn test_capability_fault_is_captured() {
    struct FailingCalls;
    impl Capabilities for FailingCalls {
        fn place_call(&mut self, _request: &CallRequest) -> Result<(), CapabilityError> {
            Err(CapabilityError::CallDispatch("trunk unavailable".to_string()))
        }
    }

    let flow = FlowDefinition {
        nodes: vec![
            node("start", "Start", "scheduled task"),
            node("ring", "Call", "voice agent"),
            node("end", "Finish", "output"),
        ],
        edges: vec![edge("start", "ring"), edge("ring", "end")],
    };
    let mut engine = Engine::builder(flow)
        .with_capabilities(Box::new(FailingCalls))
        .build();
    let record = engine.run();

    assert_eq!(record.status, RunStatus::Error);
    assert!(record.output.is_none());
    // earlier steps survive, the fault is appended as a synthetic entry
    assert_eq!(record.steps[0].message, "Trigger received");
    let last = record.steps.last().expect("fault step appended");
    assert_eq!(last.node_id, "(engine)");
    assert_eq!(last.status, StepStatus::Error);
    assert!(last.message.contains("trunk unavailable"));
}

#[test]
fn test_capability_rows_override() {
    struct LiveRows;
    impl Capabilities for LiveRows {
        fn fetch_rows(
            &mut self,
            _node_id: &str,
            _config: &serde_json::Value,
        ) -> Result<Option<Vec<serde_json::Value>>, CapabilityError> {
            Ok(Some(vec![json!({ "name": "Uma", "phone": "+15557770001" })]))
        }
    }

    let mut engine = Engine::builder(sheets_flow())
        .with_capabilities(Box::new(LiveRows))
        .build();
    let record = engine.run();

    assert_eq!(record.steps[1].message, "Fetched 1 rows (mock)");
}

#[test]
fn test_mode_only_reaches_the_envelope() {
    let mut test_engine = Engine::builder(sheets_flow()).with_seed(5).build();
    let mut run_engine = Engine::builder(sheets_flow())
        .with_mode(RunMode::Run)
        .with_seed(5)
        .build();

    let test_record = test_engine.run();
    let run_record = run_engine.run();

    assert_eq!(test_record.mode, RunMode::Test);
    assert_eq!(run_record.mode, RunMode::Run);
    // dispatch is identical either way
    let test_messages: Vec<&str> = test_record.steps.iter().map(|s| s.message.as_str()).collect();
    let run_messages: Vec<&str> = run_record.steps.iter().map(|s| s.message.as_str()).collect();
    assert_eq!(test_messages, run_messages);
}

#[test]
fn test_steps_within_budget_for_small_flows() {
    let mut engine = Engine::builder(loop_flow()).build();
    let record = engine.run();
    assert!(!record.steps.is_empty());
    assert!(record.steps.len() <= STEP_BUDGET);
}
