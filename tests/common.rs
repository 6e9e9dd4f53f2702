//! Common test utilities for building flow definitions.
use flujo::prelude::*;

/// Creates a node definition; empty label or kind strings become `None`.
#[allow(dead_code)]
pub fn node(id: &str, label: &str, kind: &str) -> FlowNodeDefinition {
    FlowNodeDefinition {
        id: id.to_string(),
        label: (!label.is_empty()).then(|| label.to_string()),
        kind: (!kind.is_empty()).then(|| kind.to_string()),
    }
}

/// Creates an unlabeled edge.
#[allow(dead_code)]
pub fn edge(from: &str, to: &str) -> FlowEdgeDefinition {
    FlowEdgeDefinition {
        from: from.to_string(),
        to: to.to_string(),
        label: None,
    }
}

/// Creates an edge with a branch label.
#[allow(dead_code)]
pub fn labeled_edge(from: &str, to: &str, label: &str) -> FlowEdgeDefinition {
    FlowEdgeDefinition {
        from: from.to_string(),
        to: to.to_string(),
        label: Some(label.to_string()),
    }
}

/// A minimal linear flow: start -> sheet fetch -> output.
///
/// With no configuration, the sheet node produces the three built-in
/// placeholder contacts; the output node has no `response` config and no
/// prior call to fall back on.
#[allow(dead_code)]
pub fn sheets_flow() -> FlowDefinition {
    FlowDefinition {
        nodes: vec![
            node("start", "Start", "scheduled task"),
            node("get_rows", "Fetch rows", "google sheets"),
            node("end", "Finish", "output"),
        ],
        edges: vec![edge("start", "get_rows"), edge("get_rows", "end")],
    }
}

/// A loop flow over configured items:
/// start -> loop -(loop)-> step -> loop, loop -(done)-> end.
#[allow(dead_code)]
pub fn loop_flow() -> FlowDefinition {
    FlowDefinition {
        nodes: vec![
            node("start", "Start", "scheduled task"),
            node("iterate", "Loop items", "logic"),
            node("work", "Do work", ""),
            node("end", "Finish", "output"),
        ],
        edges: vec![
            edge("start", "iterate"),
            labeled_edge("iterate", "work", "loop"),
            edge("work", "iterate"),
            labeled_edge("iterate", "end", "done"),
        ],
    }
}

/// A cyclic flow with no terminal node: start -> a -> b -> a -> ...
#[allow(dead_code)]
pub fn cyclic_flow() -> FlowDefinition {
    FlowDefinition {
        nodes: vec![
            node("start", "Start", "scheduled task"),
            node("a", "First hop", ""),
            node("b", "Second hop", ""),
        ],
        edges: vec![edge("start", "a"), edge("a", "b"), edge("b", "a")],
    }
}

/// A conditional gate flow: start -> gate -(true)-> caught, -(false)-> end.
#[allow(dead_code)]
pub fn gate_flow(gate_label: &str) -> FlowDefinition {
    FlowDefinition {
        nodes: vec![
            node("start", "Start", "scheduled task"),
            node("gate", gate_label, "conditional"),
            node("caught", "Caught", ""),
            node("end", "Finish", "output"),
        ],
        edges: vec![
            edge("start", "gate"),
            labeled_edge("gate", "caught", "true"),
            labeled_edge("gate", "end", "false"),
        ],
    }
}
