//! Lookup structures over a flow definition.
//!
//! Construction never fails: dangling edges and unreachable nodes are allowed
//! and simply produce shorter traces at run time. Malformed graphs mean
//! "nothing happens", not "reject outright".

use std::sync::LazyLock;

use ahash::AHashMap;
use itertools::Itertools;
use regex::Regex;

use crate::flow::FlowDefinition;

static START_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bstart\b").expect("start pattern compiles"));

/// Normalizes a free-text node category into its dispatch key: trimmed, each
/// whitespace run collapsed to a single underscore, uppercased.
pub fn kind_key(raw: &str) -> String {
    raw.split_whitespace().join("_").to_uppercase()
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Dispatch category for a node, resolved once at graph build time.
///
/// Loop and conditional constructs are tagged only by their free-text label in
/// the editor, so classification falls back to substring matching on the label
/// where the normalized key alone is not decisive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Sheets,
    Loop,
    Code,
    Call,
    Wait,
    Conditional { error_gate: bool },
    Output,
    Passthrough,
}

impl NodeKind {
    /// Classify a node from its normalized kind key and raw label.
    pub fn classify(key: &str, label: &str) -> Self {
        match key {
            "GOOGLE_SHEETS" => NodeKind::Sheets,
            "LOGIC" if contains_ci(label, "loop") => NodeKind::Loop,
            "CODE" => NodeKind::Code,
            "VOICE_AGENT" | "DAPTA_PHONECALL" => NodeKind::Call,
            "TIME" => NodeKind::Wait,
            "CONDITIONAL" => NodeKind::Conditional {
                error_gate: contains_ci(label, "if_error"),
            },
            "OUTPUT" => NodeKind::Output,
            _ if contains_ci(label, "if_error") => NodeKind::Conditional { error_gate: true },
            _ if contains_ci(label, "conditional") => NodeKind::Conditional { error_gate: false },
            _ => NodeKind::Passthrough,
        }
    }
}

/// A single normalized node of the flow graph.
#[derive(Debug, Clone)]
pub struct FlowNode {
    pub id: String,
    pub label: Option<String>,
    pub kind_key: String,
    pub kind: NodeKind,
}

impl FlowNode {
    /// The label shown in traces; falls back to the id when the editor left
    /// the label empty.
    pub fn display_label(&self) -> &str {
        match self.label.as_deref() {
            Some(label) if !label.is_empty() => label,
            _ => &self.id,
        }
    }

    fn label_text(&self) -> &str {
        self.label.as_deref().unwrap_or("")
    }
}

/// A directed connection out of a node.
#[derive(Debug, Clone)]
pub struct FlowEdge {
    pub from: String,
    pub to: String,
    pub label: Option<String>,
}

impl FlowEdge {
    fn label_key(&self) -> String {
        self.label.as_deref().unwrap_or("").trim().to_lowercase()
    }
}

/// Node and edge lookup structures for one flow.
///
/// Nodes keep their caller-supplied order (it is the final start-node
/// fallback), and each node's outgoing edges keep theirs (index 0 is the
/// default successor).
#[derive(Debug, Clone)]
pub struct FlowGraph {
    nodes: Vec<FlowNode>,
    by_id: AHashMap<String, usize>,
    outgoing: AHashMap<String, Vec<FlowEdge>>,
}

impl FlowGraph {
    /// Build the lookup structures from a definition.
    pub fn new(flow: &FlowDefinition) -> Self {
        let nodes: Vec<FlowNode> = flow
            .nodes
            .iter()
            .map(|def| {
                let key = kind_key(def.kind.as_deref().unwrap_or(""));
                let kind = NodeKind::classify(&key, def.label.as_deref().unwrap_or(""));
                FlowNode {
                    id: def.id.clone(),
                    label: def.label.clone(),
                    kind_key: key,
                    kind,
                }
            })
            .collect();

        // Duplicate ids resolve to the last definition, matching the editor.
        let mut by_id = AHashMap::with_capacity(nodes.len());
        for (index, node) in nodes.iter().enumerate() {
            by_id.insert(node.id.clone(), index);
        }

        let mut outgoing: AHashMap<String, Vec<FlowEdge>> = AHashMap::new();
        for def in &flow.edges {
            outgoing
                .entry(def.from.clone())
                .or_default()
                .push(FlowEdge {
                    from: def.from.clone(),
                    to: def.to.clone(),
                    label: def.label.clone(),
                });
        }

        Self {
            nodes,
            by_id,
            outgoing,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node by id.
    pub fn node(&self, id: &str) -> Option<&FlowNode> {
        self.by_id.get(id).map(|index| &self.nodes[*index])
    }

    /// Outgoing edges of a node, in caller-supplied order.
    pub fn outgoing(&self, id: &str) -> &[FlowEdge] {
        self.outgoing.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Select the next edge out of a node, preferring the given branch labels
    /// in order (case-insensitive, trimmed). Falls back to the first outgoing
    /// edge; `None` means that branch of traversal ends.
    pub fn next_from(&self, id: &str, preferred: &[&str]) -> Option<&FlowEdge> {
        let edges = self.outgoing(id);
        for want in preferred {
            if let Some(edge) = edges.iter().find(|e| e.label_key() == *want) {
                return Some(edge);
            }
        }
        edges.first()
    }

    /// Resolve the run's entry point: the node with id `start`, else the first
    /// node whose label contains the word "start", else the first scheduled
    /// task, else the first node in caller order.
    pub fn start_node(&self) -> Option<&FlowNode> {
        self.nodes
            .iter()
            .find(|n| n.id == "start")
            .or_else(|| {
                self.nodes
                    .iter()
                    .find(|n| START_WORD.is_match(n.label_text()))
            })
            .or_else(|| self.nodes.iter().find(|n| n.kind_key == "SCHEDULED_TASK"))
            .or_else(|| self.nodes.first())
    }
}
