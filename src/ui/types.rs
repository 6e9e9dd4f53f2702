use ahash::AHashMap;
use serde::Deserialize;

use crate::error::FlowConversionError;
use crate::flow::{FlowDefinition, FlowEdgeDefinition, FlowNodeDefinition, IntoFlow};

/// A node as serialized by the flow editor. The editor stores the dispatch
/// category under the short field `sub`.
#[derive(Debug, Deserialize, Clone)]
pub struct UiNode {
    pub id: String,
    pub label: Option<String>,
    #[serde(alias = "sub")]
    pub kind: Option<String>,
}

/// A directed editor connection with an optional branch label.
#[derive(Debug, Deserialize, Clone)]
pub struct UiEdge {
    pub from: String,
    pub to: String,
    pub label: Option<String>,
}

/// Complete editor flow payload: the graph plus both configuration tiers.
#[derive(Debug, Deserialize)]
pub struct UiFlow {
    pub nodes: Vec<UiNode>,
    pub edges: Vec<UiEdge>,
    #[serde(default)]
    pub node_configs: AHashMap<String, serde_json::Value>,
    #[serde(default)]
    pub template_config: serde_json::Value,
}

impl UiFlow {
    /// Parse an editor flow from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, FlowConversionError> {
        serde_json::from_str(json).map_err(|e| FlowConversionError::JsonParseError(e.to_string()))
    }
}

impl IntoFlow for UiFlow {
    fn into_flow(self) -> Result<FlowDefinition, FlowConversionError> {
        let nodes = self
            .nodes
            .into_iter()
            .map(|node| FlowNodeDefinition {
                id: node.id,
                label: node.label,
                kind: node.kind,
            })
            .collect();

        let edges = self
            .edges
            .into_iter()
            .map(|edge| FlowEdgeDefinition {
                from: edge.from,
                to: edge.to,
                label: edge.label,
            })
            .collect();

        Ok(FlowDefinition { nodes, edges })
    }
}
