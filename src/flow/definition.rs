/// The complete, canonical definition of an automation flow, ready for execution.
/// This is the target structure for any custom data model conversion.
#[derive(Debug, Clone, Default)]
pub struct FlowDefinition {
    pub nodes: Vec<FlowNodeDefinition>,
    pub edges: Vec<FlowEdgeDefinition>,
}

/// Defines a single step of the automation flow.
///
/// `kind` is the free-text category the editor assigns (for example
/// "Google Sheets" or "voice agent"); it is normalized at graph build time.
/// The label doubles as a behavioral hint for loop and error-branch nodes,
/// so it is carried verbatim.
#[derive(Debug, Clone)]
pub struct FlowNodeDefinition {
    pub id: String,
    pub label: Option<String>,
    pub kind: Option<String>,
}

/// Defines a directed connection between two nodes, optionally tagged with a
/// branch label such as "true", "false", "loop" or "done".
#[derive(Debug, Clone)]
pub struct FlowEdgeDefinition {
    pub from: String,
    pub to: String,
    pub label: Option<String>,
}
