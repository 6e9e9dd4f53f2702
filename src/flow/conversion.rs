use super::definition::FlowDefinition;
use crate::error::FlowConversionError;

/// A trait for custom data models that can be converted into a `FlowDefinition`.
///
/// This is the primary extension point for making the engine format-agnostic.
/// By implementing this trait on your own structs, you provide a translation
/// layer that lets the engine execute flows authored in any external format.
///
/// # Example
///
/// ```rust,no_run
/// use flujo::prelude::*;
/// use flujo::error::FlowConversionError;
///
/// // 1. Define your custom structs for parsing your format.
/// struct MyCustomNode { id: String, category: String }
/// struct MyCustomFlow { nodes: Vec<MyCustomNode> }
///
/// // 2. Implement `IntoFlow` for your top-level struct.
/// impl IntoFlow for MyCustomFlow {
///     fn into_flow(self) -> Result<FlowDefinition, FlowConversionError> {
///         let nodes = self
///             .nodes
///             .into_iter()
///             .map(|node| FlowNodeDefinition {
///                 id: node.id,
///                 label: None,
///                 kind: Some(node.category),
///             })
///             .collect();
///
///         Ok(FlowDefinition {
///             nodes,
///             edges: vec![], // Convert your edges here as well
///         })
///     }
/// }
/// ```
pub trait IntoFlow {
    /// Consumes the object and converts it into an executable flow definition.
    fn into_flow(self) -> Result<FlowDefinition, FlowConversionError>;
}
