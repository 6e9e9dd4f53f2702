//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types from the flujo crate.
//! Import this module to get access to the core functionality without having
//! to import each type individually.
//!
//! # Example
//!
//! ```rust,no_run
//! use flujo::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! // Load the editor's flow JSON and convert it
//! let json = std::fs::read_to_string("path/to/flow.json")?;
//! let ui_flow = UiFlow::from_json(&json)?;
//!
//! let node_configs = ui_flow.node_configs.clone();
//! let template_config = ui_flow.template_config.clone();
//!
//! // Build the engine and execute
//! let mut engine = Engine::builder(ui_flow.into_flow()?)
//!     .with_node_configs(node_configs)
//!     .with_template_config(template_config)
//!     .build();
//! let record = engine.run();
//!
//! println!("{}", TraceFormatter::format_record(&record));
//! # Ok(())
//! # }
//! ```

// Engine and configuration
pub use crate::config::ConfigResolver;
pub use crate::engine::{Engine, EngineBuilder, STEP_BUDGET};

// Flow model
pub use crate::flow::{FlowDefinition, FlowEdgeDefinition, FlowNodeDefinition, IntoFlow};
pub use crate::graph::{FlowGraph, FlowNode, NodeKind};
pub use crate::ui::{UiEdge, UiFlow, UiNode};

// Run-scoped state
pub use crate::context::Context;
pub use crate::rng::SeededRng;

// Capability slots
pub use crate::capability::{CallRequest, CallVariable, Capabilities, MockCapabilities};

// Results and trace
pub use crate::trace::{
    ExecutionHistory, ExecutionRecord, ExecutionStep, RunMode, RunStatus, StepStatus,
    TraceFormatter,
};

// Error types
pub use crate::error::{ArchiveError, CapabilityError, FlowConversionError};

// Map type used for node configuration tables
pub use ahash::AHashMap;

// Result type alias for convenience; the error type defaults to a boxed
// dynamic error but stays overridable so explicit signatures still read
// naturally under a glob import.
pub type Result<T, E = Box<dyn std::error::Error>> = std::result::Result<T, E>;
