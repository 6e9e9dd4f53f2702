//! # Flujo - Deterministic Flow Execution Engine
//!
//! **Flujo** walks a user-authored automation graph (nodes plus directed,
//! optionally labeled edges) and produces a complete, auditable execution
//! trace. It is the interpreter behind flow builders: branch selection, loop
//! iteration with per-node cursors, bounded traversal, variable templating
//! across steps, and a sealed result envelope the caller can store or render.
//!
//! ## Core Workflow
//!
//! The engine is format-agnostic. It operates on a canonical [`FlowDefinition`]
//! and the primary workflow is:
//!
//! 1.  **Load Your Data**: Parse your flow format (the bundled [`ui::UiFlow`]
//!     handles the editor's JSON) into your own Rust structs.
//! 2.  **Convert**: Implement the [`flow::IntoFlow`] trait to translate your
//!     structs into a `FlowDefinition`.
//! 3.  **Build**: Use [`engine::Engine::builder`] to attach per-node
//!     configuration, a run mode, a branch seed, and optionally real
//!     side-effecting [`capability::Capabilities`].
//! 4.  **Run**: Call [`engine::Engine::run`] and receive an
//!     [`trace::ExecutionRecord`] - always well-formed, even on failure.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flujo::prelude::*;
//!
//! fn main() {
//!     let flow = FlowDefinition {
//!         nodes: vec![
//!             FlowNodeDefinition {
//!                 id: "start".to_string(),
//!                 label: Some("Start".to_string()),
//!                 kind: Some("scheduled task".to_string()),
//!             },
//!             FlowNodeDefinition {
//!                 id: "get_rows".to_string(),
//!                 label: Some("Fetch contacts".to_string()),
//!                 kind: Some("google sheets".to_string()),
//!             },
//!             FlowNodeDefinition {
//!                 id: "end".to_string(),
//!                 label: Some("Done".to_string()),
//!                 kind: Some("output".to_string()),
//!             },
//!         ],
//!         edges: vec![
//!             FlowEdgeDefinition {
//!                 from: "start".to_string(),
//!                 to: "get_rows".to_string(),
//!                 label: None,
//!             },
//!             FlowEdgeDefinition {
//!                 from: "get_rows".to_string(),
//!                 to: "end".to_string(),
//!                 label: None,
//!             },
//!         ],
//!     };
//!
//!     let mut engine = Engine::builder(flow)
//!         .with_mode(RunMode::Test)
//!         .with_seed(42)
//!         .build();
//!     let record = engine.run();
//!
//!     println!("{}", TraceFormatter::format_record(&record));
//! }
//! ```
//!
//! Malformed graphs are not rejected: dangling edges and unreachable nodes
//! simply shorten the trace, and a cyclic graph stops at the fixed step
//! budget. The caller always gets exactly one record back.

pub mod capability;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod flow;
pub mod graph;
pub mod prelude;
pub mod rng;
pub mod trace;
pub mod ui;
pub mod value;

pub use engine::{Engine, EngineBuilder};
pub use flow::FlowDefinition;
pub use trace::ExecutionRecord;
