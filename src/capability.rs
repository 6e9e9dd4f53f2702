use serde::Serialize;
use serde_json::Value;

use crate::error::CapabilityError;

/// One resolved `{key, value}` pair passed to an outbound call.
#[derive(Debug, Clone, Serialize)]
pub struct CallVariable {
    pub key: Value,
    pub value: String,
}

/// Fully resolved parameters of an outbound call, ready for a telephony
/// backend. Templating has already been applied against the run context.
#[derive(Debug, Clone, Serialize)]
pub struct CallRequest {
    pub from: String,
    pub to: String,
    pub agent_id: String,
    pub variables: Vec<CallVariable>,
}

/// Side-effect slots the caller fills per run.
///
/// Every default method is a no-op, which makes a run with the stock
/// implementation a pure function of its inputs and seed. A deployment wires
/// real integrations here and picks mock or live sets per run mode; the
/// engine itself never branches on the mode.
pub trait Capabilities {
    /// Produce the row collection for a sheet-backed node, or `None` to let
    /// the engine fall back to the node's configured or built-in rows.
    fn fetch_rows(
        &mut self,
        node_id: &str,
        config: &Value,
    ) -> Result<Option<Vec<Value>>, CapabilityError> {
        let _ = (node_id, config);
        Ok(None)
    }

    /// Deliver a fully resolved outbound call.
    fn place_call(&mut self, request: &CallRequest) -> Result<(), CapabilityError> {
        let _ = request;
        Ok(())
    }

    /// Hold the flow for the given number of seconds. The stock
    /// implementation never sleeps; the timer node stays a simulation.
    fn wait(&mut self, seconds: f64) -> Result<(), CapabilityError> {
        let _ = seconds;
        Ok(())
    }
}

/// The no-op capability set used for test executions.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockCapabilities;

impl Capabilities for MockCapabilities {}
