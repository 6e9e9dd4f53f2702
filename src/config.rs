use ahash::AHashMap;
use serde_json::{Map, Value};

use crate::value;

/// Two-tier per-node configuration lookup.
///
/// The explicit `node_configs` map wins whenever it holds an entry for the
/// node. Otherwise the legacy template block is consulted, keyed by the
/// conventional node ids older flows used (`time_setup`, `call`, `get_rows`,
/// `wait`) and their loose name patterns. Nodes with no configuration at all
/// resolve to an empty object.
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    node_configs: AHashMap<String, Value>,
    template: Value,
}

impl ConfigResolver {
    pub fn new(node_configs: AHashMap<String, Value>, template: Value) -> Self {
        Self {
            node_configs,
            template,
        }
    }

    /// Resolve the configuration for one node.
    pub fn resolve(&self, node_id: &str) -> Value {
        if let Some(cfg) = self.node_configs.get(node_id) {
            // The editor treats arrays as objects here, so both pass.
            if cfg.is_object() || cfg.is_array() {
                return cfg.clone();
            }
        }

        let id_lower = node_id.to_lowercase();
        let legacy_keys: [(bool, &str); 4] = [
            (node_id == "time_setup", "time_setup"),
            (node_id == "call" || id_lower.contains("call"), "phone_call"),
            (node_id == "get_rows" || id_lower.contains("rows"), "sheets"),
            (node_id == "wait", "wait"),
        ];
        for (id_matches, template_key) in legacy_keys {
            if !id_matches {
                continue;
            }
            if let Some(cfg) = self.template.get(template_key) {
                if value::is_truthy(cfg) {
                    return cfg.clone();
                }
            }
        }

        Value::Object(Map::new())
    }
}
