//! Run-scoped variable store written by node handlers and read back through
//! `{{ dotted.path }}` templating.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::value;

static TEMPLATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([\w.]+)\s*\}\}").expect("template pattern compiles"));

/// Mutable scratch space scoped to a single run.
///
/// Handlers write arbitrary named values (fetched rows, the current loop item,
/// the last resolved call) and later nodes read them via interpolation. Each
/// run owns its own context; nothing is shared across runs.
#[derive(Debug, Default)]
pub struct Context {
    vars: Map<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a top-level variable, replacing any previous value.
    pub fn set(&mut self, key: &str, value: Value) {
        self.vars.insert(key.to_string(), value);
    }

    /// Read a top-level variable.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.vars.get(key)
    }

    /// Walk a dotted path through nested objects (numeric segments index into
    /// arrays). Missing or null intermediate values resolve to `None`.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let mut current = self.vars.get(parts.next()?)?;
        for part in parts {
            current = descend(current, part)?;
        }
        Some(current)
    }

    /// Replace every `{{ path }}` occurrence in the template with the string
    /// form of the value at that path; unresolvable paths become the empty
    /// string and non-template text passes through unchanged.
    pub fn interpolate(&self, template: &str) -> String {
        TEMPLATE
            .replace_all(template, |caps: &regex::Captures<'_>| {
                match self.get_path(&caps[1]) {
                    Some(v) if !v.is_null() => value::to_display_string(v),
                    _ => String::new(),
                }
            })
            .into_owned()
    }
}

fn descend<'a>(value: &'a Value, part: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(part),
        Value::Array(items) => part.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}
