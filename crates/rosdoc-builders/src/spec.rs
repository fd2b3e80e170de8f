//! Per-builder parameter mappings.

use serde_yaml::{Mapping, Value};

/// Output directory used when a spec does not name one.
pub const DEFAULT_OUTPUT_DIR: &str = ".";

/// The parameters for one builder: a YAML mapping whose `builder` key names
/// the backend. Every other key is backend-specific.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
#[serde(transparent)]
pub struct BuilderSpec(Mapping);

impl BuilderSpec {
    /// Key naming the backend.
    pub const BUILDER_KEY: &'static str = "builder";

    /// Key naming the output subdirectory.
    pub const OUTPUT_DIR_KEY: &'static str = "output_dir";

    /// A spec with only the `builder` key set.
    pub fn new(builder: &str) -> Self {
        Self::default().with(Self::BUILDER_KEY, builder)
    }

    /// Wrap a mapping loaded from configuration.
    pub fn from_mapping(mapping: Mapping) -> Self {
        Self(mapping)
    }

    /// The underlying mapping.
    pub fn mapping(&self) -> &Mapping {
        &self.0
    }

    /// Backend name, when `builder` is a string.
    pub fn builder(&self) -> Option<&str> {
        self.get_str(Self::BUILDER_KEY)
    }

    /// Output subdirectory relative to the documentation root.
    pub fn output_dir(&self) -> &str {
        self.get_str(Self::OUTPUT_DIR_KEY)
            .unwrap_or(DEFAULT_OUTPUT_DIR)
    }

    /// Whether the builder writes straight into the documentation root.
    pub fn targets_root(&self) -> bool {
        matches!(self.output_dir().trim_end_matches('/'), "." | "")
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Boolean value. Accepts YAML booleans and the strings
    /// `yes`/`no`/`true`/`false` in any case.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => match s.to_ascii_lowercase().as_str() {
                "yes" | "true" => Some(true),
                "no" | "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        match self.get(key)? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// A list of words. A YAML sequence yields its scalar items; a string is
    /// split on whitespace.
    pub fn get_words(&self, key: &str) -> Vec<String> {
        match self.get(key) {
            Some(Value::Sequence(items)) => items.iter().filter_map(scalar_string).collect(),
            Some(Value::String(s)) => s.split_whitespace().map(str::to_string).collect(),
            Some(other) => scalar_string(other).into_iter().collect(),
            None => Vec::new(),
        }
    }

    /// Set a key, replacing any previous value.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(Value::from(key), value.into());
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Entries rendered as display strings, in mapping order.
    pub fn display_entries(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .map(|(k, v)| {
                let key = scalar_string(k).unwrap_or_else(|| render_value(k));
                (key, scalar_string(v).unwrap_or_else(|| render_value(v)))
            })
            .collect()
    }
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn render_value(value: &Value) -> String {
    serde_yaml::to_string(value)
        .map(|s| s.trim_end().to_string())
        .unwrap_or_default()
}
