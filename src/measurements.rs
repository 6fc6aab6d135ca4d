//! Measurement records
//!
//! An additive collection of named performance metrics. The runner fills
//! one during a benchmarking session and serializes it as the JSON body of
//! a STATS reply; the tester merges that body into its own record.
//!
//! Merge semantics (additive):
//! - numbers add
//! - arrays extend
//! - nested objects merge recursively
//! - anything else is replaced by the incoming value
//!
//! The record is always owned by the orchestration layer and passed by
//! reference into protocol calls; there is no process-wide collector.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

/// Additive record of named performance metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Measurements {
    #[serde(flatten)]
    data: Map<String, Value>,
}

impl Measurements {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of top-level metrics
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if no metrics have been recorded
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Look up a metric by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    /// Merge a single metric additively
    pub fn add(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.data.get_mut(&name) {
            Some(existing) => merge_values(existing, value),
            None => {
                self.data.insert(name, value);
            }
        }
    }

    /// Append one sample to a named series (creating it if absent)
    pub fn add_sample(&mut self, name: impl Into<String>, sample: f64) {
        self.add(name, Value::Array(vec![Value::from(sample)]));
    }

    /// Merge another record into this one
    pub fn merge(&mut self, other: Measurements) {
        for (name, value) in other.data {
            self.add(name, value);
        }
    }

    /// Merge a UTF-8 JSON object (e.g. a STATS reply body) into this record
    pub fn merge_json(&mut self, bytes: &[u8]) -> Result<()> {
        let incoming: Map<String, Value> = serde_json::from_slice(bytes)?;
        for (name, value) in incoming {
            self.add(name, value);
        }
        Ok(())
    }

    /// Serialize the record as a compact JSON object
    pub fn to_json_vec(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&self.data)?)
    }

    /// Serialize the record as human-readable JSON (for report files)
    pub fn to_json_pretty(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(&self.data)?)
    }
}

impl std::ops::AddAssign for Measurements {
    fn add_assign(&mut self, other: Measurements) {
        self.merge(other);
    }
}

/// Additive merge of one metric slot
fn merge_values(slot: &mut Value, incoming: Value) {
    if slot.is_number() && incoming.is_number() {
        if let (Some(x), Some(y)) = (slot.as_i64(), incoming.as_i64()) {
            *slot = Value::from(x + y);
            return;
        }
        if let (Some(x), Some(y)) = (slot.as_f64(), incoming.as_f64()) {
            *slot = Value::from(x + y);
            return;
        }
    }

    match (slot, incoming) {
        (Value::Array(existing), Value::Array(incoming)) => {
            existing.extend(incoming);
        }
        (Value::Object(existing), Value::Object(incoming)) => {
            for (key, value) in incoming {
                match existing.get_mut(&key) {
                    Some(slot) => merge_values(slot, value),
                    None => {
                        existing.insert(key, value);
                    }
                }
            }
        }
        (slot, incoming) => *slot = incoming,
    }
}
