use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single event's counters, keyed by variable name.
///
/// The set of known fields is data, not schema: operators define new
/// variables at runtime, so this is an open string-keyed map rather than a
/// fixed struct. Consumers read absent fields as zero, but the map itself
/// keeps the missing/zero distinction so the formula engine can tell a
/// zero-defaulted divisor from a real one.
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
#[serde(transparent)]
pub struct StatsRecord {
    fields: BTreeMap<String, f64>,
}

impl StatsRecord {
    pub fn new() -> Self {
        StatsRecord {
            fields: BTreeMap::new(),
        }
    }

    pub fn get(&self, field: &str) -> Option<f64> {
        self.fields.get(field).copied()
    }

    /// The zero-defaulting read used for arithmetic.
    pub fn value_or_zero(&self, field: &str) -> f64 {
        self.get(field).unwrap_or(0.0)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: f64) {
        self.fields.insert(field.into(), value);
    }

    pub fn remove(&mut self, field: &str) -> Option<f64> {
        self.fields.remove(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<BTreeMap<String, f64>> for StatsRecord {
    fn from(fields: BTreeMap<String, f64>) -> Self {
        StatsRecord { fields }
    }
}

impl FromIterator<(String, f64)> for StatsRecord {
    fn from_iter<T: IntoIterator<Item = (String, f64)>>(iter: T) -> Self {
        StatsRecord {
            fields: iter.into_iter().collect(),
        }
    }
}
