//! In-memory fill state: the user's in-progress answers keyed by slot key.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Mapping from slot key to user-entered value.
///
/// Created empty when a fill session opens, mutated on every input change,
/// and discarded when the session closes. Absent keys read as the empty
/// string; no validation or size limits apply here. Exports take a
/// snapshot by cloning.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FillState {
    values: HashMap<String, String>,
}

impl FillState {
    /// Create an empty fill state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the value for a slot key, or `""` when absent.
    pub fn get(&self, key: &str) -> &str {
        self.values.get(key).map(String::as_str).unwrap_or("")
    }

    /// Insert or overwrite the value for a slot key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Remove a single slot value.
    pub fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }

    /// Discard all values.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if no values are stored.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over stored (key, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FillState {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_key_reads_empty() {
        let fill = FillState::new();
        assert_eq!(fill.get("p-b1-Name-0"), "");
        assert!(fill.is_empty());
    }

    #[test]
    fn test_set_overwrites() {
        let mut fill = FillState::new();
        fill.set("p-b1-Name-0", "Alice");
        fill.set("p-b1-Name-0", "Bob");
        assert_eq!(fill.get("p-b1-Name-0"), "Bob");
        assert_eq!(fill.len(), 1);
    }

    #[test]
    fn test_clear_discards_session() {
        let mut fill: FillState = [("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(fill.len(), 2);
        fill.clear();
        assert!(fill.is_empty());
        assert_eq!(fill.get("a"), "");
    }
}
