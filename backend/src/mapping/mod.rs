//! Token → value mapping consumed by the render step.

pub mod resolver;
pub mod tokens;

pub use resolver::{resolve_mapping, PlaceholderIndex};

use serde::{Serialize, Serializer};
use std::collections::HashSet;

/// Token → value table that keeps insertion order and never overwrites a
/// token once it is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
    entries: Vec<(String, String)>,
    tokens: HashSet<String>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `token` unless it is already present. Returns whether it was set.
    pub fn insert_if_absent(&mut self, token: impl Into<String>, value: impl Into<String>) -> bool {
        let token = token.into();
        if self.tokens.contains(&token) {
            return false;
        }
        self.tokens.insert(token.clone());
        self.entries.push((token, value.into()));
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(token, value)| (token.as_str(), value.as_str()))
    }
}

impl Serialize for Mapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}
