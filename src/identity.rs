//! Concept Identity Registry
//!
//! Maps ESCO concept URIs to internal Tabiya ids for the lifetime of one
//! transformation run. URIs compare case-insensitively after trimming.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TabiyaError};

/// Internal identifier minted by the registry (`key_<n>`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConceptId(String);

impl ConceptId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ConceptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// URI → id mapping plus the id counter, scoped to one run
#[derive(Debug, Default)]
pub struct ConceptRegistry {
    ids: HashMap<String, ConceptId>,
    next: u64,
}

fn normalize(uri: &str) -> String {
    uri.trim().to_lowercase()
}

impl ConceptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint an id for `uri`. Registering the same URI twice is fatal.
    pub fn register(&mut self, uri: &str) -> Result<ConceptId> {
        let key = normalize(uri);
        if self.ids.contains_key(&key) {
            return Err(TabiyaError::DuplicateConcept(key));
        }
        self.next += 1;
        let id = ConceptId(format!("key_{}", self.next));
        self.ids.insert(key, id.clone());
        Ok(id)
    }

    /// Look up the id minted for `uri`, if any
    pub fn resolve(&self, uri: &str) -> Option<&ConceptId> {
        self.ids.get(&normalize(uri))
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.resolve(uri).is_some()
    }

    /// Forget every mapping and restart the counter
    pub fn reset(&mut self) {
        self.ids.clear();
        self.next = 0;
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
