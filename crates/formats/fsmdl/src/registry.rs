use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::chunks::dict::VariableType;
use crate::guid;

/// Metadata for a known simulation variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub var_type: VariableType,
    #[serde(default)]
    pub description: String,
}

/// Read-only identifier → metadata lookup consulted while decoding DICT blocks.
pub trait VariableLookup {
    /// `id` is in the canonical form produced by [`guid::format`].
    fn lookup(&self, id: &str) -> Option<&RegistryEntry>;
}

/// In-memory variable registry keyed by normalized identifier.
#[derive(Debug, Default, Clone)]
pub struct Registry {
    entries: HashMap<String, RegistryEntry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: &str, entry: RegistryEntry) -> Option<RegistryEntry> {
        self.entries.insert(guid::normalize(id), entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl VariableLookup for Registry {
    fn lookup(&self, id: &str) -> Option<&RegistryEntry> {
        self.entries.get(&guid::normalize(id))
    }
}

impl<K: AsRef<str>> FromIterator<(K, RegistryEntry)> for Registry {
    fn from_iter<I: IntoIterator<Item = (K, RegistryEntry)>>(iter: I) -> Self {
        let mut registry = Self::new();
        for (id, entry) in iter {
            registry.insert(id.as_ref(), entry);
        }
        registry
    }
}
