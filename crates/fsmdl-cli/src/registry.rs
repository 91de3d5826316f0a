use std::collections::BTreeMap;
use std::fs;
use std::io::BufReader;
use std::path::Path;

use anyhow::{bail, Context, Result};
use fsmdl::{Registry, RegistryEntry};
use serde::Deserialize;

const REGISTRY_VERSION: u32 = 1;

/// On-disk form of the variable registry.
#[derive(Debug, Deserialize)]
struct RegistryFile {
    version: u32,
    /// Variables keyed by identifier (any case, braces optional).
    variables: BTreeMap<String, RegistryEntry>,
}

/// Load the registry from a JSON file.
/// Errors if the file cannot be parsed, or if its version is newer than supported.
pub fn load_registry(path: &Path) -> Result<Registry> {
    let file = fs::File::open(path)
        .with_context(|| format!("failed to read registry: {}", path.display()))?;
    let reg: RegistryFile = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse registry: {}", path.display()))?;
    if reg.version > REGISTRY_VERSION {
        bail!(
            "registry version {} is not supported (this build supports up to version {})",
            reg.version,
            REGISTRY_VERSION
        );
    }
    Ok(reg.variables.into_iter().collect())
}

/// Load the registry if a path was given; otherwise every variable is `custom`.
pub fn load_optional(path: Option<&Path>) -> Result<Registry> {
    match path {
        Some(path) => {
            let registry = load_registry(path)?;
            log::info!("loaded {} variables from {}", registry.len(), path.display());
            Ok(registry)
        }
        None => {
            log::warn!("no registry given; all dictionary variables will be named 'custom'");
            Ok(Registry::new())
        }
    }
}
