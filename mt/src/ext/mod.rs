//! Extension packages
//!
//! Packages add built-ins to a [`RegistryBuilder`] before it is frozen.
//! A package is enabled by dropping a `<name>.moe` marker file into the
//! extension directory, or by naming it in the configuration.

mod packages;

pub use packages::{Complex, Trig};

use crate::error::{CompileError, Result};
use crate::interp::{EvalResult, RegistryBuilder};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Marker file suffix
pub const EXTENSION_SUFFIX: &str = ".moe";

/// A package of built-in functions
pub trait Extension: Sync {
    fn name(&self) -> &'static str;

    /// Register every built-in of the package
    fn register(&self, registry: &mut RegistryBuilder) -> EvalResult<()>;
}

static CATALOG: &[&dyn Extension] = &[&Trig, &Complex];

/// Every compiled-in package
pub fn catalog() -> &'static [&'static dyn Extension] {
    CATALOG
}

pub fn find(name: &str) -> Option<&'static dyn Extension> {
    catalog().iter().copied().find(|ext| ext.name() == name)
}

/// Package names marked in `dir`, sorted. Hidden files and anything
/// without the `.moe` suffix are ignored; subdirectories are not searched.
pub fn discover(dir: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(dir).map_err(|e| {
        CompileError::io_error(format!("cannot read extension directory {}: {e}", dir.display()))
    })?;

    let mut names = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if file_name.starts_with('.') {
            continue;
        }
        if let Some(stem) = file_name.strip_suffix(EXTENSION_SUFFIX) {
            if !stem.is_empty() {
                names.push(stem.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}

/// Load the packages discovered in `dir` followed by `requested`, each at
/// most once. Returns the names actually loaded, in load order.
pub fn load_all(
    dir: Option<&Path>,
    requested: &[String],
    registry: &mut RegistryBuilder,
) -> Result<Vec<String>> {
    let mut wanted = match dir {
        Some(dir) => discover(dir)?,
        None => Vec::new(),
    };
    wanted.extend(requested.iter().cloned());

    let mut seen = HashSet::new();
    let mut loaded = Vec::new();
    for name in wanted {
        if !seen.insert(name.clone()) {
            continue;
        }
        let Some(ext) = find(&name) else {
            let available: Vec<_> = catalog().iter().map(|ext| ext.name()).collect();
            tracing::warn!(package = %name, ?available, "unknown extension package, skipping");
            continue;
        };
        ext.register(registry)
            .map_err(|e| CompileError::extension_error(&name, e))?;
        tracing::info!(package = %name, "loaded extension package");
        loaded.push(name);
    }
    Ok(loaded)
}
