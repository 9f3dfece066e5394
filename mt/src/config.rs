//! Session configuration
//!
//! Read from `mt.cfg` (TOML). Environment variables override file values:
//!
//! | variable                 | field                 |
//! |--------------------------|-----------------------|
//! | `MT_SHOW_ENV`            | `show_env`            |
//! | `MT_MAX_RECURSION_DEPTH` | `max_recursion_depth` |
//! | `MT_EXTENSION_DIR`       | `extension_dir`       |

use crate::error::{CompileError, Result};
use crate::interp::DEFAULT_MAX_RECURSION_DEPTH;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "mt.cfg";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Print the effective configuration when the REPL starts
    pub show_env: bool,
    pub max_recursion_depth: usize,
    /// Directory scanned for `.moe` package markers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension_dir: Option<PathBuf>,
    /// Packages loaded in addition to the discovered ones
    pub extensions: Vec<String>,
    /// Keep REPL history across runs
    pub history: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            show_env: false,
            max_recursion_depth: DEFAULT_MAX_RECURSION_DEPTH,
            extension_dir: None,
            extensions: Vec::new(),
            history: true,
        }
    }
}

fn parse_flag(var: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "yes" | "true" | "1" | "on" => Ok(true),
        "no" | "false" | "0" | "off" => Ok(false),
        other => Err(CompileError::config_error(format!(
            "{var}: expected yes or no, got {other:?}"
        ))),
    }
}

impl Config {
    pub fn from_toml(src: &str) -> Result<Config> {
        toml::from_str(src).map_err(|e| CompileError::config_error(e.to_string()))
    }

    /// Load `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Config> {
        match fs::read_to_string(path) {
            Ok(content) => {
                tracing::debug!(path = %path.display(), "loaded config");
                Self::from_toml(&content).map_err(|e| {
                    CompileError::config_error(format!("{}: {}", path.display(), e.message()))
                })
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Config::default()),
            Err(e) => Err(CompileError::io_error(format!(
                "failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    /// Apply `MT_*` overrides from a variable listing
    pub fn apply_env<I, K, V>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let (key, value) = (key.as_ref(), value.as_ref());
            match key {
                "MT_SHOW_ENV" => self.show_env = parse_flag(key, value)?,
                "MT_MAX_RECURSION_DEPTH" => {
                    self.max_recursion_depth = value.trim().parse().map_err(|_| {
                        CompileError::config_error(format!(
                            "{key}: expected a non-negative integer, got {value:?}"
                        ))
                    })?;
                }
                "MT_EXTENSION_DIR" => self.extension_dir = Some(PathBuf::from(value)),
                _ => continue,
            }
            tracing::debug!(key, value, "config override from environment");
        }
        Ok(())
    }

    /// File (or `mt.cfg` when `path` is None) plus process environment
    pub fn resolve(path: Option<&Path>) -> Result<Config> {
        let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        let mut config = Self::load(path)?;
        config.apply_env(std::env::vars())?;
        Ok(config)
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = toml::to_string_pretty(self).map_err(|_| fmt::Error)?;
        f.write_str(text.trim_end())
    }
}
