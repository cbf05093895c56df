//! Optional TOML configuration.

use crate::include::MAX_INCLUDE_DEPTH;
use crate::Error;
use std::path::{Path, PathBuf};

/// Settings for a preprocessing run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Directory that `include-tagged::` targets resolve against.
    pub base_dir: Option<PathBuf>,
    /// Whether to strip common indentation from tagged regions.
    pub dedent: bool,
    /// Deepest include nesting followed.
    pub max_include_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_dir: None,
            dedent: true,
            max_include_depth: MAX_INCLUDE_DEPTH,
        }
    }
}

impl Config {
    /// Read configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            format!(
                "Failed to read config file '{}': {:?}",
                path.display(),
                e
            )
        })?;
        Self::from_toml(&text)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, Error> {
        let value: toml::Value = text
            .parse()
            .map_err(|e| format!("Failed to parse config: {}", e))?;
        let base_dir = match value.get("base-dir") {
            Some(toml::Value::String(s)) => Some(PathBuf::from(s)),
            None => None,
            v => {
                return Err(Error::General(format!(
                    "Unexpected value {:?} for base-dir",
                    v
                )))
            }
        };
        let dedent = match value.get("dedent") {
            Some(toml::Value::Boolean(b)) => *b,
            None => true,
            v => {
                return Err(Error::General(format!(
                    "Unexpected value {:?} for boolean",
                    v
                )))
            }
        };
        let max_include_depth = match value.get("max-include-depth") {
            Some(toml::Value::Integer(n)) if *n >= 0 => *n as usize,
            None => MAX_INCLUDE_DEPTH,
            v => {
                return Err(Error::General(format!(
                    "Unexpected value {:?} for max-include-depth",
                    v
                )))
            }
        };
        Ok(Self {
            base_dir,
            dedent,
            max_include_depth,
        })
    }
}
