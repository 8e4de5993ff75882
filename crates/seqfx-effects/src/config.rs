//! Engine configuration.
//!
//! Loaded from YAML; every key is optional.
//!
//! ```yaml
//! threads: 8            # 0 = use the global rayon pool
//! slice_rows: 64        # rows per slice for per-pixel effects
//! blur_slice_rows: 32   # rows per slice inside each blur pass
//! adjustment_max_depth: 32
//! ```
//!
//! ```rust
//! use seqfx_effects::EngineConfig;
//!
//! let cfg = EngineConfig::from_yaml_str("threads: 2\nslice_rows: 16\n").unwrap();
//! assert_eq!(cfg.threads, 2);
//! assert_eq!(cfg.blur_slice_rows, 32);
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors while loading an [`EngineConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Reading the file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// YAML did not parse or did not match the schema.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// A value is out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tuning knobs of the compositing engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Worker threads; 0 runs on the global rayon pool.
    pub threads: usize,
    /// Rows per slice for row-decomposable effects.
    pub slice_rows: usize,
    /// Rows per slice inside each pass of two-pass effects.
    pub blur_slice_rows: usize,
    /// Upper bound of the adjustment strip's parent walk.
    pub adjustment_max_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            threads: 0,
            slice_rows: 64,
            blur_slice_rows: 32,
            adjustment_max_depth: 32,
        }
    }
}

impl EngineConfig {
    /// Parses and validates YAML.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let cfg: EngineConfig = serde_yaml::from_str(yaml)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reads, parses and validates a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&text)
    }

    /// Serializes to YAML.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Rejects zero slice sizes and a zero walk bound.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.slice_rows == 0 {
            return Err(ConfigError::Invalid("slice_rows must be >= 1".into()));
        }
        if self.blur_slice_rows == 0 {
            return Err(ConfigError::Invalid("blur_slice_rows must be >= 1".into()));
        }
        if self.adjustment_max_depth == 0 {
            return Err(ConfigError::Invalid("adjustment_max_depth must be >= 1".into()));
        }
        Ok(())
    }
}
