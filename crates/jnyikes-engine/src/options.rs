//! Engine options
//!
//! Loaded from TOML. Every key is optional:
//!
//! ```toml
//! worker_thread_name = "jnyikes-main"
//! describe_exceptions = true
//! max_depth = 64
//! interface_version = 0x00010002
//! ```

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading options
#[derive(Debug, Error)]
pub enum OptionsError {
    /// Failed to read the options file
    #[error("Failed to read options: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse options: {0}")]
    Parse(#[from] toml::de::Error),

    /// Validation error
    #[error("Invalid options: {0}")]
    Invalid(String),
}

/// Runtime interface version reported from the load hook (1.2)
pub const DEFAULT_INTERFACE_VERSION: i32 = 0x0001_0002;

/// Default name of the guarded worker thread
pub const DEFAULT_WORKER_THREAD_NAME: &str = "jnyikes-main";

/// Default object-to-bag nesting limit
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Engine configuration
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct EngineOptions {
    /// OS thread name and runtime attach name of the worker
    pub worker_thread_name: String,

    /// Print pending runtime exceptions before clearing them
    pub describe_exceptions: bool,

    /// Maximum nesting depth when converting objects to bags
    pub max_depth: usize,

    /// Version returned from [`Host::on_load`](crate::Host::on_load)
    pub interface_version: i32,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            worker_thread_name: DEFAULT_WORKER_THREAD_NAME.to_string(),
            describe_exceptions: true,
            max_depth: DEFAULT_MAX_DEPTH,
            interface_version: DEFAULT_INTERFACE_VERSION,
        }
    }
}

impl EngineOptions {
    /// Parse options from a file
    pub fn from_file(path: &Path) -> Result<Self, OptionsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse options from a string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, OptionsError> {
        let options: EngineOptions = toml::from_str(content)?;
        options.validate()?;
        Ok(options)
    }

    /// Validate the options
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.worker_thread_name.is_empty() {
            return Err(OptionsError::Invalid(
                "worker_thread_name must not be empty".to_string(),
            ));
        }
        if self.worker_thread_name.contains('\0') {
            return Err(OptionsError::Invalid(
                "worker_thread_name must not contain NUL".to_string(),
            ));
        }
        if self.max_depth == 0 {
            return Err(OptionsError::Invalid(
                "max_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
