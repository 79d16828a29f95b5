//! Per-machine configuration.
//!
//! Configuration is plain data: it can be written in code with the
//! builder-style setters or loaded from JSON, where every field is optional
//! and falls back to its default.
//!
//! ```rust
//! use scenestate::config::MachineConfig;
//! use scenestate::machine::StateRef;
//!
//! let config = MachineConfig::from_json(r#"{ "default_state": { "name": "Idle" }, "verbose": false }"#).unwrap();
//!
//! assert_eq!(config.default_state, Some(StateRef::Name("Idle".into())));
//! assert!(!config.verbose);
//! assert!(!config.allow_reentry);
//! assert!(config.return_to_default_on_disable);
//! ```

pub mod error;

pub use error::ConfigError;

use crate::machine::StateRef;
use serde::{Deserialize, Serialize};

/// Options recognised by a [`StateMachine`](crate::machine::StateMachine).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// State entered on start and restored on disable
    pub default_state: Option<StateRef>,

    /// Whether a transition into the already active state is carried out
    pub allow_reentry: bool,

    /// Whether disabling the container forces a return to the default state
    pub return_to_default_on_disable: bool,

    /// Whether transitions and rejections are logged
    pub verbose: bool,

    /// Maximum number of transitions kept in the machine's history
    pub history_capacity: usize,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            default_state: None,
            allow_reentry: false,
            return_to_default_on_disable: true,
            verbose: true,
            history_capacity: 64,
        }
    }
}

impl MachineConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Render the configuration as pretty JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(ConfigError::Render)
    }

    pub fn with_default_state(mut self, state: impl Into<StateRef>) -> Self {
        self.default_state = Some(state.into());
        self
    }

    pub fn allow_reentry(mut self, allow: bool) -> Self {
        self.allow_reentry = allow;
        self
    }

    pub fn return_to_default_on_disable(mut self, enabled: bool) -> Self {
        self.return_to_default_on_disable = enabled;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }
}
