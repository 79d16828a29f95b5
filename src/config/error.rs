//! Configuration error types.

use thiserror::Error;

/// Errors that can occur while loading or rendering a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The input was not a valid machine configuration
    #[error("Invalid machine configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configuration could not be rendered
    #[error("Failed to render machine configuration: {0}")]
    Render(serde_json::Error),
}
