//! Configuration loading and validation errors.

/// Errors that can occur while loading or validating router configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("Invalid value for {variable}: {value} ({reason})")]
    InvalidVariable { variable: &'static str, value: String, reason: String },
}
