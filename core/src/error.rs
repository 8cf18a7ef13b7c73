use thiserror::Error;

/// Rejected probe parameter. Raised while the operator configures a probe,
/// before any target is scanned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown parameter '{0}'")]
    UnknownParam(String),
    #[error("invalid value '{value}' for flag '{param}' (expected enable/disable)")]
    InvalidFlag { param: String, value: String },
}

/// The probe could not render a payload for a target.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("payload needs {needed} bytes but the buffer holds {capacity}")]
    TooLarge { needed: usize, capacity: usize },
}

/// Parse a boolean flag token.
///
/// An empty value is a bare flag and means enable.
pub fn parse_flag(param: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "enable" | "true" | "yes" | "on" | "1" => Ok(true),
        "disable" | "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidFlag { param: param.to_string(), value: value.to_string() }),
    }
}
