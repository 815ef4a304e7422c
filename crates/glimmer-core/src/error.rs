//! Error types for Glimmer

use thiserror::Error;

/// The main error type for Glimmer operations
#[derive(Debug, Error)]
pub enum GlimmerError {
    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Value out of range: {field} must be between {min} and {max}, got {value}")]
    ValueOutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("TOML serialization error: {0}")]
    TomlSerError(String),

    #[error("JSON error: {0}")]
    JsonError(String),

    #[error("Sampling error: {0}")]
    SamplingError(String),

    #[error("Sample count mismatch: expected {expected}, got {got}")]
    SampleCountMismatch { expected: usize, got: usize },

    #[error("Invalid landmarks: expected {expected} points, got {got}")]
    InvalidLandmarks { expected: usize, got: usize },

    #[error("Detection error: {0}")]
    DetectionError(String),

    #[error("Model error: {0}")]
    ModelError(String),

    #[error("Capture error: {0}")]
    CaptureError(String),

    #[error("Runtime error: {0}")]
    RuntimeError(String),
}

/// Result type alias for Glimmer operations
pub type Result<T> = std::result::Result<T, GlimmerError>;

impl From<toml::de::Error> for GlimmerError {
    fn from(err: toml::de::Error) -> Self {
        GlimmerError::TomlParseError(err.to_string())
    }
}

impl From<toml::ser::Error> for GlimmerError {
    fn from(err: toml::ser::Error) -> Self {
        GlimmerError::TomlSerError(err.to_string())
    }
}

impl From<serde_json::Error> for GlimmerError {
    fn from(err: serde_json::Error) -> Self {
        GlimmerError::JsonError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_errors_convert() {
        let err: GlimmerError = toml::from_str::<toml::Value>("= broken")
            .unwrap_err()
            .into();
        assert!(matches!(err, GlimmerError::TomlParseError(_)));
    }

    #[test]
    fn display_includes_counts() {
        let err = GlimmerError::InvalidLandmarks {
            expected: 21,
            got: 5,
        };
        assert_eq!(err.to_string(), "Invalid landmarks: expected 21 points, got 5");
    }
}
