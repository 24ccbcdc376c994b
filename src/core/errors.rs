//! Crate-wide error types.
//!
//! A single [`PalographError`] enum covers the whole pipeline: image
//! decoding, malformed caller input (ROI strings, label tables), report
//! serialization and model-artifact loading. Data insufficiency (too few
//! strokes for a statistic, fewer than two blocks for the rhythm figure)
//! is *not* an error: estimators return `Option` and the scoring engine
//! maps absence to its "not computed" sentinel classifications.

use thiserror::Error;

/// Errors that can occur while analyzing a test sheet.
#[derive(Debug, Error)]
pub enum PalographError {
    /// The input image could not be decoded.
    #[error("image load")]
    ImageLoad(#[from] image::ImageError),

    /// Caller-supplied input was malformed (ROI string, label row, ...).
    #[error("invalid input: {message}")]
    InvalidInput {
        /// Description of what was wrong with the input.
        message: String,
    },

    /// A configuration value was out of its legal range.
    #[error("configuration: {message}")]
    Config {
        /// Description of the configuration problem.
        message: String,
    },

    /// A trained model artifact could not be loaded or failed validation.
    #[error("model artifact '{path}': {reason}")]
    ModelArtifact {
        /// Path (or description) of the artifact.
        path: String,
        /// Why loading or validation failed.
        reason: String,
    },

    /// JSON (de)serialization failure for reports or artifacts.
    #[error("json")]
    Json(#[from] serde_json::Error),

    /// CSV read/write failure for the tabular interfaces.
    #[error("csv")]
    Csv(#[from] csv::Error),

    /// Underlying IO failure.
    #[error("io")]
    Io(#[from] std::io::Error),
}

impl PalographError {
    /// Creates an invalid-input error from any displayable message.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a configuration error from any displayable message.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a model-artifact error with the offending path and a reason.
    pub fn model_artifact(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ModelArtifact {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_message_is_preserved() {
        let err = PalographError::invalid_input("ROI needs 4 values");
        assert_eq!(err.to_string(), "invalid input: ROI needs 4 values");
    }

    #[test]
    fn model_artifact_error_names_the_path() {
        let err = PalographError::model_artifact("models/ensemble.json", "schema version 7");
        let text = err.to_string();
        assert!(text.contains("models/ensemble.json"));
        assert!(text.contains("schema version 7"));
    }
}
