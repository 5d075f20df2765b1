use thiserror::Error;

/// Failures of the forecasting engine. All of them are deterministic
/// functions of the input: retrying with the same data fails the same way.
#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("Malformed history: {reason}")]
    MalformedHistory { reason: String },

    #[error("Insufficient data: need at least {required} draws, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("Invalid model: {reason}")]
    InvalidModel { reason: String },

    #[error("Malformed matrix: {reason}")]
    MalformedMatrix { reason: String },

    #[error("Score undefined: {reason}")]
    ScoreUndefined { reason: String },

    #[error("Invalid numbers detected (must be {min}-{max}): {numbers:?}")]
    InvalidNumbers { numbers: Vec<u32>, min: u32, max: u32 },
}

pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
    pub(crate) fn malformed_history(reason: impl Into<String>) -> Self {
        EngineError::MalformedHistory { reason: reason.into() }
    }

    pub(crate) fn invalid_model(reason: impl Into<String>) -> Self {
        EngineError::InvalidModel { reason: reason.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EngineError::InsufficientData { required: 6, actual: 5 };
        assert_eq!(err.to_string(), "Insufficient data: need at least 6 draws, got 5");

        let err = EngineError::malformed_history("draw 1 has length 4, expected 5");
        assert!(err.to_string().contains("Malformed history"));
    }
}
