//! Error types for the prism-spectral library.

use thiserror::Error;

/// Result type alias for spectral operations.
pub type Result<T> = std::result::Result<T, SpectralError>;

/// Broad category of a [`SpectralError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input array or series is unusable (empty, too short, non-finite, ...).
    InvalidInput,
    /// No valid odd tap count could be formed for the FIR design.
    FilterDesign,
    /// Every spectral bin was removed by the period/span masks.
    EmptySpectrum,
    /// The configuration failed validation.
    InvalidConfig,
}

/// Errors that can occur during spectral analysis.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpectralError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// A NaN or infinite sample was found.
    #[error("non-finite value at index {index}")]
    NonFinite { index: usize },

    /// Input has the wrong shape or domain.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Timestamp-related error.
    #[error("timestamp error: {0}")]
    TimestampError(String),

    /// Invalid configuration value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The low-pass filter could not be designed.
    #[error("filter design error: {0}")]
    FilterDesign(String),

    /// No spectral bins survived masking.
    #[error("empty spectrum: {0}")]
    EmptySpectrum(String),
}

impl SpectralError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SpectralError::EmptyData
            | SpectralError::InsufficientData { .. }
            | SpectralError::NonFinite { .. }
            | SpectralError::InvalidInput(_)
            | SpectralError::DimensionMismatch { .. }
            | SpectralError::TimestampError(_) => ErrorKind::InvalidInput,
            SpectralError::InvalidParameter(_) => ErrorKind::InvalidConfig,
            SpectralError::FilterDesign(_) => ErrorKind::FilterDesign,
            SpectralError::EmptySpectrum(_) => ErrorKind::EmptySpectrum,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_descriptive() {
        let err = SpectralError::EmptyData;
        assert_eq!(err.to_string(), "empty input data");

        let err = SpectralError::InsufficientData { needed: 4, got: 3 };
        assert_eq!(err.to_string(), "insufficient data: need at least 4, got 3");

        let err = SpectralError::NonFinite { index: 7 };
        assert_eq!(err.to_string(), "non-finite value at index 7");

        let err = SpectralError::FilterDesign("requested 1 taps".to_string());
        assert_eq!(err.to_string(), "filter design error: requested 1 taps");

        let err = SpectralError::EmptySpectrum("no bins with period <= 2".to_string());
        assert_eq!(err.to_string(), "empty spectrum: no bins with period <= 2");
    }

    #[test]
    fn kinds_group_variants() {
        assert_eq!(SpectralError::EmptyData.kind(), ErrorKind::InvalidInput);
        assert_eq!(
            SpectralError::InsufficientData { needed: 2, got: 1 }.kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            SpectralError::NonFinite { index: 0 }.kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            SpectralError::FilterDesign(String::new()).kind(),
            ErrorKind::FilterDesign
        );
        assert_eq!(
            SpectralError::EmptySpectrum(String::new()).kind(),
            ErrorKind::EmptySpectrum
        );
        assert_eq!(
            SpectralError::InvalidParameter(String::new()).kind(),
            ErrorKind::InvalidConfig
        );
    }

    #[test]
    fn errors_are_clonable_and_comparable() {
        let err1 = SpectralError::EmptyData;
        let err2 = err1.clone();
        assert_eq!(err1, err2);
    }
}
