//! Error types for the demand-forecast library.

use thiserror::Error;

/// Result type alias for forecast operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Broad classes of failure callers are expected to react to differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or out-of-range input; fix the call.
    InvalidArgument,
    /// Not enough usable history for the operation; supply more data.
    InsufficientData,
    /// An operation was invoked before the step it depends on.
    PreconditionViolation,
    /// The parametric model could not be fitted.
    ModelFitting,
    /// Reading or writing collaborator data failed.
    Io,
}

/// Reasons a seasonal ARIMA fit can fail.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FitFailure {
    /// Too few observations for the model orders.
    #[error("too few observations for the model orders: need {needed}, got {got}")]
    TooFewObservations { needed: usize, got: usize },

    /// The differenced series carries no information (e.g. a constant input).
    #[error("degenerate series: {0}")]
    Degenerate(String),

    /// Input or intermediate values are NaN/Inf.
    #[error("non-finite values encountered: {0}")]
    NonFinite(String),

    /// The optimiser ran out of iterations before the simplex collapsed.
    #[error("optimizer did not converge after {iterations} iterations")]
    NonConvergence { iterations: usize },
}

/// Errors that can occur during forecasting operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Timestamp-related error.
    #[error("timestamp error: {0}")]
    TimestampError(String),

    /// Missing values make the operation impossible.
    #[error("missing values detected in data")]
    MissingValues,

    /// Frequency inference failed.
    #[error("could not infer frequency: {0}")]
    FrequencyInference(String),

    /// Seasonal replay requested before any decomposition.
    #[error("decomposition required first")]
    DecompositionRequired,

    /// Model has not been fitted yet.
    #[error("model must be fitted before prediction")]
    FitRequired,

    /// The parametric model could not be fitted.
    #[error("model fitting failed")]
    ModelFitting(#[from] FitFailure),

    /// Malformed tabular input.
    #[error("data format error: {0}")]
    DataFormat(String),

    /// Underlying reader/writer failure.
    #[error("i/o error: {0}")]
    Io(String),

    /// Configuration could not be parsed.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ForecastError {
    /// Classify the error into the taxonomy callers branch on.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ForecastError::EmptyData
            | ForecastError::InvalidParameter(_)
            | ForecastError::DimensionMismatch { .. }
            | ForecastError::TimestampError(_)
            | ForecastError::FrequencyInference(_)
            | ForecastError::DataFormat(_)
            | ForecastError::Config(_) => ErrorKind::InvalidArgument,
            ForecastError::InsufficientData { .. } | ForecastError::MissingValues => {
                ErrorKind::InsufficientData
            }
            ForecastError::DecompositionRequired | ForecastError::FitRequired => {
                ErrorKind::PreconditionViolation
            }
            ForecastError::ModelFitting(_) => ErrorKind::ModelFitting,
            ForecastError::Io(_) => ErrorKind::Io,
        }
    }
}

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            ForecastError::Io(err.to_string())
        } else {
            ForecastError::DataFormat(err.to_string())
        }
    }
}

impl From<std::io::Error> for ForecastError {
    fn from(err: std::io::Error) -> Self {
        ForecastError::Io(err.to_string())
    }
}

impl From<toml::de::Error> for ForecastError {
    fn from(err: toml::de::Error) -> Self {
        ForecastError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn error_messages_are_descriptive() {
        let err = ForecastError::InsufficientData { needed: 24, got: 10 };
        assert_eq!(
            err.to_string(),
            "insufficient data: need at least 24, got 10"
        );

        let err = ForecastError::InvalidParameter("window must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "invalid parameter: window must be positive"
        );

        let err = ForecastError::DecompositionRequired;
        assert_eq!(err.to_string(), "decomposition required first");
    }

    #[test]
    fn errors_are_classified() {
        assert_eq!(ForecastError::EmptyData.kind(), ErrorKind::InvalidArgument);
        assert_eq!(
            ForecastError::TimestampError("backwards".into()).kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            ForecastError::InsufficientData { needed: 2, got: 1 }.kind(),
            ErrorKind::InsufficientData
        );
        assert_eq!(
            ForecastError::MissingValues.kind(),
            ErrorKind::InsufficientData
        );
        assert_eq!(
            ForecastError::DecompositionRequired.kind(),
            ErrorKind::PreconditionViolation
        );
        assert_eq!(
            ForecastError::Io("disk full".into()).kind(),
            ErrorKind::Io
        );
    }

    #[test]
    fn model_fitting_keeps_its_cause() {
        let err: ForecastError = FitFailure::NonConvergence { iterations: 50 }.into();
        assert_eq!(err.kind(), ErrorKind::ModelFitting);

        let source = err.source().expect("fit failure is the source");
        assert_eq!(
            source.to_string(),
            "optimizer did not converge after 50 iterations"
        );
    }

    #[test]
    fn errors_are_clonable_and_comparable() {
        let err1 = ForecastError::ModelFitting(FitFailure::Degenerate("constant".into()));
        let err2 = err1.clone();
        assert_eq!(err1, err2);
    }
}
