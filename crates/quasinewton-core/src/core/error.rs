//! Error types for views, line searches and optimizers.
//!
//! Each layer has its own `thiserror` enum. Numerical failures that happen in
//! the middle of a run are not errors at the optimizer level: they end the
//! run with a [`TerminationReason`](crate::optimization::TerminationReason)
//! and the last valid point. Only problems detected before the first
//! evaluation surface as [`OptimizerError`].

use crate::optimization::optimizer::TerminationReason;
use std::fmt;
use thiserror::Error;

/// Errors raised when constructing views over caller storage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinalgError {
    /// The backing slice is shorter than the padded length of the view.
    #[error("Insufficient storage: {required} padded elements required, {available} available")]
    InsufficientStorage {
        /// Padded length needed by the view
        required: usize,
        /// Length of the slice that was supplied
        available: usize,
    },
}

impl LinalgError {
    /// Create an InsufficientStorage error.
    pub fn insufficient_storage(required: usize, available: usize) -> Self {
        Self::InsufficientStorage {
            required,
            available,
        }
    }
}

/// Why a line search gave up on a descent direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LineSearchFailure {
    /// The step shrank below the configured minimum.
    MinimumStep,
    /// The step was clamped to the configured maximum twice.
    MaximumStep,
    /// The trial budget was spent.
    MaximumTrials,
    /// The bracket collapsed to machine precision.
    WidthTooSmall,
}

impl fmt::Display for LineSearchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::MinimumStep => "step size fell below the minimum",
            Self::MaximumStep => "step size exceeded the maximum",
            Self::MaximumTrials => "maximum number of trials reached",
            Self::WidthTooSmall => "bracket width below machine precision",
        };
        f.write_str(msg)
    }
}

/// Errors that can occur during a line search.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LineSearchError {
    /// The direction does not decrease the objective: g·d ≥ 0.
    #[error("Search direction is not a descent direction (g·d = {directional_derivative})")]
    NotADescentDirection {
        /// The offending directional derivative
        directional_derivative: f64,
    },

    /// No acceptable step was found.
    #[error("Line search failed: {reason} after {evaluations} evaluations (last step {last_step_size})")]
    Failed {
        /// What stopped the search
        reason: LineSearchFailure,
        /// Objective evaluations spent
        evaluations: usize,
        /// Last step length tried
        last_step_size: f64,
    },

    /// The objective returned NaN or infinity at a trial point.
    #[error("Objective returned a non-finite value or gradient at step {step_size}")]
    NonFiniteValue {
        /// Objective evaluations spent, including the offending one
        evaluations: usize,
        /// Step length of the offending trial
        step_size: f64,
    },

    /// The search parameters violate their constraints.
    #[error("Invalid line search parameters: {reason}")]
    InvalidParameters {
        /// Description of the violated constraint
        reason: String,
    },
}

impl LineSearchError {
    /// Create a Failed error with detailed context.
    pub fn failed(reason: LineSearchFailure, evaluations: usize, last_step_size: f64) -> Self {
        Self::Failed {
            reason,
            evaluations,
            last_step_size,
        }
    }

    /// Create an InvalidParameters error.
    pub fn invalid_parameters<S: Into<String>>(reason: S) -> Self {
        Self::InvalidParameters {
            reason: reason.into(),
        }
    }

    /// Number of objective evaluations spent before the search stopped.
    pub fn evaluations(&self) -> usize {
        match self {
            Self::Failed { evaluations, .. } | Self::NonFiniteValue { evaluations, .. } => {
                *evaluations
            }
            Self::NotADescentDirection { .. } | Self::InvalidParameters { .. } => 0,
        }
    }

    /// The termination reason an optimizer reports for this failure.
    pub fn termination_reason(&self) -> TerminationReason {
        match self {
            Self::NotADescentDirection { .. } => TerminationReason::NotADescentDirection,
            Self::Failed { .. } => TerminationReason::LineSearchFailed,
            Self::NonFiniteValue { .. } => TerminationReason::NonFiniteValue,
            Self::InvalidParameters { .. } => TerminationReason::LineSearchFailed,
        }
    }
}

/// Errors detected before an optimization run starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptimizerError {
    /// The problem itself is malformed (e.g. zero-length point).
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// Description of the problem
        reason: String,
    },

    /// The objective declares a dimension different from the point's.
    #[error("Objective dimension mismatch: point has {point} entries, objective expects {objective}")]
    DimensionMismatch {
        /// Length of the starting point
        point: usize,
        /// Dimension declared by the objective
        objective: usize,
    },

    /// Invalid optimizer configuration.
    #[error("Invalid optimizer configuration: {reason}")]
    InvalidConfiguration {
        /// Description of the configuration error
        reason: String,
        /// Name of the invalid parameter
        parameter: String,
        /// Value that was invalid
        value: String,
    },
}

impl OptimizerError {
    /// Create an InvalidInput error.
    pub fn invalid_input<S: Into<String>>(reason: S) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Create an InvalidConfiguration error.
    pub fn invalid_configuration<S1, S2, S3>(reason: S1, parameter: S2, value: S3) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        Self::InvalidConfiguration {
            reason: reason.into(),
            parameter: parameter.into(),
            value: value.into(),
        }
    }

    /// Every pre-run error is reported as [`TerminationReason::InvalidInput`].
    pub fn termination_reason(&self) -> TerminationReason {
        TerminationReason::InvalidInput
    }
}

impl From<LineSearchError> for OptimizerError {
    fn from(err: LineSearchError) -> Self {
        match err {
            LineSearchError::InvalidParameters { reason } => {
                Self::invalid_configuration(reason, "line_search", "invalid")
            }
            other => Self::invalid_input(other.to_string()),
        }
    }
}

/// Result type alias for view operations.
pub type LinalgResult<T> = std::result::Result<T, LinalgError>;

/// Result type alias for line search operations.
pub type LineSearchOutcome<T> = std::result::Result<T, LineSearchError>;

/// Result type alias for optimizer operations.
pub type OptimizerResult<T> = std::result::Result<T, OptimizerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linalg_error_creation() {
        let err = LinalgError::insufficient_storage(8, 5);
        assert!(matches!(err, LinalgError::InsufficientStorage { .. }));
        assert_eq!(
            err.to_string(),
            "Insufficient storage: 8 padded elements required, 5 available"
        );
    }

    #[test]
    fn test_line_search_error_context() {
        let err = LineSearchError::failed(LineSearchFailure::MaximumTrials, 64, 1e-8);

        if let LineSearchError::Failed {
            reason,
            evaluations,
            last_step_size,
        } = err.clone()
        {
            assert_eq!(reason, LineSearchFailure::MaximumTrials);
            assert_eq!(evaluations, 64);
            assert_eq!(last_step_size, 1e-8);
        } else {
            panic!("Expected Failed variant");
        }

        assert_eq!(err.evaluations(), 64);
        assert_eq!(err.termination_reason(), TerminationReason::LineSearchFailed);
        assert!(err.to_string().contains("maximum number of trials"));
    }

    #[test]
    fn test_line_search_error_reasons_are_distinct() {
        let descent = LineSearchError::NotADescentDirection {
            directional_derivative: 0.5,
        };
        let failed = LineSearchError::failed(LineSearchFailure::MinimumStep, 3, 1e-21);
        let non_finite = LineSearchError::NonFiniteValue {
            evaluations: 2,
            step_size: 1.0,
        };

        assert_eq!(
            descent.termination_reason(),
            TerminationReason::NotADescentDirection
        );
        assert_eq!(failed.termination_reason(), TerminationReason::LineSearchFailed);
        assert_eq!(non_finite.termination_reason(), TerminationReason::NonFiniteValue);
        assert_eq!(descent.evaluations(), 0);
        assert_eq!(non_finite.evaluations(), 2);
    }

    #[test]
    fn test_optimizer_error_creation() {
        let err = OptimizerError::invalid_configuration("must be positive", "memory_size", "0");
        assert!(matches!(err, OptimizerError::InvalidConfiguration { .. }));
        assert!(err.to_string().contains("Invalid optimizer configuration"));

        let err = OptimizerError::DimensionMismatch {
            point: 3,
            objective: 2,
        };
        assert!(err.to_string().contains("point has 3 entries"));
        assert_eq!(err.termination_reason(), TerminationReason::InvalidInput);
    }

    #[test]
    fn test_rejected_initial_step_counts_as_line_search_failure() {
        let err = LineSearchError::invalid_parameters("initial step must be positive");
        assert_eq!(err.evaluations(), 0);
        assert_eq!(err.termination_reason(), TerminationReason::LineSearchFailed);
    }

    #[test]
    fn test_invalid_line_search_parameters_become_configuration_errors() {
        let err: OptimizerError = LineSearchError::invalid_parameters("c1 out of range").into();
        if let OptimizerError::InvalidConfiguration { reason, parameter, .. } = err {
            assert_eq!(reason, "c1 out of range");
            assert_eq!(parameter, "line_search");
        } else {
            panic!("Expected InvalidConfiguration variant");
        }
    }
}
