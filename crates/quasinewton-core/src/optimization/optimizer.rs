//! Optimizer trait, result record and termination reasons.
//!
//! An optimizer works in place on a caller-owned padded point. Problems
//! detected before the first evaluation (empty point, dimension mismatch,
//! bad configuration) come back as `Err(OptimizerError)`. Everything that
//! happens after that, including numerical failure, is reported through
//! [`OptimizationResult::termination_reason`] with the point left at the
//! last accepted iterate.

use crate::compute::cpu::simd::SimdOps;
use crate::core::objective::Objective;
use crate::error::OptimizerResult;
use crate::types::Scalar;
use crate::view::VectorViewMut;
use std::fmt::{self, Debug};
use std::time::Duration;

/// Why an optimization run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TerminationReason {
    /// The starting point already satisfied the gradient test.
    Success,
    /// Gradient norm fell to the tolerance: ‖∇f(x)‖ ≤ ε_g
    ConvergedByGradient,
    /// Relative decrease over the past window fell below δ.
    ConvergedByDelta,
    /// The line search could not find an acceptable step.
    LineSearchFailed,
    /// The search direction did not decrease the objective.
    NotADescentDirection,
    /// Iteration budget exhausted.
    IterationLimitReached,
    /// Evaluation budget exhausted.
    EvaluationLimitReached,
    /// The objective produced NaN or infinity.
    NonFiniteValue,
    /// The problem or configuration was rejected before evaluation.
    InvalidInput,
}

impl TerminationReason {
    /// True for the three convergence codes.
    pub fn is_converged(&self) -> bool {
        matches!(
            self,
            Self::Success | Self::ConvergedByGradient | Self::ConvergedByDelta
        )
    }

    /// True for codes that signal a numerical or input failure.
    ///
    /// Budget exhaustion is neither converged nor a failure.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::LineSearchFailed
                | Self::NotADescentDirection
                | Self::NonFiniteValue
                | Self::InvalidInput
        )
    }
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::Success => "initial point is already stationary",
            Self::ConvergedByGradient => "converged: gradient norm below tolerance",
            Self::ConvergedByDelta => "converged: relative decrease below tolerance",
            Self::LineSearchFailed => "line search failed",
            Self::NotADescentDirection => "search direction is not a descent direction",
            Self::IterationLimitReached => "iteration limit reached",
            Self::EvaluationLimitReached => "evaluation limit reached",
            Self::NonFiniteValue => "objective returned a non-finite value",
            Self::InvalidInput => "invalid input",
        };
        f.write_str(msg)
    }
}

/// Outcome of an optimization run.
///
/// The final point lives in the caller's buffer; this record carries
/// everything else.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationResult<T> {
    /// Objective value at the returned point.
    pub value: T,

    /// Euclidean norm of the gradient at the returned point.
    pub gradient_norm: T,

    /// Number of accepted iterations.
    pub iterations: usize,

    /// Total objective evaluations, line search trials included.
    pub function_evaluations: usize,

    /// Why the run stopped.
    pub termination_reason: TerminationReason,

    /// Shorthand for `termination_reason.is_converged()`.
    pub converged: bool,

    /// Wall-clock time of the run.
    pub duration: Duration,
}

impl<T: Scalar> OptimizationResult<T> {
    /// Creates a new optimization result.
    pub fn new(
        value: T,
        iterations: usize,
        duration: Duration,
        termination_reason: TerminationReason,
    ) -> Self {
        Self {
            value,
            gradient_norm: T::nan(),
            iterations,
            function_evaluations: 0,
            termination_reason,
            converged: termination_reason.is_converged(),
            duration,
        }
    }

    /// Sets the gradient norm at the returned point.
    pub fn with_gradient_norm(mut self, norm: T) -> Self {
        self.gradient_norm = norm;
        self
    }

    /// Sets the function evaluation count.
    pub fn with_function_evaluations(mut self, count: usize) -> Self {
        self.function_evaluations = count;
        self
    }
}

/// Interface for unconstrained minimizers.
pub trait Optimizer<T: SimdOps>: Debug {
    /// Human-readable algorithm name, used in logs.
    fn name(&self) -> &str;

    /// Minimizes `objective` starting from `x`, overwriting `x` with the
    /// final point.
    ///
    /// # Errors
    ///
    /// Returns an error, without evaluating the objective, if `x` is empty,
    /// if the objective declares a different dimension, or if the optimizer
    /// configuration is invalid.
    fn optimize<O>(
        &self,
        objective: &O,
        x: &mut VectorViewMut<'_, T>,
    ) -> OptimizerResult<OptimizationResult<T>>
    where
        O: Objective<T> + ?Sized;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convergence_classification() {
        assert!(TerminationReason::Success.is_converged());
        assert!(TerminationReason::ConvergedByGradient.is_converged());
        assert!(TerminationReason::ConvergedByDelta.is_converged());
        assert!(!TerminationReason::IterationLimitReached.is_converged());

        assert!(TerminationReason::LineSearchFailed.is_failure());
        assert!(TerminationReason::NotADescentDirection.is_failure());
        assert!(!TerminationReason::EvaluationLimitReached.is_failure());
        assert!(!TerminationReason::ConvergedByDelta.is_failure());
    }

    #[test]
    fn test_result_builder() {
        let result = OptimizationResult::new(
            0.5f64,
            12,
            Duration::from_millis(3),
            TerminationReason::ConvergedByGradient,
        )
        .with_gradient_norm(1e-7)
        .with_function_evaluations(15);

        assert!(result.converged);
        assert_eq!(result.iterations, 12);
        assert_eq!(result.function_evaluations, 15);
        assert_eq!(result.gradient_norm, 1e-7);
    }

    #[test]
    fn test_limit_result_is_not_converged() {
        let result = OptimizationResult::new(
            1.0f32,
            100,
            Duration::ZERO,
            TerminationReason::IterationLimitReached,
        );
        assert!(!result.converged);
        assert!(result.gradient_norm.is_nan());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            TerminationReason::LineSearchFailed.to_string(),
            "line search failed"
        );
    }
}
