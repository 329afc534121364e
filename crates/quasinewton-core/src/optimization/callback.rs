//! Progress observation for optimization runs.
//!
//! Observers see a report after every accepted iteration. They cannot stop
//! or steer the run.

use crate::optimization::optimizer::OptimizationResult;
use crate::types::Scalar;

/// Snapshot taken after an accepted iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationReport<T> {
    /// Iteration number, starting at 1.
    pub iteration: usize,
    /// Objective value at the new iterate.
    pub value: T,
    /// Gradient norm at the new iterate.
    pub gradient_norm: T,
    /// Step length accepted by the line search.
    pub step_size: T,
    /// Number of correction pairs in the history after the update.
    pub history_len: usize,
    /// Evaluations spent so far.
    pub function_evaluations: usize,
}

/// Trait for optimization observers.
pub trait ProgressObserver<T: Scalar> {
    /// Called at the end of each accepted iteration.
    fn on_iteration(&mut self, report: &IterationReport<T>);

    /// Called once with the final result.
    fn on_finish(&mut self, result: &OptimizationResult<T>) {
        let _ = result;
    }
}

/// An observer that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl<T: Scalar> ProgressObserver<T> for NoOpObserver {
    fn on_iteration(&mut self, _report: &IterationReport<T>) {}
}

/// An observer that keeps every report, for diagnostics and tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver<T> {
    /// Reports in iteration order.
    pub reports: Vec<IterationReport<T>>,
    /// Set once the run finishes.
    pub finished: Option<OptimizationResult<T>>,
}

impl<T: Scalar> RecordingObserver<T> {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self {
            reports: Vec::new(),
            finished: None,
        }
    }

    /// Objective values in iteration order.
    pub fn values(&self) -> Vec<T> {
        self.reports.iter().map(|r| r.value).collect()
    }
}

impl<T: Scalar> ProgressObserver<T> for RecordingObserver<T> {
    fn on_iteration(&mut self, report: &IterationReport<T>) {
        self.reports.push(*report);
    }

    fn on_finish(&mut self, result: &OptimizationResult<T>) {
        self.finished = Some(result.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::optimizer::TerminationReason;
    use std::time::Duration;

    #[test]
    fn test_recording_observer() {
        let mut observer = RecordingObserver::<f64>::new();
        for k in 1..=3 {
            observer.on_iteration(&IterationReport {
                iteration: k,
                value: 1.0 / k as f64,
                gradient_norm: 0.1,
                step_size: 1.0,
                history_len: k,
                function_evaluations: 2 * k,
            });
        }
        observer.on_finish(&OptimizationResult::new(
            0.25,
            3,
            Duration::ZERO,
            TerminationReason::ConvergedByDelta,
        ));

        assert_eq!(observer.values(), vec![1.0, 0.5, 1.0 / 3.0]);
        assert!(observer.finished.as_ref().is_some_and(|r| r.converged));
    }
}
