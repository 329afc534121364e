//! Concrete objectives for quasi-Newton optimization.
//!
//! This crate provides the classic smooth test problems used to exercise
//! the optimizer, and logistic regression fitted by maximum likelihood.

pub mod logistic;
pub mod test_functions;

// Re-export main models for convenience
pub use logistic::{
    default_fit_config, fit_logistic, fit_logistic_with_config, simulate_logistic,
    LogisticFit, LogisticRegression,
};
pub use test_functions::{Booth, ExtendedRosenbrock, QuadraticForm, Rosenbrock};
