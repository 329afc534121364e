//! Scalar trait and numerical constants.
//!
//! Every container and algorithm in the workspace is generic over a [`Scalar`]
//! (implemented for `f32` and `f64`). The trait bundles the arithmetic surface
//! from `num-traits` with the handful of constants the optimizer needs as
//! defaults.

use nalgebra::Scalar as NalgebraScalar;
use num_traits::{Float, ToPrimitive};
use std::fmt::{Debug, Display};

/// Trait for scalar types used in optimization (f32 or f64).
pub trait Scalar:
    NalgebraScalar + Float + Display + Debug + Default + Copy + Send + Sync + 'static
{
    /// Machine epsilon for this scalar type.
    const EPSILON: Self;

    /// Default tolerance for gradient norm convergence.
    const DEFAULT_GRADIENT_TOLERANCE: Self;

    /// Default relative decrease tolerance.
    const DEFAULT_DELTA: Self;

    /// Smallest step a line search may take before giving up.
    const MIN_STEP_SIZE: Self;

    /// Largest step a line search may take.
    const MAX_STEP_SIZE: Self;

    /// Convert from an f64 constant.
    fn from_f64(v: f64) -> Self;

    /// Convert to f64 for diagnostics. Non-representable values become NaN.
    fn as_f64(self) -> f64 {
        self.to_f64().unwrap_or(f64::NAN)
    }
}

impl Scalar for f32 {
    const EPSILON: Self = f32::EPSILON;
    const DEFAULT_GRADIENT_TOLERANCE: Self = 1e-5;
    const DEFAULT_DELTA: Self = 1e-6;
    const MIN_STEP_SIZE: Self = 1e-20;
    const MAX_STEP_SIZE: Self = 1e20;

    fn from_f64(v: f64) -> Self {
        v as f32
    }
}

impl Scalar for f64 {
    const EPSILON: Self = f64::EPSILON;
    const DEFAULT_GRADIENT_TOLERANCE: Self = 1e-5;
    const DEFAULT_DELTA: Self = 1e-6;
    const MIN_STEP_SIZE: Self = 1e-20;
    const MAX_STEP_SIZE: Self = 1e20;

    fn from_f64(v: f64) -> Self {
        v
    }
}

/// Type alias for a dynamically-sized nalgebra vector.
pub type DVector<T> = nalgebra::DVector<T>;

/// Type alias for a dynamically-sized nalgebra matrix.
pub type DMatrix<T> = nalgebra::DMatrix<T>;

/// Numerical constants shared by the optimizers.
pub mod constants {
    /// Default number of correction pairs kept by L-BFGS.
    pub const DEFAULT_MEMORY_SIZE: usize = 8;

    /// Default length of the window used by the relative decrease test.
    pub const DEFAULT_PAST: usize = 3;

    /// Default cap on line search trials per iteration.
    pub const DEFAULT_MAX_LINE_SEARCH_TRIALS: usize = 64;
}
