//! Objective function contract.
//!
//! An objective maps a point to its value and writes the gradient into a
//! caller-owned buffer. Evaluation must be deterministic: the same point
//! always yields bit-identical results. Problem data is captured at
//! construction and not mutated by the optimizer.
//!
//! # Example
//!
//! ```rust
//! use quasinewton_core::prelude::*;
//!
//! // f(x) = ½‖x‖²
//! fn half_norm(x: &VectorView<f64>, g: &mut VectorViewMut<f64>) -> f64 {
//!     g.copy_from(x);
//!     0.5 * x.norm_squared()
//! }
//!
//! let x = PaddedVector::from_slice(&[3.0, 4.0]);
//! let mut g = PaddedVector::zeros(2);
//! let value = half_norm.evaluate(&x.view(), &mut g.view_mut());
//!
//! assert_eq!(value, 12.5);
//! assert_eq!(g.as_slice(), &[3.0, 4.0]);
//! ```

use crate::compute::cpu::simd::SimdOps;
use crate::memory::PaddedVector;
use crate::view::{VectorView, VectorViewMut};
use num_traits::Float;
use std::cell::Cell;

/// A differentiable function of `n` variables.
pub trait Objective<T: SimdOps> {
    /// Returns `f(x)` and writes `∇f(x)` into `gradient`.
    ///
    /// `gradient` has the same logical length as `x`. Only its logical
    /// entries are meaningful; implementations must leave padding at zero.
    fn evaluate(&self, x: &VectorView<'_, T>, gradient: &mut VectorViewMut<'_, T>) -> T;

    /// Number of variables this objective expects, if fixed.
    ///
    /// Optimizers check a declared dimension against the starting point
    /// before the first evaluation.
    fn dimension(&self) -> Option<usize> {
        None
    }
}

impl<T, F> Objective<T> for F
where
    T: SimdOps,
    F: Fn(&VectorView<'_, T>, &mut VectorViewMut<'_, T>) -> T,
{
    fn evaluate(&self, x: &VectorView<'_, T>, gradient: &mut VectorViewMut<'_, T>) -> T {
        self(x, gradient)
    }
}

/// Wrapper that counts how many times an objective is evaluated.
#[derive(Debug)]
pub struct CountingObjective<O> {
    inner: O,
    evaluations: Cell<usize>,
}

impl<O> CountingObjective<O> {
    /// Wraps `inner` with a zeroed counter.
    pub fn new(inner: O) -> Self {
        Self {
            inner,
            evaluations: Cell::new(0),
        }
    }

    /// Number of evaluations since construction or the last reset.
    pub fn evaluations(&self) -> usize {
        self.evaluations.get()
    }

    /// Resets the counter.
    pub fn reset(&self) {
        self.evaluations.set(0);
    }

    /// Borrows the wrapped objective.
    pub fn inner(&self) -> &O {
        &self.inner
    }

    /// Unwraps the objective.
    pub fn into_inner(self) -> O {
        self.inner
    }
}

impl<T: SimdOps, O: Objective<T>> Objective<T> for CountingObjective<O> {
    fn evaluate(&self, x: &VectorView<'_, T>, gradient: &mut VectorViewMut<'_, T>) -> T {
        self.evaluations.set(self.evaluations.get() + 1);
        self.inner.evaluate(x, gradient)
    }

    fn dimension(&self) -> Option<usize> {
        self.inner.dimension()
    }
}

/// Utilities for checking gradient implementations.
pub struct DerivativeChecker;

impl DerivativeChecker {
    /// Compares the analytic gradient with central finite differences.
    ///
    /// # Arguments
    ///
    /// * `objective` - The objective to check
    /// * `point` - Point at which to check the gradient
    /// * `tol` - Tolerance on the largest component-wise error
    ///
    /// # Returns
    ///
    /// A tuple of (passes, max_error).
    pub fn check_gradient<T, O>(objective: &O, point: &[T], tol: T) -> (bool, T)
    where
        T: SimdOps,
        O: Objective<T> + ?Sized,
    {
        let n = point.len();
        let mut x = PaddedVector::from_slice(point);
        let mut analytic = PaddedVector::zeros(n);
        let mut scratch = PaddedVector::zeros(n);
        objective.evaluate(&x.view(), &mut analytic.view_mut());

        let cbrt_eps = <T as Float>::epsilon().cbrt();
        let mut max_error = T::zero();
        for i in 0..n {
            let xi = point[i];
            let h = cbrt_eps * T::one().max(xi.abs());

            x.as_mut_slice()[i] = xi + h;
            let f_plus = objective.evaluate(&x.view(), &mut scratch.view_mut());
            x.as_mut_slice()[i] = xi - h;
            let f_minus = objective.evaluate(&x.view(), &mut scratch.view_mut());
            x.as_mut_slice()[i] = xi;

            let fd = (f_plus - f_minus) / (h + h);
            max_error = max_error.max((fd - analytic.as_slice()[i]).abs());
        }

        (max_error < tol, max_error)
    }
}
