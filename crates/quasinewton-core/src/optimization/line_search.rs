//! Line searches along a descent direction.
//!
//! Given a point x₀, its value f₀ and gradient g₀, and a direction d with
//! g₀·d < 0, a line search looks for a step α > 0 such that
//!
//! - **Armijo (sufficient decrease)**: f(x₀ + αd) ≤ f₀ + c₁·α·g₀·d
//! - **Weak Wolfe (curvature)**: ∇f(x₀ + αd)·d ≥ c₂·g₀·d
//! - **Strong Wolfe**: additionally ∇f(x₀ + αd)·d ≤ −c₂·g₀·d
//!
//! with 0 < c₁ < c₂ < 1. Two strategies are provided:
//!
//! - [`BacktrackingLineSearch`]: Armijo only, shrinking the step by ρ.
//! - [`WolfeLineSearch`]: Lewis–Overton bisection/expansion. The step
//!   doubles until an upper bracket is found, then bisects the bracket.
//!
//! Trial points and gradients are written into caller-owned buffers, so a
//! successful search leaves the accepted point in `x` and its gradient in
//! `g`. No allocation happens inside a search.
//!
//! # Example
//!
//! ```rust
//! use quasinewton_core::prelude::*;
//!
//! fn parabola(x: &VectorView<f64>, g: &mut VectorViewMut<f64>) -> f64 {
//!     g[0] = 2.0 * (x[0] - 3.0);
//!     (x[0] - 3.0).powi(2)
//! }
//!
//! let x0 = PaddedVector::from_slice(&[0.0]);
//! let mut g0 = PaddedVector::zeros(1);
//! let f0 = parabola.evaluate(&x0.view(), &mut g0.view_mut());
//! let mut d = g0.clone();
//! d.view_mut().scale(-1.0);
//!
//! let mut x = PaddedVector::zeros(1);
//! let mut g = PaddedVector::zeros(1);
//! let problem = LineSearchProblem::new(&parabola, x0.view(), f0, g0.view(), d.view());
//! let result = WolfeLineSearch::weak()
//!     .search(&problem, 1.0, &mut x.view_mut(), &mut g.view_mut())
//!     .unwrap();
//!
//! assert!(result.value < f0);
//! ```

use crate::compute::cpu::simd::SimdOps;
use crate::core::objective::Objective;
use crate::error::{LineSearchError, LineSearchFailure, LineSearchOutcome};
use crate::types::{constants, Scalar};
use crate::view::{VectorView, VectorViewMut};
use log::trace;
use std::fmt::Debug;

/// Parameters shared by all line searches.
///
/// Defaults follow the usual quasi-Newton choices: c₁ = 1e-4, c₂ = 0.9,
/// steps in [1e-20, 1e20], 64 trials, ρ = 0.5.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineSearchParams<T> {
    /// Armijo parameter c₁ ∈ (0, 0.5)
    pub c1: T,

    /// Curvature parameter c₂ ∈ (c₁, 1)
    pub c2: T,

    /// Smallest step before the search gives up
    pub min_step: T,

    /// Largest step the search may try
    pub max_step: T,

    /// Maximum number of objective evaluations per search
    pub max_trials: usize,

    /// Relative bracket width below which the search gives up
    pub machine_precision: T,

    /// Backtracking reduction factor ρ ∈ (0, 1)
    pub rho: T,
}

impl<T: Scalar> Default for LineSearchParams<T> {
    fn default() -> Self {
        Self {
            c1: <T as Scalar>::from_f64(1e-4),
            c2: <T as Scalar>::from_f64(0.9),
            min_step: T::MIN_STEP_SIZE,
            max_step: T::MAX_STEP_SIZE,
            max_trials: constants::DEFAULT_MAX_LINE_SEARCH_TRIALS,
            machine_precision: <T as Scalar>::from_f64(1e-16),
            rho: <T as Scalar>::from_f64(0.5),
        }
    }
}

impl<T: Scalar> LineSearchParams<T> {
    /// Sets the sufficient decrease parameter.
    pub fn with_c1(mut self, c1: T) -> Self {
        self.c1 = c1;
        self
    }

    /// Sets the curvature parameter.
    pub fn with_c2(mut self, c2: T) -> Self {
        self.c2 = c2;
        self
    }

    /// Sets the step bounds.
    pub fn with_step_bounds(mut self, min_step: T, max_step: T) -> Self {
        self.min_step = min_step;
        self.max_step = max_step;
        self
    }

    /// Sets the trial budget.
    pub fn with_max_trials(mut self, max_trials: usize) -> Self {
        self.max_trials = max_trials;
        self
    }

    /// Sets the backtracking factor.
    pub fn with_rho(mut self, rho: T) -> Self {
        self.rho = rho;
        self
    }

    /// Checks the parameter constraints.
    ///
    /// # Errors
    ///
    /// Returns `LineSearchError::InvalidParameters` unless
    /// 0 < c₁ < 0.5, c₁ < c₂ < 1, 0 < min_step < max_step, 0 < ρ < 1,
    /// machine_precision > 0 and max_trials ≥ 1.
    pub fn validate(&self) -> LineSearchOutcome<()> {
        let half = <T as Scalar>::from_f64(0.5);
        if !(self.c1 > T::zero() && self.c1 < half) {
            return Err(LineSearchError::invalid_parameters(format!(
                "c1 must be in (0, 0.5), got {}",
                self.c1
            )));
        }
        if !(self.c2 > self.c1 && self.c2 < T::one()) {
            return Err(LineSearchError::invalid_parameters(format!(
                "c2 must satisfy c1 < c2 < 1, got {}",
                self.c2
            )));
        }
        if !(self.min_step > T::zero()) {
            return Err(LineSearchError::invalid_parameters(
                "minimum step must be positive",
            ));
        }
        if !(self.max_step > self.min_step) {
            return Err(LineSearchError::invalid_parameters(
                "maximum step must exceed minimum step",
            ));
        }
        if !(self.rho > T::zero() && self.rho < T::one()) {
            return Err(LineSearchError::invalid_parameters(format!(
                "rho must be in (0, 1), got {}",
                self.rho
            )));
        }
        if !(self.machine_precision > T::zero()) {
            return Err(LineSearchError::invalid_parameters(
                "machine precision must be positive",
            ));
        }
        if self.max_trials == 0 {
            return Err(LineSearchError::invalid_parameters(
                "at least one trial is required",
            ));
        }
        Ok(())
    }
}

/// One line search subproblem: minimize φ(α) = f(x₀ + α·d).
pub struct LineSearchProblem<'p, 'a, T, O: ?Sized> {
    /// The objective being minimized
    pub objective: &'p O,
    /// Starting point x₀
    pub x0: VectorView<'a, T>,
    /// f(x₀)
    pub f0: T,
    /// ∇f(x₀)
    pub g0: VectorView<'a, T>,
    /// Search direction d
    pub direction: VectorView<'a, T>,
    /// Evaluations the search may spend, on top of `max_trials`
    pub trial_limit: usize,
}

impl<'p, 'a, T: SimdOps, O: Objective<T> + ?Sized> LineSearchProblem<'p, 'a, T, O> {
    /// Bundles a subproblem with no extra evaluation limit.
    pub fn new(
        objective: &'p O,
        x0: VectorView<'a, T>,
        f0: T,
        g0: VectorView<'a, T>,
        direction: VectorView<'a, T>,
    ) -> Self {
        Self {
            objective,
            x0,
            f0,
            g0,
            direction,
            trial_limit: usize::MAX,
        }
    }

    /// Caps the evaluations this search may spend.
    pub fn with_trial_limit(mut self, limit: usize) -> Self {
        self.trial_limit = limit;
        self
    }

    /// Directional derivative g₀·d.
    pub fn initial_slope(&self) -> T {
        self.g0.dot(&self.direction)
    }

    /// Evaluates φ at `step`, writing x₀ + step·d into `x` and its gradient into `g`.
    fn evaluate_at(&self, step: T, x: &mut VectorViewMut<'_, T>, g: &mut VectorViewMut<'_, T>) -> T {
        x.assign_axpy(step, &self.direction, &self.x0);
        self.objective.evaluate(&x.as_view(), g)
    }
}

/// An accepted step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSearchResult<T> {
    /// Accepted step length α
    pub step_size: T,
    /// f(x₀ + α·d)
    pub value: T,
    /// Objective evaluations spent
    pub evaluations: usize,
}

/// Common interface of the line search strategies.
pub trait LineSearch<T: SimdOps>: Debug {
    /// Searches along `problem.direction` starting from `initial_step`.
    ///
    /// On success `x` holds the accepted point and `g` its gradient. On
    /// failure their contents are the last trial and must be discarded.
    ///
    /// # Errors
    ///
    /// - `NotADescentDirection` when g₀·d ≥ 0, before any evaluation
    /// - `InvalidParameters` for invalid parameters or initial step
    /// - `NonFiniteValue` when a trial evaluates to NaN or infinity
    /// - `Failed` when no acceptable step is found
    fn search<O>(
        &self,
        problem: &LineSearchProblem<'_, '_, T, O>,
        initial_step: T,
        x: &mut VectorViewMut<'_, T>,
        g: &mut VectorViewMut<'_, T>,
    ) -> LineSearchOutcome<LineSearchResult<T>>
    where
        O: Objective<T> + ?Sized;

    /// Returns the name of this line search method.
    fn name(&self) -> &str;

    /// Parameters in use.
    fn params(&self) -> &LineSearchParams<T>;
}

/// Shared entry checks: descent direction and a usable initial step.
///
/// Returns (g₀·d, clamped initial step).
fn prepare<T, O>(
    params: &LineSearchParams<T>,
    problem: &LineSearchProblem<'_, '_, T, O>,
    initial_step: T,
) -> LineSearchOutcome<(T, T)>
where
    T: SimdOps,
    O: Objective<T> + ?Sized,
{
    let slope = problem.initial_slope();
    if !(slope < T::zero()) {
        return Err(LineSearchError::NotADescentDirection {
            directional_derivative: slope.as_f64(),
        });
    }
    if !(initial_step > T::zero()) || !initial_step.is_finite() {
        return Err(LineSearchError::invalid_parameters(format!(
            "initial step must be positive and finite, got {}",
            initial_step
        )));
    }
    Ok((slope, initial_step.min(params.max_step)))
}

/// Backtracking line search enforcing the Armijo condition only.
///
/// Starting from the initial step, multiplies the step by ρ until
/// f(x₀ + αd) ≤ f₀ + c₁·α·g₀·d.
#[derive(Debug, Clone, Copy)]
pub struct BacktrackingLineSearch<T> {
    params: LineSearchParams<T>,
}

impl<T: Scalar> BacktrackingLineSearch<T> {
    /// Creates a backtracking search with default parameters.
    pub fn new() -> Self {
        Self::with_params(LineSearchParams::default())
    }

    /// Creates a backtracking search with the given parameters.
    pub fn with_params(params: LineSearchParams<T>) -> Self {
        Self { params }
    }
}

impl<T: Scalar> Default for BacktrackingLineSearch<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: SimdOps> LineSearch<T> for BacktrackingLineSearch<T> {
    fn search<O>(
        &self,
        problem: &LineSearchProblem<'_, '_, T, O>,
        initial_step: T,
        x: &mut VectorViewMut<'_, T>,
        g: &mut VectorViewMut<'_, T>,
    ) -> LineSearchOutcome<LineSearchResult<T>>
    where
        O: Objective<T> + ?Sized,
    {
        self.params.validate()?;
        let (slope, mut step) = prepare(&self.params, problem, initial_step)?;
        let budget = self.params.max_trials.min(problem.trial_limit);
        let decrease = self.params.c1 * slope;

        let mut evaluations = 0;
        loop {
            let value = problem.evaluate_at(step, x, g);
            evaluations += 1;
            trace!("backtracking trial {}: step = {}, value = {}", evaluations, step, value);

            if !value.is_finite() || !g.is_finite() {
                return Err(LineSearchError::NonFiniteValue {
                    evaluations,
                    step_size: step.as_f64(),
                });
            }

            if value <= problem.f0 + step * decrease {
                return Ok(LineSearchResult {
                    step_size: step,
                    value,
                    evaluations,
                });
            }

            if evaluations >= budget {
                return Err(LineSearchError::failed(
                    LineSearchFailure::MaximumTrials,
                    evaluations,
                    step.as_f64(),
                ));
            }

            step = step * self.params.rho;
            if step < self.params.min_step {
                return Err(LineSearchError::failed(
                    LineSearchFailure::MinimumStep,
                    evaluations,
                    step.as_f64(),
                ));
            }
        }
    }

    fn name(&self) -> &str {
        "Backtracking"
    }

    fn params(&self) -> &LineSearchParams<T> {
        &self.params
    }
}

/// Which curvature test a [`WolfeLineSearch`] enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CurvatureCondition {
    /// g·d ≥ c₂·g₀·d
    Weak,
    /// |g·d| ≤ c₂·|g₀·d|
    Strong,
}

/// Lewis–Overton bracketing line search for the Wolfe conditions.
///
/// Keeps a bracket [μ, ν] around acceptable steps. A trial that fails the
/// Armijo test moves ν down to it; a trial whose slope is still too steep
/// moves μ up to it; in strong mode a trial whose slope is too positive
/// also moves ν. The next trial is the midpoint once ν is finite, otherwise
/// the step doubles.
#[derive(Debug, Clone, Copy)]
pub struct WolfeLineSearch<T> {
    params: LineSearchParams<T>,
    condition: CurvatureCondition,
}

impl<T: Scalar> WolfeLineSearch<T> {
    /// Weak Wolfe search with default parameters.
    pub fn weak() -> Self {
        Self::with_params(LineSearchParams::default(), CurvatureCondition::Weak)
    }

    /// Strong Wolfe search with default parameters.
    pub fn strong() -> Self {
        Self::with_params(LineSearchParams::default(), CurvatureCondition::Strong)
    }

    /// Creates a search with explicit parameters.
    pub fn with_params(params: LineSearchParams<T>, condition: CurvatureCondition) -> Self {
        Self { params, condition }
    }

    /// The enforced curvature condition.
    pub fn condition(&self) -> CurvatureCondition {
        self.condition
    }
}

impl<T: Scalar> Default for WolfeLineSearch<T> {
    fn default() -> Self {
        Self::weak()
    }
}

impl<T: SimdOps> LineSearch<T> for WolfeLineSearch<T> {
    fn search<O>(
        &self,
        problem: &LineSearchProblem<'_, '_, T, O>,
        initial_step: T,
        x: &mut VectorViewMut<'_, T>,
        g: &mut VectorViewMut<'_, T>,
    ) -> LineSearchOutcome<LineSearchResult<T>>
    where
        O: Objective<T> + ?Sized,
    {
        let params = &self.params;
        params.validate()?;
        let (slope, mut step) = prepare(params, problem, initial_step)?;
        let budget = params.max_trials.min(problem.trial_limit);

        let decrease = params.c1 * slope;
        let curvature = params.c2 * slope;
        let two = <T as Scalar>::from_f64(2.0);
        let half = <T as Scalar>::from_f64(0.5);

        let mut lower = T::zero();
        let mut upper = params.max_step;
        let mut bracketed = false;
        let mut touched_max = step == params.max_step;
        let mut evaluations = 0;

        loop {
            let value = problem.evaluate_at(step, x, g);
            evaluations += 1;

            if !value.is_finite() || !g.is_finite() {
                return Err(LineSearchError::NonFiniteValue {
                    evaluations,
                    step_size: step.as_f64(),
                });
            }

            if value > problem.f0 + step * decrease {
                trace!("wolfe trial {}: step = {}, value = {} (armijo)", evaluations, step, value);
                upper = step;
                bracketed = true;
            } else {
                let trial_slope = g.dot(&problem.direction);
                trace!(
                    "wolfe trial {}: step = {}, value = {}, slope = {}",
                    evaluations,
                    step,
                    value,
                    trial_slope
                );
                if trial_slope < curvature {
                    lower = step;
                } else if self.condition == CurvatureCondition::Strong && trial_slope > -curvature {
                    upper = step;
                    bracketed = true;
                } else {
                    return Ok(LineSearchResult {
                        step_size: step,
                        value,
                        evaluations,
                    });
                }
            }

            if evaluations >= budget {
                return Err(LineSearchError::failed(
                    LineSearchFailure::MaximumTrials,
                    evaluations,
                    step.as_f64(),
                ));
            }

            if bracketed && (upper - lower) < params.machine_precision * upper {
                return Err(LineSearchError::failed(
                    LineSearchFailure::WidthTooSmall,
                    evaluations,
                    step.as_f64(),
                ));
            }

            step = if bracketed {
                half * (lower + upper)
            } else {
                two * step
            };

            if step < params.min_step {
                return Err(LineSearchError::failed(
                    LineSearchFailure::MinimumStep,
                    evaluations,
                    step.as_f64(),
                ));
            }
            if step > params.max_step {
                if touched_max {
                    return Err(LineSearchError::failed(
                        LineSearchFailure::MaximumStep,
                        evaluations,
                        step.as_f64(),
                    ));
                }
                touched_max = true;
                step = params.max_step;
            }
        }
    }

    fn name(&self) -> &str {
        match self.condition {
            CurvatureCondition::Weak => "Weak Wolfe",
            CurvatureCondition::Strong => "Strong Wolfe",
        }
    }

    fn params(&self) -> &LineSearchParams<T> {
        &self.params
    }
}

/// Line search selector stored in optimizer configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LineSearchKind {
    /// [`BacktrackingLineSearch`]
    Backtracking,
    /// [`WolfeLineSearch`] with the weak curvature condition
    #[default]
    Wolfe,
    /// [`WolfeLineSearch`] with the strong curvature condition
    StrongWolfe,
}

/// A line search built from a [`LineSearchKind`] and parameters.
#[derive(Debug, Clone, Copy)]
pub enum ConfiguredLineSearch<T> {
    /// Armijo backtracking
    Backtracking(BacktrackingLineSearch<T>),
    /// Lewis–Overton Wolfe search
    Wolfe(WolfeLineSearch<T>),
}

impl<T: Scalar> ConfiguredLineSearch<T> {
    /// Builds the search selected by `kind`.
    pub fn new(kind: LineSearchKind, params: LineSearchParams<T>) -> Self {
        match kind {
            LineSearchKind::Backtracking => {
                Self::Backtracking(BacktrackingLineSearch::with_params(params))
            }
            LineSearchKind::Wolfe => {
                Self::Wolfe(WolfeLineSearch::with_params(params, CurvatureCondition::Weak))
            }
            LineSearchKind::StrongWolfe => {
                Self::Wolfe(WolfeLineSearch::with_params(params, CurvatureCondition::Strong))
            }
        }
    }
}

impl<T: SimdOps> LineSearch<T> for ConfiguredLineSearch<T> {
    fn search<O>(
        &self,
        problem: &LineSearchProblem<'_, '_, T, O>,
        initial_step: T,
        x: &mut VectorViewMut<'_, T>,
        g: &mut VectorViewMut<'_, T>,
    ) -> LineSearchOutcome<LineSearchResult<T>>
    where
        O: Objective<T> + ?Sized,
    {
        match self {
            Self::Backtracking(ls) => ls.search(problem, initial_step, x, g),
            Self::Wolfe(ls) => ls.search(problem, initial_step, x, g),
        }
    }

    fn name(&self) -> &str {
        match self {
            Self::Backtracking(ls) => LineSearch::<T>::name(ls),
            Self::Wolfe(ls) => LineSearch::<T>::name(ls),
        }
    }

    fn params(&self) -> &LineSearchParams<T> {
        match self {
            Self::Backtracking(ls) => LineSearch::<T>::params(ls),
            Self::Wolfe(ls) => LineSearch::<T>::params(ls),
        }
    }
}
