//! L-BFGS optimizer.
//!
//! L-BFGS (Limited-memory Broyden-Fletcher-Goldfarb-Shanno) is a quasi-Newton
//! algorithm that approximates the inverse Hessian from a short history of
//! position and gradient differences.
//!
//! # Algorithm Overview
//!
//! 1. Evaluate f and ∇f at the starting point; stop if ‖∇f‖ ≤ ε_g
//! 2. Compute d = −H∇f by the two-loop recursion (see [`History`])
//! 3. Line search along d; the first trial step is 1/‖d‖ while the
//!    history is empty and 1 afterwards
//! 4. Test convergence: gradient norm, then relative decrease over the
//!    last `past` iterations, then iteration and evaluation caps
//! 5. Store (s, y) if the cautious curvature test passes, and repeat
//!
//! A failed line search restores the last accepted iterate and ends the run
//! with a failure code.
//!
//! # References
//!
//! - Nocedal & Wright, "Numerical Optimization" (2006)
//! - Lewis & Overton, "Nonsmooth optimization via quasi-Newton methods" (2013)
//! - Li & Fukushima, "On the global convergence of the BFGS method for
//!   nonconvex unconstrained optimization problems" (2001)

use crate::history::History;
use log::{debug, warn};
use quasinewton_core::prelude::*;
use std::time::{Duration, Instant};

/// Configuration for the L-BFGS optimizer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LBFGSConfig<T> {
    /// Number of correction pairs to store (typically 3-20)
    pub memory_size: usize,
    /// Stop when ‖∇f(x)‖ ≤ gradient_tolerance
    pub gradient_tolerance: T,
    /// Window length of the relative decrease test; 0 disables the test
    pub past: usize,
    /// Stop when (f[k−past] − f[k]) / max(1, |f[k]|) < delta
    pub delta: T,
    /// Maximum number of iterations, unbounded when `None`
    pub max_iterations: Option<usize>,
    /// Maximum number of objective evaluations, unbounded when `None`
    pub max_evaluations: Option<usize>,
    /// Line search strategy
    pub line_search: LineSearchKind,
    /// Line search parameters
    pub line_search_params: LineSearchParams<T>,
    /// A pair is stored only if ⟨s, y⟩ > cautious_factor·‖g‖·‖s‖²
    pub cautious_factor: T,
}

impl<T: Scalar> Default for LBFGSConfig<T> {
    fn default() -> Self {
        Self {
            memory_size: constants::DEFAULT_MEMORY_SIZE,
            gradient_tolerance: T::DEFAULT_GRADIENT_TOLERANCE,
            past: constants::DEFAULT_PAST,
            delta: T::DEFAULT_DELTA,
            max_iterations: None,
            max_evaluations: None,
            line_search: LineSearchKind::default(),
            line_search_params: LineSearchParams::default(),
            cautious_factor: <T as Scalar>::from_f64(1e-6),
        }
    }
}

impl<T: Scalar> LBFGSConfig<T> {
    /// Creates a new configuration with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the memory size (number of correction pairs to store).
    pub fn with_memory_size(mut self, size: usize) -> Self {
        self.memory_size = size;
        self
    }

    /// Sets the gradient norm tolerance.
    pub fn with_gradient_tolerance(mut self, tol: T) -> Self {
        self.gradient_tolerance = tol;
        self
    }

    /// Sets the relative decrease tolerance.
    pub fn with_delta(mut self, delta: T) -> Self {
        self.delta = delta;
        self
    }

    /// Sets the window of the relative decrease test.
    pub fn with_past(mut self, past: usize) -> Self {
        self.past = past;
        self
    }

    /// Caps the number of iterations.
    pub fn with_max_iterations(mut self, max_iter: usize) -> Self {
        self.max_iterations = Some(max_iter);
        self
    }

    /// Caps the number of objective evaluations.
    pub fn with_max_evaluations(mut self, max_evals: usize) -> Self {
        self.max_evaluations = Some(max_evals);
        self
    }

    /// Selects the line search strategy.
    pub fn with_line_search(mut self, kind: LineSearchKind) -> Self {
        self.line_search = kind;
        self
    }

    /// Sets the line search parameters.
    pub fn with_line_search_params(mut self, params: LineSearchParams<T>) -> Self {
        self.line_search_params = params;
        self
    }

    /// Sets the cautious update factor.
    pub fn with_cautious_factor(mut self, factor: T) -> Self {
        self.cautious_factor = factor;
        self
    }

    /// Checks the configuration.
    ///
    /// # Errors
    ///
    /// Returns `OptimizerError::InvalidConfiguration` naming the offending
    /// parameter.
    pub fn validate(&self) -> OptimizerResult<()> {
        if self.memory_size == 0 {
            return Err(OptimizerError::invalid_configuration(
                "memory size must be at least 1",
                "memory_size",
                "0",
            ));
        }
        if !(self.gradient_tolerance >= T::zero()) || !self.gradient_tolerance.is_finite() {
            return Err(OptimizerError::invalid_configuration(
                "gradient tolerance must be finite and non-negative",
                "gradient_tolerance",
                self.gradient_tolerance.to_string(),
            ));
        }
        if !(self.delta >= T::zero()) {
            return Err(OptimizerError::invalid_configuration(
                "delta must be non-negative",
                "delta",
                self.delta.to_string(),
            ));
        }
        if !(self.cautious_factor >= T::zero()) {
            return Err(OptimizerError::invalid_configuration(
                "cautious factor must be non-negative",
                "cautious_factor",
                self.cautious_factor.to_string(),
            ));
        }
        if self.max_iterations == Some(0) {
            return Err(OptimizerError::invalid_configuration(
                "iteration cap must be at least 1",
                "max_iterations",
                "0",
            ));
        }
        if self.max_evaluations == Some(0) {
            return Err(OptimizerError::invalid_configuration(
                "evaluation cap must be at least 1",
                "max_evaluations",
                "0",
            ));
        }
        self.line_search_params.validate()?;
        Ok(())
    }
}

/// Limited-memory BFGS optimizer.
///
/// The optimizer holds only its configuration; every run allocates its own
/// buffers, so one instance can serve several runs, including concurrent
/// ones on different threads.
///
/// # Examples
///
/// ```rust
/// use quasinewton_core::prelude::*;
/// use quasinewton_optim::{LBFGSConfig, LBFGS};
///
/// // f(x) = (x0 + 2x1 − 7)² + (2x0 + x1 − 5)²
/// fn booth(x: &VectorView<f64>, g: &mut VectorViewMut<f64>) -> f64 {
///     let a = x[0] + 2.0 * x[1] - 7.0;
///     let b = 2.0 * x[0] + x[1] - 5.0;
///     g[0] = 2.0 * a + 4.0 * b;
///     g[1] = 4.0 * a + 2.0 * b;
///     a * a + b * b
/// }
///
/// let lbfgs = LBFGS::new(LBFGSConfig::new().with_gradient_tolerance(1e-8));
/// let mut x = PaddedVector::from_slice(&[0.0, 0.0]);
/// let result = lbfgs.optimize(&booth, &mut x.view_mut()).unwrap();
///
/// assert!(result.converged);
/// assert!((x.as_slice()[0] - 1.0).abs() < 1e-4);
/// assert!((x.as_slice()[1] - 3.0).abs() < 1e-4);
/// ```
#[derive(Debug, Clone)]
pub struct LBFGS<T> {
    config: LBFGSConfig<T>,
}

/// Per-run buffers, allocated once at the padded width.
struct Workspace<T> {
    g: PaddedVector<T>,
    xp: PaddedVector<T>,
    gp: PaddedVector<T>,
    d: PaddedVector<T>,
    s: PaddedVector<T>,
    y: PaddedVector<T>,
    history: History<T>,
    past_values: Vec<T>,
}

impl<T: SimdOps> Workspace<T> {
    fn new(n: usize, memory_size: usize, past: usize) -> Self {
        Self {
            g: PaddedVector::zeros(n),
            xp: PaddedVector::zeros(n),
            gp: PaddedVector::zeros(n),
            d: PaddedVector::zeros(n),
            s: PaddedVector::zeros(n),
            y: PaddedVector::zeros(n),
            history: History::new(memory_size, n),
            past_values: vec![T::zero(); past],
        }
    }
}

impl<T: SimdOps> LBFGS<T> {
    /// Creates a new L-BFGS optimizer with given configuration.
    pub fn new(config: LBFGSConfig<T>) -> Self {
        Self { config }
    }

    /// Creates a new L-BFGS optimizer with default configuration.
    pub fn with_default_config() -> Self {
        Self::new(LBFGSConfig::default())
    }

    /// Returns the optimizer configuration.
    pub fn config(&self) -> &LBFGSConfig<T> {
        &self.config
    }

    /// Runs the optimizer, reporting every accepted iteration to `observer`.
    ///
    /// See [`Optimizer::optimize`] for the contract on `x` and errors.
    pub fn optimize_with_observer<O, P>(
        &self,
        objective: &O,
        x: &mut VectorViewMut<'_, T>,
        observer: &mut P,
    ) -> OptimizerResult<OptimizationResult<T>>
    where
        O: Objective<T> + ?Sized,
        P: ProgressObserver<T> + ?Sized,
    {
        let n = x.len();
        if n == 0 {
            return Err(OptimizerError::invalid_input(
                "starting point must have at least one entry",
            ));
        }
        if let Some(dim) = objective.dimension() {
            if dim != n {
                return Err(OptimizerError::DimensionMismatch {
                    point: n,
                    objective: dim,
                });
            }
        }
        self.config.validate()?;

        let config = &self.config;
        let line_search = ConfiguredLineSearch::new(config.line_search, config.line_search_params);
        let max_step = config.line_search_params.max_step;
        let eval_cap = config.max_evaluations.unwrap_or(usize::MAX);
        let start = Instant::now();
        let mut ws = Workspace::new(n, config.memory_size, config.past);

        let mut fx = objective.evaluate(&x.as_view(), &mut ws.g.view_mut());
        let mut evaluations = 1;
        let mut iterations = 0;

        if !fx.is_finite() || !ws.g.view().is_finite() {
            warn!("{}: objective is not finite at the starting point", self.name());
            return Ok(self.finish(
                observer,
                fx,
                T::nan(),
                iterations,
                evaluations,
                start.elapsed(),
                TerminationReason::NonFiniteValue,
            ));
        }

        let mut gnorm = ws.g.view().norm();
        if gnorm <= config.gradient_tolerance {
            debug!("{}: starting point is stationary (‖g‖ = {})", self.name(), gnorm);
            return Ok(self.finish(
                observer,
                fx,
                gnorm,
                iterations,
                evaluations,
                start.elapsed(),
                TerminationReason::Success,
            ));
        }

        if config.past > 0 {
            ws.past_values[0] = fx;
        }

        let reason = loop {
            if evaluations >= eval_cap {
                break TerminationReason::EvaluationLimitReached;
            }

            ws.history.direction(&ws.g.view(), &mut ws.d.view_mut());
            let dnorm = ws.d.view().norm();
            let step = if ws.history.is_empty() {
                (T::one() / dnorm).min(max_step)
            } else {
                T::one()
            };
            // ‖d‖ can overflow even when every entry of g is finite.
            if !dnorm.is_finite() || !(step > T::zero()) {
                warn!(
                    "{}: search direction overflowed at iteration {} (‖d‖ = {})",
                    self.name(),
                    iterations + 1,
                    dnorm
                );
                break TerminationReason::NonFiniteValue;
            }

            ws.xp.view_mut().copy_from(&x.as_view());
            ws.gp.view_mut().copy_from(&ws.g.view());
            let fxp = fx;

            let remaining = eval_cap - evaluations;
            let problem =
                LineSearchProblem::new(objective, ws.xp.view(), fxp, ws.gp.view(), ws.d.view())
                    .with_trial_limit(remaining);

            let accepted = line_search.search(&problem, step, x, &mut ws.g.view_mut());
            let accepted = match accepted {
                Ok(accepted) => accepted,
                Err(err) => {
                    evaluations += err.evaluations();
                    x.copy_from(&ws.xp.view());
                    ws.g.view_mut().copy_from(&ws.gp.view());
                    fx = fxp;

                    let budget_hit = evaluations >= eval_cap
                        && matches!(
                            err,
                            LineSearchError::Failed {
                                reason: LineSearchFailure::MaximumTrials,
                                ..
                            }
                        );
                    if budget_hit {
                        break TerminationReason::EvaluationLimitReached;
                    }
                    warn!(
                        "{}: {} at iteration {}, returning the last accepted point",
                        self.name(),
                        err,
                        iterations + 1
                    );
                    break err.termination_reason();
                }
            };

            evaluations += accepted.evaluations;
            iterations += 1;
            fx = accepted.value;
            gnorm = ws.g.view().norm();

            let stop = if gnorm <= config.gradient_tolerance {
                Some(TerminationReason::ConvergedByGradient)
            } else if self.relative_decrease_stalled(&mut ws.past_values, iterations, fx) {
                Some(TerminationReason::ConvergedByDelta)
            } else if config.max_iterations.is_some_and(|cap| iterations >= cap) {
                Some(TerminationReason::IterationLimitReached)
            } else {
                None
            };

            if stop.is_none() {
                ws.s.view_mut().assign_diff(&x.as_view(), &ws.xp.view());
                ws.y.view_mut().assign_diff(&ws.g.view(), &ws.gp.view());
                let ys = ws.y.view().dot(&ws.s.view());
                let ss = ws.s.view().norm_squared();
                if ys > config.cautious_factor * gnorm * ss {
                    ws.history.push(&ws.s.view(), &ws.y.view(), ys);
                } else {
                    debug!("{}: skipping correction pair (y·s = {})", self.name(), ys);
                }
            }

            debug!(
                "{}: iteration {}: f = {}, ‖g‖ = {}, step = {}, pairs = {}",
                self.name(),
                iterations,
                fx,
                gnorm,
                accepted.step_size,
                ws.history.len()
            );
            observer.on_iteration(&IterationReport {
                iteration: iterations,
                value: fx,
                gradient_norm: gnorm,
                step_size: accepted.step_size,
                history_len: ws.history.len(),
                function_evaluations: evaluations,
            });

            if let Some(reason) = stop {
                break reason;
            }
        };

        let gnorm = ws.g.view().norm();
        Ok(self.finish(
            observer,
            fx,
            gnorm,
            iterations,
            evaluations,
            start.elapsed(),
            reason,
        ))
    }

    /// Delta test over the `past` window; records `fx` for later iterations.
    fn relative_decrease_stalled(&self, past_values: &mut [T], k: usize, fx: T) -> bool {
        let past = self.config.past;
        if past == 0 {
            return false;
        }
        let slot = k % past;
        let stalled = if k >= past {
            let rate = (past_values[slot] - fx) / T::one().max(fx.abs());
            rate < self.config.delta
        } else {
            false
        };
        past_values[slot] = fx;
        stalled
    }

    #[allow(clippy::too_many_arguments)]
    fn finish<P>(
        &self,
        observer: &mut P,
        value: T,
        gradient_norm: T,
        iterations: usize,
        evaluations: usize,
        duration: Duration,
        reason: TerminationReason,
    ) -> OptimizationResult<T>
    where
        P: ProgressObserver<T> + ?Sized,
    {
        debug!(
            "{}: {} after {} iterations, {} evaluations (f = {})",
            self.name(),
            reason,
            iterations,
            evaluations,
            value
        );
        let result = OptimizationResult::new(value, iterations, duration, reason)
            .with_gradient_norm(gradient_norm)
            .with_function_evaluations(evaluations);
        observer.on_finish(&result);
        result
    }
}

impl<T: SimdOps> Default for LBFGS<T> {
    fn default() -> Self {
        Self::with_default_config()
    }
}

impl<T: SimdOps> Optimizer<T> for LBFGS<T> {
    fn name(&self) -> &str {
        "L-BFGS"
    }

    fn optimize<O>(
        &self,
        objective: &O,
        x: &mut VectorViewMut<'_, T>,
    ) -> OptimizerResult<OptimizationResult<T>>
    where
        O: Objective<T> + ?Sized,
    {
        self.optimize_with_observer(objective, x, &mut NoOpObserver)
    }
}

/// Final point and run summary returned by [`minimize`].
#[derive(Debug, Clone, PartialEq)]
pub struct Minimum<T> {
    /// The returned point, same length as the starting point.
    pub point: Vec<T>,
    /// Run summary.
    pub result: OptimizationResult<T>,
}

impl<T: Scalar> Minimum<T> {
    /// Objective value at [`Minimum::point`].
    pub fn value(&self) -> T {
        self.result.value
    }

    /// Why the run stopped.
    pub fn termination_reason(&self) -> TerminationReason {
        self.result.termination_reason
    }

    /// True if the run converged.
    pub fn converged(&self) -> bool {
        self.result.converged
    }

    /// The point as an nalgebra vector.
    pub fn point_dvector(&self) -> DVector<T> {
        DVector::from_column_slice(&self.point)
    }
}

/// Minimizes `objective` from `x0` with L-BFGS.
///
/// Copies `x0` into padded storage, runs the optimizer and copies the final
/// point back out.
///
/// # Errors
///
/// Returns `OptimizerError` for an empty starting point, a dimension
/// mismatch or an invalid configuration. The objective is not evaluated in
/// that case.
pub fn minimize<T, O>(objective: &O, x0: &[T], config: LBFGSConfig<T>) -> OptimizerResult<Minimum<T>>
where
    T: SimdOps,
    O: Objective<T> + ?Sized,
{
    let mut x = PaddedVector::from_slice(x0);
    let result = LBFGS::new(config).optimize(objective, &mut x.view_mut())?;
    Ok(Minimum {
        point: x.to_vec(),
        result,
    })
}
