//! Logistic regression by maximum likelihood.
//!
//! The negative log-likelihood of coefficients β for a design matrix X and
//! responses y ∈ [0, 1] is
//!
//! ```text
//! η = clamp(Xβ, −30, 30)
//! p = 1 / (1 + exp(−η))
//! f(β) = Σᵢ log(1 + exp(ηᵢ)) − ηᵀy
//! ∇f(β) = Xᵀ(p − y)
//! ```
//!
//! Clamping the linear predictor keeps `exp` finite and the fitted
//! probabilities strictly inside (0, 1).

use log::{debug, warn};
use quasinewton_core::prelude::*;
use quasinewton_optim::{minimize, LBFGSConfig};
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use std::cell::RefCell;

/// Linear predictors are clamped to ±this value.
const ETA_LIMIT: f64 = 30.0;

/// Relative decrease tolerance used by [`fit_logistic`].
pub const DEFAULT_FIT_DELTA: f64 = 1e-5;

/// Negative log-likelihood of a logistic regression model.
///
/// Holds the data in padded storage plus two scratch buffers for the linear
/// predictor and fitted probabilities. The scratch buffers live in a
/// `RefCell`, so the objective is `!Sync`; build one per thread.
#[derive(Debug, Clone)]
pub struct LogisticRegression<T> {
    x: PaddedMatrix<T>,
    y: PaddedVector<T>,
    eta: RefCell<PaddedVector<T>>,
    phat: RefCell<PaddedVector<T>>,
}

impl<T: SimdOps> LogisticRegression<T> {
    /// Builds the objective from an n × p design matrix and n responses.
    ///
    /// # Errors
    ///
    /// Returns `OptimizerError::InvalidInput` if the design matrix is empty,
    /// the number of responses differs from the number of rows, or a
    /// response lies outside [0, 1].
    pub fn new(x: &DMatrix<T>, y: &[T]) -> OptimizerResult<Self> {
        if x.nrows() == 0 || x.ncols() == 0 {
            return Err(OptimizerError::invalid_input(format!(
                "design matrix must be non-empty, got {}x{}",
                x.nrows(),
                x.ncols()
            )));
        }
        if y.len() != x.nrows() {
            return Err(OptimizerError::invalid_input(format!(
                "{} responses for {} observations",
                y.len(),
                x.nrows()
            )));
        }
        if let Some(i) = y
            .iter()
            .position(|&yi| !(yi >= T::zero() && yi <= T::one()))
        {
            return Err(OptimizerError::invalid_input(format!(
                "response {} is {}, expected a value in [0, 1]",
                i, y[i]
            )));
        }

        let n = x.nrows();
        Ok(Self {
            x: PaddedMatrix::from_dmatrix(x),
            y: PaddedVector::from_slice(y),
            eta: RefCell::new(PaddedVector::zeros(n)),
            phat: RefCell::new(PaddedVector::zeros(n)),
        })
    }

    /// Number of observations.
    pub fn nobs(&self) -> usize {
        self.x.nrows()
    }

    /// Number of coefficients.
    pub fn ncoef(&self) -> usize {
        self.x.ncols()
    }

    /// Log-likelihood at `coefficients`.
    ///
    /// # Panics
    ///
    /// Panics if `coefficients.len() != ncoef()`.
    pub fn log_likelihood(&self, coefficients: &[T]) -> T {
        let beta = PaddedVector::from_slice(coefficients);
        let mut gradient = PaddedVector::zeros(coefficients.len());
        -self.evaluate(&beta.view(), &mut gradient.view_mut())
    }

    /// Clamped linear predictors and fitted probabilities at `coefficients`.
    ///
    /// # Panics
    ///
    /// Panics if `coefficients.len() != ncoef()`.
    pub fn predict(&self, coefficients: &[T]) -> (Vec<T>, Vec<T>) {
        let beta = PaddedVector::from_slice(coefficients);
        let mut eta = PaddedVector::zeros(self.nobs());
        let mut phat = PaddedVector::zeros(self.nobs());
        self.linear_predictor(&beta.view(), &mut eta, &mut phat);
        (eta.to_vec(), phat.to_vec())
    }

    /// η = clamp(Xβ) and p = σ(η).
    fn linear_predictor(
        &self,
        beta: &VectorView<'_, T>,
        eta: &mut PaddedVector<T>,
        phat: &mut PaddedVector<T>,
    ) {
        let limit = <T as Scalar>::from_f64(ETA_LIMIT);
        self.x.view().gemv(T::one(), beta, T::zero(), &mut eta.view_mut());
        for (e, p) in eta
            .as_mut_slice()
            .iter_mut()
            .zip(phat.as_mut_slice().iter_mut())
        {
            *e = (*e).max(-limit).min(limit);
            *p = T::one() / (T::one() + (-*e).exp());
        }
    }
}

impl<T: SimdOps> Objective<T> for LogisticRegression<T> {
    fn evaluate(&self, beta: &VectorView<'_, T>, gradient: &mut VectorViewMut<'_, T>) -> T {
        let mut eta = self.eta.borrow_mut();
        let mut phat = self.phat.borrow_mut();
        self.linear_predictor(beta, &mut eta, &mut phat);

        let softplus = eta
            .as_slice()
            .iter()
            .fold(T::zero(), |acc, &e| acc + e.exp().ln_1p());
        let value = softplus - eta.view().dot(&self.y.view());

        // p − y, then Xᵀ(p − y)
        phat.view_mut().sub_assign(&self.y.view());
        self.x
            .view()
            .gemv_transpose(T::one(), &phat.view(), T::zero(), gradient);
        value
    }

    fn dimension(&self) -> Option<usize> {
        Some(self.ncoef())
    }
}

/// Result of [`fit_logistic`].
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticFit<T> {
    /// Fitted coefficients β̂.
    pub coefficients: DVector<T>,
    /// Fitted probabilities σ(η̂).
    pub fitted_values: DVector<T>,
    /// Clamped linear predictors η̂ = Xβ̂.
    pub linear_predictors: DVector<T>,
    /// Log-likelihood at β̂.
    pub log_likelihood: T,
    /// True if the optimizer reported convergence.
    pub converged: bool,
    /// Why the optimizer stopped.
    pub termination_reason: TerminationReason,
    /// Optimizer iterations.
    pub iterations: usize,
    /// Objective evaluations.
    pub function_evaluations: usize,
}

/// Optimizer settings used by [`fit_logistic`]: the defaults with a
/// relative decrease tolerance of 1e-5.
pub fn default_fit_config<T: Scalar>() -> LBFGSConfig<T> {
    LBFGSConfig::new().with_delta(<T as Scalar>::from_f64(DEFAULT_FIT_DELTA))
}

/// Fits a logistic regression by maximum likelihood, starting from β = 0.
///
/// # Errors
///
/// Returns `OptimizerError::InvalidInput` for malformed data; see
/// [`LogisticRegression::new`].
pub fn fit_logistic<T: SimdOps>(x: &DMatrix<T>, y: &[T]) -> OptimizerResult<LogisticFit<T>> {
    fit_logistic_with_config(x, y, default_fit_config())
}

/// [`fit_logistic`] with explicit optimizer settings.
///
/// # Errors
///
/// Returns `OptimizerError` for malformed data or an invalid configuration.
pub fn fit_logistic_with_config<T: SimdOps>(
    x: &DMatrix<T>,
    y: &[T],
    config: LBFGSConfig<T>,
) -> OptimizerResult<LogisticFit<T>> {
    let model = LogisticRegression::new(x, y)?;
    let start = vec![T::zero(); model.ncoef()];
    let minimum = minimize(&model, &start, config)?;

    if minimum.converged() {
        debug!(
            "logistic fit: {} after {} iterations (log-likelihood {})",
            minimum.termination_reason(),
            minimum.result.iterations,
            -minimum.value()
        );
    } else {
        warn!(
            "logistic fit did not converge: {} after {} iterations",
            minimum.termination_reason(),
            minimum.result.iterations
        );
    }

    let (eta, phat) = model.predict(&minimum.point);
    Ok(LogisticFit {
        coefficients: minimum.point_dvector(),
        fitted_values: DVector::from_vec(phat),
        linear_predictors: DVector::from_vec(eta),
        log_likelihood: -minimum.value(),
        converged: minimum.converged(),
        termination_reason: minimum.termination_reason(),
        iterations: minimum.result.iterations,
        function_evaluations: minimum.result.function_evaluations,
    })
}

/// Draws a synthetic logistic regression data set.
///
/// The design matrix has an intercept column of ones followed by
/// `coefficients.len() − 1` standard normal columns; each response is a
/// Bernoulli draw with probability σ(xᵢᵀβ).
///
/// # Panics
///
/// Panics if `coefficients` is empty.
pub fn simulate_logistic<T, R>(nobs: usize, coefficients: &[T], rng: &mut R) -> (DMatrix<T>, Vec<T>)
where
    T: SimdOps,
    R: Rng + ?Sized,
    StandardNormal: Distribution<T>,
{
    assert!(!coefficients.is_empty(), "at least one coefficient is required");
    let p = coefficients.len();
    let x = DMatrix::from_fn(nobs, p, |_, j| {
        if j == 0 {
            T::one()
        } else {
            StandardNormal.sample(rng)
        }
    });

    let y = (0..nobs)
        .map(|i| {
            let eta = (0..p).fold(T::zero(), |acc, j| acc + x[(i, j)] * coefficients[j]);
            let prob = 1.0 / (1.0 + (-eta.as_f64()).exp());
            if rng.gen::<f64>() < prob {
                T::one()
            } else {
                T::zero()
            }
        })
        .collect();
    (x, y)
}
