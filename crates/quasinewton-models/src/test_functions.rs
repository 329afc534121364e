//! Classic smooth test problems for unconstrained minimization.
//!
//! Every problem implements [`Objective`] for both `f32` and `f64` and
//! writes its analytic gradient.
//!
//! | problem | minimizer | minimum |
//! |---|---|---|
//! | [`Rosenbrock`] | (1, 1) | 0 |
//! | [`ExtendedRosenbrock`] | (1, …, 1) | 0 |
//! | [`Booth`] | (1, 3) | 0 |
//! | [`QuadraticForm`] | A⁻¹b | −½ bᵀA⁻¹b |

use quasinewton_core::prelude::*;

/// Rosenbrock's banana function f(x) = a(x₁ − x₀²)² + (1 − x₀)².
///
/// The minimizer sits at the bottom of a long curved valley, which makes
/// the problem a standard check of curvature handling.
#[derive(Debug, Clone, Copy)]
pub struct Rosenbrock<T> {
    a: T,
}

impl<T: Scalar> Rosenbrock<T> {
    /// The usual scaling a = 100.
    pub fn new() -> Self {
        Self::with_scale(<T as Scalar>::from_f64(100.0))
    }

    /// Custom valley steepness.
    pub fn with_scale(a: T) -> Self {
        Self { a }
    }

    /// Standard starting point (−1.2, 1).
    pub fn starting_point() -> Vec<T> {
        vec![<T as Scalar>::from_f64(-1.2), T::one()]
    }
}

impl<T: Scalar> Default for Rosenbrock<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: SimdOps> Objective<T> for Rosenbrock<T> {
    fn evaluate(&self, x: &VectorView<'_, T>, gradient: &mut VectorViewMut<'_, T>) -> T {
        let two = <T as Scalar>::from_f64(2.0);
        let t = x[1] - x[0] * x[0];
        let u = T::one() - x[0];
        gradient[0] = -two * two * self.a * x[0] * t - two * u;
        gradient[1] = two * self.a * t;
        self.a * t * t + u * u
    }

    fn dimension(&self) -> Option<usize> {
        Some(2)
    }
}

/// Sum of independent Rosenbrock terms over consecutive pairs.
///
/// f(x) = Σᵢ (1 − x₂ᵢ)² + 100(x₂ᵢ₊₁ − x₂ᵢ²)²
#[derive(Debug, Clone, Copy)]
pub struct ExtendedRosenbrock {
    dim: usize,
}

impl ExtendedRosenbrock {
    /// Problem in `dim` variables.
    ///
    /// # Errors
    ///
    /// Returns `OptimizerError::InvalidInput` unless `dim` is even and
    /// positive.
    pub fn new(dim: usize) -> OptimizerResult<Self> {
        if dim == 0 || dim % 2 != 0 {
            return Err(OptimizerError::invalid_input(format!(
                "extended Rosenbrock needs a positive even dimension, got {}",
                dim
            )));
        }
        Ok(Self { dim })
    }

    /// Starting point (−1.2, 1, −1.2, 1, …).
    pub fn starting_point<T: Scalar>(&self) -> Vec<T> {
        (0..self.dim)
            .map(|i| {
                if i % 2 == 0 {
                    <T as Scalar>::from_f64(-1.2)
                } else {
                    T::one()
                }
            })
            .collect()
    }
}

impl<T: SimdOps> Objective<T> for ExtendedRosenbrock {
    fn evaluate(&self, x: &VectorView<'_, T>, gradient: &mut VectorViewMut<'_, T>) -> T {
        let two = <T as Scalar>::from_f64(2.0);
        let ten = <T as Scalar>::from_f64(10.0);
        let twenty = <T as Scalar>::from_f64(20.0);

        let mut f = T::zero();
        for i in (0..self.dim).step_by(2) {
            let t1 = T::one() - x[i];
            let t2 = ten * (x[i + 1] - x[i] * x[i]);
            gradient[i + 1] = twenty * t2;
            gradient[i] = -two * (x[i] * gradient[i + 1] + t1);
            f = f + t1 * t1 + t2 * t2;
        }
        f
    }

    fn dimension(&self) -> Option<usize> {
        Some(self.dim)
    }
}

/// Booth's function f(x) = (x₀ + 2x₁ − 7)² + (2x₀ + x₁ − 5)².
#[derive(Debug, Clone, Copy, Default)]
pub struct Booth;

impl<T: SimdOps> Objective<T> for Booth {
    fn evaluate(&self, x: &VectorView<'_, T>, gradient: &mut VectorViewMut<'_, T>) -> T {
        let two = <T as Scalar>::from_f64(2.0);
        let four = <T as Scalar>::from_f64(4.0);
        let a = x[0] + two * x[1] - <T as Scalar>::from_f64(7.0);
        let b = two * x[0] + x[1] - <T as Scalar>::from_f64(5.0);
        gradient[0] = two * a + four * b;
        gradient[1] = four * a + two * b;
        a * a + b * b
    }

    fn dimension(&self) -> Option<usize> {
        Some(2)
    }
}

/// Convex quadratic f(x) = ½ xᵀAx − bᵀx with symmetric positive definite A.
///
/// The gradient Ax − b is formed with the padded matrix-vector product, so
/// evaluation costs one `gemv`.
#[derive(Debug, Clone)]
pub struct QuadraticForm<T> {
    a: PaddedMatrix<T>,
    b: PaddedVector<T>,
}

impl<T: SimdOps> QuadraticForm<T> {
    /// Builds the quadratic from A and b.
    ///
    /// # Errors
    ///
    /// Returns `OptimizerError::DimensionMismatch` if A is not square or b
    /// does not match its size, and `InvalidInput` if A is not symmetric.
    /// Positive definiteness is not checked.
    pub fn new(a: &DMatrix<T>, b: &[T]) -> OptimizerResult<Self> {
        if a.nrows() != a.ncols() {
            return Err(OptimizerError::DimensionMismatch {
                point: a.nrows(),
                objective: a.ncols(),
            });
        }
        if b.len() != a.nrows() {
            return Err(OptimizerError::DimensionMismatch {
                point: b.len(),
                objective: a.nrows(),
            });
        }
        let n = a.nrows();
        for i in 0..n {
            for j in (i + 1)..n {
                let scale = T::one().max(a[(i, j)].abs());
                if (a[(i, j)] - a[(j, i)]).abs() > T::EPSILON.sqrt() * scale {
                    return Err(OptimizerError::invalid_input(format!(
                        "quadratic form matrix is not symmetric at ({}, {})",
                        i, j
                    )));
                }
            }
        }

        Ok(Self {
            a: PaddedMatrix::from_dmatrix(a),
            b: PaddedVector::from_slice(b),
        })
    }

    /// Number of variables.
    pub fn dim(&self) -> usize {
        self.b.len()
    }
}

impl<T: SimdOps> Objective<T> for QuadraticForm<T> {
    fn evaluate(&self, x: &VectorView<'_, T>, gradient: &mut VectorViewMut<'_, T>) -> T {
        let half = <T as Scalar>::from_f64(0.5);
        self.a.view().gemv(T::one(), x, T::zero(), gradient);
        let value = half * gradient.dot(x) - self.b.view().dot(x);
        gradient.sub_assign(&self.b.view());
        value
    }

    fn dimension(&self) -> Option<usize> {
        Some(self.dim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn evaluate<O: Objective<f64>>(objective: &O, point: &[f64]) -> (f64, Vec<f64>) {
        let x = PaddedVector::from_slice(point);
        let mut g = PaddedVector::zeros(point.len());
        let f = objective.evaluate(&x.view(), &mut g.view_mut());
        (f, g.to_vec())
    }

    #[test]
    fn test_minimizers_are_stationary() {
        let (f, g) = evaluate(&Rosenbrock::new(), &[1.0, 1.0]);
        assert_eq!(f, 0.0);
        assert_eq!(g, vec![0.0, 0.0]);

        let (f, g) = evaluate(&Booth, &[1.0, 3.0]);
        assert_eq!(f, 0.0);
        assert_eq!(g, vec![0.0, 0.0]);

        let (f, g) = evaluate(&ExtendedRosenbrock::new(6).unwrap(), &[1.0; 6]);
        assert_eq!(f, 0.0);
        assert!(g.iter().all(|&gi| gi == 0.0));
    }

    #[test]
    fn test_rosenbrock_standard_start() {
        let (f, g) = evaluate(&Rosenbrock::new(), &Rosenbrock::<f64>::starting_point());
        assert_relative_eq!(f, 24.2, epsilon = 1e-12);
        assert_relative_eq!(g[0], -215.6, epsilon = 1e-10);
        assert_relative_eq!(g[1], -88.0, epsilon = 1e-10);
    }

    #[test]
    fn test_extended_rosenbrock_matches_pairwise_sum() {
        let problem = ExtendedRosenbrock::new(4).unwrap();
        let x = [-1.2, 1.0, 0.5, 0.3];
        let (f, _) = evaluate(&problem, &x);
        let pair = |a: f64, b: f64| (1.0 - a).powi(2) + 100.0 * (b - a * a).powi(2);
        assert_relative_eq!(f, pair(-1.2, 1.0) + pair(0.5, 0.3), epsilon = 1e-12);

        assert!(ExtendedRosenbrock::new(3).is_err());
        assert!(ExtendedRosenbrock::new(0).is_err());
        assert_eq!(problem.starting_point::<f64>(), vec![-1.2, 1.0, -1.2, 1.0]);
    }

    #[test]
    fn test_gradients_match_finite_differences() {
        let point = [0.3, -0.7, 1.1, 0.2];
        let (ok, err) = DerivativeChecker::check_gradient(
            &ExtendedRosenbrock::new(4).unwrap(),
            &point,
            1e-5,
        );
        assert!(ok, "max error {}", err);

        let (ok, err) = DerivativeChecker::check_gradient(&Booth, &[0.3, -0.7], 1e-5);
        assert!(ok, "max error {}", err);

        let a = DMatrix::from_row_slice(3, 3, &[4.0, 1.0, 0.0, 1.0, 3.0, 0.5, 0.0, 0.5, 2.0]);
        let quadratic = QuadraticForm::new(&a, &[1.0, -2.0, 0.5]).unwrap();
        let (ok, err) = DerivativeChecker::check_gradient(&quadratic, &[0.3, -0.7, 1.1], 1e-6);
        assert!(ok, "max error {}", err);
    }

    #[test]
    fn test_quadratic_form_value() {
        let a = DMatrix::from_row_slice(2, 2, &[2.0, 0.0, 0.0, 4.0]);
        let quadratic = QuadraticForm::new(&a, &[2.0, 4.0]).unwrap();
        // Minimizer A⁻¹b = (1, 1), minimum −½ bᵀA⁻¹b = −3.
        let (f, g) = evaluate(&quadratic, &[1.0, 1.0]);
        assert_relative_eq!(f, -3.0);
        assert_eq!(g, vec![0.0, 0.0]);
    }

    #[test]
    fn test_quadratic_form_rejects_bad_shapes() {
        let rect = DMatrix::<f64>::zeros(2, 3);
        assert!(matches!(
            QuadraticForm::new(&rect, &[0.0, 0.0]),
            Err(OptimizerError::DimensionMismatch { .. })
        ));

        let square = DMatrix::<f64>::identity(2, 2);
        assert!(QuadraticForm::new(&square, &[0.0]).is_err());

        let skew = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 0.0, 1.0]);
        assert!(matches!(
            QuadraticForm::new(&skew, &[0.0, 0.0]),
            Err(OptimizerError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_f32_evaluation() {
        let x = PaddedVector::from_slice(&[1.0f32, 3.0]);
        let mut g = PaddedVector::zeros(2);
        let f = Objective::<f32>::evaluate(&Booth, &x.view(), &mut g.view_mut());
        assert_eq!(f, 0.0f32);
    }
}
