//! Correction-pair history and the two-loop recursion.
//!
//! The history is a fixed-capacity ring of (sₖ, yₖ) pairs with
//! sₖ = xₖ₊₁ − xₖ and yₖ = ∇f(xₖ₊₁) − ∇f(xₖ). All slots are allocated up
//! front; pushing at capacity overwrites the oldest pair.
//!
//! ## Two-Loop Recursion
//!
//! ```text
//! q = -g
//! for i = newest .. oldest:
//!     αᵢ = ρᵢ ⟨sᵢ, q⟩
//!     q  = q − αᵢ yᵢ
//! q = γ q,   γ = ⟨s, y⟩ / ⟨y, y⟩ of the newest pair
//! for i = oldest .. newest:
//!     β = ρᵢ ⟨yᵢ, q⟩
//!     q = q + (αᵢ − β) sᵢ
//! d = q  (= −H g)
//! ```

use quasinewton_core::memory::PaddedVector;
use quasinewton_core::prelude::*;

/// Ring buffer of the most recent correction pairs.
#[derive(Debug, Clone)]
pub struct History<T> {
    s: Vec<PaddedVector<T>>,
    y: Vec<PaddedVector<T>>,
    rho: Vec<T>,
    alpha: Vec<T>,
    gamma: T,
    head: usize,
    len: usize,
}

impl<T: SimdOps> History<T> {
    /// Allocates `capacity` pairs of vectors of dimension `dim`.
    pub fn new(capacity: usize, dim: usize) -> Self {
        Self {
            s: (0..capacity).map(|_| PaddedVector::zeros(dim)).collect(),
            y: (0..capacity).map(|_| PaddedVector::zeros(dim)).collect(),
            rho: vec![T::zero(); capacity],
            alpha: vec![T::zero(); capacity],
            gamma: T::one(),
            head: 0,
            len: 0,
        }
    }

    /// Maximum number of stored pairs.
    pub fn capacity(&self) -> usize {
        self.rho.len()
    }

    /// Number of stored pairs.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if no pair is stored.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drops every stored pair.
    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
        self.gamma = T::one();
    }

    /// Slot of the `i`-th pair counted from the oldest.
    fn slot(&self, i: usize) -> usize {
        let cap = self.capacity();
        (self.head + cap - self.len + i) % cap
    }

    /// Stores a new pair, evicting the oldest at capacity.
    ///
    /// `ys = ⟨s, y⟩` must be positive; callers filter pairs with the
    /// cautious test first.
    pub fn push(&mut self, s: &VectorView<'_, T>, y: &VectorView<'_, T>, ys: T) {
        let cap = self.capacity();
        if cap == 0 {
            return;
        }
        let slot = self.head;
        self.s[slot].view_mut().copy_from(s);
        self.y[slot].view_mut().copy_from(y);
        self.rho[slot] = T::one() / ys;
        self.gamma = ys / y.norm_squared();

        self.head = (self.head + 1) % cap;
        self.len = (self.len + 1).min(cap);
    }

    /// The `i`-th pair counted from the oldest, with its ρ = 1/⟨s, y⟩.
    ///
    /// # Panics
    ///
    /// Panics if `i >= len()`.
    pub fn pair(&self, i: usize) -> (VectorView<'_, T>, VectorView<'_, T>, T) {
        assert!(i < self.len, "history index out of range");
        let slot = self.slot(i);
        (self.s[slot].view(), self.y[slot].view(), self.rho[slot])
    }

    /// Writes the quasi-Newton direction `d = −H·g` into `d`.
    ///
    /// With an empty history this is steepest descent, `d = −g`.
    pub fn direction(&mut self, g: &VectorView<'_, T>, d: &mut VectorViewMut<'_, T>) {
        d.assign_scaled(-T::one(), g);
        if self.len == 0 {
            return;
        }

        for i in (0..self.len).rev() {
            let slot = self.slot(i);
            let alpha = self.rho[slot] * self.s[slot].view().dot(&d.as_view());
            self.alpha[slot] = alpha;
            d.axpy(-alpha, &self.y[slot].view());
        }

        d.scale(self.gamma);

        for i in 0..self.len {
            let slot = self.slot(i);
            let beta = self.rho[slot] * self.y[slot].view().dot(&d.as_view());
            d.axpy(self.alpha[slot] - beta, &self.s[slot].view());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{DMatrix, DVector};

    fn vec_of(values: &[f64]) -> PaddedVector<f64> {
        PaddedVector::from_slice(values)
    }

    #[test]
    fn test_empty_history_gives_steepest_descent() {
        let mut history = History::<f64>::new(4, 3);
        let g = vec_of(&[1.0, -2.0, 0.5]);
        let mut d = PaddedVector::zeros(3);
        history.direction(&g.view(), &mut d.view_mut());
        assert_eq!(d.as_slice(), &[-1.0, 2.0, -0.5]);
    }

    #[test]
    fn test_fifo_eviction() {
        let mut history = History::<f64>::new(3, 2);
        for k in 1..=4 {
            let s = vec_of(&[k as f64, 0.0]);
            let y = vec_of(&[1.0, 0.0]);
            history.push(&s.view(), &y.view(), k as f64);
            assert!(history.len() <= history.capacity());
        }

        assert_eq!(history.len(), 3);
        let firsts: Vec<f64> = (0..3).map(|i| history.pair(i).0[0]).collect();
        assert_eq!(firsts, vec![2.0, 3.0, 4.0]);
        assert_relative_eq!(history.pair(0).2, 0.5);

        history.clear();
        assert!(history.is_empty());
    }

    #[test]
    fn test_direction_matches_bfgs_inverse_on_quadratic() {
        // For f = ½xᵀAx with A-conjugate steps and yᵢ = Asᵢ, n updates recover A⁻¹.
        let a = DMatrix::from_row_slice(2, 2, &[4.0, 1.0, 1.0, 3.0]);
        let mut history = History::<f64>::new(2, 2);
        for s in [DVector::from_vec(vec![1.0, 0.0]), DVector::from_vec(vec![1.0, -4.0])] {
            let y = &a * &s;
            let ys = s.dot(&y);
            history.push(
                &PaddedVector::from_dvector(&s).view(),
                &PaddedVector::from_dvector(&y).view(),
                ys,
            );
        }

        let g = DVector::from_vec(vec![1.0, 2.0]);
        let mut d = PaddedVector::zeros(2);
        history.direction(&PaddedVector::from_dvector(&g).view(), &mut d.view_mut());

        let expected = -(a.clone().try_inverse().unwrap() * g);
        assert_relative_eq!(d.as_slice()[0], expected[0], epsilon = 1e-12);
        assert_relative_eq!(d.as_slice()[1], expected[1], epsilon = 1e-12);
    }

    #[test]
    fn test_direction_is_descent_with_positive_curvature() {
        let mut history = History::<f64>::new(2, 3);
        history.push(
            &vec_of(&[0.1, -0.2, 0.3]).view(),
            &vec_of(&[0.2, -0.1, 0.4]).view(),
            0.02 + 0.02 + 0.12,
        );
        let g = vec_of(&[1.0, 1.0, -1.0]);
        let mut d = PaddedVector::zeros(3);
        history.direction(&g.view(), &mut d.view_mut());
        assert!(g.view().dot(&d.view()) < 0.0);
        assert!(d.padding_is_zero());
    }
}
