//! Vector views over padded, caller-owned storage.
//!
//! A view pairs a borrowed slice of `padded_len(n)` elements with a logical
//! length `n`. Elementwise operations sweep the whole padded width in SIMD
//! lanes; reductions only read the first `n` entries.
//!
//! # Example
//!
//! ```rust
//! use quasinewton_core::view::{VectorView, VectorViewMut};
//!
//! let a = [1.0, 2.0, 3.0, 0.0];
//! let mut b = [0.5, 0.5, 0.5, 0.0];
//!
//! let x = VectorView::new(&a, 3).unwrap();
//! let mut y = VectorViewMut::new(&mut b, 3).unwrap();
//! y.axpy(2.0, &x);
//!
//! assert_eq!(y.as_slice(), &[2.5, 4.5, 6.5]);
//! assert_eq!(x.dot(&y.as_view()), 31.0);
//! ```

use crate::compute::cpu::simd::{dot_prefix, padded_len, sum_prefix, SimdOps, SimdVector};
use crate::error::{LinalgError, LinalgResult};
use num_traits::Float;
use std::fmt;
use std::ops::{Index, IndexMut};

/// Shared view of a padded vector.
#[derive(Clone, Copy)]
pub struct VectorView<'a, T> {
    data: &'a [T],
    len: usize,
}

/// Exclusive view of a padded vector.
pub struct VectorViewMut<'a, T> {
    data: &'a mut [T],
    len: usize,
}

impl<'a, T: SimdOps> VectorView<'a, T> {
    /// Creates a view of logical length `len` over `data`.
    ///
    /// `data` must hold at least `padded_len(len)` elements; any excess is
    /// ignored.
    pub fn new(data: &'a [T], len: usize) -> LinalgResult<Self> {
        let padded = padded_len::<T>(len);
        if data.len() < padded {
            return Err(LinalgError::insufficient_storage(padded, data.len()));
        }
        Ok(Self::from_parts(&data[..padded], len))
    }

    /// Wraps a slice already cut to exactly `padded_len(len)`.
    pub(crate) fn from_parts(data: &'a [T], len: usize) -> Self {
        debug_assert_eq!(data.len(), padded_len::<T>(len));
        Self { data, len }
    }

    /// Logical length.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the logical length is zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Length of the backing storage, a multiple of the lane width.
    #[inline]
    pub fn padded_len(&self) -> usize {
        self.data.len()
    }

    /// The logical entries.
    #[inline]
    pub fn as_slice(&self) -> &'a [T] {
        &self.data[..self.len]
    }

    /// The whole padded storage.
    #[inline]
    pub fn as_padded_slice(&self) -> &'a [T] {
        self.data
    }

    /// Inner product over the logical entries.
    ///
    /// # Panics
    ///
    /// Panics if the logical lengths differ.
    pub fn dot(&self, other: &VectorView<'_, T>) -> T {
        assert_eq!(self.len, other.len, "vector length mismatch in dot");
        dot_prefix(self.data, other.data, self.len)
    }

    /// Squared Euclidean norm.
    pub fn norm_squared(&self) -> T {
        dot_prefix(self.data, self.data, self.len)
    }

    /// Euclidean norm.
    pub fn norm(&self) -> T {
        self.norm_squared().sqrt()
    }

    /// Sum of the logical entries.
    pub fn sum(&self) -> T {
        sum_prefix(self.data, self.len)
    }

    /// Largest absolute value among the logical entries, zero when empty.
    pub fn max_abs(&self) -> T {
        self.as_slice()
            .iter()
            .fold(T::zero(), |acc, &v| acc.max(v.abs()))
    }

    /// Returns true if no logical entry is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        self.as_slice().iter().all(|v| v.is_finite())
    }

    /// Copies the logical entries into a new `Vec`.
    pub fn to_vec(&self) -> Vec<T> {
        self.as_slice().to_vec()
    }
}

impl<'a, T: SimdOps> VectorViewMut<'a, T> {
    /// Creates a mutable view of logical length `len` over `data`.
    pub fn new(data: &'a mut [T], len: usize) -> LinalgResult<Self> {
        let padded = padded_len::<T>(len);
        if data.len() < padded {
            return Err(LinalgError::insufficient_storage(padded, data.len()));
        }
        Ok(Self::from_parts(&mut data[..padded], len))
    }

    pub(crate) fn from_parts(data: &'a mut [T], len: usize) -> Self {
        debug_assert_eq!(data.len(), padded_len::<T>(len));
        Self { data, len }
    }

    /// Logical length.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the logical length is zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Length of the backing storage.
    #[inline]
    pub fn padded_len(&self) -> usize {
        self.data.len()
    }

    /// Reborrows as a shared view.
    #[inline]
    pub fn as_view(&self) -> VectorView<'_, T> {
        VectorView::from_parts(self.data, self.len)
    }

    /// The logical entries.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data[..self.len]
    }

    /// The logical entries, mutably. Padding is not reachable through this slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data[..self.len]
    }

    /// Sets every logical entry to `value` and every padding entry to zero.
    pub fn fill(&mut self, value: T) {
        let (logical, padding) = self.data.split_at_mut(self.len);
        logical.fill(value);
        padding.fill(T::zero());
    }

    /// Copies `src` into `self`, padding included.
    pub fn copy_from(&mut self, src: &VectorView<'_, T>) {
        assert_eq!(self.len, src.len, "vector length mismatch in copy_from");
        self.data.copy_from_slice(src.data);
    }

    /// `self ← self + alpha·x`
    pub fn axpy(&mut self, alpha: T, x: &VectorView<'_, T>) {
        assert_eq!(self.len, x.len, "vector length mismatch in axpy");
        let a = T::SimdVector::splat(alpha);
        sweep_binary(self.data, x.data, |s, x| x.mul_add(a, s));
    }

    /// `self ← alpha·self`
    pub fn scale(&mut self, alpha: T) {
        let a = T::SimdVector::splat(alpha);
        for lane in self.data.chunks_exact_mut(T::SIMD_WIDTH) {
            T::SimdVector::from_slice(lane).mul(a).store_to_slice(lane);
        }
    }

    /// `self ← self + x`
    pub fn add_assign(&mut self, x: &VectorView<'_, T>) {
        assert_eq!(self.len, x.len, "vector length mismatch in add_assign");
        sweep_binary(self.data, x.data, |s, x| s.add(x));
    }

    /// `self ← self − x`
    pub fn sub_assign(&mut self, x: &VectorView<'_, T>) {
        assert_eq!(self.len, x.len, "vector length mismatch in sub_assign");
        sweep_binary(self.data, x.data, |s, x| s.sub(x));
    }

    /// `self ← a − b`
    pub fn assign_diff(&mut self, a: &VectorView<'_, T>, b: &VectorView<'_, T>) {
        assert_eq!(self.len, a.len, "vector length mismatch in assign_diff");
        assert_eq!(self.len, b.len, "vector length mismatch in assign_diff");
        sweep_ternary(self.data, a.data, b.data, |a, b| a.sub(b));
    }

    /// `self ← alpha·x + y`
    pub fn assign_axpy(&mut self, alpha: T, x: &VectorView<'_, T>, y: &VectorView<'_, T>) {
        assert_eq!(self.len, x.len, "vector length mismatch in assign_axpy");
        assert_eq!(self.len, y.len, "vector length mismatch in assign_axpy");
        let a = T::SimdVector::splat(alpha);
        sweep_ternary(self.data, x.data, y.data, |x, y| x.mul_add(a, y));
    }

    /// `self ← alpha·x`
    pub fn assign_scaled(&mut self, alpha: T, x: &VectorView<'_, T>) {
        assert_eq!(self.len, x.len, "vector length mismatch in assign_scaled");
        let a = T::SimdVector::splat(alpha);
        sweep_binary(self.data, x.data, |_, x| x.mul(a));
    }

    /// See [`VectorView::dot`].
    pub fn dot(&self, other: &VectorView<'_, T>) -> T {
        self.as_view().dot(other)
    }

    /// See [`VectorView::norm`].
    pub fn norm(&self) -> T {
        self.as_view().norm()
    }

    /// See [`VectorView::norm_squared`].
    pub fn norm_squared(&self) -> T {
        self.as_view().norm_squared()
    }

    /// See [`VectorView::is_finite`].
    pub fn is_finite(&self) -> bool {
        self.as_view().is_finite()
    }
}

/// `dst[i] ← op(dst[i], src[i])` over whole lanes.
#[inline]
fn sweep_binary<T, F>(dst: &mut [T], src: &[T], op: F)
where
    T: SimdOps,
    F: Fn(T::SimdVector, T::SimdVector) -> T::SimdVector,
{
    let width = T::SIMD_WIDTH;
    for (d, s) in dst.chunks_exact_mut(width).zip(src.chunks_exact(width)) {
        let out = op(T::SimdVector::from_slice(d), T::SimdVector::from_slice(s));
        out.store_to_slice(d);
    }
}

/// `dst[i] ← op(a[i], b[i])` over whole lanes.
#[inline]
fn sweep_ternary<T, F>(dst: &mut [T], a: &[T], b: &[T], op: F)
where
    T: SimdOps,
    F: Fn(T::SimdVector, T::SimdVector) -> T::SimdVector,
{
    let width = T::SIMD_WIDTH;
    for ((d, a), b) in dst
        .chunks_exact_mut(width)
        .zip(a.chunks_exact(width))
        .zip(b.chunks_exact(width))
    {
        let out = op(T::SimdVector::from_slice(a), T::SimdVector::from_slice(b));
        out.store_to_slice(d);
    }
}

impl<T: SimdOps> Index<usize> for VectorView<'_, T> {
    type Output = T;

    fn index(&self, i: usize) -> &T {
        &self.as_slice()[i]
    }
}

impl<T: SimdOps> Index<usize> for VectorViewMut<'_, T> {
    type Output = T;

    fn index(&self, i: usize) -> &T {
        &self.as_slice()[i]
    }
}

impl<T: SimdOps> IndexMut<usize> for VectorViewMut<'_, T> {
    fn index_mut(&mut self, i: usize) -> &mut T {
        &mut self.as_mut_slice()[i]
    }
}

impl<T: SimdOps> fmt::Debug for VectorView<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VectorView")
            .field("len", &self.len)
            .field("data", &self.as_slice())
            .finish()
    }
}

impl<T: SimdOps> fmt::Debug for VectorViewMut<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VectorViewMut")
            .field("len", &self.len)
            .field("data", &self.as_slice())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn padded(values: &[f64]) -> Vec<f64> {
        let mut data = vec![0.0; padded_len::<f64>(values.len())];
        data[..values.len()].copy_from_slice(values);
        data
    }

    #[test]
    fn test_construction_checks_storage() {
        let data = [1.0, 2.0, 3.0];
        let err = VectorView::new(&data, 3).unwrap_err();
        assert_eq!(err, LinalgError::insufficient_storage(4, 3));

        let data = [0.0f64; 12];
        let view = VectorView::new(&data, 5).unwrap();
        assert_eq!(view.len(), 5);
        assert_eq!(view.padded_len(), 8);
    }

    #[test]
    fn test_empty_view() {
        let data: [f64; 0] = [];
        let view = VectorView::new(&data, 0).unwrap();
        assert!(view.is_empty());
        assert_eq!(view.norm(), 0.0);
        assert_eq!(view.max_abs(), 0.0);
    }

    #[test]
    fn test_reductions_ignore_padding() {
        let mut data = padded(&[3.0, 4.0, 0.0, 0.0, 12.0]);
        data[5] = 1e6;
        data[7] = -1e6;
        let v = VectorView::new(&data, 5).unwrap();

        assert_relative_eq!(v.norm(), 13.0);
        assert_relative_eq!(v.sum(), 19.0);
        assert_relative_eq!(v.max_abs(), 12.0);
        assert!(v.is_finite());
    }

    #[test]
    fn test_lane_sweeps_keep_zero_padding() {
        let x = padded(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let y = padded(&[5.0, 4.0, 3.0, 2.0, 1.0]);
        let mut z = vec![0.0; 8];

        let xv = VectorView::new(&x, 5).unwrap();
        let yv = VectorView::new(&y, 5).unwrap();
        let mut zv = VectorViewMut::new(&mut z, 5).unwrap();

        zv.assign_axpy(2.0, &xv, &yv);
        assert_eq!(zv.as_slice(), &[7.0, 8.0, 9.0, 10.0, 11.0]);
        zv.sub_assign(&yv);
        zv.scale(0.5);
        assert_eq!(zv.as_slice(), &[1.0, 2.0, 3.0, 4.0, 5.0]);
        zv.assign_diff(&xv, &yv);
        zv.add_assign(&yv);
        zv.assign_scaled(-1.0, &xv);
        zv.axpy(1.0, &xv);

        assert!(z.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_fill_zeroes_padding() {
        let mut data = vec![9.0; 8];
        let mut v = VectorViewMut::new(&mut data, 6).unwrap();
        v.fill(1.5);
        assert_eq!(data, vec![1.5, 1.5, 1.5, 1.5, 1.5, 1.5, 0.0, 0.0]);
    }

    #[test]
    fn test_non_finite_detection() {
        let data = padded(&[1.0, f64::NAN]);
        assert!(!VectorView::new(&data, 2).unwrap().is_finite());

        let data = padded(&[f64::INFINITY]);
        assert!(!VectorView::new(&data, 1).unwrap().is_finite());
    }

    #[test]
    #[should_panic(expected = "vector length mismatch")]
    fn test_length_mismatch_panics() {
        let a = padded(&[1.0, 2.0, 3.0]);
        let b = padded(&[1.0, 2.0]);
        let _ = VectorView::new(&a, 3)
            .unwrap()
            .dot(&VectorView::new(&b, 2).unwrap());
    }

    #[test]
    fn test_reductions_are_reproducible() {
        let values: Vec<f64> = (0..37).map(|i| (i as f64 * 0.37).sin()).collect();
        let data = padded(&values);
        let v = VectorView::new(&data, values.len()).unwrap();
        let first = v.dot(&v);
        for _ in 0..10 {
            assert_eq!(v.dot(&v).to_bits(), first.to_bits());
        }
    }

    #[test]
    fn test_indexing() {
        let mut data = padded(&[1.0, 2.0]);
        let mut v = VectorViewMut::new(&mut data, 2).unwrap();
        v[1] = 5.0;
        assert_eq!(v[1], 5.0);
        assert_eq!(v.as_view()[0], 1.0);
    }
}
