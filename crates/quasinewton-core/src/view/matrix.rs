//! Column-major matrix views with padded column stride.
//!
//! Column `j` occupies `data[j * stride .. (j + 1) * stride]` with
//! `stride = padded_len(rows)`, so every column is itself a padded vector
//! and matrix-vector products reduce to lane sweeps and dot products.

use super::vector::{VectorView, VectorViewMut};
use crate::compute::cpu::simd::{padded_len, SimdOps};
use crate::error::{LinalgError, LinalgResult};
use std::fmt;

/// Shared view of a padded column-major matrix.
#[derive(Clone, Copy)]
pub struct MatrixView<'a, T> {
    data: &'a [T],
    rows: usize,
    cols: usize,
}

/// Exclusive view of a padded column-major matrix.
pub struct MatrixViewMut<'a, T> {
    data: &'a mut [T],
    rows: usize,
    cols: usize,
}

fn required_len<T: SimdOps>(rows: usize, cols: usize) -> usize {
    padded_len::<T>(rows) * cols
}

impl<'a, T: SimdOps> MatrixView<'a, T> {
    /// Creates a `rows × cols` view; `data` needs `padded_len(rows) * cols` elements.
    pub fn new(data: &'a [T], rows: usize, cols: usize) -> LinalgResult<Self> {
        let required = required_len::<T>(rows, cols);
        if data.len() < required {
            return Err(LinalgError::insufficient_storage(required, data.len()));
        }
        Ok(Self::from_parts(&data[..required], rows, cols))
    }

    pub(crate) fn from_parts(data: &'a [T], rows: usize, cols: usize) -> Self {
        debug_assert_eq!(data.len(), required_len::<T>(rows, cols));
        Self { data, rows, cols }
    }

    /// Number of rows.
    #[inline]
    pub fn nrows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[inline]
    pub fn ncols(&self) -> usize {
        self.cols
    }

    /// Distance between the starts of consecutive columns.
    #[inline]
    pub fn stride(&self) -> usize {
        padded_len::<T>(self.rows)
    }

    /// Entry at row `i`, column `j`.
    pub fn get(&self, i: usize, j: usize) -> T {
        assert!(i < self.rows && j < self.cols, "matrix index out of bounds");
        self.data[j * self.stride() + i]
    }

    /// Column `j` as a vector view of length `rows`.
    pub fn column(&self, j: usize) -> VectorView<'a, T> {
        assert!(j < self.cols, "column index out of bounds");
        let stride = self.stride();
        VectorView::from_parts(&self.data[j * stride..(j + 1) * stride], self.rows)
    }

    /// `y ← alpha·A·x + beta·y`
    ///
    /// When `beta` is zero the previous contents of `y` are discarded, so
    /// uninitialized NaNs in `y` do not leak into the result. Non-finite
    /// entries of `A` propagate even where the matching `x[j]` is zero.
    ///
    /// # Panics
    ///
    /// Panics if `x.len() != ncols` or `y.len() != nrows`.
    pub fn gemv(&self, alpha: T, x: &VectorView<'_, T>, beta: T, y: &mut VectorViewMut<'_, T>) {
        assert_eq!(x.len(), self.cols, "gemv: x length must equal column count");
        assert_eq!(y.len(), self.rows, "gemv: y length must equal row count");

        if beta == T::zero() {
            y.fill(T::zero());
        } else if beta != T::one() {
            y.scale(beta);
        }

        for j in 0..self.cols {
            y.axpy(alpha * x[j], &self.column(j));
        }
    }

    /// `y ← alpha·Aᵀ·x + beta·y`
    ///
    /// # Panics
    ///
    /// Panics if `x.len() != nrows` or `y.len() != ncols`.
    pub fn gemv_transpose(
        &self,
        alpha: T,
        x: &VectorView<'_, T>,
        beta: T,
        y: &mut VectorViewMut<'_, T>,
    ) {
        assert_eq!(x.len(), self.rows, "gemv_transpose: x length must equal row count");
        assert_eq!(y.len(), self.cols, "gemv_transpose: y length must equal column count");

        let out = y.as_mut_slice();
        for (j, yj) in out.iter_mut().enumerate() {
            let dot = self.column(j).dot(x);
            *yj = if beta == T::zero() {
                alpha * dot
            } else {
                alpha * dot + beta * *yj
            };
        }
    }
}

impl<'a, T: SimdOps> MatrixViewMut<'a, T> {
    /// Creates a mutable `rows × cols` view.
    pub fn new(data: &'a mut [T], rows: usize, cols: usize) -> LinalgResult<Self> {
        let required = required_len::<T>(rows, cols);
        if data.len() < required {
            return Err(LinalgError::insufficient_storage(required, data.len()));
        }
        Ok(Self::from_parts(&mut data[..required], rows, cols))
    }

    pub(crate) fn from_parts(data: &'a mut [T], rows: usize, cols: usize) -> Self {
        debug_assert_eq!(data.len(), required_len::<T>(rows, cols));
        Self { data, rows, cols }
    }

    /// Number of rows.
    #[inline]
    pub fn nrows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[inline]
    pub fn ncols(&self) -> usize {
        self.cols
    }

    /// Reborrows as a shared view.
    pub fn as_view(&self) -> MatrixView<'_, T> {
        MatrixView::from_parts(self.data, self.rows, self.cols)
    }

    /// Sets the entry at row `i`, column `j`.
    pub fn set(&mut self, i: usize, j: usize, value: T) {
        assert!(i < self.rows && j < self.cols, "matrix index out of bounds");
        let stride = padded_len::<T>(self.rows);
        self.data[j * stride + i] = value;
    }

    /// Column `j` as a mutable vector view.
    pub fn column_mut(&mut self, j: usize) -> VectorViewMut<'_, T> {
        assert!(j < self.cols, "column index out of bounds");
        let stride = padded_len::<T>(self.rows);
        VectorViewMut::from_parts(&mut self.data[j * stride..(j + 1) * stride], self.rows)
    }
}

impl<T: SimdOps> fmt::Debug for MatrixView<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatrixView")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .finish_non_exhaustive()
    }
}

impl<T: SimdOps> fmt::Debug for MatrixViewMut<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatrixViewMut")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // 3 × 2 matrix [[1, 4], [2, 5], [3, 6]] with stride 4.
    fn sample() -> Vec<f64> {
        vec![1.0, 2.0, 3.0, 0.0, 4.0, 5.0, 6.0, 0.0]
    }

    #[test]
    fn test_storage_check() {
        let data = vec![0.0; 7];
        let err = MatrixView::new(&data, 3, 2).unwrap_err();
        assert_eq!(err, LinalgError::insufficient_storage(8, 7));
    }

    #[test]
    fn test_gemv() {
        let data = sample();
        let a = MatrixView::new(&data, 3, 2).unwrap();
        let x = [1.0, -1.0, 0.0, 0.0];
        let mut y = [f64::NAN; 4];

        let mut yv = VectorViewMut::new(&mut y, 3).unwrap();
        a.gemv(1.0, &VectorView::new(&x, 2).unwrap(), 0.0, &mut yv);

        assert_eq!(yv.as_slice(), &[-3.0, -3.0, -3.0]);
        assert_eq!(y[3], 0.0);
    }

    #[test]
    fn test_gemv_propagates_nan_from_zero_weighted_column() {
        let mut data = sample();
        data[5] = f64::NAN;
        let a = MatrixView::new(&data, 3, 2).unwrap();
        let x = [1.0, 0.0, 0.0, 0.0];
        let mut y = [0.0; 4];

        let mut yv = VectorViewMut::new(&mut y, 3).unwrap();
        a.gemv(1.0, &VectorView::new(&x, 2).unwrap(), 0.0, &mut yv);

        assert_eq!(yv[0], 1.0);
        assert!(yv[1].is_nan());
        assert_eq!(yv[2], 3.0);
    }

    #[test]
    fn test_gemv_accumulates_with_beta() {
        let data = sample();
        let a = MatrixView::new(&data, 3, 2).unwrap();
        let x = [2.0, 1.0, 0.0, 0.0];
        let mut y = [1.0, 1.0, 1.0, 0.0];

        let mut yv = VectorViewMut::new(&mut y, 3).unwrap();
        a.gemv(0.5, &VectorView::new(&x, 2).unwrap(), 2.0, &mut yv);

        assert_relative_eq!(yv.as_slice()[0], 5.0);
        assert_relative_eq!(yv.as_slice()[1], 6.5);
        assert_relative_eq!(yv.as_slice()[2], 8.0);
    }

    #[test]
    fn test_gemv_transpose() {
        let data = sample();
        let a = MatrixView::new(&data, 3, 2).unwrap();
        let x = [1.0, 1.0, 1.0, 0.0];
        let mut y = [10.0, 10.0, 0.0, 0.0];

        let mut yv = VectorViewMut::new(&mut y, 2).unwrap();
        a.gemv_transpose(1.0, &VectorView::new(&x, 3).unwrap(), 1.0, &mut yv);

        assert_eq!(yv.as_slice(), &[16.0, 25.0]);
    }

    #[test]
    fn test_column_access() {
        let mut data = sample();
        let mut a = MatrixViewMut::new(&mut data, 3, 2).unwrap();
        a.set(2, 1, 9.0);
        a.column_mut(0).scale(2.0);

        let view = a.as_view();
        assert_eq!(view.column(0).as_slice(), &[2.0, 4.0, 6.0]);
        assert_eq!(view.get(2, 1), 9.0);
        assert_eq!(view.stride(), 4);
    }

    #[test]
    #[should_panic(expected = "gemv: x length")]
    fn test_gemv_shape_mismatch_panics() {
        let data = sample();
        let a = MatrixView::new(&data, 3, 2).unwrap();
        let x = [1.0, 1.0, 1.0, 0.0];
        let mut y = [0.0; 4];
        let mut yv = VectorViewMut::new(&mut y, 3).unwrap();
        a.gemv(1.0, &VectorView::new(&x, 3).unwrap(), 0.0, &mut yv);
    }
}
