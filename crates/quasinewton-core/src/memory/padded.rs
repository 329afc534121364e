//! Owned padded storage.
//!
//! These are the allocation side of the view layer: they round the logical
//! size up to the lane width, zero the padding, and convert to and from
//! plain slices and nalgebra containers.

use crate::compute::cpu::simd::{padded_len, SimdOps};
use crate::types::{DMatrix, DVector};
use crate::view::{MatrixView, MatrixViewMut, VectorView, VectorViewMut};
use num_traits::Zero;

/// Heap vector whose storage is padded to the lane width.
#[derive(Debug, Clone, PartialEq)]
pub struct PaddedVector<T> {
    data: Vec<T>,
    len: usize,
}

impl<T: SimdOps> PaddedVector<T> {
    /// Zero vector of logical length `len`.
    pub fn zeros(len: usize) -> Self {
        Self {
            data: vec![T::zero(); padded_len::<T>(len)],
            len,
        }
    }

    /// Copies `values` into fresh padded storage.
    pub fn from_slice(values: &[T]) -> Self {
        let mut out = Self::zeros(values.len());
        out.data[..values.len()].copy_from_slice(values);
        out
    }

    /// Copies an nalgebra vector into fresh padded storage.
    pub fn from_dvector(v: &DVector<T>) -> Self {
        Self::from_slice(v.as_slice())
    }

    /// Logical length.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the logical length is zero.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The logical entries.
    pub fn as_slice(&self) -> &[T] {
        &self.data[..self.len]
    }

    /// The logical entries, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data[..self.len]
    }

    /// Shared view.
    pub fn view(&self) -> VectorView<'_, T> {
        VectorView::from_parts(&self.data, self.len)
    }

    /// Exclusive view.
    pub fn view_mut(&mut self) -> VectorViewMut<'_, T> {
        VectorViewMut::from_parts(&mut self.data, self.len)
    }

    /// Returns true if the padding past the logical length is all zero.
    pub fn padding_is_zero(&self) -> bool {
        self.data[self.len..].iter().all(|v| v.is_zero())
    }

    /// Copies the logical entries out.
    pub fn to_vec(&self) -> Vec<T> {
        self.as_slice().to_vec()
    }

    /// Copies the logical entries into an nalgebra vector.
    pub fn to_dvector(&self) -> DVector<T> {
        DVector::from_column_slice(self.as_slice())
    }
}

impl<T: SimdOps> From<&[T]> for PaddedVector<T> {
    fn from(values: &[T]) -> Self {
        Self::from_slice(values)
    }
}

/// Heap column-major matrix with each column padded to the lane width.
#[derive(Debug, Clone, PartialEq)]
pub struct PaddedMatrix<T> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
}

impl<T: SimdOps> PaddedMatrix<T> {
    /// Zero matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![T::zero(); padded_len::<T>(rows) * cols],
            rows,
            cols,
        }
    }

    /// Builds from densely packed column-major values (`rows * cols` entries).
    ///
    /// # Panics
    ///
    /// Panics if `values.len() != rows * cols`.
    pub fn from_column_slice(rows: usize, cols: usize, values: &[T]) -> Self {
        assert_eq!(values.len(), rows * cols, "column slice has the wrong length");
        let mut out = Self::zeros(rows, cols);
        let stride = padded_len::<T>(rows);
        if rows > 0 {
            for (j, column) in values.chunks_exact(rows).enumerate() {
                out.data[j * stride..j * stride + rows].copy_from_slice(column);
            }
        }
        out
    }

    /// Copies an nalgebra matrix.
    pub fn from_dmatrix(m: &DMatrix<T>) -> Self {
        Self::from_column_slice(m.nrows(), m.ncols(), m.as_slice())
    }

    /// Number of rows.
    pub fn nrows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn ncols(&self) -> usize {
        self.cols
    }

    /// Shared view.
    pub fn view(&self) -> MatrixView<'_, T> {
        MatrixView::from_parts(&self.data, self.rows, self.cols)
    }

    /// Exclusive view.
    pub fn view_mut(&mut self) -> MatrixViewMut<'_, T> {
        MatrixViewMut::from_parts(&mut self.data, self.rows, self.cols)
    }

    /// Copies into an nalgebra matrix.
    pub fn to_dmatrix(&self) -> DMatrix<T> {
        let view = self.view();
        DMatrix::from_fn(self.rows, self.cols, |i, j| view.get(i, j))
    }
}

impl<T: SimdOps> From<&DMatrix<T>> for PaddedMatrix<T> {
    fn from(m: &DMatrix<T>) -> Self {
        Self::from_dmatrix(m)
    }
}

impl<T: SimdOps> Default for PaddedVector<T> {
    fn default() -> Self {
        Self::zeros(0)
    }
}
