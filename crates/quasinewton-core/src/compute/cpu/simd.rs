//! SIMD lanes for padded vector sweeps.
//!
//! This module maps each scalar type to a lane type from the `wide` crate and
//! defines the padded width used by every buffer in the workspace. Storage
//! padded to a multiple of [`SimdOps::SIMD_WIDTH`] can be swept lane by lane
//! with no scalar tail.
//!
//! # Example
//!
//! ```rust
//! use quasinewton_core::compute::cpu::simd::{padded_len, SimdOps};
//!
//! assert_eq!(<f64 as SimdOps>::SIMD_WIDTH, 4);
//! assert_eq!(padded_len::<f64>(5), 8);
//! assert_eq!(padded_len::<f32>(5), 8);
//! assert_eq!(padded_len::<f64>(0), 0);
//! ```

use crate::types::Scalar;
use wide::{f32x8, f64x4};

/// SIMD operations for different scalar types
pub trait SimdOps: Scalar {
    /// SIMD vector type for this scalar
    type SimdVector: SimdVector<Scalar = Self>;

    /// Number of elements in SIMD vector
    const SIMD_WIDTH: usize;
}

/// Trait for SIMD vector operations
pub trait SimdVector: Copy {
    type Scalar: Scalar;

    /// Load the first lane-width elements of a slice.
    fn from_slice(slice: &[Self::Scalar]) -> Self;

    /// Store into the first lane-width elements of a slice.
    fn store_to_slice(self, slice: &mut [Self::Scalar]);

    /// Splat a single value
    fn splat(value: Self::Scalar) -> Self;

    /// Add two vectors
    fn add(self, other: Self) -> Self;

    /// Subtract two vectors
    fn sub(self, other: Self) -> Self;

    /// Multiply two vectors
    fn mul(self, other: Self) -> Self;

    /// Fused multiply-add: self * mul + add
    fn mul_add(self, mul: Self, add: Self) -> Self;

    /// Horizontal sum, always left to right across lanes
    fn horizontal_sum(self) -> Self::Scalar;
}

impl SimdVector for f32x8 {
    type Scalar = f32;

    fn from_slice(slice: &[f32]) -> Self {
        f32x8::from([
            slice[0], slice[1], slice[2], slice[3], slice[4], slice[5], slice[6], slice[7],
        ])
    }

    fn store_to_slice(self, slice: &mut [f32]) {
        let arr = self.to_array();
        slice[..8].copy_from_slice(&arr);
    }

    fn splat(value: f32) -> Self {
        f32x8::splat(value)
    }

    fn add(self, other: Self) -> Self {
        self + other
    }

    fn sub(self, other: Self) -> Self {
        self - other
    }

    fn mul(self, other: Self) -> Self {
        self * other
    }

    fn mul_add(self, mul: Self, add: Self) -> Self {
        f32x8::mul_add(self, mul, add)
    }

    fn horizontal_sum(self) -> f32 {
        let arr = self.to_array();
        arr.iter().fold(0.0, |acc, &v| acc + v)
    }
}

impl SimdVector for f64x4 {
    type Scalar = f64;

    fn from_slice(slice: &[f64]) -> Self {
        f64x4::from([slice[0], slice[1], slice[2], slice[3]])
    }

    fn store_to_slice(self, slice: &mut [f64]) {
        let arr = self.to_array();
        slice[..4].copy_from_slice(&arr);
    }

    fn splat(value: f64) -> Self {
        f64x4::splat(value)
    }

    fn add(self, other: Self) -> Self {
        self + other
    }

    fn sub(self, other: Self) -> Self {
        self - other
    }

    fn mul(self, other: Self) -> Self {
        self * other
    }

    fn mul_add(self, mul: Self, add: Self) -> Self {
        f64x4::mul_add(self, mul, add)
    }

    fn horizontal_sum(self) -> f64 {
        let arr = self.to_array();
        arr.iter().fold(0.0, |acc, &v| acc + v)
    }
}

impl SimdOps for f32 {
    type SimdVector = f32x8;
    const SIMD_WIDTH: usize = 8;
}

impl SimdOps for f64 {
    type SimdVector = f64x4;
    const SIMD_WIDTH: usize = 4;
}

/// Rounds `n` up to the next multiple of the lane width of `T`.
#[inline]
pub fn padded_len<T: SimdOps>(n: usize) -> usize {
    n.next_multiple_of(T::SIMD_WIDTH)
}

/// Lane-wise dot product of the first `n` entries of two slices.
///
/// Full lanes are accumulated into one lane register, the register is
/// reduced left to right, then the scalar tail is added in index order. The
/// order depends only on `n`, so results are reproducible bit for bit.
pub(crate) fn dot_prefix<T: SimdOps>(a: &[T], b: &[T], n: usize) -> T {
    let width = T::SIMD_WIDTH;
    let simd_end = n - (n % width);

    let mut sum = T::SimdVector::splat(T::zero());
    for i in (0..simd_end).step_by(width) {
        let va = T::SimdVector::from_slice(&a[i..]);
        let vb = T::SimdVector::from_slice(&b[i..]);
        sum = va.mul_add(vb, sum);
    }

    let mut result = sum.horizontal_sum();
    for i in simd_end..n {
        result = result + a[i] * b[i];
    }
    result
}

/// Lane-wise sum of the first `n` entries of a slice, same order as [`dot_prefix`].
pub(crate) fn sum_prefix<T: SimdOps>(a: &[T], n: usize) -> T {
    let width = T::SIMD_WIDTH;
    let simd_end = n - (n % width);

    let mut sum = T::SimdVector::splat(T::zero());
    for i in (0..simd_end).step_by(width) {
        sum = sum.add(T::SimdVector::from_slice(&a[i..]));
    }

    let mut result = sum.horizontal_sum();
    for value in &a[simd_end..n] {
        result = result + *value;
    }
    result
}
