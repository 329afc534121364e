//! CPU lane kernels.

pub mod simd;

pub use simd::{padded_len, SimdOps, SimdVector};
