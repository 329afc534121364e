//! Non-owning vector and matrix views over padded storage.
//!
//! Views never allocate. Storage comes from the caller, typically a
//! [`PaddedVector`](crate::memory::PaddedVector) or
//! [`PaddedMatrix`](crate::memory::PaddedMatrix), and must be zero-padded
//! past the logical length.

pub mod matrix;
pub mod vector;

pub use matrix::{MatrixView, MatrixViewMut};
pub use vector::{VectorView, VectorViewMut};
