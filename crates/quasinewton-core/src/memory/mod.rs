//! Owned, zero-padded buffers that hand out views.

pub mod padded;

pub use padded::{PaddedMatrix, PaddedVector};
