//! Computational kernels.

pub mod cpu;

pub use cpu::*;
