//! Core building blocks for quasi-Newton optimization.
//!
//! This crate provides the pieces every optimizer in the workspace is built
//! from: a generic scalar type, SIMD lanes, zero-padded storage with
//! non-owning views, the objective contract, and line searches.
//!
//! # Key Concepts
//!
//! - **Padded storage**: every vector is stored with its length rounded up
//!   to a multiple of the SIMD lane width, so elementwise sweeps never need
//!   a scalar tail
//! - **Views**: [`VectorView`](view::VectorView) and
//!   [`MatrixView`](view::MatrixView) borrow caller storage and never allocate
//! - **Objectives**: anything implementing [`Objective`](core::objective::Objective),
//!   including plain functions and closures
//! - **Line searches**: Armijo backtracking and Lewis–Overton Wolfe searches
//!
//! # Modules
//!
//! - [`compute`]: SIMD lane kernels and padding arithmetic
//! - [`core`]: scalar trait, errors and the objective contract
//! - [`memory`]: owned padded buffers
//! - [`optimization`]: optimizer trait, results, line searches, observers
//! - [`view`]: vector and matrix views

pub mod compute;
pub mod core;
pub mod memory;
pub mod optimization;
pub mod view;

pub use crate::core::{error, objective, types};

// Re-export commonly used items at the crate root
pub use crate::core::error::{
    LinalgError, LinalgResult, LineSearchError, LineSearchFailure, LineSearchOutcome,
    OptimizerError, OptimizerResult,
};

/// Prelude module for convenient imports.
///
/// # Example
/// ```
/// use quasinewton_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::compute::cpu::simd::{padded_len, SimdOps};
    pub use crate::core::error::{
        LinalgError, LinalgResult, LineSearchError, LineSearchFailure, LineSearchOutcome,
        OptimizerError, OptimizerResult,
    };
    pub use crate::core::objective::{CountingObjective, DerivativeChecker, Objective};
    pub use crate::core::types::{constants, DMatrix, DVector, Scalar};
    pub use crate::memory::{PaddedMatrix, PaddedVector};
    pub use crate::optimization::callback::{
        IterationReport, NoOpObserver, ProgressObserver, RecordingObserver,
    };
    pub use crate::optimization::line_search::{
        BacktrackingLineSearch, ConfiguredLineSearch, CurvatureCondition, LineSearch,
        LineSearchKind, LineSearchParams, LineSearchProblem, LineSearchResult, WolfeLineSearch,
    };
    pub use crate::optimization::optimizer::{OptimizationResult, Optimizer, TerminationReason};
    pub use crate::view::{MatrixView, MatrixViewMut, VectorView, VectorViewMut};
}
