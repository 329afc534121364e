//! Quasi-Newton optimization algorithms.
//!
//! This crate provides the limited-memory BFGS optimizer on top of the
//! padded views and line searches of `quasinewton-core`.
//!
//! # Available Optimizers
//!
//! - **L-BFGS**: Limited memory Broyden-Fletcher-Goldfarb-Shanno with
//!   cautious updates and Lewis–Overton or backtracking line searches
//!
//! # Examples
//!
//! ```rust
//! use quasinewton_core::prelude::*;
//! use quasinewton_optim::{minimize, LBFGSConfig};
//!
//! // f(x) = Σ (xᵢ − i)²
//! fn shifted(x: &VectorView<f64>, g: &mut VectorViewMut<f64>) -> f64 {
//!     let mut f = 0.0;
//!     for i in 0..x.len() {
//!         let r = x[i] - i as f64;
//!         g[i] = 2.0 * r;
//!         f += r * r;
//!     }
//!     f
//! }
//!
//! let minimum = minimize(&shifted, &[5.0; 4], LBFGSConfig::new()).unwrap();
//! assert!(minimum.converged());
//! assert!((minimum.point[3] - 3.0).abs() < 1e-4);
//! ```

pub mod history;
pub mod lbfgs;

// Re-export main optimizers for convenience
pub use history::History;
pub use lbfgs::{minimize, Minimum, LBFGSConfig, LBFGS};

// Re-export commonly used items from core
pub use quasinewton_core::optimization::{
    line_search::{LineSearchKind, LineSearchParams},
    optimizer::{OptimizationResult, Optimizer, TerminationReason},
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exports() {
        let config = LBFGSConfig::<f64>::new().with_line_search(LineSearchKind::Backtracking);
        let optimizer = LBFGS::new(config);
        assert_eq!(optimizer.name(), "L-BFGS");
        assert!(TerminationReason::ConvergedByDelta.is_converged());
    }
}
