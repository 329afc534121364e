//! L-BFGS quasi-Newton minimization.
//!
//! This is the umbrella crate of the workspace. It re-exports
//!
//! - [`quasinewton_core`]: padded storage, vector and matrix views, the
//!   objective contract, line searches, results and errors
//! - [`quasinewton_optim`]: the L-BFGS optimizer and
//!   [`minimize`](quasinewton_optim::minimize)
//! - [`quasinewton_models`]: test problems and logistic regression
//!
//! # Example
//!
//! ```rust
//! use quasinewton::prelude::*;
//!
//! let problem = Rosenbrock::<f64>::new();
//! let config = LBFGSConfig::new()
//!     .with_gradient_tolerance(1e-8)
//!     .with_delta(1e-8);
//! let minimum = minimize(&problem, &Rosenbrock::<f64>::starting_point(), config).unwrap();
//!
//! assert!(minimum.converged());
//! assert!((minimum.point[0] - 1.0).abs() < 1e-4);
//! ```

pub use nalgebra;
pub use quasinewton_core;
pub use quasinewton_models;
pub use quasinewton_optim;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use quasinewton_core::prelude::*;
    pub use quasinewton_models::{
        fit_logistic, fit_logistic_with_config, simulate_logistic, Booth, ExtendedRosenbrock,
        LogisticFit, LogisticRegression, QuadraticForm, Rosenbrock,
    };
    pub use quasinewton_optim::{minimize, History, LBFGSConfig, Minimum, LBFGS};
}
