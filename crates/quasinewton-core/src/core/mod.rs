//! Scalar types, errors and the objective contract.

pub mod error;
pub mod objective;
pub mod types;

pub use error::*;
pub use objective::{CountingObjective, DerivativeChecker, Objective};
pub use types::*;
