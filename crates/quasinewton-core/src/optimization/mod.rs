//! Optimizer interface, line searches and progress observation.

pub mod callback;
pub mod line_search;
pub mod optimizer;

pub use callback::{IterationReport, NoOpObserver, ProgressObserver, RecordingObserver};
pub use line_search::{
    BacktrackingLineSearch, ConfiguredLineSearch, CurvatureCondition, LineSearch, LineSearchKind,
    LineSearchParams, LineSearchProblem, LineSearchResult, WolfeLineSearch,
};
pub use optimizer::{OptimizationResult, Optimizer, TerminationReason};
