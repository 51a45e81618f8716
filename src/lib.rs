//! Classification experiment harness for precomputed kernel matrices
//!
//! Evaluates an N x N similarity matrix with a multi-class SVM under
//! deterministic, repeatable train/test splits.

pub mod core;
pub mod data;
pub mod experiment;
pub mod harness;
pub mod matrix;
pub mod report;
pub mod select;
pub mod solver;
pub mod utils;

// Re-export main types for convenience
pub use crate::core::traits::*;
pub use crate::core::types::*;
pub use crate::core::{ExperimentError, Result};
pub use crate::data::read_labels;
pub use crate::experiment::SvmExperiment;
pub use crate::harness::{Harness, RunSummary};
pub use crate::matrix::{GramBlock, KernelMatrix};
pub use crate::report::RunReport;
pub use crate::select::TrialSelector;
pub use crate::solver::SmoSolver;
pub use crate::utils::ClassDistribution;

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
