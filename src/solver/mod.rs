//! SVM dual optimization over precomputed kernel values
//!
//! Implements Sequential Minimal Optimization (SMO) in the style of Platt's
//! "Fast Training of Support Vector Machines using Sequential Minimal
//! Optimization", reading every kernel value out of a precomputed Gram
//! block instead of evaluating a kernel function.

pub mod smo;

pub use self::smo::*;
