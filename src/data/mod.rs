//! Input loading for the experiment harness
//!
//! The kernel matrix loader lives with the matrix type itself; this module
//! covers the remaining input, the per-item label list.

pub mod labels;

pub use self::labels::*;
