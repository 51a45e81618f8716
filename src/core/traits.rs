//! Core traits for the experiment harness

use crate::core::LabeledIndex;

/// A deterministic partition of labeled items into training and testing
/// sets for one trial.
///
/// Implementors compute the partition once; both accessors must return the
/// same sequences on every call, and the two sequences must never share an
/// item index.
pub trait ExampleSelection {
    /// Items to train on, ordered by global item index
    fn training_examples(&self) -> &[LabeledIndex];

    /// Held-out items to evaluate on, ordered by global item index
    fn testing_examples(&self) -> &[LabeledIndex];
}
