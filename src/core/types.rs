//! Core type definitions for the experiment harness

/// An item index paired with its ground-truth class label.
///
/// The index addresses a row/column of the global kernel matrix; the label
/// must equal the entry recorded for that index in the loaded label list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LabeledIndex {
    /// Position of the item in the corpus, in [0, N)
    pub index: usize,
    /// Class identifier of the item
    pub label: usize,
}

impl LabeledIndex {
    /// Create a new labeled index
    pub fn new(index: usize, label: usize) -> Self {
        Self { index, label }
    }
}

/// Predicted label for one testing item, with the winning vote count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prediction {
    /// Predicted class label
    pub label: usize,
    /// Number of pairwise votes the winning class received
    pub votes: usize,
}

impl Prediction {
    pub fn new(label: usize, votes: usize) -> Self {
        Self { label, votes }
    }
}

/// Configuration for the SVM dual optimizer
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Regularization parameter C (upper bound for the multipliers)
    pub cost: f64,
    /// Tolerance for KKT conditions
    pub tolerance: f64,
    /// Iteration budget; exceeding it is a training failure
    pub max_iterations: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            cost: 1.0,
            tolerance: 0.001,
            max_iterations: 10_000,
        }
    }
}

/// Outcome of one trial: correct/total counts over the testing set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrialResult {
    /// Trial index this result belongs to
    pub trial: usize,
    /// Number of correctly classified testing items
    pub num_correct: usize,
    /// Total number of testing items
    pub num_test: usize,
    /// Size of the training set used
    pub num_train: usize,
}

impl TrialResult {
    /// Fraction of testing items classified correctly.
    ///
    /// NaN when the testing set is empty; the counts are divided as floats,
    /// never panicking on zero.
    pub fn accuracy(&self) -> f64 {
        self.num_correct as f64 / self.num_test as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labeled_index() {
        let li = LabeledIndex::new(7, 2);
        assert_eq!(li.index, 7);
        assert_eq!(li.label, 2);
        assert_eq!(li, LabeledIndex { index: 7, label: 2 });
    }

    #[test]
    fn test_prediction() {
        let pred = Prediction::new(3, 5);
        assert_eq!(pred.label, 3);
        assert_eq!(pred.votes, 5);
    }

    #[test]
    fn test_solver_config_default() {
        let config = SolverConfig::default();
        assert_eq!(config.cost, 1.0);
        assert_eq!(config.tolerance, 0.001);
        assert_eq!(config.max_iterations, 10_000);
    }

    #[test]
    fn test_trial_result_accuracy() {
        let result = TrialResult {
            trial: 0,
            num_correct: 3,
            num_test: 4,
            num_train: 12,
        };
        assert_eq!(result.accuracy(), 0.75);
    }

    #[test]
    fn test_trial_result_empty_test_set_is_nan() {
        let result = TrialResult {
            trial: 1,
            num_correct: 0,
            num_test: 0,
            num_train: 10,
        };
        assert!(result.accuracy().is_nan());
    }
}
