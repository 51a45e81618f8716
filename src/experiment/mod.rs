//! Kernel SVM experiment over one train/test split
//!
//! Trains a one-vs-one multi-class SVM from precomputed kernel values and
//! evaluates held-out accuracy. The experiment moves through three states,
//! Constructed -> Trained -> Evaluated; out-of-order calls fail with named
//! errors instead of returning stale or zeroed data.

use crate::core::{
    ExampleSelection, ExperimentError, LabeledIndex, Prediction, Result, SolverConfig,
};
use crate::matrix::{GramBlock, KernelMatrix};
use crate::solver::{BinaryModel, PairProblem, SmoSolver};
use log::debug;
use std::collections::HashSet;
use std::sync::Arc;

/// One binary decision function of the one-vs-one ensemble.
///
/// `positions` maps the solver-local examples back into the experiment's
/// training sequence; every kernel lookup at prediction time goes through
/// this table.
struct PairClassifier {
    /// Slot in the class list voted for when the decision value is
    /// non-negative
    positive_slot: usize,
    /// Slot voted for otherwise
    negative_slot: usize,
    positions: Vec<usize>,
    labels: Vec<f64>,
    model: BinaryModel,
}

struct MulticlassModel {
    /// Distinct training classes, ascending
    classes: Vec<usize>,
    pairs: Vec<PairClassifier>,
}

struct Evaluation {
    predictions: Vec<Prediction>,
    num_correct: usize,
}

/// A single trial's train/evaluate computation over a shared kernel matrix
pub struct SvmExperiment {
    training: Vec<LabeledIndex>,
    testing: Vec<LabeledIndex>,
    matrix: Arc<KernelMatrix>,
    config: SolverConfig,
    model: Option<MulticlassModel>,
    evaluation: Option<Evaluation>,
}

impl SvmExperiment {
    /// Create an experiment over explicit training and testing sequences
    pub fn new(
        training: Vec<LabeledIndex>,
        testing: Vec<LabeledIndex>,
        matrix: Arc<KernelMatrix>,
        config: SolverConfig,
    ) -> Self {
        Self {
            training,
            testing,
            matrix,
            config,
            model: None,
            evaluation: None,
        }
    }

    /// Create an experiment from a selector's split
    pub fn from_selection<S: ExampleSelection>(
        selection: &S,
        matrix: Arc<KernelMatrix>,
        config: SolverConfig,
    ) -> Self {
        Self::new(
            selection.training_examples().to_vec(),
            selection.testing_examples().to_vec(),
            matrix,
            config,
        )
    }

    /// Number of training examples in the split
    pub fn training_size(&self) -> usize {
        self.training.len()
    }

    /// Number of testing examples in the split
    pub fn testing_size(&self) -> usize {
        self.testing.len()
    }

    /// Train the one-vs-one ensemble from the training-side Gram block.
    ///
    /// Valid only in the Constructed state. The split is validated first;
    /// an empty or overlapping split never reaches the optimizer.
    pub fn train(&mut self) -> Result<()> {
        if self.model.is_some() {
            return Err(ExperimentError::AlreadyTrained);
        }
        self.validate_split()?;

        let train_indices: Vec<usize> = self.training.iter().map(|e| e.index).collect();
        let gram = self.matrix.submatrix(&train_indices, &train_indices);

        let mut classes: Vec<usize> = self.training.iter().map(|e| e.label).collect();
        classes.sort_unstable();
        classes.dedup();

        let solver = SmoSolver::new(self.config.clone());
        let mut pairs = Vec::new();

        for positive_slot in 0..classes.len() {
            for negative_slot in (positive_slot + 1)..classes.len() {
                let positive = classes[positive_slot];
                let negative = classes[negative_slot];
                let pair =
                    self.train_pair(&solver, &gram, positive_slot, negative_slot, positive, negative)?;
                debug!(
                    "pair {positive} vs {negative}: {} examples, {} support, {} sweeps",
                    pair.positions.len(),
                    pair.model.support.len(),
                    pair.model.iterations
                );
                pairs.push(pair);
            }
        }

        self.model = Some(MulticlassModel { classes, pairs });
        Ok(())
    }

    fn train_pair(
        &self,
        solver: &SmoSolver,
        gram: &GramBlock,
        positive_slot: usize,
        negative_slot: usize,
        positive: usize,
        negative: usize,
    ) -> Result<PairClassifier> {
        let mut positions = Vec::new();
        let mut labels = Vec::new();

        for (position, example) in self.training.iter().enumerate() {
            if example.label == positive {
                positions.push(position);
                labels.push(1.0);
            } else if example.label == negative {
                positions.push(position);
                labels.push(-1.0);
            }
        }

        let problem = PairProblem::new(gram, &positions, &labels)?;
        let model = solver.solve(&problem)?;

        Ok(PairClassifier {
            positive_slot,
            negative_slot,
            positions,
            labels,
            model,
        })
    }

    /// Classify every testing item and tally correct predictions.
    ///
    /// Valid only in the Trained state. Each testing item's kernel row
    /// against the training set is extracted on demand; raw features are
    /// never consulted.
    pub fn test(&mut self) -> Result<()> {
        let model = match &self.model {
            Some(model) => model,
            None => return Err(ExperimentError::NotTrained),
        };
        if self.evaluation.is_some() {
            return Err(ExperimentError::AlreadyEvaluated);
        }

        let train_indices: Vec<usize> = self.training.iter().map(|e| e.index).collect();
        let mut predictions = Vec::with_capacity(self.testing.len());
        let mut num_correct = 0;

        for example in &self.testing {
            let row = self.matrix.submatrix(&[example.index], &train_indices);
            let prediction = Self::predict(model, &row);
            if prediction.label == example.label {
                num_correct += 1;
            }
            predictions.push(prediction);
        }

        self.evaluation = Some(Evaluation {
            predictions,
            num_correct,
        });
        Ok(())
    }

    /// Vote over all pair classifiers for one testing item.
    ///
    /// A pair abstains when the item has no positive kernel value against
    /// any of the pair's training examples; with a similarity kernel such a
    /// row carries no evidence and the raw sign would only echo the bias.
    /// Vote ties resolve to the largest tied label.
    fn predict(model: &MulticlassModel, row: &GramBlock) -> Prediction {
        let mut votes = vec![0usize; model.classes.len()];

        for pair in &model.pairs {
            let informative = pair
                .positions
                .iter()
                .any(|&position| row.at(0, position) > 0.0);
            if !informative {
                continue;
            }

            let mut decision = pair.model.bias;
            for &s in &pair.model.support {
                decision +=
                    pair.model.alpha[s] * pair.labels[s] * row.at(0, pair.positions[s]);
            }

            let slot = if decision >= 0.0 {
                pair.positive_slot
            } else {
                pair.negative_slot
            };
            votes[slot] += 1;
        }

        let mut best_slot = 0;
        for slot in 1..votes.len() {
            if votes[slot] >= votes[best_slot] {
                best_slot = slot;
            }
        }

        Prediction::new(model.classes[best_slot], votes[best_slot])
    }

    /// Number of correctly classified testing items
    ///
    /// Valid only after a successful `test()`.
    pub fn num_correct(&self) -> Result<usize> {
        match &self.evaluation {
            Some(evaluation) => Ok(evaluation.num_correct),
            None => Err(ExperimentError::NotEvaluated),
        }
    }

    /// Number of testing items evaluated
    ///
    /// Valid only after a successful `test()`.
    pub fn num_test_examples(&self) -> Result<usize> {
        match &self.evaluation {
            Some(evaluation) => Ok(evaluation.predictions.len()),
            None => Err(ExperimentError::NotEvaluated),
        }
    }

    /// Fraction of testing items classified correctly; NaN for an empty
    /// testing set, never a division panic
    pub fn accuracy(&self) -> Result<f64> {
        Ok(self.num_correct()? as f64 / self.num_test_examples()? as f64)
    }

    /// Per-item predictions in testing order
    pub fn predictions(&self) -> Result<&[Prediction]> {
        match &self.evaluation {
            Some(evaluation) => Ok(&evaluation.predictions),
            None => Err(ExperimentError::NotEvaluated),
        }
    }

    fn validate_split(&self) -> Result<()> {
        if self.training.is_empty() {
            return Err(ExperimentError::InvalidSplit(
                "training set is empty".to_string(),
            ));
        }
        if self.testing.is_empty() {
            return Err(ExperimentError::InvalidSplit(
                "testing set is empty".to_string(),
            ));
        }

        let size = self.matrix.size();
        let mut seen = HashSet::new();

        for example in self.training.iter().chain(&self.testing) {
            if example.index >= size {
                return Err(ExperimentError::InvalidSplit(format!(
                    "item {} outside matrix of size {size}",
                    example.index
                )));
            }
            if !seen.insert(example.index) {
                return Err(ExperimentError::InvalidSplit(format!(
                    "item {} appears twice across the split",
                    example.index
                )));
            }
        }

        Ok(())
    }
}
