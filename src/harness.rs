//! High-level trial driver for kernel classification experiments
//!
//! Wires the selector, the kernel matrix, and the per-trial experiment
//! together behind a builder-style front end.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use gramexp::harness::Harness;
//! use gramexp::matrix::KernelMatrix;
//! use gramexp::data::read_labels;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let matrix = KernelMatrix::from_file("corpus.kern")?;
//! let labels = read_labels("labels.txt")?;
//!
//! let summary = Harness::new(matrix, labels)?
//!     .with_test_size(5)
//!     .with_cost(10_000.0)
//!     .run(80)?;
//! println!("Average accuracy: {:.4}", summary.mean_accuracy());
//! # Ok(())
//! # }
//! ```

use crate::core::{ExperimentError, Result, SolverConfig, TrialResult};
use crate::experiment::SvmExperiment;
use crate::matrix::KernelMatrix;
use crate::select::TrialSelector;
use log::info;
use std::sync::Arc;

/// Experiment driver: owns the shared inputs and runs trials
pub struct Harness {
    matrix: Arc<KernelMatrix>,
    labels: Vec<usize>,
    num_classes: usize,
    test_size: usize,
    config: SolverConfig,
}

impl Harness {
    /// Create a harness over a loaded matrix and label list.
    ///
    /// The label list must have exactly one entry per matrix item. The
    /// class count defaults to max label + 1 and the per-class test quota
    /// to 1; both are adjustable through the builder setters.
    pub fn new(matrix: KernelMatrix, labels: Vec<usize>) -> Result<Self> {
        if labels.len() != matrix.size() {
            return Err(ExperimentError::LabelCountMismatch {
                matrix: matrix.size(),
                labels: labels.len(),
            });
        }

        let num_classes = labels.iter().max().map_or(0, |&max| max + 1);

        Ok(Self {
            matrix: Arc::new(matrix),
            labels,
            num_classes,
            test_size: 1,
            config: SolverConfig::default(),
        })
    }

    /// Override the class count (labels at or above it are excluded)
    pub fn with_classes(mut self, num_classes: usize) -> Self {
        self.num_classes = num_classes;
        self
    }

    /// Set the per-class testing quota
    pub fn with_test_size(mut self, test_size: usize) -> Self {
        self.test_size = test_size;
        self
    }

    /// Set the regularization parameter C
    pub fn with_cost(mut self, cost: f64) -> Self {
        self.config.cost = cost;
        self
    }

    /// Set the optimizer's KKT tolerance
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.config.tolerance = tolerance;
        self
    }

    /// Set the optimizer's iteration budget
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.max_iterations = max_iterations;
        self
    }

    /// Number of items in the corpus
    pub fn corpus_size(&self) -> usize {
        self.matrix.size()
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    pub fn test_size(&self) -> usize {
        self.test_size
    }

    pub fn cost(&self) -> f64 {
        self.config.cost
    }

    /// Run one trial: select, train, test, score.
    ///
    /// Each trial builds a fresh split and a fresh experiment; nothing is
    /// shared between trials except the read-only matrix.
    pub fn run_trial(&self, trial: usize) -> Result<TrialResult> {
        let selector = TrialSelector::new(&self.labels, trial, self.num_classes, self.test_size);
        let mut experiment =
            SvmExperiment::from_selection(&selector, Arc::clone(&self.matrix), self.config.clone());

        let num_train = experiment.training_size();
        experiment.train()?;
        experiment.test()?;

        let result = TrialResult {
            trial,
            num_correct: experiment.num_correct()?,
            num_test: experiment.num_test_examples()?,
            num_train,
        };

        info!(
            "trial {trial}: {}/{} correct ({:.2}%)",
            result.num_correct,
            result.num_test,
            result.accuracy() * 100.0
        );

        Ok(result)
    }

    /// Run consecutive trials 0..trials and collect their results.
    ///
    /// A failing trial aborts the run; no accuracy is fabricated for it.
    pub fn run(&self, trials: usize) -> Result<RunSummary> {
        if trials == 0 {
            return Err(ExperimentError::InvalidParameter(
                "trial count must be positive".to_string(),
            ));
        }

        let mut results = Vec::with_capacity(trials);
        for trial in 0..trials {
            results.push(self.run_trial(trial)?);
        }

        Ok(RunSummary { results })
    }
}

/// Results of a multi-trial run
#[derive(Debug, Clone)]
pub struct RunSummary {
    results: Vec<TrialResult>,
}

impl RunSummary {
    /// Per-trial results in trial order
    pub fn results(&self) -> &[TrialResult] {
        &self.results
    }

    pub fn num_trials(&self) -> usize {
        self.results.len()
    }

    /// Mean of the per-trial accuracies (NaN propagates from empty
    /// testing sets rather than being masked)
    pub fn mean_accuracy(&self) -> f64 {
        let sum: f64 = self.results.iter().map(|r| r.accuracy()).sum();
        sum / self.results.len() as f64
    }

    /// Total correct over total tested across all trials
    pub fn pooled_accuracy(&self) -> f64 {
        let correct: usize = self.results.iter().map(|r| r.num_correct).sum();
        let total: usize = self.results.iter().map(|r| r.num_test).sum();
        correct as f64 / total as f64
    }
}
