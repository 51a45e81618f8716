//! Run report serialization
//!
//! Records a multi-trial run (configuration, per-trial results, aggregate
//! accuracy) as JSON so results can be archived and compared across runs.

use crate::core::{ExperimentError, Result, TrialResult};
use crate::harness::{Harness, RunSummary};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Serializable record of one complete run
#[derive(Serialize, Deserialize)]
pub struct RunReport {
    /// Number of items in the corpus
    pub corpus_size: usize,
    /// Class count used for selection
    pub num_classes: usize,
    /// Per-class testing quota
    pub test_size: usize,
    /// Regularization parameter C
    pub cost: f64,
    /// Per-trial outcomes
    pub trials: Vec<TrialRecord>,
    /// Mean of per-trial accuracies
    pub mean_accuracy: f64,
    /// Creation timestamp, RFC 3339
    pub created_at: String,
}

/// Serializable per-trial outcome
#[derive(Serialize, Deserialize, Clone)]
pub struct TrialRecord {
    pub trial: usize,
    pub num_correct: usize,
    pub num_test: usize,
    pub num_train: usize,
    pub accuracy: f64,
}

impl From<&TrialResult> for TrialRecord {
    fn from(result: &TrialResult) -> Self {
        Self {
            trial: result.trial,
            num_correct: result.num_correct,
            num_test: result.num_test,
            num_train: result.num_train,
            accuracy: result.accuracy(),
        }
    }
}

impl RunReport {
    /// Build a report from a finished run
    pub fn from_run(harness: &Harness, summary: &RunSummary) -> Self {
        Self {
            corpus_size: harness.corpus_size(),
            num_classes: harness.num_classes(),
            test_size: harness.test_size(),
            cost: harness.cost(),
            trials: summary.results().iter().map(TrialRecord::from).collect(),
            mean_accuracy: summary.mean_accuracy(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Save the report to a file as pretty-printed JSON
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path).map_err(ExperimentError::IoError)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| ExperimentError::SerializationError(e.to_string()))?;
        Ok(())
    }

    /// Load a report from a file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path).map_err(ExperimentError::IoError)?;
        let reader = BufReader::new(file);
        let report = serde_json::from_reader(reader)
            .map_err(|e| ExperimentError::SerializationError(e.to_string()))?;
        Ok(report)
    }

    /// Print a run summary
    pub fn print_summary(&self) {
        println!("=== Experiment Run Summary ===");
        println!("Corpus size: {}", self.corpus_size);
        println!("Classes: {}", self.num_classes);
        println!("Test size per class: {}", self.test_size);
        println!("Cost parameter: {}", self.cost);
        println!("Trials: {}", self.trials.len());
        println!("Mean accuracy: {:.4}", self.mean_accuracy);
        println!("Created: {}", self.created_at);
    }
}
