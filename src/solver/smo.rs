//! Sequential Minimal Optimization (SMO) over a precomputed Gram block
//!
//! Solves the binary SVM dual problem by repeatedly optimizing pairs of
//! Lagrange multipliers. The solver never sees raw features: every kernel
//! value is a lookup into a [`GramBlock`] through an explicit position
//! table mapping solver-local indices to block rows/columns.

use crate::core::{ExperimentError, Result, SolverConfig};
use crate::matrix::GramBlock;

/// A binary subproblem over a train x train Gram block.
///
/// `positions[p]` maps solver-local index p to a row/column of the block;
/// `labels[p]` is the +1.0/-1.0 side assigned to that example. The position
/// table is the remapping between solver space and the caller's training
/// sequence; decision functions built from the solved multipliers must be
/// evaluated through it.
pub struct PairProblem<'a> {
    gram: &'a GramBlock,
    positions: &'a [usize],
    labels: &'a [f64],
}

impl<'a> PairProblem<'a> {
    /// Create a subproblem, validating the position table and labels
    pub fn new(gram: &'a GramBlock, positions: &'a [usize], labels: &'a [f64]) -> Result<Self> {
        if positions.len() != labels.len() {
            return Err(ExperimentError::InvalidParameter(format!(
                "{} positions but {} labels",
                positions.len(),
                labels.len()
            )));
        }
        for &position in positions {
            if position >= gram.num_rows() || position >= gram.num_cols() {
                return Err(ExperimentError::InvalidParameter(format!(
                    "position {position} outside {}x{} Gram block",
                    gram.num_rows(),
                    gram.num_cols()
                )));
            }
        }
        for &label in labels {
            if label != 1.0 && label != -1.0 {
                return Err(ExperimentError::InvalidParameter(format!(
                    "binary label must be +1 or -1, got {label}"
                )));
            }
        }
        Ok(Self {
            gram,
            positions,
            labels,
        })
    }

    /// Number of examples in the subproblem
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Kernel value between solver-local examples p and q
    fn kernel(&self, p: usize, q: usize) -> f64 {
        self.gram.at(self.positions[p], self.positions[q])
    }

    fn label(&self, p: usize) -> f64 {
        self.labels[p]
    }
}

/// Solved binary decision function state
#[derive(Debug, Clone)]
pub struct BinaryModel {
    /// Lagrange multipliers, one per solver-local example
    pub alpha: Vec<f64>,
    /// Bias term
    pub bias: f64,
    /// Solver-local indices with nonzero multipliers
    pub support: Vec<usize>,
    /// Number of optimization sweeps performed
    pub iterations: usize,
}

/// SMO solver for one binary subproblem
pub struct SmoSolver {
    config: SolverConfig,
}

impl SmoSolver {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Solve the dual problem.
    ///
    /// Converges when a full sweep changes no multiplier. Exhausting the
    /// iteration budget before that point is a [`TrainingFailed`] error,
    /// never a silent partial model.
    ///
    /// [`TrainingFailed`]: ExperimentError::TrainingFailed
    pub fn solve(&self, problem: &PairProblem) -> Result<BinaryModel> {
        if problem.is_empty() {
            return Err(ExperimentError::InvalidSplit(
                "empty binary subproblem".to_string(),
            ));
        }

        let n = problem.len();

        // A one-sided subproblem has no feasible pair step; the equality
        // constraint pins its multiplier to zero and the decision function
        // degenerates to that example's side.
        if n == 1 {
            return Ok(BinaryModel {
                alpha: vec![0.0],
                bias: problem.label(0),
                support: vec![],
                iterations: 0,
            });
        }

        let mut alpha = vec![0.0; n];

        // Error cache: E_p = output_p - y_p, with all outputs zero at start
        let mut error_cache: Vec<f64> = (0..n).map(|p| -problem.label(p)).collect();

        let mut iterations = 0;
        let mut num_changed = 0;
        let mut examine_all = true;

        while num_changed > 0 || examine_all {
            if iterations >= self.config.max_iterations {
                return Err(ExperimentError::TrainingFailed(format!(
                    "optimizer did not converge within {} sweeps",
                    self.config.max_iterations
                )));
            }

            num_changed = 0;

            if examine_all {
                for p in 0..n {
                    if self.examine_example(p, problem, &mut alpha, &mut error_cache) {
                        num_changed += 1;
                    }
                }
            } else {
                // Only non-bound multipliers (0 < alpha < C)
                for p in 0..n {
                    if alpha[p] > 0.0
                        && alpha[p] < self.config.cost
                        && self.examine_example(p, problem, &mut alpha, &mut error_cache)
                    {
                        num_changed += 1;
                    }
                }
            }

            if examine_all {
                examine_all = false;
            } else if num_changed == 0 {
                examine_all = true;
            }

            iterations += 1;
        }

        let bias = self.calculate_bias(&alpha, &error_cache);

        let support: Vec<usize> = alpha
            .iter()
            .enumerate()
            .filter_map(|(p, &a)| (a > self.config.tolerance).then_some(p))
            .collect();

        Ok(BinaryModel {
            alpha,
            bias,
            support,
            iterations,
        })
    }

    /// Examine one example and attempt a joint step with a second one
    fn examine_example(
        &self,
        p: usize,
        problem: &PairProblem,
        alpha: &mut [f64],
        error_cache: &mut [f64],
    ) -> bool {
        let y_p = problem.label(p);
        let alpha_p = alpha[p];
        let e_p = error_cache[p];
        let r_p = e_p * y_p;

        // KKT violation: can increase alpha_p, or can decrease it
        let violated = (r_p < -self.config.tolerance && alpha_p < self.config.cost)
            || (r_p > self.config.tolerance && alpha_p > 0.0);
        if !violated {
            return false;
        }

        // Second choice: maximize |E_p - E_q| first, then fall back to a
        // deterministic scan so one rejected step cannot stall the sweep.
        if let Some(q) = self.select_second(p, e_p, error_cache) {
            if self.take_step(p, q, problem, alpha, error_cache) {
                return true;
            }
        }

        for q in 0..problem.len() {
            if q != p && self.take_step(p, q, problem, alpha, error_cache) {
                return true;
            }
        }

        false
    }

    /// Pick the partner maximizing |E_p - E_q|
    fn select_second(&self, p: usize, e_p: f64, error_cache: &[f64]) -> Option<usize> {
        let mut best_q = None;
        let mut max_diff = 0.0;

        for (q, &e_q) in error_cache.iter().enumerate() {
            if q == p {
                continue;
            }
            let diff = (e_p - e_q).abs();
            if diff > max_diff {
                max_diff = diff;
                best_q = Some(q);
            }
        }

        best_q
    }

    /// Jointly optimize multipliers p and q; true if either changed
    fn take_step(
        &self,
        p: usize,
        q: usize,
        problem: &PairProblem,
        alpha: &mut [f64],
        error_cache: &mut [f64],
    ) -> bool {
        if p == q {
            return false;
        }

        let y_p = problem.label(p);
        let y_q = problem.label(q);
        let alpha_p_old = alpha[p];
        let alpha_q_old = alpha[q];
        let e_p = error_cache[p];
        let e_q = error_cache[q];
        let s = y_p * y_q;

        // Feasible segment for alpha_q under the box and equality constraints
        let (low, high) = if y_p != y_q {
            let diff = alpha_q_old - alpha_p_old;
            (
                0.0_f64.max(diff),
                self.config.cost.min(self.config.cost + diff),
            )
        } else {
            let sum = alpha_p_old + alpha_q_old;
            (0.0_f64.max(sum - self.config.cost), self.config.cost.min(sum))
        };

        if low >= high {
            return false;
        }

        let k_pp = problem.kernel(p, p);
        let k_pq = problem.kernel(p, q);
        let k_qq = problem.kernel(q, q);
        let eta = k_pp + k_qq - 2.0 * k_pq;

        if eta <= 0.0 {
            // Degenerate curvature; skip rather than guess along the segment
            return false;
        }

        let mut alpha_q_new = alpha_q_old + y_q * (e_p - e_q) / eta;
        alpha_q_new = alpha_q_new.clamp(low, high);

        if (alpha_q_new - alpha_q_old).abs()
            < self.config.tolerance * (alpha_q_new + alpha_q_old + self.config.tolerance)
        {
            return false;
        }

        let alpha_p_new = alpha_p_old + s * (alpha_q_old - alpha_q_new);

        alpha[p] = alpha_p_new;
        alpha[q] = alpha_q_new;

        let delta_p = alpha_p_new - alpha_p_old;
        let delta_q = alpha_q_new - alpha_q_old;

        for k in 0..problem.len() {
            error_cache[k] +=
                y_p * delta_p * problem.kernel(p, k) + y_q * delta_q * problem.kernel(q, k);
        }

        true
    }

    /// Bias from margin support vectors, falling back to all support vectors
    fn calculate_bias(&self, alpha: &[f64], error_cache: &[f64]) -> f64 {
        let margin: Vec<f64> = alpha
            .iter()
            .zip(error_cache)
            .filter(|(&a, _)| a > self.config.tolerance && a < self.config.cost - self.config.tolerance)
            .map(|(_, &e)| e)
            .collect();

        if !margin.is_empty() {
            return -margin.iter().sum::<f64>() / margin.len() as f64;
        }

        let bound: Vec<f64> = alpha
            .iter()
            .zip(error_cache)
            .filter(|(&a, _)| a > self.config.tolerance)
            .map(|(_, &e)| e)
            .collect();

        if bound.is_empty() {
            0.0
        } else {
            -bound.iter().sum::<f64>() / bound.len() as f64
        }
    }
}
