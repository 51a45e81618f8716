//! Deterministic train/test example selection
//!
//! Partitions labeled items into training and testing sets for one trial.
//! Selection is a pure function of (labels, trial, num_classes, test_size);
//! no random state is consulted, so a selector rebuilt with the same inputs
//! always yields the same split.

use crate::core::{ExampleSelection, LabeledIndex};
use log::warn;

/// Per-trial train/test partition with a rotating held-out window.
///
/// For each class, `test_size` consecutive members (in ascending item-index
/// order) are held out for testing, starting at an offset that advances
/// with the trial index. Successive trials therefore test on disjoint
/// windows until a class's members are exhausted and the window wraps.
pub struct TrialSelector {
    training: Vec<LabeledIndex>,
    testing: Vec<LabeledIndex>,
}

impl TrialSelector {
    /// Build the partition for one trial.
    ///
    /// `labels` holds one class per item in matrix index order. Classes are
    /// the values in [0, num_classes); items labeled outside that range are
    /// excluded from both sets. A class with fewer members than `test_size`
    /// has its quota clamped to the class size (with a warning); a class
    /// with no members is skipped.
    pub fn new(labels: &[usize], trial: usize, num_classes: usize, test_size: usize) -> Self {
        let mut training = Vec::new();
        let mut testing = Vec::new();

        for class in 0..num_classes {
            let members: Vec<usize> = labels
                .iter()
                .enumerate()
                .filter(|&(_, &label)| label == class)
                .map(|(index, _)| index)
                .collect();

            if members.is_empty() {
                continue;
            }

            let quota = if test_size > members.len() {
                warn!(
                    "class {class} has {} members, clamping test quota from {test_size}",
                    members.len()
                );
                members.len()
            } else {
                test_size
            };

            if quota == 0 {
                training.extend(members.iter().map(|&i| LabeledIndex::new(i, class)));
                continue;
            }

            // Held-out window for this trial: quota consecutive members
            // starting at (trial * quota) mod class size, wrapping.
            let start = (trial * quota) % members.len();
            let held_out: Vec<bool> = {
                let mut flags = vec![false; members.len()];
                for offset in 0..quota {
                    flags[(start + offset) % members.len()] = true;
                }
                flags
            };

            for (position, &index) in members.iter().enumerate() {
                let example = LabeledIndex::new(index, class);
                if held_out[position] {
                    testing.push(example);
                } else {
                    training.push(example);
                }
            }
        }

        training.sort_by_key(|example| example.index);
        testing.sort_by_key(|example| example.index);

        Self { training, testing }
    }
}

impl ExampleSelection for TrialSelector {
    fn training_examples(&self) -> &[LabeledIndex] {
        &self.training
    }

    fn testing_examples(&self) -> &[LabeledIndex] {
        &self.testing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn indices(examples: &[LabeledIndex]) -> Vec<usize> {
        examples.iter().map(|e| e.index).collect()
    }

    #[test]
    fn test_basic_partition() {
        let labels = vec![0, 0, 0, 1, 1, 1];
        let selector = TrialSelector::new(&labels, 0, 2, 1);

        assert_eq!(indices(selector.testing_examples()), vec![0, 3]);
        assert_eq!(indices(selector.training_examples()), vec![1, 2, 4, 5]);
    }

    #[test]
    fn test_labels_match_global_list() {
        let labels = vec![1, 0, 1, 0];
        let selector = TrialSelector::new(&labels, 0, 2, 1);

        for example in selector
            .training_examples()
            .iter()
            .chain(selector.testing_examples())
        {
            assert_eq!(example.label, labels[example.index]);
        }
    }

    #[test]
    fn test_deterministic_for_fixed_inputs() {
        let labels = vec![0, 1, 2, 0, 1, 2, 0, 1, 2];

        let first = TrialSelector::new(&labels, 3, 3, 1);
        let second = TrialSelector::new(&labels, 3, 3, 1);

        assert_eq!(first.training_examples(), second.training_examples());
        assert_eq!(first.testing_examples(), second.testing_examples());
    }

    #[test]
    fn test_disjoint_and_no_duplicates() {
        let labels = vec![0, 0, 1, 1, 2, 2, 0, 1, 2, 0];
        let selector = TrialSelector::new(&labels, 5, 3, 2);

        let train: HashSet<usize> = indices(selector.training_examples()).into_iter().collect();
        let test: HashSet<usize> = indices(selector.testing_examples()).into_iter().collect();

        assert_eq!(train.len(), selector.training_examples().len());
        assert_eq!(test.len(), selector.testing_examples().len());
        assert!(train.is_disjoint(&test));
    }

    #[test]
    fn test_rotation_varies_held_out_window() {
        let labels = vec![0; 6];

        let windows: Vec<Vec<usize>> = (0..3)
            .map(|trial| indices(TrialSelector::new(&labels, trial, 1, 2).testing_examples()))
            .collect();

        assert_eq!(windows[0], vec![0, 1]);
        assert_eq!(windows[1], vec![2, 3]);
        assert_eq!(windows[2], vec![4, 5]);
    }

    #[test]
    fn test_rotation_non_overlapping_until_exhaustion() {
        // 400 items in one class, 80 trials of 5 held-out items: every item
        // is tested exactly once across the run.
        let labels = vec![0; 400];
        let mut seen = HashSet::new();

        for trial in 0..80 {
            let selector = TrialSelector::new(&labels, trial, 1, 5);
            let held_out = indices(selector.testing_examples());
            assert_eq!(held_out.len(), 5);
            for index in held_out {
                assert!(seen.insert(index), "item {index} held out twice");
            }
        }

        assert_eq!(seen.len(), 400);
    }

    #[test]
    fn test_window_wraps_after_exhaustion() {
        let labels = vec![0; 4];

        let early = indices(TrialSelector::new(&labels, 0, 1, 2).testing_examples());
        let wrapped = indices(TrialSelector::new(&labels, 2, 1, 2).testing_examples());

        assert_eq!(early, wrapped);
    }

    #[test]
    fn test_quota_clamped_to_class_size() {
        let labels = vec![0, 0, 1];
        let selector = TrialSelector::new(&labels, 0, 2, 5);

        // Class 1 has a single member; it is entirely held out, never
        // duplicated into training.
        assert_eq!(indices(selector.testing_examples()), vec![0, 1, 2]);
        assert!(selector.training_examples().is_empty());
    }

    #[test]
    fn test_empty_class_skipped() {
        let labels = vec![0, 0, 2, 2];
        let selector = TrialSelector::new(&labels, 0, 3, 1);

        assert_eq!(indices(selector.testing_examples()), vec![0, 2]);
        assert_eq!(indices(selector.training_examples()), vec![1, 3]);
    }

    #[test]
    fn test_out_of_range_labels_excluded() {
        let labels = vec![0, 7, 1, 7];
        let selector = TrialSelector::new(&labels, 0, 2, 1);

        let all: Vec<usize> = indices(selector.training_examples())
            .into_iter()
            .chain(indices(selector.testing_examples()))
            .collect();

        assert!(!all.contains(&1));
        assert!(!all.contains(&3));
    }

    #[test]
    fn test_zero_test_size_trains_everything() {
        let labels = vec![0, 1, 0, 1];
        let selector = TrialSelector::new(&labels, 0, 2, 0);

        assert!(selector.testing_examples().is_empty());
        assert_eq!(indices(selector.training_examples()), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_outputs_sorted_by_index() {
        let labels = vec![2, 0, 1, 2, 0, 1];
        let selector = TrialSelector::new(&labels, 1, 3, 1);

        let train = indices(selector.training_examples());
        let test = indices(selector.testing_examples());

        assert!(train.windows(2).all(|w| w[0] < w[1]));
        assert!(test.windows(2).all(|w| w[0] < w[1]));
    }
}
