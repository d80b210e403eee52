//! Canonical forest representation (collection of trees).

use super::{Tree, TreeValidationError};

/// Structural validation errors for [`Forest`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ForestValidationError {
    #[error("base score is not finite")]
    NonFiniteBaseScore,
    #[error("tree {tree_idx} is invalid: {error}")]
    InvalidTree {
        tree_idx: usize,
        error: TreeValidationError,
    },
}

/// Additive forest of regression trees with a single output.
///
/// The raw prediction for a row is `base_score + Σ tree(row)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Forest {
    trees: Vec<Tree>,
    base_score: f32,
}

impl Forest {
    /// Empty forest predicting `base_score` everywhere.
    pub fn new(base_score: f32) -> Self {
        Self {
            trees: Vec::new(),
            base_score,
        }
    }

    /// Add a tree to the forest.
    pub fn push_tree(&mut self, tree: Tree) {
        self.trees.push(tree);
    }

    /// Number of trees.
    #[inline]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    #[inline]
    pub fn base_score(&self) -> f32 {
        self.base_score
    }

    /// Get a reference to a specific tree.
    #[inline]
    pub fn tree(&self, idx: usize) -> &Tree {
        &self.trees[idx]
    }

    /// Iterate over trees.
    pub fn trees(&self) -> impl Iterator<Item = &Tree> {
        self.trees.iter()
    }

    /// Keep only the first `n_trees` trees.
    pub fn truncate(&mut self, n_trees: usize) {
        self.trees.truncate(n_trees);
    }

    /// Validate every tree against the model input width.
    pub fn validate(&self, n_features: usize) -> Result<(), ForestValidationError> {
        if !self.base_score.is_finite() {
            return Err(ForestValidationError::NonFiniteBaseScore);
        }
        for (tree_idx, tree) in self.trees.iter().enumerate() {
            tree.validate(n_features)
                .map_err(|error| ForestValidationError::InvalidTree { tree_idx, error })?;
        }
        Ok(())
    }

    /// Raw (untransformed) prediction for a single row of features.
    ///
    /// Accumulates in f64 so the result does not depend on summation grouping.
    #[inline]
    pub fn predict_row(&self, features: &[f32]) -> f32 {
        let sum: f64 = self
            .trees
            .iter()
            .map(|tree| tree.predict_row(features) as f64)
            .sum();
        (self.base_score as f64 + sum) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repr::gbdt::tree::stump;

    #[test]
    fn forest_single_tree_regression() {
        let mut forest = Forest::new(0.0);
        forest.push_tree(stump(0, 0.5, 1.0, 2.0));

        assert_eq!(forest.predict_row(&[0.3]), 1.0);
        assert_eq!(forest.predict_row(&[0.7]), 2.0);
    }

    #[test]
    fn forest_multiple_trees_sum() {
        let mut forest = Forest::new(0.0);
        forest.push_tree(stump(0, 0.5, 1.0, 2.0));
        forest.push_tree(stump(0, 0.5, 0.5, 1.5));

        assert_eq!(forest.predict_row(&[0.3]), 1.5);
        assert_eq!(forest.predict_row(&[0.7]), 3.5);
    }

    #[test]
    fn forest_with_base_score() {
        let mut forest = Forest::new(0.5);
        forest.push_tree(stump(0, 0.5, 1.0, 2.0));
        assert_eq!(forest.predict_row(&[0.3]), 1.5);
    }

    #[test]
    fn truncate_keeps_prefix() {
        let mut forest = Forest::new(0.0);
        forest.push_tree(stump(0, 0.5, 1.0, 2.0));
        forest.push_tree(stump(0, 0.5, 10.0, 20.0));
        forest.truncate(1);
        assert_eq!(forest.n_trees(), 1);
        assert_eq!(forest.predict_row(&[0.7]), 2.0);
    }

    #[test]
    fn validate_reports_tree_index() {
        let mut forest = Forest::new(0.0);
        forest.push_tree(stump(0, 0.5, 1.0, 2.0));
        forest.push_tree(stump(3, 0.5, 1.0, 2.0));
        assert!(matches!(
            forest.validate(2),
            Err(ForestValidationError::InvalidTree { tree_idx: 1, .. })
        ));
        assert!(Forest::new(f32::NAN).validate(1).is_err());
    }
}
