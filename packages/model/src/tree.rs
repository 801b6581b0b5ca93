//! Flat-array regression trees.

use fare_estimator_features::FEATURE_COUNT;
use serde::{Deserialize, Serialize};

/// One node of a serialized regression tree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    /// Goes to `left` when `x[feature] < threshold`, otherwise `right`.
    /// NaN inputs go right.
    Split {
        /// Feature index.
        feature: usize,
        /// Split point.
        threshold: f64,
        /// Index of the left child.
        left: usize,
        /// Index of the right child.
        right: usize,
    },
    /// Terminal value.
    Leaf {
        /// Output of this leaf.
        leaf: f64,
    },
}

/// A validated tree.
///
/// Children always have larger indices than their parent, so evaluation
/// terminates.
#[derive(Debug, Clone)]
pub struct RegressionTree {
    nodes: Vec<TreeNode>,
}

impl RegressionTree {
    /// Validates `nodes`.
    ///
    /// # Errors
    ///
    /// Returns a description of the first structural problem found.
    pub fn new(nodes: Vec<TreeNode>) -> Result<Self, String> {
        if nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }

        for (i, node) in nodes.iter().enumerate() {
            match *node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if feature >= FEATURE_COUNT {
                        return Err(format!("node {i} splits on unknown feature {feature}"));
                    }
                    if threshold.is_nan() {
                        return Err(format!("node {i} has a NaN threshold"));
                    }
                    for child in [left, right] {
                        if child <= i || child >= nodes.len() {
                            return Err(format!("node {i} has invalid child {child}"));
                        }
                    }
                }
                TreeNode::Leaf { leaf } => {
                    if !leaf.is_finite() {
                        return Err(format!("node {i} has a non-finite leaf"));
                    }
                }
            }
        }

        Ok(Self { nodes })
    }

    /// Walks from the root to a leaf.
    #[must_use]
    pub fn evaluate(&self, x: &[f64; FEATURE_COUNT]) -> f64 {
        let mut i = 0;
        loop {
            match self.nodes[i] {
                TreeNode::Leaf { leaf } => return leaf,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    i = if x[feature] < threshold { left } else { right };
                }
            }
        }
    }
}
