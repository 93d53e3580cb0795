//! Serializable regressors that map an ordered feature vector to a single prediction.
//!
//! The training pipeline exports fitted models into one of these shapes; the service
//! only ever evaluates them.

use crate::model::error::{ArtifactError, RegressorError};
use serde::{Deserialize, Serialize};

/// A fitted regression model.
///
/// The input slice must be ordered exactly like the artifact's `feature_order`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regressor {
    /// `intercept + sum(coefficient_i * x_i)`.
    Linear {
        coefficients: Vec<f64>,
        intercept: f64,
    },
    /// An ensemble of binary regression trees (random forest or gradient boosting).
    TreeEnsemble {
        n_features: usize,
        trees: Vec<RegressionTree>,
        aggregation: Aggregation,
        base_score: f64,
    },
}

/// How tree outputs are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// Average of the trees (random forest). `base_score` is ignored.
    Mean,
    /// `base_score` plus the sum of the trees (gradient boosting).
    Sum,
}

/// A binary tree stored as a flat node array; node 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    pub nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    /// Go to `left` when `x[feature] < threshold`, else `right`. NaN follows `missing_left`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        missing_left: bool,
    },
    Leaf {
        value: f64,
    },
}

impl RegressionTree {
    fn evaluate(&self, features: &[f64]) -> Option<f64> {
        let mut index = 0;
        // A well-formed tree reaches a leaf in fewer steps than it has nodes.
        for _ in 0..self.nodes.len() {
            match self.nodes.get(index)? {
                TreeNode::Leaf { value } => return Some(*value),
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    missing_left,
                } => {
                    let x = *features.get(*feature)?;
                    let go_left = if x.is_nan() {
                        *missing_left
                    } else {
                        x < *threshold
                    };
                    index = if go_left { *left } else { *right };
                }
            }
        }
        None
    }

    fn check(&self, tree: usize, n_features: usize) -> Result<(), ArtifactError> {
        if self.nodes.is_empty() {
            return Err(ArtifactError::Invalid(format!("tree {tree} has no nodes")));
        }
        for (i, node) in self.nodes.iter().enumerate() {
            if let TreeNode::Split {
                feature,
                left,
                right,
                ..
            } = node
            {
                if *feature >= n_features {
                    return Err(ArtifactError::Invalid(format!(
                        "tree {tree} node {i} splits on feature {feature}, but there are only {n_features}"
                    )));
                }
                if *left >= self.nodes.len() || *right >= self.nodes.len() {
                    return Err(ArtifactError::Invalid(format!(
                        "tree {tree} node {i} points outside the node array"
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Regressor {
    /// Number of input features this regressor consumes.
    pub fn width(&self) -> usize {
        match self {
            Regressor::Linear { coefficients, .. } => coefficients.len(),
            Regressor::TreeEnsemble { n_features, .. } => *n_features,
        }
    }

    /// Runs inference on a feature vector ordered per the artifact's feature order.
    ///
    /// Non-finite outputs are rejected: a linear model fed a NaN lag produces NaN, and
    /// that must never be reported as a forecast.
    pub fn predict(&self, features: &[f64]) -> Result<f64, RegressorError> {
        if features.len() != self.width() {
            return Err(RegressorError::WidthMismatch {
                expected: self.width(),
                found: features.len(),
            });
        }

        let prediction = match self {
            Regressor::Linear {
                coefficients,
                intercept,
            } => {
                intercept
                    + coefficients
                        .iter()
                        .zip(features)
                        .map(|(c, x)| c * x)
                        .sum::<f64>()
            }
            Regressor::TreeEnsemble {
                trees,
                aggregation,
                base_score,
                ..
            } => {
                let mut total = 0.0;
                for (i, tree) in trees.iter().enumerate() {
                    total += tree
                        .evaluate(features)
                        .ok_or(RegressorError::MalformedTree { tree: i })?;
                }
                match aggregation {
                    Aggregation::Mean if trees.is_empty() => f64::NAN,
                    Aggregation::Mean => total / trees.len() as f64,
                    Aggregation::Sum => base_score + total,
                }
            }
        };

        if prediction.is_finite() {
            Ok(prediction)
        } else {
            Err(RegressorError::NonFinite(prediction))
        }
    }

    /// Structural checks run once when an artifact is loaded.
    pub(crate) fn check(&self) -> Result<(), ArtifactError> {
        match self {
            Regressor::Linear { coefficients, .. } => {
                if coefficients.is_empty() {
                    return Err(ArtifactError::Invalid(
                        "linear regressor has no coefficients".to_string(),
                    ));
                }
            }
            Regressor::TreeEnsemble {
                n_features, trees, ..
            } => {
                if trees.is_empty() {
                    return Err(ArtifactError::Invalid(
                        "tree ensemble has no trees".to_string(),
                    ));
                }
                for (i, tree) in trees.iter().enumerate() {
                    tree.check(i, *n_features)?;
                }
            }
        }
        Ok(())
    }
}
