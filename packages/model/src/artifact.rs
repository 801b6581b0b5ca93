//! On-disk model artifact format.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::tree::TreeNode;

/// A serialized fare model.
///
/// ```json
/// {
///   "version": 1,
///   "name": "nyc-taxi-linear",
///   "feature_names": ["pickup_longitude", "..."],
///   "model": { "type": "linear", "intercept": 0.0, "coefficients": [0.0] }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Artifact format version.
    pub version: u32,
    /// Identifier of the trained model.
    pub name: String,
    /// Free-form notes (training data, metrics).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Features the model was trained on, in column order.
    pub feature_names: Vec<String>,
    /// Fitted parameters.
    pub model: ModelSpec,
}

/// Fitted parameters, tagged by `type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelSpec {
    /// `intercept + Σ coefficients[i] * x[i]`.
    Linear {
        /// Constant term.
        intercept: f64,
        /// One weight per feature.
        coefficients: Vec<f64>,
    },
    /// Ensemble of regression trees.
    TreeEnsemble {
        /// Added to the aggregated tree output.
        #[serde(default)]
        base_score: f64,
        /// How tree outputs are combined.
        #[serde(default)]
        aggregation: Aggregation,
        /// Each tree as a flat node list rooted at index 0.
        trees: Vec<Vec<TreeNode>>,
    },
}

/// How the outputs of an ensemble's trees are combined.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Aggregation {
    /// Gradient boosting: outputs are summed.
    #[default]
    Sum,
    /// Random forest: outputs are averaged.
    Mean,
}
