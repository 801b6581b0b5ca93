#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Fare model artifacts and the [`Predictor`] interface.
//!
//! A model artifact is a versioned JSON document that names the features
//! it was trained on and carries the fitted parameters. Loading checks
//! the declared feature names against [`FEATURE_NAMES`] so a model
//! trained on a different schema is rejected up front instead of
//! silently producing bad fares.
//!
//! Two model families are supported:
//!
//! - `linear`: intercept plus one coefficient per feature
//! - `tree_ensemble`: regression trees summed or averaged on top of a
//!   base score (gradient boosting and random forests)

pub mod artifact;
pub mod tree;

use std::path::Path;

use fare_estimator_features::{FEATURE_COUNT, FEATURE_NAMES, FeatureVector};
use thiserror::Error;

pub use artifact::{Aggregation, ModelArtifact, ModelSpec};
use tree::RegressionTree;

/// Artifact format version understood by this crate.
pub const SUPPORTED_VERSION: u32 = 1;

/// Errors from loading or evaluating a model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Artifact file could not be read.
    #[error("Failed to read model artifact: {0}")]
    Io(#[from] std::io::Error),

    /// Artifact is not valid JSON for the expected shape.
    #[error("Failed to parse model artifact: {0}")]
    Json(#[from] serde_json::Error),

    /// Artifact declares a format version this crate does not understand.
    #[error("Unsupported model artifact version {found} (expected {SUPPORTED_VERSION})")]
    UnsupportedVersion {
        /// Declared version.
        found: u32,
    },

    /// Artifact was trained on a different feature schema.
    #[error("Model feature schema mismatch: {message}")]
    SchemaMismatch {
        /// Which names differ.
        message: String,
    },

    /// Artifact parameters are structurally invalid.
    #[error("Invalid model artifact: {message}")]
    Invalid {
        /// What is wrong.
        message: String,
    },

    /// Evaluation produced NaN or infinity.
    #[error("Model produced a non-finite prediction")]
    NonFinite,
}

/// Maps a feature vector to a predicted fare in dollars.
pub trait Predictor: Send + Sync {
    /// Predicts the fare for one trip.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] if evaluation fails or produces a
    /// non-finite value.
    fn predict(&self, features: &FeatureVector) -> Result<f64, ModelError>;
}

/// A validated, ready-to-evaluate fare model.
#[derive(Debug, Clone)]
pub struct FareModel {
    name: String,
    kind: ModelKind,
}

#[derive(Debug, Clone)]
enum ModelKind {
    Linear {
        intercept: f64,
        coefficients: [f64; FEATURE_COUNT],
    },
    TreeEnsemble {
        base_score: f64,
        aggregation: Aggregation,
        trees: Vec<RegressionTree>,
    },
}

const BUILTIN_ARTIFACT: &str = include_str!("../artifacts/nyc_taxi_linear.json");

impl FareModel {
    /// Validates a parsed artifact.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] if the version, feature schema, or
    /// parameters are invalid.
    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, ModelError> {
        if artifact.version != SUPPORTED_VERSION {
            return Err(ModelError::UnsupportedVersion {
                found: artifact.version,
            });
        }

        check_schema(&artifact.feature_names)?;

        let kind = match artifact.model {
            ModelSpec::Linear {
                intercept,
                coefficients,
            } => {
                let coefficients: [f64; FEATURE_COUNT] =
                    coefficients.try_into().map_err(|c: Vec<f64>| ModelError::Invalid {
                        message: format!(
                            "expected {FEATURE_COUNT} coefficients, found {}",
                            c.len()
                        ),
                    })?;
                if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
                    return Err(ModelError::Invalid {
                        message: "linear parameters must be finite".to_string(),
                    });
                }
                ModelKind::Linear {
                    intercept,
                    coefficients,
                }
            }
            ModelSpec::TreeEnsemble {
                base_score,
                aggregation,
                trees,
            } => {
                if trees.is_empty() {
                    return Err(ModelError::Invalid {
                        message: "tree ensemble has no trees".to_string(),
                    });
                }
                let trees = trees
                    .into_iter()
                    .enumerate()
                    .map(|(i, nodes)| {
                        RegressionTree::new(nodes).map_err(|message| ModelError::Invalid {
                            message: format!("tree {i}: {message}"),
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                ModelKind::TreeEnsemble {
                    base_score,
                    aggregation,
                    trees,
                }
            }
        };

        Ok(Self {
            name: artifact.name,
            kind,
        })
    }

    /// Parses and validates a JSON artifact.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] if the JSON is malformed or the artifact is
    /// invalid.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        Self::from_artifact(serde_json::from_str(json)?)
    }

    /// Reads, parses, and validates the artifact at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] if the file cannot be read or the artifact
    /// is invalid.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let json = std::fs::read_to_string(path)?;
        let model = Self::from_json(&json)?;
        log::info!("Loaded fare model '{}' from {}", model.name, path.display());
        Ok(model)
    }

    /// The linear model bundled with the crate.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] if the bundled artifact is invalid.
    pub fn builtin() -> Result<Self, ModelError> {
        Self::from_json(BUILTIN_ARTIFACT)
    }

    /// Name declared by the artifact.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Predictor for FareModel {
    fn predict(&self, features: &FeatureVector) -> Result<f64, ModelError> {
        let x = features.to_array();

        let fare = match &self.kind {
            ModelKind::Linear {
                intercept,
                coefficients,
            } => {
                intercept
                    + coefficients
                        .iter()
                        .zip(x.iter())
                        .map(|(c, v)| c * v)
                        .sum::<f64>()
            }
            ModelKind::TreeEnsemble {
                base_score,
                aggregation,
                trees,
            } => {
                let sum: f64 = trees.iter().map(|t| t.evaluate(&x)).sum();
                match aggregation {
                    Aggregation::Sum => base_score + sum,
                    #[allow(clippy::cast_precision_loss)]
                    Aggregation::Mean => base_score + sum / trees.len() as f64,
                }
            }
        };

        if fare.is_finite() {
            Ok(fare)
        } else {
            Err(ModelError::NonFinite)
        }
    }
}

fn check_schema(names: &[String]) -> Result<(), ModelError> {
    if names.len() != FEATURE_COUNT {
        return Err(ModelError::SchemaMismatch {
            message: format!(
                "expected {FEATURE_COUNT} features, artifact declares {}",
                names.len()
            ),
        });
    }

    for (i, (expected, found)) in FEATURE_NAMES.iter().zip(names).enumerate() {
        if expected != found {
            return Err(ModelError::SchemaMismatch {
                message: format!("feature {i} is '{found}', expected '{expected}'"),
            });
        }
    }

    Ok(())
}
