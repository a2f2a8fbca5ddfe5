use std::fs;
use std::path::{Path, PathBuf};

use ndarray::{Array1, Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{ArtifactError, InferenceError};
use crate::models::{FEATURE_NAMES, MODEL_VERSION};

pub const ARTIFACT_FORMAT: &str = "iris-logistic-regression";
pub const ARTIFACT_VERSION: u32 = 1;

/// Multinomial logistic regression: one linear score per class, the
/// highest score wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    n_features: usize,
    classes: Vec<i64>,
    coefficients: Array2<f64>,
    intercepts: Array1<f64>,
}

impl LogisticModel {
    pub fn new(
        classes: Vec<i64>,
        coefficients: Array2<f64>,
        intercepts: Array1<f64>,
    ) -> Result<Self, ArtifactError> {
        let model = LogisticModel {
            n_features: coefficients.ncols(),
            classes,
            coefficients,
            intercepts,
        };
        model.check_shape()?;
        Ok(model)
    }

    fn check_shape(&self) -> Result<(), ArtifactError> {
        let n_classes = self.classes.len();
        if n_classes == 0 {
            return Err(ArtifactError::Shape("model has no classes".to_string()));
        }
        if self.coefficients.dim() != (n_classes, self.n_features) {
            return Err(ArtifactError::Shape(format!(
                "coefficients are {:?}, expected ({}, {})",
                self.coefficients.dim(),
                n_classes,
                self.n_features
            )));
        }
        if self.intercepts.len() != n_classes {
            return Err(ArtifactError::Shape(format!(
                "{} intercepts for {} classes",
                self.intercepts.len(),
                n_classes
            )));
        }
        if self.n_features != FEATURE_NAMES.len() {
            return Err(ArtifactError::Shape(format!(
                "model expects {} features, the service provides {}",
                self.n_features,
                FEATURE_NAMES.len()
            )));
        }
        Ok(())
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn classes(&self) -> &[i64] {
        &self.classes
    }

    /// Raw per-class scores, one row per input record.
    pub fn decision_function(&self, rows: ArrayView2<f64>) -> Result<Array2<f64>, InferenceError> {
        if rows.ncols() != self.n_features {
            return Err(InferenceError::FeatureCount {
                expected: self.n_features,
                found: rows.ncols(),
            });
        }
        Ok(rows.dot(&self.coefficients.t()) + &self.intercepts)
    }

    /// Class label for every input row.
    ///
    /// Overflowing scores still rank: `+inf` beats everything finite and
    /// `-inf` loses to it. A NaN score wins outright at its index, the way
    /// numpy's argmax treats NaN.
    pub fn predict(&self, rows: ArrayView2<f64>) -> Result<Vec<i64>, InferenceError> {
        let scores = self.decision_function(rows)?;
        scores
            .axis_iter(Axis(0))
            .map(|row| {
                let mut best: Option<(usize, f64)> = None;
                for (idx, &score) in row.iter().enumerate() {
                    if score.is_nan() {
                        best = Some((idx, score));
                        break;
                    }
                    // ties go to the lowest class index
                    if best.map_or(true, |(_, top)| score.total_cmp(&top).is_gt()) {
                        best = Some((idx, score));
                    }
                }
                best.map(|(idx, _)| self.classes[idx])
                    .ok_or(InferenceError::Empty)
            })
            .collect()
    }

    pub fn model_info(&self) -> ModelInfo {
        ModelInfo {
            model_version: MODEL_VERSION.to_string(),
            algorithm: "multinomial_logistic_regression".to_string(),
            format_version: ARTIFACT_VERSION,
            n_features: self.n_features,
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            classes: self.classes.clone(),
        }
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ModelInfo {
    pub model_version: String,
    pub algorithm: String,
    pub format_version: u32,
    pub n_features: usize,
    pub feature_names: Vec<String>,
    pub classes: Vec<i64>,
}

#[derive(Serialize)]
struct ArtifactOut<'a> {
    format: &'a str,
    format_version: u32,
    model: &'a LogisticModel,
}

#[derive(Deserialize)]
struct ArtifactIn {
    format: String,
    format_version: u32,
    model: serde_json::Value,
}

/// Reads and checks the artifact at `path`.
///
/// The envelope is checked before the model body so that an artifact from a
/// different format version is reported as such instead of as corrupt data.
pub fn load_artifact(path: &Path) -> Result<LogisticModel, ArtifactError> {
    let bytes = fs::read(path).map_err(|e| io_at(path, e))?;
    let envelope: ArtifactIn = serde_json::from_slice(&bytes)?;
    if envelope.format != ARTIFACT_FORMAT {
        return Err(ArtifactError::UnknownFormat(envelope.format));
    }
    if envelope.format_version != ARTIFACT_VERSION {
        return Err(ArtifactError::UnsupportedVersion {
            found: envelope.format_version,
            expected: ARTIFACT_VERSION,
        });
    }
    let model: LogisticModel = serde_json::from_value(envelope.model)?;
    model.check_shape()?;
    Ok(model)
}

/// Writes the artifact next to `path` first and renames it into place, so an
/// interrupted write never clobbers the previous artifact.
pub fn save_artifact(model: &LogisticModel, path: &Path) -> Result<(), ArtifactError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| io_at(parent, e))?;
    }

    let bytes = serde_json::to_vec_pretty(&ArtifactOut {
        format: ARTIFACT_FORMAT,
        format_version: ARTIFACT_VERSION,
        model,
    })?;

    let tmp = staging_path(path);
    fs::write(&tmp, bytes).map_err(|e| io_at(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| io_at(path, e))?;
    Ok(())
}

fn io_at(path: &Path, source: std::io::Error) -> ArtifactError {
    ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model.json".to_string());
    path.with_file_name(format!(".{}.tmp", name))
}
