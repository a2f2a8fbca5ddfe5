use iris_backend::{ArtifactError, InferenceError, LogisticModel};
use log::debug;
use ndarray::{Array1, Array2, Axis};
use thiserror::Error;

/// Fixed hyperparameters for the softmax regression fit.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainConfig {
    /// Inverse L2 regularization strength.
    pub c: f64,
    pub learning_rate: f64,
    pub max_iter: usize,
    /// Stop once no gradient component exceeds this.
    pub tol: f64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            c: 1.0,
            learning_rate: 0.02,
            max_iter: 10_000,
            tol: 1e-2,
        }
    }
}

#[derive(Debug, Error)]
pub enum TrainError {
    #[error("dataset is empty")]
    EmptyDataset,
    #[error("{features} feature rows but {labels} labels")]
    LabelCount { features: usize, labels: usize },
    #[error("row {row} has label {label}, outside the {n_classes} known classes")]
    UnknownLabel {
        row: usize,
        label: usize,
        n_classes: usize,
    },
    #[error("hyperparameter `{0}` must be positive")]
    InvalidHyperparameter(&'static str),
    #[error("gradient descent diverged at iteration {0}")]
    Diverged(usize),
    #[error(transparent)]
    Model(#[from] ArtifactError),
    #[error(transparent)]
    Inference(#[from] InferenceError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FitReport {
    pub iterations: usize,
    pub converged: bool,
    /// Mean cross-entropy of the final model on the training rows.
    pub loss: f64,
}

/// Fits a multinomial logistic regression with full-batch gradient descent.
///
/// Weights start at zero and every step uses the whole dataset, so the same
/// inputs always produce the same model.
pub fn fit(
    features: &Array2<f64>,
    labels: &[usize],
    n_classes: usize,
    cfg: &TrainConfig,
) -> Result<(LogisticModel, FitReport), TrainError> {
    check_inputs(features, labels, n_classes, cfg)?;

    let (n_rows, n_features) = features.dim();
    let n = n_rows as f64;
    let targets = one_hot(labels, n_classes);

    let mut weights = Array2::<f64>::zeros((n_classes, n_features));
    let mut bias = Array1::<f64>::zeros(n_classes);
    let mut iterations = 0;
    let mut converged = false;

    for iter in 1..=cfg.max_iter {
        iterations = iter;
        let probs = softmax(features.dot(&weights.t()) + &bias);
        let residual = probs - &targets;

        let grad_w = residual.t().dot(features) / n + &weights / (cfg.c * n);
        let grad_b = residual.sum_axis(Axis(0)) / n;

        let mut largest = 0.0_f64;
        for &g in grad_w.iter().chain(grad_b.iter()) {
            if !g.is_finite() {
                return Err(TrainError::Diverged(iter));
            }
            largest = largest.max(g.abs());
        }

        weights.scaled_add(-cfg.learning_rate, &grad_w);
        bias.scaled_add(-cfg.learning_rate, &grad_b);

        if iter % 1000 == 0 {
            debug!("iteration {}: max |gradient| = {:.6}", iter, largest);
        }
        if largest < cfg.tol {
            converged = true;
            break;
        }
    }

    let probs = softmax(features.dot(&weights.t()) + &bias);
    let loss = labels
        .iter()
        .enumerate()
        .map(|(row, &label)| -probs[[row, label]].max(f64::MIN_POSITIVE).ln())
        .sum::<f64>()
        / n;

    let classes = (0..n_classes as i64).collect();
    let model = LogisticModel::new(classes, weights, bias)?;
    Ok((
        model,
        FitReport {
            iterations,
            converged,
            loss,
        },
    ))
}

/// Share of rows whose predicted label matches.
pub fn accuracy(
    model: &LogisticModel,
    features: &Array2<f64>,
    labels: &[usize],
) -> Result<f64, TrainError> {
    if labels.is_empty() {
        return Err(TrainError::EmptyDataset);
    }
    let predicted = model.predict(features.view())?;
    let hits = predicted
        .iter()
        .zip(labels)
        .filter(|(&p, &l)| p == l as i64)
        .count();
    Ok(hits as f64 / labels.len() as f64)
}

fn check_inputs(
    features: &Array2<f64>,
    labels: &[usize],
    n_classes: usize,
    cfg: &TrainConfig,
) -> Result<(), TrainError> {
    if features.nrows() == 0 || features.ncols() == 0 {
        return Err(TrainError::EmptyDataset);
    }
    if features.nrows() != labels.len() {
        return Err(TrainError::LabelCount {
            features: features.nrows(),
            labels: labels.len(),
        });
    }
    if let Some((row, &label)) = labels.iter().enumerate().find(|(_, &l)| l >= n_classes) {
        return Err(TrainError::UnknownLabel {
            row,
            label,
            n_classes,
        });
    }
    if !(cfg.c > 0.0) {
        return Err(TrainError::InvalidHyperparameter("c"));
    }
    if !(cfg.learning_rate > 0.0) {
        return Err(TrainError::InvalidHyperparameter("learning_rate"));
    }
    if cfg.max_iter == 0 {
        return Err(TrainError::InvalidHyperparameter("max_iter"));
    }
    Ok(())
}

fn one_hot(labels: &[usize], n_classes: usize) -> Array2<f64> {
    let mut out = Array2::zeros((labels.len(), n_classes));
    for (row, &label) in labels.iter().enumerate() {
        out[[row, label]] = 1.0;
    }
    out
}

/// Row-wise softmax, shifted by the row maximum to keep `exp` finite.
fn softmax(mut scores: Array2<f64>) -> Array2<f64> {
    for mut row in scores.rows_mut() {
        let max = row.fold(f64::NEG_INFINITY, |m, &v| m.max(v));
        row.mapv_inplace(|v| (v - max).exp());
        let total = row.sum();
        row /= total;
    }
    scores
}
