//! Offline trainer for the iris classifier artifact.

pub mod dataset;
pub mod training;

use std::path::Path;

use iris_backend::save_artifact;
use log::{info, warn};

use crate::dataset::load_iris;
use crate::training::{accuracy, fit, FitReport, TrainConfig, TrainError};

#[derive(Debug, Clone, PartialEq)]
pub struct TrainSummary {
    pub report: FitReport,
    pub accuracy: f64,
}

/// Fits on the built-in dataset and writes the artifact to `path`,
/// replacing whatever was there.
pub fn train_and_save(path: &Path, cfg: &TrainConfig) -> Result<TrainSummary, TrainError> {
    let data = load_iris();
    info!(
        "Training on {} samples, {} features, {} classes",
        data.n_samples(),
        data.n_features(),
        data.n_classes()
    );

    let (model, report) = fit(&data.features, &data.labels, data.n_classes(), cfg)?;
    if report.converged {
        info!(
            "Converged after {} iterations (loss {:.4})",
            report.iterations, report.loss
        );
    } else {
        warn!(
            "Stopped at max_iter={} without converging (loss {:.4})",
            cfg.max_iter, report.loss
        );
    }

    let accuracy = accuracy(&model, &data.features, &data.labels)?;
    info!("Training accuracy: {:.2}%", accuracy * 100.0);

    save_artifact(&model, path)?;
    Ok(TrainSummary { report, accuracy })
}
