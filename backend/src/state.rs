use std::path::Path;

use log::{error, info};

use crate::error::ApiError;
use crate::inference::{load_artifact, LogisticModel};

/// Outcome of the single startup load. Built once before the server starts
/// and shared read-only by every worker; there is no transition out of either
/// state for the life of the process.
#[derive(Debug)]
pub enum ModelState {
    Loaded(LogisticModel),
    Unavailable { reason: String },
}

impl ModelState {
    pub fn load(path: &Path) -> Self {
        match load_artifact(path) {
            Ok(model) => {
                info!(
                    "Model loaded from {} ({} classes, {} features)",
                    path.display(),
                    model.classes().len(),
                    model.n_features()
                );
                ModelState::Loaded(model)
            }
            Err(e) => {
                error!("Failed to load model: {}", e);
                ModelState::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, ModelState::Loaded(_))
    }

    pub fn model(&self) -> Result<&LogisticModel, ApiError> {
        match self {
            ModelState::Loaded(model) => Ok(model),
            ModelState::Unavailable { .. } => Err(ApiError::ModelNotLoaded),
        }
    }
}
