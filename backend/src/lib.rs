//! Iris classifier serving: artifact codec, startup model state and the
//! actix-web routes for `/health`, `/predict` and `/model-info`.

pub mod config;
pub mod error;
pub mod extract;
pub mod inference;
pub mod models;
pub mod routes;
pub mod state;

pub use error::{ApiError, ArtifactError, InferenceError};
pub use inference::{load_artifact, save_artifact, LogisticModel};
pub use models::MODEL_VERSION;
pub use state::ModelState;
