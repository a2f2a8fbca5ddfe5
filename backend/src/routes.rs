use actix_web::{get, post, web, HttpResponse, Responder};
use log::debug;
use ndarray::arr2;

use crate::error::{json_error_handler, ApiError, InferenceError};
use crate::models::{HealthResponse, IrisFeatures, PredictionResponse};
use crate::state::ModelState;

const MAX_BODY_BYTES: usize = 4 * 1024;

#[get("/health")]
pub async fn health(state: web::Data<ModelState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse::healthy(state.is_loaded()))
}

#[post("/predict")]
pub async fn predict(
    state: web::Data<ModelState>,
    features: IrisFeatures,
) -> Result<HttpResponse, ApiError> {
    let model = state.model()?;

    let row = arr2(&[features.to_array()]);
    let labels = model.predict(row.view())?;
    let prediction = labels.first().copied().ok_or(InferenceError::Empty)?;

    debug!("Predicted class {} for {:?}", prediction, features);
    Ok(HttpResponse::Ok().json(PredictionResponse::new(prediction)))
}

#[get("/model-info")]
pub async fn model_info(state: web::Data<ModelState>) -> Result<HttpResponse, ApiError> {
    let model = state.model()?;
    Ok(HttpResponse::Ok().json(model.model_info()))
}

pub async fn not_found() -> Result<HttpResponse, ApiError> {
    Err(ApiError::NotFound)
}

/// Registers the endpoints and the JSON body limits. The caller provides the
/// `web::Data<ModelState>`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(MAX_BODY_BYTES)
            .error_handler(json_error_handler),
    )
    .service(health)
    .service(predict)
    .service(model_info);
}
