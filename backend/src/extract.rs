use std::future::Future;
use std::pin::Pin;

use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};

use crate::error::ApiError;
use crate::models::{IrisFeatures, PredictionRequest};

/// Decodes and validates the `/predict` body before the handler runs, so a
/// bad request is rejected with 422 whether or not a model is loaded.
impl FromRequest for IrisFeatures {
    type Error = actix_web::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let body = web::Json::<PredictionRequest>::from_request(req, payload);
        Box::pin(validated(body))
    }
}

async fn validated<F>(body: F) -> Result<IrisFeatures, actix_web::Error>
where
    F: Future<Output = Result<web::Json<PredictionRequest>, actix_web::Error>>,
{
    let request = body.await?.into_inner();
    let features = request.validate().map_err(ApiError::Validation)?;
    Ok(features)
}
