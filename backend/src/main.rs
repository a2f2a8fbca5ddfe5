use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use log::{info, warn};

use iris_backend::config::Settings;
use iris_backend::routes;
use iris_backend::{ModelState, MODEL_VERSION};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .format_module_path(false)
        .init();

    info!("Starting iris classifier service v{}", MODEL_VERSION);

    let settings = Settings::from_env();

    // Loaded once, before any worker exists.
    let state = web::Data::new(ModelState::load(&settings.model_path));
    if !state.is_loaded() {
        warn!("No model available: /predict answers 503 until the service is restarted");
    }

    info!(
        "Listening on http://{}:{} with {} workers",
        settings.host, settings.port, settings.workers
    );
    info!("   GET  /health      - readiness");
    info!("   GET  /model-info  - loaded model metadata");
    info!("   POST /predict     - single-record prediction");

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(routes::configure)
            .default_service(web::route().to(routes::not_found))
    })
    .workers(settings.workers)
    .bind((settings.host.as_str(), settings.port))
    .with_context(|| format!("cannot bind {}:{}", settings.host, settings.port))?
    .run()
    .await
    .context("server stopped with an error")
}
