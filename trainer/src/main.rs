use anyhow::Context;

use iris_backend::config::model_path_from_env;
use iris_trainer::train_and_save;
use iris_trainer::training::TrainConfig;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .format_module_path(false)
        .init();

    let path = model_path_from_env();
    let summary = train_and_save(&path, &TrainConfig::default())
        .with_context(|| format!("training run for {} failed", path.display()))?;

    println!("model saved to {}", path.display());
    println!(
        "{} iterations, training accuracy {:.2}%",
        summary.report.iterations,
        summary.accuracy * 100.0
    );
    Ok(())
}
