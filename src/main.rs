use anyhow::Result;
use dynamic_translate::config::Config;
use dynamic_translate::engine::HttpEngineLoader;
use dynamic_translate::loader::{ModelLoader, ModelState};
use dynamic_translate::service::TranslationRuntime;
use std::io::BufRead;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when the variables are already set)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("dynamic_translate=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;
    info!(
        "Translating {} -> {} with {} via {}",
        config.source_language, config.target_language, config.model, config.engine_url
    );

    // Texts from arguments, or one per stdin line
    let mut texts: Vec<String> = std::env::args().skip(1).collect();
    if texts.is_empty() {
        for line in std::io::stdin().lock().lines() {
            texts.push(line?);
        }
    }

    if texts.is_empty() {
        info!("Nothing to translate");
        return Ok(());
    }

    let engine_loader = HttpEngineLoader::from_config(&config)?;
    let loader = ModelLoader::with_devices(Arc::new(engine_loader), config.devices.clone());
    let runtime = TranslationRuntime::with_loader(loader, config.source_language);
    let translator = runtime.translator(config.target_language);

    translator.initialize().await;
    if runtime.loader().state() == ModelState::Failed {
        warn!("Model unavailable; printing input unchanged");
    }

    for translated in translator.translate_batch(&texts).await {
        println!("{}", translated);
    }

    info!(
        "Translation metrics: {}",
        serde_json::to_string(&runtime.metrics())?
    );
    Ok(())
}
