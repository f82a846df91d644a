pub mod check;
pub mod doctor;
pub mod ingest;
pub mod languages;
pub mod serve;
pub mod show;

use reqlens_config::AppConfig;
use reqlens_engine::AlignmentEngine;

/// Load config and wire an engine from it.
pub(crate) async fn load_engine() -> Result<(AppConfig, AlignmentEngine), Box<dyn std::error::Error>>
{
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let engine = AlignmentEngine::from_config(&config).await?;
    Ok((config, engine))
}
