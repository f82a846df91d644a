//! `reqlens serve` — Start the HTTP API server.

use super::load_engine;

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let (mut config, engine) = load_engine().await?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("reqlens gateway");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   Store:     {} ({})", config.store.backend, config.store.path.display());
    println!("   Models:    {} / {} / {}", config.embedding.model, config.coding.model, config.review.model);

    reqlens_gateway::start(config, engine).await?;

    Ok(())
}
