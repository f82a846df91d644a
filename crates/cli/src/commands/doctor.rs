//! `reqlens doctor` — Diagnose config, store and model endpoints.

use reqlens_config::AppConfig;
use reqlens_core::provider::ModelHandle;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("reqlens doctor");
    println!("==============\n");

    let mut issues = 0;

    // Config
    let config_path = AppConfig::config_dir().join("config.toml");
    if !config_path.exists() {
        println!("  -  No config file at {}, using defaults", config_path.display());
    }
    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ok Config valid");
            config
        }
        Err(e) => {
            println!("  !! Config invalid: {e}");
            println!("\n  1 issue found. Fix the config and re-run.");
            return Ok(());
        }
    };

    // Store
    match reqlens_engine::open_store(&config).await {
        Ok(store) => match (store.health_check().await, store.vector_count().await) {
            (Ok(true), Ok(count)) => {
                println!("  ok Store reachable: {} ({count} vectors)", store.name());
            }
            (Ok(false), _) => {
                println!("  !! Store unhealthy: {}", store.name());
                issues += 1;
            }
            (Err(e), _) | (_, Err(e)) => {
                println!("  !! Store check failed: {e}");
                issues += 1;
            }
        },
        Err(e) => {
            println!("  !! Store unavailable: {e}");
            issues += 1;
        }
    }

    // Model endpoints
    let models = reqlens_providers::build_from_config(&config);
    for (role, handle) in [
        ("embedding", &models.embedding),
        ("coding", &models.coding),
        ("review", &models.review),
    ] {
        if !check_model(role, handle).await {
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  All checks passed.");
    } else {
        println!("  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}

async fn check_model(role: &str, handle: &ModelHandle) -> bool {
    match handle.provider().health_check().await {
        Ok(true) => {
            println!("  ok {role} model {} reachable via {}", handle.model(), handle.provider().name());
            true
        }
        Ok(false) => {
            println!("  !! {role} endpoint {} reports unhealthy", handle.provider().name());
            false
        }
        Err(e) => {
            println!("  !! {role} endpoint {} unreachable: {e}", handle.provider().name());
            false
        }
    }
}
