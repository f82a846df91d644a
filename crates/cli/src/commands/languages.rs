//! `reqlens languages` — List accepted languages.

use reqlens_config::AppConfig;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    for language in &config.analysis.supported_languages {
        let probe = match reqlens_engine::probe_for(language) {
            Some(_) if language == "rust" => "syntax tree",
            Some(_) => "line heuristic",
            None => "none",
        };
        println!("  {language:<12} structure probe: {probe}");
    }

    Ok(())
}
