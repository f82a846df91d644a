//! `reqlens ingest` — Store a requirement.

use std::path::PathBuf;

use reqlens_core::requirement::Requirement;
use reqlens_core::validation::validate_requirement;

use super::load_engine;

pub async fn run(
    file: Option<PathBuf>,
    text: Option<String>,
    category: String,
    id: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let content = match (file, text) {
        (Some(path), _) => std::fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read {}: {e}", path.display()))?,
        (None, Some(text)) => text,
        (None, None) => return Err("Provide --file or --text".into()),
    };

    let category = validate_requirement(&content, &category)?;
    let (_, engine) = load_engine().await?;

    let requirement = Requirement::with_id(id.unwrap_or_default(), content, category);
    let id = engine.ingest(&requirement).await?;
    println!("{id}");

    Ok(())
}
