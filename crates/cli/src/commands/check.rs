//! `reqlens check` — Check a source file against its requirement.

use std::path::PathBuf;

use reqlens_core::submission::CodeSubmission;
use reqlens_core::validation::validate_submission;

use super::load_engine;

pub async fn run(
    file: PathBuf,
    language: String,
    requirement_id: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let code = std::fs::read_to_string(&file)
        .map_err(|e| format!("Failed to read {}: {e}", file.display()))?;

    let (config, engine) = load_engine().await?;
    let language = validate_submission(
        &code,
        &language,
        config.analysis.max_code_size,
        &config.analysis.supported_languages,
    )?;

    let mut submission = CodeSubmission::new(code, language);
    if let Some(id) = requirement_id {
        submission = submission.with_requirement(id);
    }

    let outcome = engine.check(&submission).await?;
    eprintln!("Requirement: {} ({:?})", outcome.requirement_id, outcome.tier);
    println!("{}", serde_json::to_string_pretty(&outcome.feedback)?);

    Ok(())
}
