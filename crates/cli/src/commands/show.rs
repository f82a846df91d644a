//! `reqlens show` — Print a stored requirement.

use super::load_engine;

pub async fn run(id: String) -> Result<(), Box<dyn std::error::Error>> {
    let (_, engine) = load_engine().await?;
    let requirement = engine.requirement(&id).await?;

    println!("Id:       {}", requirement.id);
    println!("Category: {}", requirement.category);
    println!();
    println!("{}", requirement.content);

    Ok(())
}
