use anyhow::Result;
use colored::Colorize;
use echome_newsletter::{config::Paths, pipeline};

/// Execute the generate command
pub async fn execute(paths: &Paths) -> Result<()> {
    let report = pipeline::generate(paths).await?;

    println!(
        "{}",
        format!("Newsletter générée: {}", report.output.display()).green()
    );
    Ok(())
}
