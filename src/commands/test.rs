use anyhow::Result;
use colored::Colorize;
use echome_newsletter::{config, render};
use tracing::info;

/// Execute the test command
///
/// This validates the configuration file and template without contacting the open-data API
pub async fn execute(paths: &config::Paths) -> Result<()> {
    println!("{}", "Testing configuration...".yellow());
    info!("Loading and validating configuration");

    let cfg = config::load_config(&paths.config)?;
    let template = render::load_template(&paths.template).await?;

    println!("{}", "✓ Configuration test successful".green());
    println!();

    println!("{}", "Configuration Summary:".bold());
    println!("  {}: {}", "Site Title".cyan(), cfg.site_title);
    println!("  {}: {} / {}", "Colors".cyan(), cfg.brand_color, cfg.text_color);
    println!("  {}: {}", "Timezone".cyan(), cfg.timezone);
    println!();

    println!("  {}: {}", "Blocks".cyan(), cfg.blocks.len());
    for (idx, block) in cfg.blocks.iter().enumerate() {
        println!("    {}. {}", idx + 1, block.title);
    }
    println!("  {}: {}", "Links".cyan(), cfg.links.len());
    for (label, url) in &cfg.links {
        println!("    {} → {}", label, url);
    }
    println!();

    println!("{}", "Open Data:".cyan());
    println!("    API root: {}", cfg.open_data.api_root);
    println!("    Metropole: {}", cfg.open_data.metropole_slug);
    println!("    ZNI: {}", cfg.open_data.zni_slug);
    println!();

    let placeholders = render::placeholders(&template);
    println!("  {}: {}", "Template placeholders".cyan(), placeholders.len());
    for name in &placeholders {
        let status = if render::is_known_placeholder(name) {
            "ok".green()
        } else {
            "unknown".red()
        };
        println!("    {} ({})", name, status);
    }

    let edito = if paths.edito.is_file() {
        "present".green()
    } else {
        "absent".dimmed()
    };
    println!("  {}: {}", "Edito".cyan(), edito);

    info!("Configuration validation completed successfully");
    Ok(())
}
