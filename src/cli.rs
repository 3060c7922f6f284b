use clap::{Parser, Subcommand};
use echome_newsletter::config::{
    Paths, DEFAULT_CONFIG_PATH, DEFAULT_EDITO_PATH, DEFAULT_OUTPUT_PATH, DEFAULT_TEMPLATE_PATH,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "newsletter", version, about = "Echome photovoltaic newsletter generator")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH, global = true)]
    pub config: PathBuf,

    /// Editorial text path (optional file)
    #[arg(short, long, default_value = DEFAULT_EDITO_PATH, global = true)]
    pub edito: PathBuf,

    /// HTML template path
    #[arg(short, long, default_value = DEFAULT_TEMPLATE_PATH, global = true)]
    pub template: PathBuf,

    /// Output document path
    #[arg(short, long, default_value = DEFAULT_OUTPUT_PATH, global = true)]
    pub output: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Fetch tariff data and write the newsletter (default)
    Generate,

    /// Check configuration and template without network access
    Test,

    /// Show version information
    Version,
}

impl Cli {
    /// Get the command to execute, defaulting to Generate if none provided
    pub fn get_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Generate)
    }

    pub fn paths(&self) -> Paths {
        Paths {
            config: self.config.clone(),
            edito: self.edito.clone(),
            template: self.template.clone(),
            output: self.output.clone(),
        }
    }
}
