use clap::{Args, Subcommand};

use super::OutputFormat;
use erx_sync::config::Config;

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl ConfigCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(config)?);
                    }
                    OutputFormat::Text => print_config(config),
                }
                Ok(())
            }
        }
    }
}

fn print_config(config: &Config) {
    println!("Configuration");
    println!("=============\n");

    match &config.config_file {
        Some(path) => println!("Config file: {}", path.display()),
        None => println!(
            "Config file: {} (not found)",
            Config::default_config_path().display()
        ),
    }
    println!();

    println!("database_path: {}", config.database_path.value.display());
    println!("  source: {}", config.database_path.source);
    println!();

    println!(
        "locale: {}",
        config.locale.value.as_deref().unwrap_or("(server default)")
    );
    println!("  source: {}", config.locale.source);
    println!();

    println!("insurance_type: {}", config.insurance_type.value);
    println!("  source: {}", config.insurance_type.source);
    println!();

    println!("remote:");
    println!(
        "  base_url: {}",
        config.remote.base_url.as_deref().unwrap_or("(not configured)")
    );
    println!(
        "  access_token: {}",
        if config.remote.access_token.is_some() {
            "(set)"
        } else {
            "(not set)"
        }
    );
    println!("  timeout_secs: {}", config.remote.timeout_secs);
}
