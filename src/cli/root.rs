use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, info};

use crate::config::Config;
use crate::tui;

/// Awaitable modal dialogs for terminal applications
#[derive(Parser, Debug)]
#[command(
    name = "suspend-dialogs",
    version,
    about = "Awaitable modal dialogs for terminal applications",
    long_about = r#"Shows a demo screen whose actions await confirm, input and loading dialogs
from background tasks. Dialogs stack, resolve independently and can be chained.

Examples:
  suspend-dialogs                          # Start the demo screen
  suspend-dialogs --loading-delay 500      # Shorter loading work
  suspend-dialogs config                   # Print the effective configuration"#
)]
pub struct Cli {
    /// Path to a JSON configuration file
    #[arg(short = 'c', long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short = 'd', long = "debug", global = true)]
    pub debug: bool,

    /// UI tick interval in milliseconds
    #[arg(long = "tick-rate", value_name = "MS", global = true)]
    pub tick_rate: Option<u64>,

    /// Disable mouse capture
    #[arg(long = "no-mouse", global = true)]
    pub no_mouse: bool,

    /// Duration of the loading demo's work in milliseconds
    #[arg(long = "loading-delay", value_name = "MS", global = true)]
    pub loading_delay: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Start the interactive demo screen (default)
    Demo,

    /// Print the effective configuration as JSON
    Config,
}

impl Cli {
    /// Load configuration from files and the environment, then apply flags
    pub async fn load_config(&self) -> Result<Config> {
        let mut config = Config::init(self.config.as_deref()).await?;
        self.apply_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Command line flags take priority over every other source
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(tick_rate) = self.tick_rate {
            config.tick_rate_ms = tick_rate;
        }
        if self.no_mouse {
            config.mouse_enabled = false;
        }
        if let Some(delay) = self.loading_delay {
            config.demo.loading_delay_ms = delay;
        }
    }

    pub async fn execute(self, config: Config) -> Result<()> {
        if self.debug {
            debug!("Debug logging enabled");
        }

        match self.command.unwrap_or(Commands::Demo) {
            Commands::Demo => {
                info!("Starting demo screen");
                tui::run(config).await
            }
            Commands::Config => {
                println!("{}", serde_json::to_string_pretty(&config)?);
                Ok(())
            }
        }
    }
}
