use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod commands;

use crate::config::DashboardConfig;
use commands::{predict, serve};

#[derive(Parser)]
#[command(name = "kpcast")]
#[command(about = "Kp index forecast dashboard and prediction tools")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Serve {
        /// Bind address for the web server
        ///
        /// Format: IP:PORT (e.g., 0.0.0.0:3000, 127.0.0.1:8080)
        #[arg(short, long, env = "BIND_ADDRESS", default_value = "0.0.0.0:3000")]
        bind_address: String,

        #[command(flatten)]
        config: DashboardConfig,
    },
    /// Predict Kp once from feature values
    ///
    /// Example:
    ///   kpcast predict -- 1.2 3.4 -0.5 ...
    Predict {
        #[command(flatten)]
        config: DashboardConfig,

        /// Feature values in training order
        #[arg(required = true, allow_hyphen_values = true)]
        features: Vec<String>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Serve { bind_address, config } => {
                serve(&config, &bind_address).await?;
            }
            Commands::Predict { config, features } => {
                predict(&config, &features).await?;
            }
        }
        Ok(())
    }
}
