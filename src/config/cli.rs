use crate::config::toml_config::TrackerConfig;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "training-tracker")]
#[command(about = "Training management backend with dashboard reporting")]
pub struct CliArgs {
    /// Path to TOML configuration file (defaults to ./training-tracker.toml when present)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the listening port from config
    #[arg(long)]
    pub port: Option<u16>,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Override the in-memory seed file from config
    #[arg(long)]
    pub seed_file: Option<String>,

    /// Validate configuration and exit
    #[arg(long)]
    pub check: bool,
}

impl CliArgs {
    /// Applies command-line overrides and describes each one applied.
    ///
    /// Runs before logging is configured, so the caller logs the result.
    pub fn apply_overrides(&self, config: &mut TrackerConfig) -> Vec<String> {
        let mut applied = Vec::new();
        if let Some(port) = self.port {
            config.server.port = port;
            applied.push(format!("Port overridden to: {}", port));
        }
        if let Some(seed_file) = &self.seed_file {
            config.store.seed_file = Some(seed_file.clone());
            applied.push(format!("Seed file overridden to: {}", seed_file));
        }
        if self.json_logs {
            config.logging.format = Some("json".to_string());
        }
        if self.verbose {
            config.logging.verbose = Some(true);
        }
        applied
    }
}
