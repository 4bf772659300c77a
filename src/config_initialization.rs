//! Configuration initialization and hierarchy management

use anyhow::{Context, Result};
use tracing::info;

use crate::adapters::toml_config::{ServiceConfig, TomlConfigAdapter, DEFAULT_CONFIG_PATHS};
use crate::cli::Cli;

/// Build the effective configuration following precedence: CLI > Env > File > Defaults
pub fn initialize_configuration_hierarchy(cli: &Cli) -> Result<ServiceConfig> {
    initialize_with_env(cli, |key| std::env::var(key).ok())
}

/// Same as [`initialize_configuration_hierarchy`] with an explicit environment
pub fn initialize_with_env<F>(cli: &Cli, lookup: F) -> Result<ServiceConfig>
where
    F: Fn(&str) -> Option<String>,
{
    // Step 1: defaults come from TomlConfigAdapter::new()
    let mut adapter = TomlConfigAdapter::new();

    // Step 2: an explicit file must exist; the default locations are optional
    match &cli.config {
        Some(path) => adapter
            .load_config(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => {
            if !adapter.load_first_existing(&DEFAULT_CONFIG_PATHS)? {
                info!("No config file loaded, using defaults");
            }
        }
    }

    // Step 3: environment
    adapter
        .apply_env(lookup)
        .context("Invalid environment configuration")?;

    // Step 4: command line
    apply_cli_configuration_overrides(adapter.config_mut(), cli);

    adapter.validate_config()?;
    Ok(adapter.into_config())
}

/// Apply CLI argument overrides to configuration
fn apply_cli_configuration_overrides(config: &mut ServiceConfig, cli: &Cli) -> usize {
    let mut cli_overrides = 0;

    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
        cli_overrides += 1;
    }
    if let Some(poll_interval_ms) = cli.poll_interval_ms {
        config.poll_interval_ms = poll_interval_ms;
        cli_overrides += 1;
    }

    if cli_overrides > 0 {
        info!("Applied {} CLI configuration overrides", cli_overrides);
    }
    cli_overrides
}
