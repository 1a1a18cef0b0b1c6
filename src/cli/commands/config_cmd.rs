//! Configuration display.

use gridscrape::Config;

/// Print the effective configuration (file, environment and flags merged) as TOML.
pub fn cmd_config_show(config: &Config) -> anyhow::Result<()> {
    print!("{}", config.to_toml()?);
    Ok(())
}
