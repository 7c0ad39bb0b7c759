//! Configuration loading

use anyhow::Result;
use std::path::Path;

use crate::Config;

/// Load configuration from a config file and environment variables
///
/// Config file search order:
/// 1. The explicit path (from `--config` or `NICOMETA_CONFIG_PATH`)
/// 2. ./config.yaml (current working directory)
/// 3. Fall back to environment variables only
///
/// Runs before logging is initialized, so progress goes to stderr.
pub fn load_config(explicit_path: Option<&Path>) -> Result<Config> {
    let config_path = explicit_path
        .map(|p| p.to_string_lossy().into_owned())
        .or_else(|| {
            let cwd = "config.yaml";
            Path::new(cwd).exists().then(|| cwd.to_string())
        });

    let config = if let Some(path) = config_path {
        if !Path::new(&path).exists() {
            return Err(anyhow::anyhow!("Config file not found: {path}"));
        }
        eprintln!("Loading config from {path}");
        Config::from_file(&path)
            .map_err(|e| anyhow::anyhow!("Failed to load {path}: {e}"))?
    } else {
        eprintln!("No config file found, using environment variables");
        Config::from_env().map_err(|e| anyhow::anyhow!("Failed to load config: {e}"))?
    };

    // Fail fast on misconfigurations
    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Config validation error: {error}");
        }
        return Err(anyhow::anyhow!(
            "Configuration validation failed with {} error(s): {}",
            errors.len(),
            errors.join("; ")
        ));
    }

    Ok(config)
}
