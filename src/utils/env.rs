//! Environment handling utilities
//!
//! Reads environment overrides and enforces the module-mode startup
//! precondition of the Go toolchain.

use crate::{
    config::EnvironmentConfig,
    error::{ParserError, Result},
};
use std::env;
use tracing::{debug, instrument};

/// Environment variable utilities
#[derive(Debug)]
pub struct EnvUtils;

impl EnvUtils {
    /// Get an environment variable, treating an empty value as unset
    pub fn get_var(key: &str) -> Option<String> {
        env::var(key).ok().filter(|value| !value.trim().is_empty())
    }

    /// Interpret a loose boolean such as `1`, `true`, `yes` or `on`
    pub fn parse_bool(value: &str) -> Option<bool> {
        match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        }
    }
}

/// Abort startup when the module system is switched off.
///
/// Package paths can only be resolved in module mode, so a value listed in
/// `disabled_values` (default `GO111MODULE=off`) is fatal.
#[instrument(skip(config))]
pub fn check_module_mode(config: &EnvironmentConfig) -> Result<()> {
    check_module_mode_with(config, |key| env::var(key).ok())
}

/// Same as [`check_module_mode`] with a custom variable lookup
pub fn check_module_mode_with<F>(config: &EnvironmentConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(&config.module_var) else {
        debug!("{} is not set", config.module_var);
        return Ok(());
    };

    let normalized = value.trim().to_ascii_lowercase();
    let disabled = config
        .disabled_values
        .iter()
        .any(|candidate| candidate.trim().eq_ignore_ascii_case(&normalized));

    if disabled {
        return Err(ParserError::environment_precondition(
            &config.module_var,
            value,
            "module mode is required to resolve package paths; unset it or set it to `on`",
        ));
    }

    debug!("{}={} is compatible", config.module_var, value);
    Ok(())
}
