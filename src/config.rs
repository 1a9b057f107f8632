//! Configuration management for the function parser
//!
//! Configuration is layered: built-in defaults, then an optional TOML file,
//! then `GOPARSER_*` environment overrides.

use crate::{
    cli::Surface,
    error::{ParserError, Result},
    utils::env::EnvUtils,
};
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::debug;

/// Environment variable pointing at an explicit config file
pub const CONFIG_PATH_VAR: &str = "GOPARSER_CONFIG";
/// Config file picked up from the working directory
pub const LOCAL_CONFIG_FILE: &str = "goparser.toml";

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Enable debug logging
    pub debug: bool,
    /// Which argument surface the command line uses
    pub surface: Surface,
    /// Parser backend configuration
    pub backend: BackendConfig,
    /// Startup precondition on the host environment
    pub environment: EnvironmentConfig,
}

/// Available parser backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// `go doc -src`
    #[default]
    GoDoc,
    /// Arbitrary program with an argument template
    Command,
}

/// Parser backend configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackendConfig {
    /// Backend flavour
    pub kind: BackendKind,
    /// Program to execute
    pub program: String,
    /// Argument template for the command backend; `{package}` and
    /// `{function}` are substituted
    pub args: Vec<String>,
    /// Extra arguments appended in code-only mode (command backend)
    pub code_only_args: Vec<String>,
    /// Extra arguments appended when only exported functions are wanted
    /// (command backend)
    pub exported_only_args: Vec<String>,
    /// Arguments that make `go doc` include unexported symbols
    pub all_symbols_args: Vec<String>,
    /// Seconds before the backend is killed; 0 waits forever
    pub timeout_secs: u64,
}

/// Host environment precondition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnvironmentConfig {
    /// Variable selecting the module-resolution mode
    pub module_var: String,
    /// Values of `module_var` that abort startup
    pub disabled_values: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            surface: Surface::default(),
            backend: BackendConfig::default(),
            environment: EnvironmentConfig::default(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::GoDoc,
            program: "go".to_string(),
            args: Vec::new(),
            code_only_args: Vec::new(),
            exported_only_args: Vec::new(),
            all_symbols_args: vec!["-u".to_string()],
            timeout_secs: 60,
        }
    }
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            module_var: "GO111MODULE".to_string(),
            disabled_values: vec!["off".to_string()],
        }
    }
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self> {
        let mut config = match Self::locate_file(EnvUtils::get_var)? {
            Some(path) => Self::from_file(&path)?,
            None => {
                debug!("No config file found, using defaults");
                Self::default()
            }
        };

        config.apply_env_overrides(EnvUtils::get_var)?;
        config.validate()?;
        Ok(config)
    }

    /// Read configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading config from {}", path.display());

        let content = std::fs::read_to_string(path).map_err(|source| ParserError::ConfigFile {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|e| {
            ParserError::config_from(format!("invalid TOML in {}", path.display()), e)
        })
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ParserError::config_from("invalid TOML", e))
    }

    /// Find the config file to use.
    ///
    /// An explicit `GOPARSER_CONFIG` must exist; the implicit locations are
    /// skipped when absent.
    fn locate_file<F>(lookup: F) -> Result<Option<PathBuf>>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(explicit) = lookup(CONFIG_PATH_VAR) {
            let path = PathBuf::from(explicit);
            if !path.is_file() {
                return Err(ParserError::config(format!(
                    "{} points to a missing file: {}",
                    CONFIG_PATH_VAR,
                    path.display()
                )));
            }
            return Ok(Some(path));
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.is_file() {
            return Ok(Some(local));
        }

        Ok(dirs::config_dir()
            .map(|dir| dir.join("goparser").join("config.toml"))
            .filter(|path| path.is_file()))
    }

    /// Apply `GOPARSER_*` overrides read through `lookup`
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("GOPARSER_SURFACE") {
            self.surface = value
                .parse()
                .map_err(|e: String| ParserError::config(format!("GOPARSER_SURFACE: {e}")))?;
        }

        if let Some(value) = lookup("GOPARSER_BACKEND") {
            self.backend.kind = match value.trim().to_ascii_lowercase().as_str() {
                "go-doc" | "godoc" => BackendKind::GoDoc,
                "command" | "cmd" => BackendKind::Command,
                other => {
                    return Err(ParserError::config(format!(
                        "GOPARSER_BACKEND: unknown backend '{other}' (expected go-doc or command)"
                    )));
                }
            };
        }

        if let Some(value) = lookup("GOPARSER_BACKEND_PROGRAM") {
            self.backend.program = value;
        }

        if let Some(value) = lookup("GOPARSER_TIMEOUT") {
            self.backend.timeout_secs = value.trim().parse().map_err(|_| {
                ParserError::config(format!("GOPARSER_TIMEOUT: '{value}' is not a number of seconds"))
            })?;
        }

        if let Some(value) = lookup("GOPARSER_DEBUG") {
            self.debug = EnvUtils::parse_bool(&value).ok_or_else(|| {
                ParserError::config(format!("GOPARSER_DEBUG: '{value}' is not a boolean"))
            })?;
        }

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.backend.program.trim().is_empty() {
            return Err(ParserError::config("backend program must not be empty"));
        }

        if self.backend.kind == BackendKind::Command && self.backend.args.is_empty() {
            debug!("Command backend has no argument template");
        }

        if self.environment.module_var.trim().is_empty() {
            return Err(ParserError::config("environment.module_var must not be empty"));
        }

        Ok(())
    }

    /// Backend timeout, if one is configured
    pub fn timeout(&self) -> Option<Duration> {
        match self.backend.timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}
