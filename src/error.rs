//! Error types for the function parser
//!
//! Provides structured error handling with context and proper error chains.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the function parser
#[derive(Error, Debug)]
pub enum ParserError {
    /// The host toolchain is configured in a mode the parser cannot work with
    #[error("Environment precondition failed: {variable}={value}: {message}")]
    EnvironmentPrecondition {
        variable: String,
        value: String,
        message: String,
    },

    /// Errors raised by the source-parsing collaborator
    #[error("Parser error: {message}")]
    Collaborator {
        message: String,
        function: String,
        package: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Process execution errors
    #[error("Process error: {command} failed")]
    Process {
        command: String,
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A child process did not finish in time and was killed
    #[error("Process error: {command} timed out after {seconds}s")]
    Timeout { command: String, seconds: u64 },

    /// Configuration file could not be read
    #[error("Configuration error: cannot read {path}")]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Writing the result failed
    #[error("Output error")]
    Io(#[from] std::io::Error),
}

impl ParserError {
    /// Create a new environment precondition error
    pub fn environment_precondition(
        variable: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::EnvironmentPrecondition {
            variable: variable.into(),
            value: value.into(),
            message: message.into(),
        }
    }

    /// Create a new collaborator error
    pub fn collaborator(
        message: impl Into<String>,
        function: impl Into<String>,
        package: impl Into<String>,
    ) -> Self {
        Self::Collaborator {
            message: message.into(),
            function: function.into(),
            package: package.into(),
            source: None,
        }
    }

    /// Wrap a lower-level failure as a collaborator error
    pub fn collaborator_from(
        message: impl Into<String>,
        function: impl Into<String>,
        package: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Collaborator {
            message: message.into(),
            function: function.into(),
            package: package.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new process error
    pub fn process(
        command: impl Into<String>,
        exit_code: Option<i32>,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
    ) -> Self {
        Self::Process {
            command: command.into(),
            exit_code,
            stdout: stdout.into(),
            stderr: stderr.into(),
            source: None,
        }
    }

    /// Create a new timeout error
    pub fn timeout(command: impl Into<String>, seconds: u64) -> Self {
        Self::Timeout {
            command: command.into(),
            seconds,
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with its underlying cause
    pub fn config_from(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Process exit code reported for this error.
    ///
    /// Startup failures (environment and configuration) exit with 2, failures
    /// while producing the result exit with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::EnvironmentPrecondition { .. } | Self::ConfigFile { .. } | Self::Config { .. } => 2,
            Self::Collaborator { .. } | Self::Process { .. } | Self::Timeout { .. } | Self::Io(_) => 1,
        }
    }

    /// Render the error and its causes on one line for the terminal
    pub fn report(&self) -> String {
        let mut text = self.to_string();
        let mut cause = std::error::Error::source(self);
        while let Some(err) = cause {
            text.push_str(": ");
            text.push_str(&err.to_string());
            cause = err.source();
        }
        text
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ParserError>;
