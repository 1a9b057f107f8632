//! Parser backends
//!
//! The dispatcher only knows the [`SourceParser`] boundary. The backends
//! here hand the actual lookup to an external program and turn every way it
//! can fail into [`ParserError::Collaborator`].

use crate::{
    config::{BackendConfig, BackendKind, Config},
    core::{request::InvocationRequest, source::SourceCleaner},
    error::{ParserError, Result},
    utils::process::ProcessRunner,
};
use tracing::{debug, info, instrument};

/// Locates a function and returns its source text
pub trait SourceParser {
    /// Look up `request.function_name` in `request.package_path`
    fn parse(&self, request: &InvocationRequest) -> Result<String>;
}

/// Backend built on `go doc -src`
#[derive(Debug)]
pub struct GoDocParser {
    program: String,
    all_symbols_args: Vec<String>,
    runner: ProcessRunner,
    cleaner: SourceCleaner,
}

impl GoDocParser {
    /// Create a new `go doc` backend
    pub fn new(config: &BackendConfig, runner: ProcessRunner) -> Result<Self> {
        Ok(Self {
            program: config.program.clone(),
            all_symbols_args: config.all_symbols_args.clone(),
            runner,
            cleaner: SourceCleaner::new()?,
        })
    }

    /// Arguments passed to the `go` program for `request`
    pub fn command_args(&self, request: &InvocationRequest) -> Vec<String> {
        let mut args = vec!["doc".to_string(), "-src".to_string()];
        if !request.exported_only {
            args.extend(self.all_symbols_args.iter().cloned());
        }
        args.push(request.package_path.clone());
        args.push(request.function_name.clone());
        args
    }
}

impl SourceParser for GoDocParser {
    #[instrument(skip(self))]
    fn parse(&self, request: &InvocationRequest) -> Result<String> {
        let args = self.command_args(request);
        let output = self
            .runner
            .run_command_with_output(&self.program, &args)
            .map_err(|e| collaborator_failure(e, request))?;

        let source = self.cleaner.clean(&output.stdout, request.code_only);
        non_empty(source, &output.stderr, request)
    }
}

/// Backend running an arbitrary program from an argument template
#[derive(Debug)]
pub struct CommandParser {
    program: String,
    args: Vec<String>,
    code_only_args: Vec<String>,
    exported_only_args: Vec<String>,
    runner: ProcessRunner,
}

impl CommandParser {
    /// Create a new command backend
    pub fn new(config: &BackendConfig, runner: ProcessRunner) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
            code_only_args: config.code_only_args.clone(),
            exported_only_args: config.exported_only_args.clone(),
            runner,
        }
    }

    /// Expand the argument template for `request`
    pub fn command_args(&self, request: &InvocationRequest) -> Vec<String> {
        let mut args: Vec<String> = self
            .args
            .iter()
            .map(|arg| {
                arg.replace("{package}", &request.package_path)
                    .replace("{function}", &request.function_name)
            })
            .collect();

        if request.code_only {
            args.extend(self.code_only_args.iter().cloned());
        }
        if request.exported_only {
            args.extend(self.exported_only_args.iter().cloned());
        }
        args
    }
}

impl SourceParser for CommandParser {
    #[instrument(skip(self))]
    fn parse(&self, request: &InvocationRequest) -> Result<String> {
        let args = self.command_args(request);
        let output = self
            .runner
            .run_command_with_output(&self.program, &args)
            .map_err(|e| collaborator_failure(e, request))?;

        let source = output
            .stdout
            .trim_start_matches(['\r', '\n'])
            .trim_end()
            .to_string();
        non_empty(source, &output.stderr, request)
    }
}

/// Build the backend selected by the configuration
pub fn build_parser(config: &Config) -> Result<Box<dyn SourceParser>> {
    let runner = ProcessRunner::new(config.timeout());

    info!(
        "Using {:?} backend ({}), timeout {:?}",
        config.backend.kind,
        config.backend.program,
        runner.timeout()
    );

    Ok(match config.backend.kind {
        BackendKind::GoDoc => Box::new(GoDocParser::new(&config.backend, runner)?),
        BackendKind::Command => Box::new(CommandParser::new(&config.backend, runner)),
    })
}

fn non_empty(source: String, stderr: &str, request: &InvocationRequest) -> Result<String> {
    if source.is_empty() {
        let message = match stderr.trim() {
            "" => format!("backend returned an empty result for {}", request.function_name),
            detail => format!(
                "backend returned an empty result for {}: {detail}",
                request.function_name
            ),
        };
        return Err(ParserError::collaborator(
            message,
            &request.function_name,
            &request.package_path,
        ));
    }

    debug!("Backend returned {} bytes", source.len());
    Ok(source)
}

fn collaborator_failure(err: ParserError, request: &InvocationRequest) -> ParserError {
    let target = format!("{} in {}", request.function_name, request.package_path);
    let message = match &err {
        ParserError::Process {
            exit_code: Some(code),
            stderr,
            ..
        } => match stderr.trim() {
            "" => format!("cannot find {target}: backend exited with status {code}"),
            detail => format!("cannot find {target}: {detail}"),
        },
        ParserError::Process { exit_code: None, .. } => {
            format!("cannot run the backend to look up {target}")
        }
        ParserError::Timeout { seconds, .. } => {
            format!("backend did not answer within {seconds}s while looking up {target}")
        }
        _ => format!("cannot look up {target}"),
    };

    ParserError::collaborator_from(message, &request.function_name, &request.package_path, err)
}
