use goparser::{
    cli::Dispatcher,
    config::{Config, EnvironmentConfig},
    core::build_parser,
    error::{ParserError, Result},
    setup_logging,
    utils::check_module_mode,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(code) => exit_code(code),
        Err(err) => {
            eprintln!("error: {}", err.report());
            exit_code(err.exit_code())
        }
    }
}

fn run() -> Result<i32> {
    // GO111MODULE=off aborts before any config file is read
    check_module_mode(&EnvironmentConfig::default())?;

    // Load layered configuration (defaults, file, environment)
    let config = Config::load()?;

    // Logging goes to stderr so stdout only carries the result
    if let Err(e) = setup_logging(config.debug) {
        return Err(ParserError::config(format!("{e:#}")));
    }

    // A configured variable or value list may be stricter than the default
    check_module_mode(&config.environment)?;

    let parser = build_parser(&config)?;
    let mut stdout = std::io::stdout().lock();
    Dispatcher::new(config.surface, parser.as_ref()).run(std::env::args_os(), &mut stdout)
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
