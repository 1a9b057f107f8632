//! # goparser
//!
//! Prints the source of a Go function given its name and package path.
//! Argument handling lives here; the lookup itself is delegated to an
//! external program (`go doc -src` by default) behind the
//! [`core::SourceParser`] trait.
//!
//! ## Example
//!
//! ```no_run
//! use goparser::{cli::{Dispatcher, Surface}, config::Config, core::build_parser};
//!
//! let config = Config::load()?;
//! let parser = build_parser(&config)?;
//! let mut stdout = std::io::stdout();
//! let code = Dispatcher::new(Surface::Flags, parser.as_ref())
//!     .run(["goparser", "-func", "Fuzz", "-p", "./fuzz"], &mut stdout)?;
//! assert_eq!(code, 0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod utils;

use anyhow::Result;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding an explicit log filter
pub const LOG_FILTER_VAR: &str = "GOPARSER_LOG";

/// Initialize logging on stderr with appropriate verbosity.
///
/// `GOPARSER_LOG` takes precedence; otherwise only warnings are shown unless
/// `debug` is set.
pub fn setup_logging(debug: bool) -> Result<()> {
    let filter = match EnvFilter::try_from_env(LOG_FILTER_VAR) {
        Ok(filter) => filter,
        Err(_) if debug => EnvFilter::new("debug"),
        Err(_) => EnvFilter::new("warn"),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true)
                .compact(),
        )
        .with(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
