//! Core functionality for function lookup
//!
//! Contains the invocation request, the parser backend boundary and the
//! backends that delegate to external programs.

pub mod parser;
pub mod request;
pub mod source;

pub use parser::{CommandParser, GoDocParser, SourceParser, build_parser};
pub use request::InvocationRequest;
pub use source::SourceCleaner;
