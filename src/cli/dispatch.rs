//! Invocation dispatch
//!
//! Resolves the arguments with the configured surface, calls the parser
//! backend at most once and prints what it returned.

use crate::{
    cli::{
        Surface,
        args::{Resolution, resolve},
    },
    core::SourceParser,
    error::Result,
};
use std::ffi::OsString;
use std::io::Write;
use tracing::{debug, info, instrument};

/// Runs one invocation against a parser backend
pub struct Dispatcher<'a> {
    surface: Surface,
    parser: &'a dyn SourceParser,
}

impl<'a> Dispatcher<'a> {
    /// Create a dispatcher for `surface` backed by `parser`
    pub fn new(surface: Surface, parser: &'a dyn SourceParser) -> Self {
        Self { surface, parser }
    }

    /// Handle `args` (program name first), writing all user-facing text to
    /// `out`, and return the process exit code.
    ///
    /// Usage problems are reported on `out` with a non-zero exit code and
    /// never reach the backend. Backend and write failures are returned as
    /// errors for the caller to report.
    #[instrument(skip_all, fields(surface = %self.surface))]
    pub fn run<I, T, W>(&self, args: I, out: &mut W) -> Result<i32>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
        W: Write,
    {
        let request = match resolve(self.surface, args) {
            Resolution::Request(request) => request,
            Resolution::Exit { message, exit_code } => {
                debug!("Not invoking the parser, exit code {}", exit_code);
                out.write_all(message.as_bytes())?;
                if !message.ends_with('\n') {
                    out.write_all(b"\n")?;
                }
                out.flush()?;
                return Ok(exit_code);
            }
        };

        info!(
            "Looking up {} in {} (code_only={})",
            request.function_name, request.package_path, request.code_only
        );

        let source = self.parser.parse(&request)?;
        writeln!(out, "{source}")?;
        out.flush()?;
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::InvocationRequest;
    use crate::error::ParserError;
    use std::cell::RefCell;

    /// Backend stub recording every request it receives
    struct StubParser {
        reply: std::result::Result<String, String>,
        calls: RefCell<Vec<InvocationRequest>>,
    }

    impl StubParser {
        fn returning(source: &str) -> Self {
            Self {
                reply: Ok(source.to_string()),
                calls: RefCell::new(Vec::new()),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                reply: Err(message.to_string()),
                calls: RefCell::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<InvocationRequest> {
            self.calls.borrow().clone()
        }
    }

    impl SourceParser for StubParser {
        fn parse(&self, request: &InvocationRequest) -> Result<String> {
            self.calls.borrow_mut().push(request.clone());
            self.reply.clone().map_err(|message| {
                ParserError::collaborator(message, &request.function_name, &request.package_path)
            })
        }
    }

    fn run(surface: Surface, parser: &StubParser, args: &[&str]) -> (String, Result<i32>) {
        let mut out = Vec::new();
        let result = Dispatcher::new(surface, parser).run(args.iter().copied(), &mut out);
        (String::from_utf8(out).unwrap(), result)
    }

    #[test]
    fn test_prints_result_with_newline() {
        let parser = StubParser::returning("func foo() {}");
        let (out, code) = run(Surface::Flags, &parser, &["goparser", "-func", "foo"]);

        assert_eq!(code.unwrap(), 0);
        assert_eq!(out, "func foo() {}\n");
    }

    #[test]
    fn test_flags_forward_defaults() {
        let parser = StubParser::returning("x");
        let (out, code) = run(Surface::Flags, &parser, &["goparser", "-func", "foo"]);
        assert_eq!(code.unwrap(), 0);
        assert_eq!(out, "x\n");

        let calls = parser.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].package_path, ".");
        assert!(!calls[0].code_only);
        assert!(!calls[0].exported_only);
    }

    #[test]
    fn test_flags_forward_code_only() {
        let parser = StubParser::returning("x");
        let (_, code) = run(Surface::Flags, &parser, &["goparser", "-func", "foo", "-code"]);
        assert_eq!(code.unwrap(), 0);
        assert!(parser.calls()[0].code_only);
    }

    #[test]
    fn test_positional_forward_package() {
        let parser = StubParser::returning("x");
        for args in [&["goparser", "foo"][..], &["goparser", "foo", "bar/baz"]] {
            let (out, code) = run(Surface::Positional, &parser, args);
            assert_eq!(code.unwrap(), 0);
            assert_eq!(out, "x\n");
        }

        let calls = parser.calls();
        assert_eq!(calls[0].package_path, ".");
        assert_eq!(calls[1].package_path, "bar/baz");
        assert!(calls.iter().all(|call| !call.code_only && !call.exported_only));
    }

    #[test]
    fn test_missing_function_never_calls_parser() {
        for surface in [Surface::Flags, Surface::Positional] {
            let parser = StubParser::returning("x");
            let (out, code) = run(surface, &parser, &["goparser"]);

            assert_eq!(code.unwrap(), 1);
            assert!(out.contains("Missing function name"));
            assert!(out.contains("Usage"));
            assert!(parser.calls().is_empty());
        }
    }

    #[test]
    fn test_positional_help_never_calls_parser() {
        let parser = StubParser::returning("x");
        let (out, code) = run(Surface::Positional, &parser, &["goparser", "--help"]);

        assert_eq!(code.unwrap(), 1);
        assert!(out.starts_with("Usage"));
        assert!(parser.calls().is_empty());
    }

    #[test]
    fn test_parser_failure_is_returned_without_output() {
        let parser = StubParser::failing("no symbol foo");
        let (out, result) = run(Surface::Flags, &parser, &["goparser", "-func", "foo"]);

        assert!(out.is_empty());
        let err = result.unwrap_err();
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("no symbol foo"));
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let parser = StubParser::returning("func foo() {}");
        let first = run(Surface::Flags, &parser, &["goparser", "-func", "foo", "-p", "pkg"]);
        let second = run(Surface::Flags, &parser, &["goparser", "-func", "foo", "-p", "pkg"]);

        assert_eq!(first.0, second.0);
        assert_eq!(first.1.unwrap(), second.1.unwrap());
        let calls = parser.calls();
        assert_eq!(calls[0], calls[1]);
    }
}
