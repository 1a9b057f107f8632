//! Command-line argument parsing and validation
//!
//! Both surfaces resolve the raw argument vector into either an
//! [`InvocationRequest`] or a message to print before exiting.

use crate::{cli::Surface, core::InvocationRequest};
use clap::{ArgAction, CommandFactory, Parser, builder::BoolishValueParser};
use std::ffi::OsString;
use std::fmt::Write as _;

/// Exit code used for usage errors on both surfaces
pub const USAGE_EXIT_CODE: i32 = 1;

const MISSING_FUNCTION: &str = "Missing function name";
const FLAGS_USAGE: &str = "Usage: goparser -func func_name [-code] [-p pkg_path]";
const POSITIONAL_USAGE: &str = "Usage: goparser <func_name> [pkg_path]";

/// Long flags that may be spelled with a single dash, as Go's flag package allows
const SINGLE_DASH_LONG_FLAGS: &[&str] = &["func", "code", "help", "version"];
/// Flags whose value may follow as a separate argument
const VALUE_FLAGS: &[&str] = &["--func", "-p"];

/// Outcome of argument resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Arguments are valid; call the parser backend
    Request(InvocationRequest),
    /// Print `message` to stdout and exit with `exit_code`
    Exit { message: String, exit_code: i32 },
}

/// Print the source of a Go function
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(name = "goparser", args_override_self = true)]
pub struct FlagArgs {
    /// Name of the function to parse
    #[arg(long = "func", value_name = "func_name", allow_hyphen_values = true)]
    pub func: Option<String>,

    /// Return code only
    #[arg(
        long = "code",
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value = "false",
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub code: bool,

    /// Package path (optional)
    #[arg(
        short = 'p',
        value_name = "pkg_path",
        default_value = ".",
        allow_hyphen_values = true
    )]
    pub package: String,

    /// Arguments left after the flags; ignored
    #[arg(hide = true)]
    pub rest: Vec<String>,
}

/// Print the source of a Go function
#[derive(Parser, Debug)]
#[command(name = "goparser", disable_help_flag = true, disable_version_flag = true)]
pub struct PositionalArgs {
    /// Name of the function to parse
    #[arg(allow_hyphen_values = true)]
    pub func_name: Option<String>,

    /// Package path (optional)
    #[arg(allow_hyphen_values = true)]
    pub pkg_path: Option<String>,

    /// Arguments after the package path; ignored
    #[arg(hide = true, allow_hyphen_values = true)]
    pub rest: Vec<String>,
}

/// Resolve an argument vector (program name first) with the given surface
pub fn resolve<I, T>(surface: Surface, args: I) -> Resolution
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let args: Vec<String> = args
        .into_iter()
        .map(|arg| arg.into().to_string_lossy().into_owned())
        .collect();

    match surface {
        Surface::Flags => resolve_flags(args),
        Surface::Positional => resolve_positional(args),
    }
}

fn resolve_flags(args: Vec<String>) -> Resolution {
    let parsed = match FlagArgs::try_parse_from(normalize_go_flags(args)) {
        Ok(parsed) => parsed,
        Err(err) => {
            return Resolution::Exit {
                message: err.render().to_string(),
                exit_code: err.exit_code(),
            };
        }
    };

    match parsed.func.filter(|name| !name.is_empty()) {
        Some(func) => Resolution::Request(
            InvocationRequest::new(func, Some(parsed.package)).with_code_only(parsed.code),
        ),
        None => Resolution::Exit {
            message: format!("{MISSING_FUNCTION}\n{FLAGS_USAGE}\n{}", flag_defaults()),
            exit_code: USAGE_EXIT_CODE,
        },
    }
}

fn resolve_positional(args: Vec<String>) -> Resolution {
    // Help is only recognised as the first argument; anything else there is
    // taken as the function name.
    if matches!(args.get(1).map(String::as_str), Some("-h" | "--help")) {
        return Resolution::Exit {
            message: format!("{POSITIONAL_USAGE}\n{}", positional_help()),
            exit_code: USAGE_EXIT_CODE,
        };
    }

    let parsed = match PositionalArgs::try_parse_from(args) {
        Ok(parsed) => parsed,
        Err(err) => {
            return Resolution::Exit {
                message: err.render().to_string(),
                exit_code: err.exit_code(),
            };
        }
    };

    match parsed.func_name.filter(|name| !name.is_empty()) {
        Some(func) => Resolution::Request(InvocationRequest::new(func, parsed.pkg_path)),
        None => Resolution::Exit {
            message: format!("{MISSING_FUNCTION}\n{POSITIONAL_USAGE}\n"),
            exit_code: USAGE_EXIT_CODE,
        },
    }
}

/// Rewrite Go-style flags (`-func x`, `-code`, `--p x`) into the spelling
/// clap understands. The program name, flag values and everything after `--`
/// are left alone. Like Go's `flag.Parse`, flag parsing ends at the first
/// non-flag argument; a `--` is inserted there so clap treats the remainder
/// as leftovers.
pub fn normalize_go_flags(args: Vec<String>) -> Vec<String> {
    let mut normalized = Vec::with_capacity(args.len());
    let mut iter = args.into_iter();

    if let Some(program) = iter.next() {
        normalized.push(program);
    }

    let mut expect_value = false;
    let mut passthrough = false;
    for arg in iter {
        if passthrough || expect_value {
            expect_value = false;
            normalized.push(arg);
            continue;
        }
        if arg == "--" {
            passthrough = true;
            normalized.push(arg);
            continue;
        }
        if arg == "-" || !arg.starts_with('-') {
            passthrough = true;
            normalized.push("--".to_string());
            normalized.push(arg);
            continue;
        }

        let rewritten = rewrite_flag(&arg).unwrap_or(arg);
        expect_value = VALUE_FLAGS.contains(&rewritten.as_str());
        normalized.push(rewritten);
    }

    normalized
}

fn rewrite_flag(arg: &str) -> Option<String> {
    let (name, value) = match arg.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (arg, None),
    };

    let rewritten_name = if name == "--p" {
        "-p".to_string()
    } else {
        let bare = name.strip_prefix('-').filter(|rest| !rest.starts_with('-'))?;
        if !SINGLE_DASH_LONG_FLAGS.contains(&bare) {
            return None;
        }
        format!("--{bare}")
    };

    Some(match value {
        Some(value) => format!("{rewritten_name}={value}"),
        None => rewritten_name,
    })
}

/// Option listing in the style of Go's `flag.PrintDefaults`
fn flag_defaults() -> String {
    let command = FlagArgs::command();
    let mut out = String::new();

    for arg in command.get_arguments() {
        let id = arg.get_id().as_str();
        if arg.is_hide_set() || arg.is_positional() || id == "help" || id == "version" {
            continue;
        }

        let name = match (arg.get_short(), arg.get_long()) {
            (Some(short), _) => short.to_string(),
            (None, Some(long)) => long.to_string(),
            (None, None) => continue,
        };
        // Switches such as `-code` are listed bare, as Go does for bools
        let switch =
            !arg.get_action().takes_values() || arg.get_num_args().is_some_and(|range| range.min_values() == 0);

        let _ = write!(out, "  -{name}");
        if !switch {
            if let Some(value_name) = arg.get_value_names().and_then(|names| names.first()) {
                let _ = write!(out, " {value_name}");
            }
        }
        out.push('\n');

        let help = arg.get_help().map(ToString::to_string).unwrap_or_default();
        let _ = write!(out, "    \t{help}");
        if let Some(default) = arg.get_default_values().first().filter(|_| !switch) {
            let _ = write!(out, " (default {:?})", default.to_string_lossy());
        }
        out.push('\n');
    }

    out
}

fn positional_help() -> String {
    let command = PositionalArgs::command();
    let mut out = String::new();

    for arg in command.get_positionals() {
        if arg.is_hide_set() {
            continue;
        }
        let help = arg.get_help().map(ToString::to_string).unwrap_or_default();
        let _ = writeln!(out, "  {:<12}{}", arg.get_id().as_str(), help);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(surface: Surface, args: &[&str]) -> InvocationRequest {
        match resolve(surface, args.iter().copied()) {
            Resolution::Request(request) => request,
            other => panic!("Expected a request, got {other:?}"),
        }
    }

    fn exit(surface: Surface, args: &[&str]) -> (String, i32) {
        match resolve(surface, args.iter().copied()) {
            Resolution::Exit { message, exit_code } => (message, exit_code),
            other => panic!("Expected an exit, got {other:?}"),
        }
    }

    #[test]
    fn test_flags_default_package() {
        let request = request(Surface::Flags, &["goparser", "-func", "foo"]);
        assert_eq!(request.function_name, "foo");
        assert_eq!(request.package_path, ".");
        assert!(!request.code_only);
        assert!(!request.exported_only);
    }

    #[test]
    fn test_flags_code_and_package() {
        let request = request(Surface::Flags, &["goparser", "-func", "foo", "-code", "-p", "./pkg/x"]);
        assert!(request.code_only);
        assert_eq!(request.package_path, "./pkg/x");
    }

    #[test]
    fn test_flags_accept_equals_and_double_dash() {
        let double = request(Surface::Flags, &["goparser", "--func=Fuzz", "--p=bar/baz", "--code"]);
        assert_eq!(double.function_name, "Fuzz");
        assert_eq!(double.package_path, "bar/baz");
        assert!(double.code_only);

        let single = request(Surface::Flags, &["goparser", "-func=Fuzz", "-p=bar"]);
        assert_eq!(single.function_name, "Fuzz");
        assert_eq!(single.package_path, "bar");
    }

    #[test]
    fn test_flags_missing_function() {
        let (message, code) = exit(Surface::Flags, &["goparser"]);
        assert_eq!(code, 1);
        assert!(message.starts_with("Missing function name\nUsage: goparser -func"));
        assert!(message.contains("  -func func_name"));
        assert!(message.contains("  -p pkg_path"));
        assert!(message.contains("(default \".\")"));
        assert!(message.contains("  -code\n"));
        assert!(!message.contains("CODE"));
        assert!(!message.contains("(default \"false\")"));
    }

    #[test]
    fn test_flags_code_accepts_bool_values() {
        let on = request(Surface::Flags, &["goparser", "-func", "foo", "-code=true"]);
        assert!(on.code_only);

        let off = request(Surface::Flags, &["goparser", "-func", "foo", "-code=false"]);
        assert!(!off.code_only);

        let last_wins = request(Surface::Flags, &["goparser", "-code", "-func", "foo", "-code=false"]);
        assert!(!last_wins.code_only);

        let (_, code) = exit(Surface::Flags, &["goparser", "-func", "foo", "-code=maybe"]);
        assert_eq!(code, 2);
    }

    #[test]
    fn test_flags_stop_at_first_non_flag() {
        let (message, code) = exit(Surface::Flags, &["goparser", "foo", "-func", "bar"]);
        assert_eq!(code, 1);
        assert!(message.starts_with("Missing function name"));

        let parsed = request(Surface::Flags, &["goparser", "-func", "foo", "extra", "-code"]);
        assert!(!parsed.code_only);
    }

    #[test]
    fn test_flags_empty_function() {
        let (message, code) = exit(Surface::Flags, &["goparser", "-func", "", "-code"]);
        assert_eq!(code, 1);
        assert!(message.contains("Usage"));
    }

    #[test]
    fn test_flags_reject_unknown_flag() {
        let (message, code) = exit(Surface::Flags, &["goparser", "-func", "foo", "--bogus"]);
        assert_eq!(code, 2);
        assert!(message.contains("Usage"));
    }

    #[test]
    fn test_flags_help_exits_zero() {
        let (message, code) = exit(Surface::Flags, &["goparser", "-help"]);
        assert_eq!(code, 0);
        assert!(message.contains("Usage"));
    }

    #[test]
    fn test_flags_ignore_leftover_positionals() {
        let request = request(Surface::Flags, &["goparser", "-func", "foo", "extra"]);
        assert_eq!(request.function_name, "foo");
    }

    #[test]
    fn test_positional_default_package() {
        let request = request(Surface::Positional, &["goparser", "foo"]);
        assert_eq!(request.function_name, "foo");
        assert_eq!(request.package_path, ".");
        assert!(!request.code_only);
    }

    #[test]
    fn test_positional_explicit_package() {
        let request = request(Surface::Positional, &["goparser", "foo", "bar/baz"]);
        assert_eq!(request.package_path, "bar/baz");
    }

    #[test]
    fn test_positional_missing_function() {
        let (message, code) = exit(Surface::Positional, &["goparser"]);
        assert_eq!(code, 1);
        assert!(message.starts_with("Missing function name"));
        assert!(message.contains("Usage: goparser <func_name> [pkg_path]"));
    }

    #[test]
    fn test_positional_help() {
        for flag in ["-h", "--help"] {
            let (message, code) = exit(Surface::Positional, &["goparser", flag]);
            assert_eq!(code, 1);
            assert!(message.starts_with("Usage"));
            assert!(message.contains("func_name"));
        }
    }

    #[test]
    fn test_positional_help_only_as_first_argument() {
        let parsed = request(Surface::Positional, &["goparser", "foo", "-h"]);
        assert_eq!(parsed.function_name, "foo");
        assert_eq!(parsed.package_path, "-h");

        let parsed = request(Surface::Positional, &["goparser", "-x"]);
        assert_eq!(parsed.function_name, "-x");
    }

    #[test]
    fn test_normalize_inserts_terminator_at_first_non_flag() {
        let args: Vec<String> = ["goparser", "-code", "foo", "-func", "bar"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            normalize_go_flags(args),
            vec!["goparser", "--code", "--", "foo", "-func", "bar"]
        );
    }

    #[test]
    fn test_normalize_leaves_values_alone() {
        let args: Vec<String> = ["goparser", "-func", "-code", "-p", "-func"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            normalize_go_flags(args),
            vec!["goparser", "--func", "-code", "-p", "-func"]
        );
    }

    #[test]
    fn test_normalize_stops_at_terminator() {
        let args: Vec<String> = ["goparser", "--", "-code"].iter().map(|s| s.to_string()).collect();
        assert_eq!(normalize_go_flags(args), vec!["goparser", "--", "-code"]);
    }
}
