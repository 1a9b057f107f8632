//! Cleanup of declaration text printed by `go doc -src`

use crate::error::{ParserError, Result};
use regex::Regex;
use tracing::debug;

/// Trims the package clause from a printed declaration and, in code-only
/// mode, reduces it to the function body
#[derive(Debug)]
pub struct SourceCleaner {
    /// Matches `package foo` and `package foo // import "example.com/foo"`
    re_package_clause: Regex,
}

impl SourceCleaner {
    /// Create a new source cleaner
    pub fn new() -> Result<Self> {
        Ok(Self {
            re_package_clause: Regex::new(r"^package\s+[A-Za-z_][A-Za-z0-9_]*\s*(?://.*)?$")
                .map_err(|e| ParserError::config_from("Failed to compile regex", e))?,
        })
    }

    /// Clean `raw`; the result never has leading blank lines or trailing
    /// whitespace.
    ///
    /// In code-only mode the doc comment and the signature are dropped and
    /// only the statements between the body braces are kept, de-indented.
    /// Text without a function body is returned minus its leading comments.
    pub fn clean(&self, raw: &str, code_only: bool) -> String {
        let mut lines: Vec<&str> = raw.lines().collect();

        let first = first_content_line(&lines);
        if lines
            .get(first)
            .is_some_and(|line| self.re_package_clause.is_match(line.trim()))
        {
            debug!("Dropping package clause: {}", lines[first]);
            lines.drain(..=first);
        }

        let start = first_content_line(&lines);
        let declaration = lines[start..].join("\n");

        if !code_only {
            return declaration.trim_end().to_string();
        }

        let code = strip_leading_comments(&declaration);
        match function_body(code) {
            Some(body) => dedent(body),
            None => {
                debug!("No function body found, keeping declaration");
                code.trim_end().to_string()
            }
        }
    }
}

fn first_content_line(lines: &[&str]) -> usize {
    lines
        .iter()
        .position(|line| !line.trim().is_empty())
        .unwrap_or(lines.len())
}

/// Drop `//` and `/* */` comments (and blanks) in front of the declaration
fn strip_leading_comments(text: &str) -> &str {
    let mut rest = text;
    loop {
        let trimmed = rest.trim_start();
        if let Some(after) = trimmed.strip_prefix("//") {
            rest = after.split_once('\n').map_or("", |(_, next)| next);
        } else if let Some(after) = trimmed.strip_prefix("/*") {
            rest = after.split_once("*/").map_or("", |(_, next)| next);
        } else {
            return trimmed;
        }
    }
}

/// Text between the braces of the function body.
///
/// The body brace is the first `{` outside parentheses that does not open an
/// `interface{...}` or `struct{...}` type in the signature.
fn function_body(decl: &str) -> Option<&str> {
    let bytes = decl.as_bytes();
    let mut parens = 0usize;
    let mut i = 0;

    while i < bytes.len() {
        if let Some(next) = skip_literal_or_comment(bytes, i) {
            i = next;
            continue;
        }
        match bytes[i] {
            b'(' => parens += 1,
            b')' => parens = parens.saturating_sub(1),
            b'{' if parens == 0 => {
                let close = matching_brace(bytes, i)?;
                if ends_with_type_keyword(&decl[..i]) {
                    i = close + 1;
                    continue;
                }
                return Some(&decl[i + 1..close]);
            }
            _ => {}
        }
        i += 1;
    }

    None
}

fn matching_brace(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = open;

    while i < bytes.len() {
        if let Some(next) = skip_literal_or_comment(bytes, i) {
            i = next;
            continue;
        }
        match bytes[i] {
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }

    None
}

/// Index just past the string, rune or comment starting at `i`, if any
fn skip_literal_or_comment(bytes: &[u8], i: usize) -> Option<usize> {
    match (bytes[i], bytes.get(i + 1)) {
        (b'/', Some(b'/')) => Some(find_from(bytes, i + 2, b"\n").unwrap_or(bytes.len())),
        (b'/', Some(b'*')) => Some(find_from(bytes, i + 2, b"*/").map_or(bytes.len(), |end| end + 2)),
        (b'`', _) => Some(find_from(bytes, i + 1, b"`").map_or(bytes.len(), |end| end + 1)),
        (quote @ (b'"' | b'\''), _) => {
            let mut j = i + 1;
            while j < bytes.len() {
                match bytes[j] {
                    b'\\' => j += 2,
                    b'\n' => return Some(j),
                    b if b == quote => return Some(j + 1),
                    _ => j += 1,
                }
            }
            Some(bytes.len())
        }
        _ => None,
    }
}

fn find_from(bytes: &[u8], start: usize, needle: &[u8]) -> Option<usize> {
    bytes
        .get(start..)?
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|pos| pos + start)
}

fn ends_with_type_keyword(prefix: &str) -> bool {
    let prefix = prefix.trim_end();
    ["interface", "struct"].iter().any(|keyword| {
        prefix.strip_suffix(keyword).is_some_and(|before| {
            !before.ends_with(|c: char| c.is_alphanumeric() || c == '_')
        })
    })
}

/// Remove blank edges and the indentation shared by every statement
fn dedent(body: &str) -> String {
    let lines: Vec<&str> = body.lines().collect();
    let start = first_content_line(&lines);
    let end = lines
        .iter()
        .rposition(|line| !line.trim().is_empty())
        .map_or(start, |last| last + 1);
    let lines = &lines[start..end.max(start)];

    let indent = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start_matches('\t').len())
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .map(|line| line.get(indent..).unwrap_or(""))
        .collect::<Vec<_>>()
        .join("\n")
        .trim_end()
        .trim_start_matches(' ')
        .to_string()
}
