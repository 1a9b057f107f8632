//! The value handed from argument resolution to the parser backend

use serde::{Deserialize, Serialize};

/// Package path used when none is given on the command line
pub const DEFAULT_PACKAGE_PATH: &str = ".";

/// Everything needed to look up one function, resolved from the command line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationRequest {
    /// Name of the function to locate
    pub function_name: String,
    /// Directory or package to search
    pub package_path: String,
    /// Return only the function body, without signature or comments
    pub code_only: bool,
    /// Restrict the search to exported functions.
    ///
    /// Neither argument surface exposes this; it is always `false` today.
    pub exported_only: bool,
}

impl InvocationRequest {
    /// Create a request for `function_name`, falling back to the current
    /// directory when no package path is given
    pub fn new(function_name: impl Into<String>, package_path: Option<String>) -> Self {
        Self {
            function_name: function_name.into(),
            package_path: package_path.unwrap_or_else(|| DEFAULT_PACKAGE_PATH.to_string()),
            code_only: false,
            exported_only: false,
        }
    }

    /// Set code-only output mode
    #[must_use]
    pub fn with_code_only(mut self, code_only: bool) -> Self {
        self.code_only = code_only;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let request = InvocationRequest::new("Fuzz", None);
        assert_eq!(request.function_name, "Fuzz");
        assert_eq!(request.package_path, ".");
        assert!(!request.code_only);
        assert!(!request.exported_only);
    }

    #[test]
    fn test_explicit_package_and_code_only() {
        let request = InvocationRequest::new("Fuzz", Some("bar/baz".to_string())).with_code_only(true);
        assert_eq!(request.package_path, "bar/baz");
        assert!(request.code_only);
        assert!(!request.exported_only);
    }
}
