//! Selection of the command-line surface

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// How invocation arguments are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Surface {
    /// `goparser -func NAME [-code] [-p PATH]`
    #[default]
    Flags,
    /// `goparser NAME [PATH]`
    Positional,
}

impl FromStr for Surface {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flags" | "flag" => Ok(Self::Flags),
            "positional" | "pos" => Ok(Self::Positional),
            other => Err(format!(
                "unknown surface '{other}' (expected flags or positional)"
            )),
        }
    }
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flags => f.write_str("flags"),
            Self::Positional => f.write_str("positional"),
        }
    }
}
