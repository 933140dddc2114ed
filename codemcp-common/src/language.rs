//! Interpreter dispatch table

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A language the execution endpoint knows how to run.
///
/// The set is closed: each variant maps to a fixed interpreter invocation,
/// and anything else is rejected before a process is ever spawned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Javascript,
    Bash,
}

/// Requested language is not in the dispatch table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported language: {0}")]
pub struct UnsupportedLanguage(pub String);

impl Language {
    pub const ALL: [Language; 3] = [Language::Python, Language::Javascript, Language::Bash];

    /// Interpreter argv prefix. The code string is appended as the final
    /// argument when the process is spawned.
    pub fn command(&self) -> &'static [&'static str] {
        match self {
            Language::Python => &["python", "-c"],
            Language::Javascript => &["node", "-e"],
            Language::Bash => &["bash", "-c"],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Javascript => "javascript",
            Language::Bash => "bash",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = UnsupportedLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "python" => Ok(Language::Python),
            "javascript" => Ok(Language::Javascript),
            "bash" => Ok(Language::Bash),
            other => Err(UnsupportedLanguage(other.to_string())),
        }
    }
}
