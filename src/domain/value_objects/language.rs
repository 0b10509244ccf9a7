//! Language value object - dominant source language of a repository

use serde::{Deserialize, Serialize};

/// Dominant programming language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Javascript,
    Typescript,
    Java,
    Ruby,
    Php,
    Go,
    #[default]
    Unknown,
}

impl Language {
    /// Recognized extensions, in tie-breaking order
    pub const EXTENSIONS: [(&'static str, Language); 7] = [
        ("py", Language::Python),
        ("js", Language::Javascript),
        ("ts", Language::Typescript),
        ("java", Language::Java),
        ("rb", Language::Ruby),
        ("php", Language::Php),
        ("go", Language::Go),
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Javascript => "javascript",
            Language::Typescript => "typescript",
            Language::Java => "java",
            Language::Ruby => "ruby",
            Language::Php => "php",
            Language::Go => "go",
            Language::Unknown => "unknown",
        }
    }

    /// Node.js family (JavaScript or TypeScript)
    pub fn is_node(&self) -> bool {
        matches!(self, Language::Javascript | Language::Typescript)
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
