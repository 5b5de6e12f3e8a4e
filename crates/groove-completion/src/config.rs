//! Engine configuration, read from `groove.toml` or from the editor's
//! initialization options.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::GrooveError;

/// Text inserted at the cursor before the patched copy is parsed.
pub const DEFAULT_DUMMY_IDENTIFIER: &str = "IntellijIdeaRulezzz";

/// Packages and classes every Groovy source sees without an import.
pub const GROOVY_DEFAULT_IMPORTS: &[&str] = &[
    "java.lang",
    "java.util",
    "java.io",
    "java.net",
    "groovy.lang",
    "groovy.util",
    "java.math.BigInteger",
    "java.math.BigDecimal",
];

/// When an inserted class name is written fully qualified instead of
/// imported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualifyPolicy {
    /// Always insert the short name and add an import.
    Never,
    /// Insert the fully qualified name whenever the class is not already
    /// visible.
    Always,
    /// Import unless another class with the same short name is already
    /// imported or declared in the file.
    #[default]
    OnConflict,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompletionConfig {
    pub dummy_identifier: String,
    /// Candidates kept after sorting. Zero means unlimited.
    pub max_results: usize,
    pub case_sensitive: bool,
    pub qualify: QualifyPolicy,
    /// Extra packages (or fully qualified classes) treated as imported, on
    /// top of [`GROOVY_DEFAULT_IMPORTS`].
    pub default_imports: Vec<String>,
    /// Upper bound on inheritors enumerated for one expected type.
    pub inheritor_limit: usize,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            dummy_identifier: DEFAULT_DUMMY_IDENTIFIER.to_string(),
            max_results: 500,
            case_sensitive: false,
            qualify: QualifyPolicy::default(),
            default_imports: Vec::new(),
            inheritor_limit: 1000,
        }
    }
}

impl CompletionConfig {
    /// Read and parse a `groove.toml` file.
    pub fn from_file(path: &Path) -> Result<Self, GrooveError> {
        let content = std::fs::read_to_string(path).map_err(|e| GrooveError::io(path, e))?;
        Self::from_str(&content)
    }

    /// Parse configuration from TOML text. Missing keys take their defaults.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, GrooveError> {
        Ok(toml::from_str(content)?)
    }

    /// Built-in default imports followed by the configured extras.
    pub fn default_imports(&self) -> impl Iterator<Item = &str> + '_ {
        GROOVY_DEFAULT_IMPORTS
            .iter()
            .copied()
            .chain(self.default_imports.iter().map(String::as_str))
    }
}
