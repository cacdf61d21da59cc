use serde::{Deserialize, Serialize};

use crate::mask::{MaskMode, MaskSpec};
use crate::render::RenderMode;

/// Settings file, e.g. `.matomail.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Shorthand for a one-element `patterns`.
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub patterns: Vec<String>,

    // -- Masking --
    #[serde(default)]
    pub mask: Option<MaskMode>,
    #[serde(default)]
    pub sentinel: Option<String>,
    #[serde(default)]
    pub ignore_ansi: Option<bool>,
    #[serde(default)]
    pub trim_trailing_whitespace: Option<bool>,

    // -- Output --
    #[serde(default)]
    pub render: Option<RenderMode>,
}

impl Config {
    /// All patterns, `pattern` first.
    pub fn all_patterns(&self) -> Vec<String> {
        self.pattern
            .iter()
            .chain(self.patterns.iter())
            .cloned()
            .collect()
    }

    pub fn mask_spec(&self) -> MaskSpec {
        MaskSpec {
            patterns: self.all_patterns(),
            mode: self.mask.unwrap_or_default(),
            sentinel: self.sentinel.clone(),
            ignore_ansi: self.ignore_ansi == Some(true),
            trim_trailing_whitespace: self.trim_trailing_whitespace == Some(true),
        }
    }
}
