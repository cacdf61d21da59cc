use std::borrow::Cow;
use std::sync::OnceLock;

use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Token substituted for each match in [`MaskMode::Replace`].
pub const DEFAULT_SENTINEL: &str = "MASKED";

/// What happens to pattern matches before two lines are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaskMode {
    /// Delete every match.
    #[default]
    Remove,
    /// Substitute every match with the sentinel token.
    Replace,
}

/// Uncompiled masking options, as read from flags or a config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaskSpec {
    pub patterns: Vec<String>,
    pub mode: MaskMode,
    pub sentinel: Option<String>,
    pub ignore_ansi: bool,
    pub trim_trailing_whitespace: bool,
}

impl MaskSpec {
    /// True when no option changes how lines compare.
    pub fn is_exact(&self) -> bool {
        self.patterns.is_empty() && !self.ignore_ansi && !self.trim_trailing_whitespace
    }
}

/// A compiled comparison transform. Two lines are equivalent when their
/// [`key`](MaskRule::key)s are equal.
#[derive(Debug, Clone)]
pub struct MaskRule {
    pattern: Option<Regex>,
    replacement: String,
    strip_ansi: bool,
    trim_trailing_whitespace: bool,
}

impl MaskRule {
    /// Compile a single pattern.
    pub fn new(pattern: &str, mode: MaskMode) -> Result<Self> {
        let spec = MaskSpec {
            patterns: vec![pattern.to_string()],
            mode,
            ..Default::default()
        };
        Ok(Self::build(&spec, Some(compile_one(pattern)?)))
    }

    /// Compile a spec. Returns `None` when the spec asks for exact comparison.
    ///
    /// Every pattern is validated on its own first so that the error names the
    /// offending one, then all of them are joined into a single alternation.
    pub fn compile(spec: &MaskSpec) -> Result<Option<Self>> {
        if spec.is_exact() {
            return Ok(None);
        }

        let pattern = match spec.patterns.as_slice() {
            [] => None,
            [single] => Some(compile_one(single)?),
            many => {
                for p in many {
                    compile_one(p)?;
                }
                let joined = many
                    .iter()
                    .map(|p| format!("(?:{p})"))
                    .collect::<Vec<_>>()
                    .join("|");
                Some(compile_one(&joined)?)
            }
        };

        tracing::debug!(
            patterns = spec.patterns.len(),
            mode = ?spec.mode,
            ignore_ansi = spec.ignore_ansi,
            trim = spec.trim_trailing_whitespace,
            "compiled mask rule"
        );
        Ok(Some(Self::build(spec, pattern)))
    }

    fn build(spec: &MaskSpec, pattern: Option<Regex>) -> Self {
        let replacement = match spec.mode {
            MaskMode::Remove => String::new(),
            MaskMode::Replace => spec
                .sentinel
                .clone()
                .unwrap_or_else(|| DEFAULT_SENTINEL.to_string()),
        };
        Self {
            pattern,
            replacement,
            strip_ansi: spec.ignore_ansi,
            trim_trailing_whitespace: spec.trim_trailing_whitespace,
        }
    }

    /// The form of `line` used for comparison. Borrows when nothing changes.
    pub fn key<'a>(&self, line: &'a str) -> Cow<'a, str> {
        let mut key = Cow::Borrowed(line);
        if self.strip_ansi {
            key = rewrite(key, |s| owned(ansi_escape().replace_all(s, "")));
        }
        if let Some(re) = &self.pattern {
            key = rewrite(key, |s| owned(re.replace_all(s, NoExpand(&self.replacement))));
        }
        if self.trim_trailing_whitespace {
            key = rewrite(key, |s| {
                let trimmed = s.trim_end();
                (trimmed.len() != s.len()).then(|| trimmed.to_string())
            });
        }
        key
    }

    pub fn equivalent(&self, a: &str, b: &str) -> bool {
        self.key(a) == self.key(b)
    }
}

/// Decide whether two lines belong to the same run.
pub fn equivalent(a: &str, b: &str, rule: Option<&MaskRule>) -> bool {
    match rule {
        Some(rule) => rule.equivalent(a, b),
        None => a == b,
    }
}

fn compile_one(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| Error::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

fn rewrite<'a>(key: Cow<'a, str>, f: impl FnOnce(&str) -> Option<String>) -> Cow<'a, str> {
    match f(&key) {
        Some(changed) => Cow::Owned(changed),
        None => key,
    }
}

fn owned(result: Cow<'_, str>) -> Option<String> {
    match result {
        Cow::Owned(s) => Some(s),
        Cow::Borrowed(_) => None,
    }
}

/// CSI, OSC and charset-selection escape sequences.
fn ansi_escape() -> &'static Regex {
    static ANSI: OnceLock<Regex> = OnceLock::new();
    ANSI.get_or_init(|| {
        Regex::new(r"\x1b\[[0-9;?]*[a-zA-Z]|\x1b\][^\x07]*\x07|\x1b[()][AB012]")
            .expect("ANSI escape pattern is valid")
    })
}
