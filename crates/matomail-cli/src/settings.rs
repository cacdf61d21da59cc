//! Command-line flags layered over the config file.

use clap::ValueEnum;

use matomail_core::config::Config;
use matomail_core::mask::{MaskMode, MaskSpec};
use matomail_core::render::RenderMode;

use crate::Cli;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MaskArg {
    /// Delete matches
    Remove,
    /// Replace matches with the sentinel token
    Replace,
}

impl From<MaskArg> for MaskMode {
    fn from(arg: MaskArg) -> Self {
        match arg {
            MaskArg::Remove => MaskMode::Remove,
            MaskArg::Replace => MaskMode::Replace,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RenderArg {
    /// ANSI on a terminal, plain otherwise
    Auto,
    /// Overwrite the running count with cursor control sequences
    Ansi,
    /// Append only; counts are written once final
    Plain,
}

impl From<RenderArg> for RenderMode {
    fn from(arg: RenderArg) -> Self {
        match arg {
            RenderArg::Auto => RenderMode::Auto,
            RenderArg::Ansi => RenderMode::Ansi,
            RenderArg::Plain => RenderMode::Plain,
        }
    }
}

/// Effective settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub mask: MaskSpec,
    pub render: RenderMode,
}

impl Settings {
    /// Flags win over the file. `--pattern` replaces the file's patterns
    /// rather than adding to them.
    pub fn merge(config: Option<Config>, cli: &Cli) -> Self {
        let config = config.unwrap_or_default();
        let file = config.mask_spec();

        let patterns = if cli.patterns.is_empty() {
            file.patterns
        } else {
            cli.patterns.clone()
        };

        Self {
            mask: MaskSpec {
                patterns,
                mode: cli.mask.map(MaskMode::from).unwrap_or(file.mode),
                sentinel: cli.sentinel.clone().or(file.sentinel),
                ignore_ansi: cli.ignore_ansi || file.ignore_ansi,
                trim_trailing_whitespace: cli.ignore_trailing_whitespace
                    || file.trim_trailing_whitespace,
            },
            render: cli
                .render
                .map(RenderMode::from)
                .or(config.render)
                .unwrap_or_default(),
        }
    }
}
