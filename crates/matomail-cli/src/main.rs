mod settings;

use std::fs::File;
use std::io::{self, BufRead, BufReader, IsTerminal};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use console::Term;
use tracing_subscriber::EnvFilter;

use matomail_core::config::{load_config, ConfigSource};
use matomail_core::mask::MaskRule;
use matomail_core::render::{AnsiSurface, PlainSurface, RenderMode, Surface};
use matomail_core::runner::compact_stream;

use settings::{MaskArg, RenderArg, Settings};

const LONG_ABOUT: &str = "\
matomail - \"matome\" (gather) + \"tail\"

Reads lines from standard input and collapses consecutive identical lines.
A run is shown as its first line prefixed with \"(1)\", an \"...\" marker, and
the latest line prefixed with the running count, e.g. \"(3)\". On a terminal
the count is updated in place as the run grows.

By default lines must match exactly. With --pattern, the parts of each line
matching the regular expression are masked before comparing, so lines that
differ only in timestamps or other volatile fields count as the same.";

const AFTER_HELP: &str = "\
Examples:
  tail -f /var/log/app.log | matomail
  tail -f /var/log/app.log | matomail --pattern='\\d{4}-\\d{2}-\\d{2} \\d{2}:\\d{2}:\\d{2}'";

/// Environment variable holding the log filter, e.g. `MATOMAIL_LOG=debug`.
const LOG_ENV: &str = "MATOMAIL_LOG";

#[derive(Parser, Debug)]
#[command(
    name = "matomail",
    version,
    about = "Collapse consecutive repeated lines of a live log stream",
    long_about = LONG_ABOUT,
    after_help = AFTER_HELP
)]
pub(crate) struct Cli {
    /// Regular expression masked out of each line before comparing (repeatable)
    #[arg(short, long = "pattern", value_name = "REGEX", allow_hyphen_values = true)]
    pub patterns: Vec<String>,

    /// What to do with pattern matches before comparing
    #[arg(long, value_enum, value_name = "MODE")]
    pub mask: Option<MaskArg>,

    /// Token substituted for matches with --mask=replace [default: MASKED]
    #[arg(long, value_name = "TOKEN")]
    pub sentinel: Option<String>,

    /// Ignore ANSI colour and style codes when comparing
    #[arg(long)]
    pub ignore_ansi: bool,

    /// Ignore trailing whitespace when comparing
    #[arg(long)]
    pub ignore_trailing_whitespace: bool,

    /// How running counts are redrawn
    #[arg(long, value_enum, value_name = "MODE")]
    pub render: Option<RenderArg>,

    /// Read settings from this file instead of searching for one
    #[arg(long, value_name = "PATH", conflicts_with = "no_config")]
    pub config: Option<PathBuf>,

    /// Ignore .matomail.toml and ~/.config/matomail/config.toml
    #[arg(long)]
    pub no_config: bool,

    /// File to read instead of standard input ("-" for stdin)
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,
}

impl Cli {
    fn config_source(&self) -> ConfigSource {
        match (&self.config, self.no_config) {
            (Some(path), _) => ConfigSource::Explicit(path.clone()),
            (None, true) => ConfigSource::Disabled,
            (None, false) => ConfigSource::Discover,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("matomail: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let loaded = load_config(&cli.config_source()).context("loading config")?;
    if let Some((path, _)) = &loaded {
        tracing::debug!(path = %path.display(), "using config file");
    }
    let settings = Settings::merge(loaded.map(|(_, config)| config), cli);

    // Compile before touching the input so a bad pattern never consumes it.
    let rule = MaskRule::compile(&settings.mask)?;
    let reader = open_input(cli.file.as_deref())?;

    let stdout = io::stdout();
    let mode = settings.render.resolve(stdout.is_terminal());
    tracing::debug!(?mode, masked = rule.is_some(), "starting");
    let surface: Box<dyn Surface> = match mode {
        RenderMode::Ansi => match Term::stdout().size_checked() {
            Some((_, cols)) => Box::new(AnsiSurface::with_width(stdout.lock(), cols.into())),
            None => Box::new(AnsiSurface::new(stdout.lock())),
        },
        RenderMode::Plain | RenderMode::Auto => Box::new(PlainSurface::new(stdout.lock())),
    };

    compact_stream(reader, rule, surface)?;
    Ok(())
}

fn open_input(file: Option<&Path>) -> Result<Box<dyn BufRead>> {
    match file {
        None => Ok(Box::new(io::stdin().lock())),
        Some(path) if path == Path::new("-") => Ok(Box::new(io::stdin().lock())),
        Some(path) => {
            let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
    }
}
