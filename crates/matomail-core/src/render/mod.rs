pub mod ansi;
pub mod plain;

use serde::{Deserialize, Serialize};

pub use ansi::AnsiSurface;
pub use plain::PlainSurface;

use crate::engine::RenderInstruction;
use crate::error::{Error, Result};

/// Literal shown in place of intermediate run counts.
pub const ELLIPSIS: &str = "...";

/// How overwrites reach the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// `Ansi` when stdout is a terminal, `Plain` otherwise.
    #[default]
    Auto,
    /// Cursor movement and line erase control sequences.
    Ansi,
    /// Append-only; the running count is held back until it is final.
    Plain,
}

impl RenderMode {
    /// Resolve `Auto` against whether the output is interactive.
    pub fn resolve(self, is_terminal: bool) -> Self {
        match self {
            RenderMode::Auto if is_terminal => RenderMode::Ansi,
            RenderMode::Auto => RenderMode::Plain,
            other => other,
        }
    }
}

/// An output that can take back its most recent line.
///
/// Settled lines are final. At most one provisional line is outstanding at a
/// time; it is either retracted or followed by a settled line.
pub trait Surface {
    fn settle(&mut self, line: &str) -> std::io::Result<()>;
    fn provisional(&mut self, line: &str) -> std::io::Result<()>;
    /// Remove the outstanding provisional line, if any.
    fn retract(&mut self) -> std::io::Result<()>;
    /// Write anything held back and flush.
    fn finish(&mut self) -> std::io::Result<()>;
}

impl<S: Surface + ?Sized> Surface for &mut S {
    fn settle(&mut self, line: &str) -> std::io::Result<()> {
        (**self).settle(line)
    }

    fn provisional(&mut self, line: &str) -> std::io::Result<()> {
        (**self).provisional(line)
    }

    fn retract(&mut self) -> std::io::Result<()> {
        (**self).retract()
    }

    fn finish(&mut self) -> std::io::Result<()> {
        (**self).finish()
    }
}

impl<S: Surface + ?Sized> Surface for Box<S> {
    fn settle(&mut self, line: &str) -> std::io::Result<()> {
        (**self).settle(line)
    }

    fn provisional(&mut self, line: &str) -> std::io::Result<()> {
        (**self).provisional(line)
    }

    fn retract(&mut self) -> std::io::Result<()> {
        (**self).retract()
    }

    fn finish(&mut self) -> std::io::Result<()> {
        (**self).finish()
    }
}

/// Translates render instructions into surface writes.
#[derive(Debug)]
pub struct Renderer<S> {
    surface: S,
    ellipsis_shown: bool,
    update_shown: bool,
}

impl<S: Surface> Renderer<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            ellipsis_shown: false,
            update_shown: false,
        }
    }

    pub fn render(&mut self, instruction: RenderInstruction) -> Result<()> {
        self.apply(instruction).map_err(Error::Write)
    }

    fn apply(&mut self, instruction: RenderInstruction) -> std::io::Result<()> {
        match instruction {
            RenderInstruction::Plain(line) => {
                self.close_run();
                self.surface.settle(&line)
            }
            RenderInstruction::FirstOfRun(line) => {
                self.close_run();
                self.surface.settle(&counted(1, &line))
            }
            RenderInstruction::Ellipsis => {
                if self.update_shown {
                    self.surface.retract()?;
                    self.update_shown = false;
                }
                if self.ellipsis_shown {
                    return Ok(());
                }
                self.ellipsis_shown = true;
                self.surface.settle(ELLIPSIS)
            }
            RenderInstruction::RunUpdate(count, line) => {
                if self.update_shown {
                    self.surface.retract()?;
                }
                self.update_shown = true;
                self.surface.provisional(&counted(count, &line))
            }
        }
    }

    fn close_run(&mut self) {
        self.ellipsis_shown = false;
        self.update_shown = false;
    }

    pub fn finish(&mut self) -> Result<()> {
        self.surface.finish().map_err(Error::Write)
    }

    pub fn into_inner(self) -> S {
        self.surface
    }
}

fn counted(count: usize, line: &str) -> String {
    format!("({count}) {line}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RenderInstruction::*;

    /// Records surface calls.
    #[derive(Default)]
    struct Log(Vec<String>);

    impl Surface for Log {
        fn settle(&mut self, line: &str) -> std::io::Result<()> {
            self.0.push(format!("settle {line}"));
            Ok(())
        }

        fn provisional(&mut self, line: &str) -> std::io::Result<()> {
            self.0.push(format!("provisional {line}"));
            Ok(())
        }

        fn retract(&mut self) -> std::io::Result<()> {
            self.0.push("retract".into());
            Ok(())
        }

        fn finish(&mut self) -> std::io::Result<()> {
            self.0.push("finish".into());
            Ok(())
        }
    }

    fn render_all(instructions: Vec<RenderInstruction>) -> Vec<String> {
        let mut renderer = Renderer::new(Log::default());
        for i in instructions {
            renderer.render(i).unwrap();
        }
        renderer.finish().unwrap();
        renderer.into_inner().0
    }

    #[test]
    fn plain_lines_are_settled() {
        assert_eq!(render_all(vec![Plain("a".into())]), vec!["settle a", "finish"]);
    }

    #[test]
    fn run_of_four_shows_one_ellipsis() {
        let calls = render_all(vec![
            FirstOfRun("x".into()),
            RunUpdate(2, "x".into()),
            Ellipsis,
            RunUpdate(3, "x".into()),
            Ellipsis,
            RunUpdate(4, "x".into()),
        ]);
        assert_eq!(
            calls,
            vec![
                "settle (1) x",
                "provisional (2) x",
                "retract",
                "settle ...",
                "provisional (3) x",
                "retract",
                "provisional (4) x",
                "finish",
            ]
        );
    }

    #[test]
    fn new_run_after_ellipsis_gets_its_own() {
        let calls = render_all(vec![
            FirstOfRun("x".into()),
            RunUpdate(2, "x".into()),
            Ellipsis,
            RunUpdate(3, "x".into()),
            FirstOfRun("y".into()),
            RunUpdate(2, "y".into()),
            Ellipsis,
            RunUpdate(3, "y".into()),
        ]);
        assert_eq!(calls.iter().filter(|c| *c == "settle ...").count(), 2);
    }

    #[test]
    fn auto_mode_follows_terminal() {
        assert_eq!(RenderMode::Auto.resolve(true), RenderMode::Ansi);
        assert_eq!(RenderMode::Auto.resolve(false), RenderMode::Plain);
        assert_eq!(RenderMode::Plain.resolve(true), RenderMode::Plain);
        assert_eq!(RenderMode::Ansi.resolve(false), RenderMode::Ansi);
    }
}
