use std::io::BufRead;

use crate::engine::{Compacted, RenderInstruction};
use crate::error::{Error, Result};
use crate::mask::MaskRule;
use crate::render::{PlainSurface, Renderer, Surface};
use crate::source::LineSource;

/// Counters gathered while driving a stream.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Stats {
    pub lines_read: usize,
    pub instructions: usize,
    /// Runs of two or more equivalent lines.
    pub runs: usize,
    pub longest_run: usize,
}

impl Stats {
    fn record(&mut self, instruction: &RenderInstruction) {
        self.instructions += 1;
        match instruction {
            RenderInstruction::FirstOfRun(_) => self.runs += 1,
            RenderInstruction::RunUpdate(count, _) => {
                self.longest_run = self.longest_run.max(*count);
            }
            _ => {}
        }
    }
}

/// Read `reader` to the end, rendering the compacted stream onto `surface`.
///
/// The surface is finished on every path. A read error stops the stream: no
/// further instructions are rendered, but everything already rendered stays.
pub fn compact_stream<R, S>(reader: R, rule: Option<MaskRule>, surface: S) -> Result<Stats>
where
    R: BufRead,
    S: Surface,
{
    let mut stats = Stats::default();
    let mut lines_read = 0usize;
    let lines = LineSource::new(reader).inspect(|line| {
        if line.is_ok() {
            lines_read += 1;
        }
    });

    let mut renderer = Renderer::new(surface);
    let mut outcome = Ok(());
    for item in Compacted::new(lines, rule) {
        let rendered = item
            .map_err(Error::Read)
            .and_then(|instruction| {
                stats.record(&instruction);
                renderer.render(instruction)
            });
        if let Err(e) = rendered {
            outcome = Err(e);
            break;
        }
    }

    let finished = renderer.finish();
    stats.lines_read = lines_read;
    tracing::debug!(
        lines = stats.lines_read,
        instructions = stats.instructions,
        runs = stats.runs,
        longest_run = stats.longest_run,
        "stream finished"
    );

    match (outcome, finished) {
        (Err(e), Err(flush)) => {
            tracing::warn!(error = %flush, "flushing output after failure");
            Err(e)
        }
        (Err(e), Ok(())) => Err(e),
        (Ok(()), finished) => finished.map(|()| stats),
    }
}

/// Compact a complete text in memory, as it would appear when piped.
pub fn compact_text(input: &str, rule: Option<MaskRule>) -> Result<String> {
    let mut surface = PlainSurface::new(Vec::with_capacity(input.len()));
    compact_stream(input.as_bytes(), rule, &mut surface)?;
    Ok(String::from_utf8_lossy(&surface.into_inner()).into_owned())
}
