//! Run detection over a line stream.
//!
//! The [`Compactor`] keeps a one-line lookback: each new line is compared with
//! the line read just before it, never with the first member of the run. The
//! first line of a stream is buffered until the second arrives (or the stream
//! ends), because only then is it known whether it opens a run.

use std::iter::Flatten;

use crate::mask::MaskRule;

/// What the renderer should do next. Produced in input order, consumed once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderInstruction {
    /// A line that is not part of any run.
    Plain(String),
    /// First member of a newly detected run, shown as `(1) line`.
    FirstOfRun(String),
    /// Replaces the previous running count with `...`.
    Ellipsis,
    /// Running count of the current run, shown as `(n) line`.
    RunUpdate(usize, String),
}

/// Instructions produced by a single step: zero, one or two.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Emission([Option<RenderInstruction>; 2]);

impl Emission {
    fn none() -> Self {
        Self::default()
    }

    fn one(first: RenderInstruction) -> Self {
        Self([Some(first), None])
    }

    fn two(first: RenderInstruction, second: RenderInstruction) -> Self {
        Self([Some(first), Some(second)])
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(Option::is_none)
    }
}

impl IntoIterator for Emission {
    type Item = RenderInstruction;
    type IntoIter = Flatten<std::array::IntoIter<Option<RenderInstruction>, 2>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter().flatten()
    }
}

#[derive(Debug)]
struct Previous {
    line: String,
    /// Comparison key, cached so each line is masked exactly once.
    key: String,
}

/// Mutable state carried across lines.
#[derive(Debug, Default)]
struct RunState {
    previous: Option<Previous>,
    /// Length of the run ending at `previous`; at least 1 once a line is seen.
    run_length: usize,
}

/// Stateful single-pass compaction of consecutive equivalent lines.
#[derive(Debug, Default)]
pub struct Compactor {
    rule: Option<MaskRule>,
    state: RunState,
}

impl Compactor {
    pub fn new(rule: Option<MaskRule>) -> Self {
        Self {
            rule,
            state: RunState::default(),
        }
    }

    /// Length of the run ending at the last line read (0 before any line).
    pub fn run_length(&self) -> usize {
        self.state.run_length
    }

    /// Feed the next line.
    pub fn push(&mut self, line: String) -> Emission {
        let key = self.key_of(&line);
        let state = &mut self.state;

        let Some(previous) = state.previous.take() else {
            state.previous = Some(Previous { line, key });
            state.run_length = 1;
            return Emission::none();
        };

        if previous.key != key {
            let closing = state.run_length;
            state.previous = Some(Previous { line, key });
            state.run_length = 1;
            // Runs of two or more were rendered as they grew.
            return if closing == 1 {
                Emission::one(RenderInstruction::Plain(previous.line))
            } else {
                Emission::none()
            };
        }

        state.run_length += 1;
        let count = state.run_length;
        let update = RenderInstruction::RunUpdate(count, line.clone());
        let emission = if count == 2 {
            Emission::two(RenderInstruction::FirstOfRun(previous.line), update)
        } else {
            Emission::two(RenderInstruction::Ellipsis, update)
        };
        state.previous = Some(Previous { line, key });
        emission
    }

    /// Flush the buffered line at end of stream. Calling it again is a no-op.
    pub fn finish(&mut self) -> Emission {
        let closing = std::mem::take(&mut self.state.run_length);
        match self.state.previous.take() {
            Some(previous) if closing == 1 => {
                Emission::one(RenderInstruction::Plain(previous.line))
            }
            _ => Emission::none(),
        }
    }

    fn key_of(&self, line: &str) -> String {
        match &self.rule {
            Some(rule) => rule.key(line).into_owned(),
            None => line.to_string(),
        }
    }
}

/// Lazily compacts a fallible line iterator.
///
/// After the first `Err` from the source the adapter yields nothing more; the
/// buffered line is dropped rather than flushed.
pub struct Compacted<I, E> {
    lines: I,
    compactor: Compactor,
    queue: std::collections::VecDeque<RenderInstruction>,
    done: bool,
    _error: std::marker::PhantomData<fn() -> E>,
}

impl<I, E> Compacted<I, E>
where
    I: Iterator<Item = Result<String, E>>,
{
    pub fn new(lines: I, rule: Option<MaskRule>) -> Self {
        Self {
            lines,
            compactor: Compactor::new(rule),
            queue: std::collections::VecDeque::with_capacity(2),
            done: false,
            _error: std::marker::PhantomData,
        }
    }
}

impl<I, E> Iterator for Compacted<I, E>
where
    I: Iterator<Item = Result<String, E>>,
{
    type Item = Result<RenderInstruction, E>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(instruction) = self.queue.pop_front() {
                return Some(Ok(instruction));
            }
            if self.done {
                return None;
            }
            match self.lines.next() {
                Some(Ok(line)) => self.queue.extend(self.compactor.push(line)),
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                }
                None => {
                    self.done = true;
                    self.queue.extend(self.compactor.finish());
                }
            }
        }
    }
}

impl<I, E> std::iter::FusedIterator for Compacted<I, E> where
    I: Iterator<Item = Result<String, E>>
{
}
