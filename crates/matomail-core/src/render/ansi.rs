use std::io::{self, Write};

use console::measure_text_width;

use super::Surface;

/// Cursor up one row, carriage return, erase the whole row.
pub const RETRACT_SEQUENCE: &[u8] = b"\x1b[1A\r\x1b[2K";

/// Writes straight to an interactive terminal, flushing after every line.
///
/// Retracting moves the cursor back over the provisional line and erases it,
/// so the next write lands where it was. With a known terminal width, a line
/// that soft-wrapped is erased on every row it took.
#[derive(Debug)]
pub struct AnsiSurface<W> {
    out: W,
    width: Option<usize>,
    /// Rows taken by the provisional line, zero when there is none.
    pending_rows: usize,
}

impl<W: Write> AnsiSurface<W> {
    /// A surface that assumes no line wraps.
    pub fn new(out: W) -> Self {
        Self {
            out,
            width: None,
            pending_rows: 0,
        }
    }

    /// A surface for a terminal `width` columns wide.
    pub fn with_width(out: W, width: usize) -> Self {
        Self {
            out,
            width: (width > 0).then_some(width),
            pending_rows: 0,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Terminal rows `line` occupies once written.
    fn rows(&self, line: &str) -> usize {
        match self.width {
            Some(width) => measure_text_width(line).div_ceil(width).max(1),
            None => 1,
        }
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.out.write_all(line.as_bytes())?;
        self.out.write_all(b"\n")?;
        self.out.flush()
    }
}

impl<W: Write> Surface for AnsiSurface<W> {
    fn settle(&mut self, line: &str) -> io::Result<()> {
        self.pending_rows = 0;
        self.write_line(line)
    }

    fn provisional(&mut self, line: &str) -> io::Result<()> {
        self.pending_rows = self.rows(line);
        self.write_line(line)
    }

    fn retract(&mut self) -> io::Result<()> {
        if self.pending_rows == 0 {
            return Ok(());
        }
        let rows = std::mem::take(&mut self.pending_rows);
        for _ in 0..rows {
            self.out.write_all(RETRACT_SEQUENCE)?;
        }
        self.out.flush()
    }

    fn finish(&mut self) -> io::Result<()> {
        self.pending_rows = 0;
        self.out.flush()
    }
}
