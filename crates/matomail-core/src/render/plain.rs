use std::io::{self, Write};

use super::Surface;

/// Append-only output for pipes and files.
///
/// Settled lines go out (and are flushed) immediately. The provisional line
/// is held back until it is either retracted or superseded by a settled line,
/// so the bytes written equal what a terminal would finally show.
#[derive(Debug)]
pub struct PlainSurface<W> {
    out: W,
    pending: Option<String>,
}

impl<W: Write> PlainSurface<W> {
    pub fn new(out: W) -> Self {
        Self { out, pending: None }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn commit_pending(&mut self) -> io::Result<()> {
        if let Some(line) = self.pending.take() {
            self.out.write_all(line.as_bytes())?;
            self.out.write_all(b"\n")?;
        }
        Ok(())
    }
}

impl<W: Write> Surface for PlainSurface<W> {
    fn settle(&mut self, line: &str) -> io::Result<()> {
        self.commit_pending()?;
        self.out.write_all(line.as_bytes())?;
        self.out.write_all(b"\n")?;
        self.out.flush()
    }

    fn provisional(&mut self, line: &str) -> io::Result<()> {
        self.commit_pending()?;
        self.pending = Some(line.to_string());
        Ok(())
    }

    fn retract(&mut self) -> io::Result<()> {
        self.pending = None;
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        self.commit_pending()?;
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provisional_line_waits_for_next_settle() {
        let mut surface = PlainSurface::new(Vec::new());
        surface.provisional("(2) x").unwrap();
        assert!(surface.out.is_empty());
        surface.settle("y").unwrap();
        assert_eq!(surface.into_inner(), b"(2) x\ny\n");
    }

    #[test]
    fn retracted_line_is_never_written() {
        let mut surface = PlainSurface::new(Vec::new());
        surface.provisional("(2) x").unwrap();
        surface.retract().unwrap();
        surface.settle("...").unwrap();
        surface.provisional("(3) x").unwrap();
        surface.finish().unwrap();
        assert_eq!(surface.into_inner(), b"...\n(3) x\n");
    }

    #[test]
    fn finish_on_empty_surface_writes_nothing() {
        let mut surface = PlainSurface::new(Vec::new());
        surface.finish().unwrap();
        assert!(surface.into_inner().is_empty());
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_errors_propagate() {
        let mut surface = PlainSurface::new(FailingWriter);
        let err = surface.settle("a").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[derive(Default)]
    struct FlushCounter {
        written: Vec<u8>,
        flushes: usize,
    }

    impl Write for FlushCounter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flushes += 1;
            Ok(())
        }
    }

    #[test]
    fn settled_lines_are_flushed_at_once() {
        let mut surface = PlainSurface::new(FlushCounter::default());
        surface.settle("a").unwrap();
        assert_eq!(surface.out.flushes, 1);
        surface.provisional("(2) a").unwrap();
        assert_eq!(surface.out.flushes, 1);
        surface.settle("b").unwrap();
        assert_eq!(surface.out.flushes, 2);
        assert_eq!(surface.out.written, b"a\n(2) a\nb\n");
        surface.finish().unwrap();
        assert_eq!(surface.out.flushes, 3);
    }
}
