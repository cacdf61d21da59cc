use std::io::{self, BufRead};

/// Lines pulled one at a time from a reader.
///
/// Each line has its `\n` (and a preceding `\r`) removed. Invalid UTF-8 is
/// replaced rather than treated as an error, since log streams routinely carry
/// stray bytes. A final line without a trailing newline is still yielded.
#[derive(Debug)]
pub struct LineSource<R> {
    reader: R,
    buf: Vec<u8>,
    failed: bool,
}

impl<R: BufRead> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(256),
            failed: false,
        }
    }
}

impl<R: BufRead> Iterator for LineSource<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                let mut end = self.buf.len();
                if self.buf[..end].ends_with(b"\n") {
                    end -= 1;
                    if self.buf[..end].ends_with(b"\r") {
                        end -= 1;
                    }
                }
                Some(Ok(String::from_utf8_lossy(&self.buf[..end]).into_owned()))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
