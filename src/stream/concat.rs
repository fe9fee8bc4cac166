//! Concatenation of several streams into one.

use crate::decoders::Stream;
use std::collections::VecDeque;
use std::io::{self, Read};

/// Yields each part in turn. A part is dropped as soon as it is exhausted.
#[derive(Default)]
pub struct ConcatStream {
    parts: VecDeque<Stream>,
    /// Emit a space between parts
    pad: bool,
    pending_pad: bool,
}

impl ConcatStream {
    /// Create an empty concatenation. With `pad`, a space separates parts
    /// so operators at the end of one part never run into the next.
    pub fn new(pad: bool) -> Self {
        Self {
            parts: VecDeque::new(),
            pad,
            pending_pad: false,
        }
    }

    /// Append a part.
    pub fn push(&mut self, part: Stream) {
        self.parts.push_back(part);
    }

    /// Number of parts not yet exhausted.
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Whether every part has been consumed (or none was pushed).
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

impl Read for ConcatStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        loop {
            if self.pending_pad {
                self.pending_pad = false;
                buf[0] = b' ';
                return Ok(1);
            }
            let part = match self.parts.front_mut() {
                Some(part) => part,
                None => return Ok(0),
            };
            let n = part.read(buf)?;
            if n > 0 {
                return Ok(n);
            }
            self.parts.pop_front();
            self.pending_pad = self.pad && !self.parts.is_empty();
        }
    }
}
