//! Length-constrained views of shared byte sources.
//!
//! Neither stage owns the source it reads from: dropping a stage releases
//! only its own reference, and the source stays usable for the next stream
//! opened on it.

use crate::document::SharedSource;
use std::cell::RefCell;
use std::io::{self, Read, Seek, SeekFrom};
use std::rc::Rc;

/// Reads `length` bytes of the document file starting at `offset`.
///
/// The stage seeks before every read, so several stages may be opened on
/// the same file and read in any order.
pub struct RangeStage {
    file: SharedSource,
    pos: u64,
    remaining: u64,
}

impl RangeStage {
    /// View `length` bytes of `file` at `offset`.
    pub fn new(file: SharedSource, offset: u64, length: u64) -> Self {
        Self {
            file,
            pos: offset,
            remaining: length,
        }
    }
}

impl Read for RangeStage {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let want = buf.len().min(usize::try_from(self.remaining).unwrap_or(usize::MAX));
        if want == 0 {
            return Ok(0);
        }

        let mut file = self
            .file
            .try_borrow_mut()
            .map_err(|_| io::Error::other("document file is already being read"))?;
        file.seek(SeekFrom::Start(self.pos))?;
        let n = file.read(&mut buf[..want])?;

        self.pos += n as u64;
        self.remaining = if n == 0 { 0 } else { self.remaining - n as u64 };
        Ok(n)
    }
}

/// Reads at most `length` bytes from a caller-owned source, from wherever
/// that source currently is.
pub struct InlineStage {
    source: Rc<RefCell<dyn Read>>,
    remaining: u64,
}

impl InlineStage {
    /// View the next `length` bytes of `source`.
    pub fn new(source: Rc<RefCell<dyn Read>>, length: u64) -> Self {
        Self {
            source,
            remaining: length,
        }
    }
}

impl Read for InlineStage {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let want = buf.len().min(usize::try_from(self.remaining).unwrap_or(usize::MAX));
        if want == 0 {
            return Ok(0);
        }

        let mut source = self
            .source
            .try_borrow_mut()
            .map_err(|_| io::Error::other("inline stream source is already being read"))?;
        let n = source.read(&mut buf[..want])?;

        self.remaining = if n == 0 { 0 } else { self.remaining - n as u64 };
        Ok(n)
    }
}
