//! JBIG2 global segments and their per-document cache.
//!
//! Several images in a document may point at the same `JBIG2Globals`
//! stream. The cache keys loaded globals by that stream's reference so each
//! one is loaded and parsed once per document.

use crate::error::{Error, Result};
use crate::object::ObjectRef;
use bytes::Bytes;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Segment type of the end-of-file segment (T.88, 7.4.11).
const END_OF_FILE: u8 = 51;

/// A parsed JBIG2 segment header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentHeader {
    /// Segment number
    pub number: u32,
    /// Segment type (low 6 bits of the flags byte)
    pub segment_type: u8,
    /// Segments this one refers to
    pub referred_to: Vec<u32>,
    /// Page this segment belongs to (0 for global segments)
    pub page: u32,
    /// Length of the segment data following the header
    pub data_length: u32,
}

/// Decoded JBIG2 global segments.
#[derive(Debug, Clone)]
pub struct Jbig2Globals {
    data: Bytes,
    segments: Vec<SegmentHeader>,
}

impl Jbig2Globals {
    /// Parse the segment headers of a fully decoded globals stream.
    pub fn parse(data: Bytes) -> Result<Self> {
        let mut reader = SegmentReader { data: &data, pos: 0 };
        let mut segments = Vec::new();

        while reader.pos < data.len() {
            let header = reader.header()?;
            reader.skip(header.data_length as usize)?;
            let end = header.segment_type == END_OF_FILE;
            segments.push(header);
            if end {
                break;
            }
        }

        log::debug!("JBIG2 globals: {} segments, {} bytes", segments.len(), data.len());
        Ok(Self { data, segments })
    }

    /// The raw segment bytes.
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Segment headers in stream order.
    pub fn segments(&self) -> &[SegmentHeader] {
        &self.segments
    }

    /// Size of the global data in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the globals stream was empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

struct SegmentReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl SegmentReader<'_> {
    fn take(&mut self, n: usize) -> Result<&[u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| {
                Error::Jbig2(format!("segment truncated at offset {} (need {} bytes)", self.pos, n))
            })?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn skip(&mut self, n: usize) -> Result<()> {
        self.take(n).map(|_| ())
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// T.88, 7.2: segment header.
    fn header(&mut self) -> Result<SegmentHeader> {
        let number = self.u32()?;
        let flags = self.u8()?;
        let segment_type = flags & 0x3F;
        let long_page = flags & 0x40 != 0;

        let first = self.u8()?;
        let count = match first >> 5 {
            7 => {
                self.pos -= 1;
                let count = (self.u32()? & 0x1FFF_FFFF) as usize;
                // retention flags: one bit per referred segment plus one
                self.skip((count + 8) / 8)?;
                count
            },
            n @ 0..=4 => usize::from(n),
            n => {
                return Err(Error::Jbig2(format!(
                    "segment {}: invalid referred-to segment count {}",
                    number, n
                )));
            },
        };

        let mut referred_to = Vec::with_capacity(count.min(64));
        for _ in 0..count {
            let id = if number <= 256 {
                u32::from(self.u8()?)
            } else if number <= 65536 {
                u32::from(self.u16()?)
            } else {
                self.u32()?
            };
            referred_to.push(id);
        }

        let page = if long_page { self.u32()? } else { u32::from(self.u8()?) };
        let data_length = self.u32()?;
        if data_length == u32::MAX {
            return Err(Error::Jbig2(format!(
                "segment {}: unknown data length is not allowed in globals",
                number
            )));
        }

        Ok(SegmentHeader {
            number,
            segment_type,
            referred_to,
            page,
            data_length,
        })
    }
}

/// Per-document cache of loaded JBIG2 globals, keyed by stream reference.
///
/// The cost of the cache is the total size of the global data it holds.
#[derive(Debug, Default)]
pub struct Jbig2GlobalsCache {
    entries: RefCell<HashMap<ObjectRef, Rc<Jbig2Globals>>>,
    /// Keys whose build is running
    building: RefCell<HashSet<ObjectRef>>,
}

impl Jbig2GlobalsCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up previously loaded globals.
    pub fn get(&self, key: ObjectRef) -> Option<Rc<Jbig2Globals>> {
        self.entries.borrow().get(&key).cloned()
    }

    /// Return the cached globals for `key`, building and caching them with
    /// `build` on a miss. A failed build caches nothing.
    ///
    /// `build` runs without the cache borrowed, so it may itself consult the
    /// cache. If an entry for `key` appears meanwhile, that entry is kept.
    /// Asking for `key` again while its own build is running fails with
    /// [`Error::Jbig2`].
    pub fn get_or_try_insert_with<F>(&self, key: ObjectRef, build: F) -> Result<Rc<Jbig2Globals>>
    where
        F: FnOnce() -> Result<Jbig2Globals>,
    {
        if let Some(hit) = self.get(key) {
            return Ok(hit);
        }

        if !self.building.borrow_mut().insert(key) {
            return Err(Error::Jbig2(format!("recursive JBIG2Globals ({})", key)));
        }
        let result = build();
        self.building.borrow_mut().remove(&key);

        let built = Rc::new(result?);
        let mut entries = self.entries.borrow_mut();
        let entry = entries.entry(key).or_insert_with(|| {
            log::debug!("caching JBIG2 globals {} ({} bytes)", key, built.len());
            Rc::clone(&built)
        });
        Ok(Rc::clone(entry))
    }

    /// Total bytes of global data held.
    pub fn cost(&self) -> usize {
        self.entries.borrow().values().map(|g| g.len()).sum()
    }

    /// Number of cached globals.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Drop every cached entry. Stages still holding globals keep them alive.
    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}
