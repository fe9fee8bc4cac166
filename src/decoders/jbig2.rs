//! JBIG2Decode stage.
//!
//! Embedded JBIG2 streams omit the segments shared across pages; those live
//! in the `JBIG2Globals` stream. The stage yields the globals segments
//! followed by the page's own segments, which is the order a JBIG2 decoder
//! consumes them in.
//!
//! PDF Spec: ISO 32000-1:2008, Section 7.4.7 - JBIG2Decode Filter

use crate::decoders::Stream;
use crate::jbig2::Jbig2Globals;
use bytes::Bytes;
use std::io::{self, Cursor, Read};
use std::rc::Rc;

/// JBIG2Decode stage.
pub struct Jbig2Stage {
    globals: Option<Rc<Jbig2Globals>>,
    prefix: Cursor<Bytes>,
    upstream: Stream,
}

impl Jbig2Stage {
    /// The stage holds a reference on `globals` until it is dropped.
    pub fn new(upstream: Stream, globals: Option<Rc<Jbig2Globals>>) -> Self {
        let prefix = globals
            .as_ref()
            .map(|g| g.data().clone())
            .unwrap_or_default();
        Self {
            globals,
            prefix: Cursor::new(prefix),
            upstream,
        }
    }

    /// Globals attached to this stage, if any.
    pub fn globals(&self) -> Option<&Rc<Jbig2Globals>> {
        self.globals.as_ref()
    }
}

impl Read for Jbig2Stage {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.prefix.read(buf)?;
        if n > 0 {
            return Ok(n);
        }
        self.upstream.read(buf)
    }
}
