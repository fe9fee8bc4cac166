//! CCITTFaxDecode stage.
//!
//! Group 3/4 fax data is passed through undecoded; the stage carries the
//! resolved parameters so an image consumer can run the bit-level decode.
//!
//! PDF Spec: ISO 32000-1:2008, Section 7.4.6 - CCITTFaxDecode Filter

use crate::decoders::Stream;
use std::io::{self, Read};

/// Resolved CCITTFaxDecode parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaxParams {
    /// Coding scheme: < 0 pure 2D (G4), 0 pure 1D (G3), > 0 mixed
    pub k: i64,
    /// `EndOfLine`
    pub end_of_line: bool,
    /// `EncodedByteAlign`
    pub encoded_byte_align: bool,
    /// `Columns`
    pub columns: i64,
    /// `Rows` (0 = unknown)
    pub rows: i64,
    /// `EndOfBlock`
    pub end_of_block: bool,
    /// `BlackIs1`
    pub black_is_1: bool,
}

impl Default for FaxParams {
    fn default() -> Self {
        Self {
            k: 0,
            end_of_line: false,
            encoded_byte_align: false,
            columns: 1728,
            rows: 0,
            end_of_block: true,
            black_is_1: false,
        }
    }
}

/// CCITTFaxDecode stage: hands the encoded bytes through unchanged.
pub struct CcittFaxStage {
    upstream: Stream,
    params: FaxParams,
    logged: bool,
}

impl CcittFaxStage {
    /// Wrap `upstream` with the given parameters.
    pub fn new(upstream: Stream, params: FaxParams) -> Self {
        Self {
            upstream,
            params,
            logged: false,
        }
    }

    /// Parameters the stage was opened with.
    pub fn params(&self) -> &FaxParams {
        &self.params
    }
}

impl Read for CcittFaxStage {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.logged {
            log::debug!(
                "CCITTFaxDecode: pass-through (K={}, {}x{})",
                self.params.k,
                self.params.columns,
                self.params.rows
            );
            self.logged = true;
        }
        self.upstream.read(buf)
    }
}
