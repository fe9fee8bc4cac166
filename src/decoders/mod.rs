//! Decode stages for PDF filters.
//!
//! Every stage is a pull source (`Read`) that owns the stage below it, so a
//! chain of filters is just nested boxes and dropping the outermost stage
//! releases the whole chain exactly once.
//!
//! - FlateDecode - streaming inflate (zlib, with raw deflate fallback)
//! - ASCIIHexDecode, ASCII85Decode, RunLengthDecode, LZWDecode - whole-buffer
//!   decoders run on first read
//! - Predictor post-stage (TIFF 2, PNG 10-15) for Flate/LZW
//! - DCTDecode, CCITTFaxDecode - pass-through, parameters retained
//! - JBIG2Decode - pass-through that prepends the document's globals segments
//!
//! Stage construction goes through [`CodecFactory`] so callers (and tests)
//! can substitute their own engines.

use crate::error::{Error, Result};
use crate::jbig2::Jbig2Globals;
use std::io::{self, Cursor, Read};
use std::rc::Rc;

mod ascii85;
mod ascii_hex;
mod ccitt;
mod dct;
mod flate;
mod jbig2;
mod lzw;
mod predictor;
mod runlength;

pub use ascii_hex::AsciiHexDecoder;
pub use ascii85::Ascii85Decoder;
pub use ccitt::{CcittFaxStage, FaxParams};
pub use dct::DctStage;
pub use flate::FlateStage;
pub use jbig2::Jbig2Stage;
pub use lzw::LzwDecoder;
pub use predictor::{DecodeParams, PredictorDecoder, decode_predictor};
pub use runlength::RunLengthDecoder;

/// A boxed pull source of bytes; one link of a decode chain.
pub type Stream = Box<dyn Read>;

/// A whole-buffer decoder for one PDF filter.
pub trait StreamDecoder {
    /// Decode the input data.
    fn decode(&self, input: &[u8]) -> Result<Vec<u8>>;

    /// Get the name of this decoder (e.g., "LZWDecode").
    fn name(&self) -> &str;
}

/// Stage that drains its upstream on the first read and serves the output
/// of a whole-buffer decoder.
///
/// The upstream is released as soon as it has been drained.
pub struct BufferedStage<D> {
    upstream: Option<Stream>,
    decoder: D,
    output: Cursor<Vec<u8>>,
}

impl<D: StreamDecoder> BufferedStage<D> {
    /// Wrap `upstream` with `decoder`. No bytes are read until the first pull.
    pub fn new(upstream: Stream, decoder: D) -> Self {
        Self {
            upstream: Some(upstream),
            decoder,
            output: Cursor::new(Vec::new()),
        }
    }

    fn fill(&mut self) -> io::Result<()> {
        if let Some(mut upstream) = self.upstream.take() {
            let mut input = Vec::new();
            upstream.read_to_end(&mut input)?;
            drop(upstream);
            let decoded = self.decoder.decode(&input)?;
            log::debug!(
                "{}: decoded {} bytes into {} bytes",
                self.decoder.name(),
                input.len(),
                decoded.len()
            );
            self.output = Cursor::new(decoded);
        }
        Ok(())
    }
}

impl<D: StreamDecoder> Read for BufferedStage<D> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.fill()?;
        self.output.read(buf)
    }
}

/// Constructors for decode stages, one per codec.
///
/// Each method takes ownership of `chain`: on success the returned stage owns
/// it, on failure it has already been dropped. Defaults build the standard
/// engines; override individual methods to substitute an engine.
pub trait CodecFactory {
    /// ASCIIHexDecode
    fn open_ascii_hex(&self, chain: Stream) -> Result<Stream> {
        Ok(Box::new(BufferedStage::new(chain, AsciiHexDecoder)))
    }

    /// ASCII85Decode
    fn open_ascii85(&self, chain: Stream) -> Result<Stream> {
        Ok(Box::new(BufferedStage::new(chain, Ascii85Decoder)))
    }

    /// RunLengthDecode
    fn open_run_length(&self, chain: Stream) -> Result<Stream> {
        Ok(Box::new(BufferedStage::new(chain, RunLengthDecoder)))
    }

    /// FlateDecode, without predictor
    fn open_flate(&self, chain: Stream) -> Result<Stream> {
        Ok(Box::new(FlateStage::new(chain)))
    }

    /// LZWDecode, without predictor
    fn open_lzw(&self, chain: Stream, early_change: i64) -> Result<Stream> {
        Ok(Box::new(BufferedStage::new(chain, LzwDecoder::new(early_change))))
    }

    /// Predictor post-stage for Flate and LZW
    fn open_predictor(&self, chain: Stream, params: &DecodeParams) -> Result<Stream> {
        let decoder = PredictorDecoder::new(params)?;
        Ok(Box::new(BufferedStage::new(chain, decoder)))
    }

    /// DCTDecode
    fn open_dct(&self, chain: Stream, color_transform: i64) -> Result<Stream> {
        Ok(Box::new(DctStage::new(chain, color_transform)))
    }

    /// CCITTFaxDecode
    fn open_fax(&self, chain: Stream, params: &FaxParams) -> Result<Stream> {
        Ok(Box::new(CcittFaxStage::new(chain, *params)))
    }

    /// JBIG2Decode; the stage keeps `globals` alive for its own lifetime
    fn open_jbig2(&self, chain: Stream, globals: Option<Rc<Jbig2Globals>>) -> Result<Stream> {
        Ok(Box::new(Jbig2Stage::new(chain, globals)))
    }
}

/// The built-in codec engines.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardCodecs;

impl CodecFactory for StandardCodecs {}

/// Read a stage to the end, converting stage failures back to [`Error`].
pub fn read_to_vec(stream: &mut dyn Read) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    stream.read_to_end(&mut out).map_err(Error::from_io)?;
    Ok(out)
}
