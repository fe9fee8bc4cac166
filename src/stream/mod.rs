//! Opening and loading PDF streams.
//!
//! Every stream of an indirect object starts with a *raw* layer: its bytes
//! constrained to the declared `Length` and decrypted. Filters named by the
//! stream dictionary are layered on top of that:
//!
//! ```text
//! file --RangeStage--> [default decryption] --filter 1--> ... --filter n--> caller
//! ```
//!
//! Objects whose raw data is already in memory skip the range and
//! decryption layers. Inline streams (image data embedded in a content
//! stream) are read from a caller-supplied source and never decrypted.

use crate::decoders::Stream;
use crate::document::PdfDocument;
use crate::error::{Error, Result};
use crate::filters::{build_filters, guess_chain_length, FilterParams, Origin};
use crate::object::{dict_int, get_either, Dictionary, Object};
use bytes::Bytes;
use std::cell::RefCell;
use std::io::{Cursor, Read};
use std::rc::Rc;

mod concat;
mod load;
mod range;

pub use concat::ConcatStream;
pub use load::{read_all, read_best, LoadLimits};
pub use range::{InlineStage, RangeStage};

/// Stream data still encoded with its last filter, plus the description of
/// that filter.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressedBuffer {
    /// Bytes up to, but not through, the terminal filter
    pub buffer: Bytes,
    /// The terminal filter, or [`FilterParams::Raw`] if it was decoded
    pub params: FilterParams,
}

/// Whether a stream dictionary names an explicit `Crypt` filter.
pub fn stream_has_crypt(dict: &Dictionary) -> bool {
    match get_either(dict, "Filter", "F") {
        Some(Object::Name(name)) => name == "Crypt",
        Some(Object::Array(filters)) => filters.iter().any(|f| f.as_name() == Some("Crypt")),
        _ => false,
    }
}

fn declared_length(dict: &Dictionary) -> i64 {
    dict_int(Some(dict), "Length").max(0)
}

impl PdfDocument {
    /// Whether object `num` carries stream data. Out-of-range ids are not
    /// streams.
    pub fn is_stream(&self, num: u32, gen: u16) -> bool {
        self.entry(num, gen).is_ok_and(|entry| entry.is_stream())
    }

    /// Open the raw (still encoded, but decrypted) data of a stream.
    pub fn open_raw_stream(&self, num: u32, gen: u16) -> Result<Stream> {
        self.open_raw_renumbered_stream(num, gen, num, gen)
    }

    /// Open the raw data of stream `num`, decrypting it as object
    /// `orig_num`/`orig_gen`.
    ///
    /// Objects moved by an incremental update or repacked into an object
    /// stream keep the identity they were encrypted under.
    pub fn open_raw_renumbered_stream(
        &self,
        num: u32,
        gen: u16,
        orig_num: u32,
        orig_gen: u16,
    ) -> Result<Stream> {
        let entry = self.entry(num, gen)?;
        if !entry.is_stream() {
            return Err(Error::NotAStream(num, gen));
        }
        let empty = Dictionary::new();
        let dict = entry.dict().unwrap_or(&empty);
        self.open_raw_filter(dict, num, orig_num, orig_gen, entry.stm_ofs)
    }

    /// Open the decoded data of a stream.
    pub fn open_stream(&self, num: u32, gen: u16) -> Result<Stream> {
        self.open_image_stream(num, gen, num, gen, None)
    }

    /// Open the decoded data of a stream, optionally stopping short of its
    /// last filter.
    ///
    /// With `params`, a final CCITTFax, DCT, RunLength, Flate or LZW filter
    /// is left undecoded and described in `params`, so image code can hand
    /// the encoded data to its own decoder. Otherwise `params` is set to
    /// [`FilterParams::Raw`].
    pub fn open_image_stream(
        &self,
        num: u32,
        gen: u16,
        orig_num: u32,
        orig_gen: u16,
        params: Option<&mut FilterParams>,
    ) -> Result<Stream> {
        let entry = self.entry(num, gen)?;
        if !entry.is_stream() {
            return Err(Error::NotAStream(num, gen));
        }
        let empty = Dictionary::new();
        let dict = entry.dict().unwrap_or(&empty);
        self.open_filter(dict, num, orig_num, orig_gen, entry.stm_ofs, params)
    }

    /// Open a stream whose dictionary and data offset the caller already
    /// knows, e.g. while repairing a damaged file.
    pub fn open_stream_with_offset(
        &self,
        num: u32,
        gen: u16,
        dict: &Dictionary,
        stm_ofs: u64,
    ) -> Result<Stream> {
        if stm_ofs == 0 {
            return Err(Error::NotAStream(num, gen));
        }
        self.open_filter(dict, num, num, gen, stm_ofs, None)
    }

    /// Open inline data: `length` bytes of `source`, decoded by the filters
    /// of `dict`.
    ///
    /// `source` is read from its current position and stays usable after
    /// the returned stream is dropped. Neither encryption nor the
    /// cross-reference table is consulted.
    pub fn open_inline_stream(
        &self,
        dict: &Dictionary,
        length: u64,
        source: Rc<RefCell<dyn Read>>,
        params: Option<&mut FilterParams>,
    ) -> Result<Stream> {
        let chain: Stream = Box::new(InlineStage::new(source, length));
        build_filters(
            self,
            Origin::Inline,
            chain,
            get_either(dict, "Filter", "F"),
            get_either(dict, "DecodeParms", "DP"),
            params,
        )
    }

    /// Open a page's `Contents`: a stream reference, or an array of them
    /// read back to back.
    ///
    /// Returns `Ok(None)` when `obj` is neither.
    pub fn open_contents_stream(&self, obj: &Object) -> Result<Option<Stream>> {
        if let Object::Array(parts) = obj {
            return self.open_object_array(parts).map(|s| Some(Box::new(s) as Stream));
        }

        match obj.as_reference() {
            Some(r) if self.is_stream(r.id, r.gen) => self.open_stream(r.id, r.gen).map(Some),
            _ => {
                log::warn!("pdf object stream missing ({})", obj.type_name());
                Ok(None)
            },
        }
    }

    /// Open every element of `parts` and splice the results together.
    ///
    /// A part that cannot be opened is left out with a warning; retryable
    /// failures abort the whole operation.
    pub fn open_object_array(&self, parts: &[Object]) -> Result<ConcatStream> {
        let n = parts.len();
        let mut concat = ConcatStream::new(true);
        for (i, part) in parts.iter().enumerate() {
            let opened = match part.as_reference() {
                Some(r) => self.open_stream(r.id, r.gen),
                None => Err(Error::InvalidObjectType {
                    expected: "Reference".to_string(),
                    found: part.type_name().to_string(),
                }),
            };
            match opened {
                Ok(stream) => concat.push(stream),
                Err(e) if e.is_retryable() => return Err(e),
                Err(e) => {
                    log::warn!("cannot load content stream part {}/{}: {}", i + 1, n, e);
                },
            }
        }
        Ok(concat)
    }

    /// Load the raw (still encoded, but decrypted) data of a stream.
    pub fn load_raw_stream(&self, num: u32, gen: u16) -> Result<Bytes> {
        self.load_raw_renumbered_stream(num, gen, num, gen)
    }

    /// Load the raw data of stream `num`, decrypting it as object
    /// `orig_num`/`orig_gen`.
    pub fn load_raw_renumbered_stream(
        &self,
        num: u32,
        gen: u16,
        orig_num: u32,
        orig_gen: u16,
    ) -> Result<Bytes> {
        if let Some(buf) = self.buffered(num) {
            return Ok(buf);
        }

        let entry = self.entry(num, gen)?;
        let len = entry.dict().map_or(0, declared_length) as u64;

        let mut stream = self.open_raw_renumbered_stream(num, gen, orig_num, orig_gen)?;
        let limits = LoadLimits::new(self.options(), len, false);
        read_all(&mut stream, len as usize, &limits).map(Bytes::from)
    }

    /// Load the decoded data of a stream.
    pub fn load_stream(&self, num: u32, gen: u16) -> Result<Bytes> {
        self.load_image_stream(num, gen, num, gen, None, None)
    }

    /// Load the decoded data of stream `num`, decrypting it as object
    /// `orig_num`/`orig_gen`.
    ///
    /// With `truncated`, decode errors end the data early instead of
    /// failing, and `truncated` reports whether that happened.
    pub fn load_renumbered_stream(
        &self,
        num: u32,
        gen: u16,
        orig_num: u32,
        orig_gen: u16,
        truncated: Option<&mut bool>,
    ) -> Result<Bytes> {
        self.load_image_stream(num, gen, orig_num, orig_gen, None, truncated)
    }

    /// Load a stream, leaving an image-codec terminal filter undecoded.
    pub fn load_compressed_stream(&self, num: u32, gen: u16) -> Result<CompressedBuffer> {
        let mut params = FilterParams::Raw;
        let buffer = self.load_image_stream(num, gen, num, gen, Some(&mut params), None)?;
        Ok(CompressedBuffer { buffer, params })
    }

    fn load_image_stream(
        &self,
        num: u32,
        gen: u16,
        orig_num: u32,
        orig_gen: u16,
        params: Option<&mut FilterParams>,
        truncated: Option<&mut bool>,
    ) -> Result<Bytes> {
        if let Some(buf) = self.buffered(num) {
            if let Some(slot) = params {
                *slot = FilterParams::Raw;
            }
            return Ok(buf);
        }

        let entry = self.entry(num, gen)?;
        let (declared, filters) = match entry.dict() {
            Some(dict) => (declared_length(dict), get_either(dict, "Filter", "F")),
            None => (0, None),
        };
        let guessed = guess_chain_length(declared, filters).max(0) as usize;
        let filtered = filters.is_some_and(|f| f.as_name().is_some() || f.array_len() > 0);
        let limits = LoadLimits::new(self.options(), declared as u64, filtered);

        let mut stream = self.open_image_stream(num, gen, orig_num, orig_gen, params)?;
        let result = match truncated {
            Some(flag) => read_best(&mut stream, guessed, &limits, flag),
            None => read_all(&mut stream, guessed, &limits),
        };
        drop(stream);

        result.map(Bytes::from).map_err(|e| {
            log::debug!("cannot read stream ({} {} R): {}", num, gen, e);
            e
        })
    }

    /// The already-materialized raw data of object `num`, if any.
    fn buffered(&self, num: u32) -> Option<Bytes> {
        self.xref().get(num).and_then(|entry| entry.stm_buf.clone())
    }

    fn open_raw_filter(
        &self,
        dict: &Dictionary,
        num: u32,
        orig_num: u32,
        orig_gen: u16,
        offset: u64,
    ) -> Result<Stream> {
        if let Some(buf) = self.buffered(num) {
            return Ok(Box::new(Cursor::new(buf)));
        }

        let len = declared_length(dict) as u64;
        let chain: Stream = Box::new(RangeStage::new(Rc::clone(self.file()), offset, len));

        match self.crypt() {
            Some(crypt) if !stream_has_crypt(dict) => crypt.open_default(chain, orig_num, orig_gen),
            _ => Ok(chain),
        }
    }

    fn open_filter(
        &self,
        dict: &Dictionary,
        num: u32,
        orig_num: u32,
        orig_gen: u16,
        offset: u64,
        params: Option<&mut FilterParams>,
    ) -> Result<Stream> {
        let filters = get_either(dict, "Filter", "F");
        let decode_parms = get_either(dict, "DecodeParms", "DP");

        let chain = self.open_raw_filter(dict, num, orig_num, orig_gen, offset)?;
        build_filters(
            self,
            Origin::Object(orig_num, orig_gen),
            chain,
            filters,
            decode_parms,
            params,
        )
    }
}
