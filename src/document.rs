//! PDF document state consumed by stream opening.
//!
//! A [`PdfDocument`] ties together everything a stream needs to be opened:
//! the shared byte source, the cross-reference table, the optional
//! encryption handler, the codec engines and the per-document JBIG2 globals
//! cache. Opening and loading streams lives in [`crate::stream`].

use crate::config::StreamOptions;
use crate::decoders::{CodecFactory, StandardCodecs};
use crate::encryption::CryptHandler;
use crate::error::{Error, Result};
use crate::jbig2::Jbig2GlobalsCache;
use crate::xref::{CrossRefTable, XRefEntry};
use std::cell::RefCell;
use std::io::{Read, Seek};
use std::rc::Rc;

/// A seekable byte source.
pub trait ReadSeek: Read + Seek {}

impl<T: Read + Seek> ReadSeek for T {}

/// The document's underlying file, shared by every raw stream opened on it.
pub type SharedSource = Rc<RefCell<dyn ReadSeek>>;

/// PDF document.
///
/// Single-threaded: streams opened from a document hold a reference on its
/// file and borrow it only for the duration of each read.
///
/// # Example
///
/// ```
/// use pdf_streams::document::PdfDocument;
/// use pdf_streams::object::{Dictionary, Object};
/// use pdf_streams::xref::{CrossRefTable, XRefEntry};
/// use std::io::Cursor;
///
/// let mut dict = Dictionary::new();
/// dict.insert("Length".to_string(), Object::Integer(5));
///
/// let mut xref = CrossRefTable::new();
/// xref.insert(1, XRefEntry::stream(0, dict, 10));
///
/// let doc = PdfDocument::new(Cursor::new(b"0123456789hello".to_vec()), xref);
/// assert_eq!(&doc.load_stream(1, 0)?[..], b"hello");
/// # Ok::<(), pdf_streams::error::Error>(())
/// ```
pub struct PdfDocument {
    /// Underlying file
    file: SharedSource,
    /// Cross-reference table
    xref: CrossRefTable,
    /// Encryption handler (if the PDF is encrypted)
    crypt: Option<Rc<dyn CryptHandler>>,
    /// Codec engines used to build decode stages
    codecs: Rc<dyn CodecFactory>,
    /// Decoding options
    options: StreamOptions,
    /// Loaded JBIG2 globals, dropped with the document
    jbig2_globals: Jbig2GlobalsCache,
}

impl std::fmt::Debug for PdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfDocument")
            .field("xref_entries", &self.xref.len())
            .field("encrypted", &self.crypt.is_some())
            .field("options", &self.options)
            .field("jbig2_globals", &self.jbig2_globals.len())
            .finish_non_exhaustive()
    }
}

impl PdfDocument {
    /// Create a document over `source` with the given cross-reference table.
    pub fn new<R: Read + Seek + 'static>(source: R, xref: CrossRefTable) -> Self {
        Self::from_shared(Rc::new(RefCell::new(source)), xref)
    }

    /// Create a document over a file the caller also keeps a handle on.
    pub fn from_shared(file: SharedSource, xref: CrossRefTable) -> Self {
        Self {
            file,
            xref,
            crypt: None,
            codecs: Rc::new(StandardCodecs),
            options: StreamOptions::default(),
            jbig2_globals: Jbig2GlobalsCache::new(),
        }
    }

    /// Attach an encryption handler.
    pub fn with_crypt(mut self, crypt: Rc<dyn CryptHandler>) -> Self {
        self.crypt = Some(crypt);
        self
    }

    /// Replace the codec engines.
    pub fn with_codecs(mut self, codecs: Rc<dyn CodecFactory>) -> Self {
        self.codecs = codecs;
        self
    }

    /// Replace the decoding options.
    pub fn with_options(mut self, options: StreamOptions) -> Self {
        self.options = options;
        self
    }

    /// The shared underlying file.
    pub fn file(&self) -> &SharedSource {
        &self.file
    }

    /// The cross-reference table.
    pub fn xref(&self) -> &CrossRefTable {
        &self.xref
    }

    /// Mutable access to the cross-reference table.
    pub fn xref_mut(&mut self) -> &mut CrossRefTable {
        &mut self.xref
    }

    /// The encryption handler, if the document is encrypted.
    pub fn crypt(&self) -> Option<&dyn CryptHandler> {
        self.crypt.as_deref()
    }

    /// Whether the document has an active encryption state.
    pub fn has_crypt(&self) -> bool {
        self.crypt.is_some()
    }

    /// Codec engines.
    pub fn codecs(&self) -> &dyn CodecFactory {
        self.codecs.as_ref()
    }

    /// Decoding options.
    pub fn options(&self) -> &StreamOptions {
        &self.options
    }

    /// The document's JBIG2 globals cache.
    pub fn jbig2_globals(&self) -> &Jbig2GlobalsCache {
        &self.jbig2_globals
    }

    /// Look up the cross-reference entry for `num`.
    ///
    /// # Errors
    ///
    /// [`Error::ObjectOutOfRange`] if `num` is 0 or past the end of the table.
    pub fn entry(&self, num: u32, gen: u16) -> Result<&XRefEntry> {
        self.xref.get(num).ok_or(Error::ObjectOutOfRange(num, gen))
    }
}
