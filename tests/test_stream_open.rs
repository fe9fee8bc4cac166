//! Integration tests for raw, decoded, renumbered and inline stream opening.
//!
//! Covers:
//! - Length-constrained raw reads and the buffered-data bypass
//! - Which identity seeds decryption, and when decryption is skipped
//! - Inline streams never reaching the encryption handler
//! - Best-effort loading and retryable errors

use flate2::Compression;
use flate2::write::ZlibEncoder;
use pdf_streams::decoders::{CodecFactory, Stream};
use pdf_streams::encryption::rc4_crypt;
use pdf_streams::object::{Dictionary, Object};
use pdf_streams::xref::{CrossRefTable, XRefEntry};
use pdf_streams::{CryptHandler, CryptMethod, Error, PdfDocument, StandardCryptHandler};
use std::cell::RefCell;
use std::io::{self, Cursor, Read, Write};
use std::rc::Rc;

struct TestFile {
    data: Vec<u8>,
    xref: CrossRefTable,
}

impl TestFile {
    fn new() -> Self {
        Self {
            data: b"%PDF-1.7\n".to_vec(),
            xref: CrossRefTable::new(),
        }
    }

    fn add_stream(&mut self, num: u32, mut dict: Dictionary, body: &[u8]) {
        dict.insert("Length".to_string(), Object::Integer(body.len() as i64));
        self.add_stream_with_dict(num, dict, body);
    }

    /// Add a stream without touching `Length`.
    fn add_stream_with_dict(&mut self, num: u32, dict: Dictionary, body: &[u8]) {
        self.data.extend_from_slice(b"stream\n");
        let offset = self.data.len() as u64;
        self.data.extend_from_slice(body);
        self.data.extend_from_slice(b"\nendstream\n");
        self.xref.insert(num, XRefEntry::stream(0, dict, offset));
    }

    fn into_document(self) -> PdfDocument {
        PdfDocument::new(Cursor::new(self.data), self.xref)
    }
}

fn dict(entries: &[(&str, Object)]) -> Dictionary {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn read(mut stream: Stream) -> Vec<u8> {
    let mut out = Vec::new();
    stream.read_to_end(&mut out).unwrap();
    out
}

fn zlib(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Records every request and applies no decryption.
#[derive(Default)]
struct RecordingCrypt {
    calls: RefCell<Vec<(String, u32, u16)>>,
}

impl RecordingCrypt {
    fn calls(&self) -> Vec<(String, u32, u16)> {
        self.calls.borrow().clone()
    }
}

impl CryptHandler for RecordingCrypt {
    fn open_default(&self, stream: Stream, num: u32, gen: u16) -> pdf_streams::Result<Stream> {
        self.calls.borrow_mut().push(("default".to_string(), num, gen));
        Ok(stream)
    }

    fn open_with_filter(&self, stream: Stream, name: &str, num: u32, gen: u16) -> pdf_streams::Result<Stream> {
        self.calls.borrow_mut().push((name.to_string(), num, gen));
        Ok(stream)
    }
}

fn recorded_document(file: TestFile) -> (PdfDocument, Rc<RecordingCrypt>) {
    let crypt = Rc::new(RecordingCrypt::default());
    let doc = file.into_document().with_crypt(Rc::clone(&crypt) as Rc<dyn CryptHandler>);
    (doc, crypt)
}

#[test]
fn test_raw_stream_is_length_constrained() {
    let mut file = TestFile::new();
    file.add_stream(1, Dictionary::new(), b"exactly these bytes");
    let doc = file.into_document();

    assert_eq!(read(doc.open_raw_stream(1, 0).unwrap()), b"exactly these bytes");
    assert_eq!(&doc.load_raw_stream(1, 0).unwrap()[..], b"exactly these bytes");
}

#[test]
fn test_negative_length_reads_nothing() {
    let mut file = TestFile::new();
    file.add_stream_with_dict(1, dict(&[("Length", Object::Integer(-7))]), b"ignored");
    let doc = file.into_document();
    assert!(doc.load_stream(1, 0).unwrap().is_empty());
}

#[test]
fn test_raw_stream_keeps_filters_encoded() {
    let body = zlib(b"still compressed");
    let mut file = TestFile::new();
    file.add_stream(1, dict(&[("Filter", Object::name("FlateDecode"))]), &body);
    let doc = file.into_document();

    assert_eq!(doc.load_raw_stream(1, 0).unwrap().to_vec(), body);
    assert_eq!(&doc.load_stream(1, 0).unwrap()[..], b"still compressed");
}

#[test]
fn test_default_decryption_seeded_with_object_id() {
    let mut file = TestFile::new();
    file.add_stream(5, Dictionary::new(), b"data");
    let (doc, crypt) = recorded_document(file);

    assert_eq!(read(doc.open_raw_stream(5, 0).unwrap()), b"data");
    assert_eq!(crypt.calls(), vec![("default".to_string(), 5, 0)]);
}

#[test]
fn test_renumbered_stream_decrypted_as_original() {
    let mut file = TestFile::new();
    file.add_stream(5, Dictionary::new(), b"moved");
    let (doc, crypt) = recorded_document(file);

    assert_eq!(read(doc.open_raw_renumbered_stream(5, 0, 12, 3).unwrap()), b"moved");
    assert_eq!(&doc.load_renumbered_stream(5, 0, 40, 1, None).unwrap()[..], b"moved");
    assert_eq!(
        crypt.calls(),
        vec![("default".to_string(), 12, 3), ("default".to_string(), 40, 1)]
    );
}

#[test]
fn test_explicit_crypt_filter_replaces_default() {
    let mut file = TestFile::new();
    file.add_stream(
        7,
        dict(&[
            ("Filter", Object::name("Crypt")),
            ("DecodeParms", Object::Dictionary(dict(&[("Name", Object::name("StdCF"))]))),
        ]),
        b"crypted",
    );
    let (doc, crypt) = recorded_document(file);

    assert_eq!(read(doc.open_raw_stream(7, 0).unwrap()), b"crypted");
    assert!(crypt.calls().is_empty());

    assert_eq!(read(doc.open_stream(7, 0).unwrap()), b"crypted");
    assert_eq!(crypt.calls(), vec![("StdCF".to_string(), 7, 0)]);
}

#[test]
fn test_buffered_stream_bypasses_file_and_crypt() {
    let mut xref = CrossRefTable::new();
    xref.insert(
        3,
        XRefEntry::buffered(0, dict(&[("Filter", Object::name("ASCIIHexDecode"))]), b"414243>".to_vec()),
    );
    let crypt = Rc::new(RecordingCrypt::default());
    let doc = PdfDocument::new(Cursor::new(Vec::new()), xref).with_crypt(Rc::clone(&crypt) as Rc<dyn CryptHandler>);

    assert!(doc.is_stream(3, 0));
    assert_eq!(read(doc.open_raw_stream(3, 0).unwrap()), b"414243>");
    assert_eq!(&doc.load_raw_stream(3, 0).unwrap()[..], b"414243>");
    assert_eq!(read(doc.open_stream(3, 0).unwrap()), b"ABC");
    assert_eq!(&doc.load_stream(3, 0).unwrap()[..], b"414243>");
    assert!(crypt.calls().is_empty());
    assert_eq!(Rc::strong_count(doc.file()), 1);
}

#[test]
fn test_rc4_encrypted_flate_stream() {
    let handler = StandardCryptHandler::new(vec![0x11, 0x22, 0x33, 0x44, 0x55], CryptMethod::Rc4).unwrap();
    let plain = b"q 1 0 0 1 0 0 cm Q";
    let encrypted = rc4_crypt(&handler.object_key(CryptMethod::Rc4, 9, 0), &zlib(plain));

    let mut file = TestFile::new();
    file.add_stream(9, dict(&[("Filter", Object::name("FlateDecode"))]), &encrypted);
    let doc = file.into_document().with_crypt(Rc::new(handler));

    assert_eq!(&doc.load_stream(9, 0).unwrap()[..], plain);
}

#[test]
fn test_rc4_renumbered_uses_original_key() {
    let handler = StandardCryptHandler::new(vec![0x0A; 16], CryptMethod::Rc4).unwrap();
    let plain = b"encrypted as object 30";
    let encrypted = rc4_crypt(&handler.object_key(CryptMethod::Rc4, 30, 0), plain);

    let mut file = TestFile::new();
    file.add_stream(2, Dictionary::new(), &encrypted);
    let doc = file.into_document().with_crypt(Rc::new(handler));

    assert_eq!(&doc.load_renumbered_stream(2, 0, 30, 0, None).unwrap()[..], plain);
    assert_ne!(&doc.load_stream(2, 0).unwrap()[..], plain);
}

#[test]
fn test_unknown_named_crypt_filter_fails() {
    let handler = StandardCryptHandler::new(vec![0x0A; 16], CryptMethod::Rc4).unwrap();
    let mut file = TestFile::new();
    file.add_stream(
        4,
        dict(&[
            ("Filter", Object::name("Crypt")),
            ("DecodeParms", Object::Dictionary(dict(&[("Name", Object::name("Missing"))]))),
        ]),
        b"data",
    );
    let doc = file.into_document().with_crypt(Rc::new(handler));
    assert!(matches!(doc.open_stream(4, 0), Err(Error::Encryption(_))));
    assert_eq!(Rc::strong_count(doc.file()), 1);
}

#[test]
fn test_inline_stream_never_touches_crypt() {
    let (doc, crypt) = recorded_document(TestFile::new());
    let inline = dict(&[
        ("F", Object::Array(vec![Object::name("Crypt"), Object::name("AHx")])),
        (
            "DP",
            Object::Array(vec![Object::Dictionary(dict(&[("Name", Object::name("StdCF"))])), Object::Null]),
        ),
    ]);
    let source: Rc<RefCell<dyn Read>> = Rc::new(RefCell::new(Cursor::new(b"48 69> EI Q".to_vec())));

    let stream = doc.open_inline_stream(&inline, 6, Rc::clone(&source), None).unwrap();
    assert_eq!(read(stream), b"Hi");
    assert!(crypt.calls().is_empty());

    let mut rest = Vec::new();
    source.borrow_mut().read_to_end(&mut rest).unwrap();
    assert_eq!(rest, b" EI Q");
}

#[test]
fn test_inline_stream_without_filters() {
    let doc = TestFile::new().into_document();
    let source: Rc<RefCell<dyn Read>> = Rc::new(RefCell::new(Cursor::new(b"\x01\x02\x03\x04".to_vec())));
    let stream = doc.open_inline_stream(&Dictionary::new(), 3, source, None).unwrap();
    assert_eq!(read(stream), &[1, 2, 3]);
}

#[test]
fn test_open_stream_with_offset() {
    let mut file = TestFile::new();
    file.add_stream(1, Dictionary::new(), b"unused");
    let offset = file.data.len() as u64;
    file.data.extend_from_slice(b"repaired stream data");
    let doc = file.into_document();

    let repaired = dict(&[("Length", Object::Integer(8))]);
    assert_eq!(read(doc.open_stream_with_offset(1, 0, &repaired, offset).unwrap()), b"repaired");
}

#[test]
fn test_best_effort_load_reports_truncation() {
    let mut file = TestFile::new();
    file.add_stream(1, dict(&[("Filter", Object::name("ASCIIHexDecode"))]), b"41 4G>");
    let doc = file.into_document();

    assert!(matches!(doc.load_stream(1, 0), Err(Error::Decode(_))));

    let mut truncated = false;
    let data = doc.load_renumbered_stream(1, 0, 1, 0, Some(&mut truncated)).unwrap();
    assert!(data.is_empty());
    assert!(truncated);

    let mut truncated = true;
    let mut file = TestFile::new();
    file.add_stream(1, Dictionary::new(), b"fine");
    let doc = file.into_document();
    let data = doc.load_renumbered_stream(1, 0, 1, 0, Some(&mut truncated)).unwrap();
    assert_eq!(&data[..], b"fine");
    assert!(!truncated);
}

/// Fails every read with a retryable error.
struct NotYetLoaded;

impl Read for NotYetLoaded {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(Error::TryLater("data not yet loaded".to_string()).into())
    }
}

struct ProgressiveCodecs;

impl CodecFactory for ProgressiveCodecs {
    fn open_ascii_hex(&self, _chain: Stream) -> pdf_streams::Result<Stream> {
        Ok(Box::new(NotYetLoaded))
    }
}

#[test]
fn test_best_effort_load_propagates_retryable() {
    let mut file = TestFile::new();
    file.add_stream(1, dict(&[("Filter", Object::name("ASCIIHexDecode"))]), b"4142>");
    let doc = file.into_document().with_codecs(Rc::new(ProgressiveCodecs));

    let mut truncated = false;
    let result = doc.load_renumbered_stream(1, 0, 1, 0, Some(&mut truncated));
    assert!(matches!(result, Err(Error::TryLater(_))));
}

#[test]
fn test_not_a_stream() {
    let mut xref = CrossRefTable::new();
    xref.insert(1, XRefEntry::object(0, Object::Integer(42)));
    let doc = PdfDocument::new(Cursor::new(Vec::new()), xref);

    assert!(!doc.is_stream(1, 0));
    assert!(matches!(doc.load_stream(1, 0), Err(Error::NotAStream(1, 0))));
    assert!(matches!(doc.load_raw_stream(1, 0), Err(Error::NotAStream(1, 0))));
    assert!(matches!(doc.load_stream(7, 0), Err(Error::ObjectOutOfRange(7, 0))));
}

#[test]
fn test_unnamed_crypt_filter_is_identity() {
    let mut file = TestFile::new();
    file.add_stream(8, dict(&[("Filter", Object::Array(vec![Object::name("Crypt"), Object::name("AHx")]))]), b"4F4B>");
    let (doc, crypt) = recorded_document(file);

    assert_eq!(read(doc.open_raw_stream(8, 0).unwrap()), b"4F4B>");
    assert_eq!(&doc.load_stream(8, 0).unwrap()[..], b"OK");
    assert!(crypt.calls().is_empty());
}
