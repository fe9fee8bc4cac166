//! FlateDecode (zlib/deflate) implementation.
//!
//! The most common PDF compression filter. Decoding is incremental through
//! flate2's streaming readers. Recovery for damaged data:
//!
//! 1. A stream without a valid zlib header is inflated as raw deflate.
//! 2. Corruption after some output has been produced ends the stream at the
//!    last good byte instead of failing the whole read.

use crate::decoders::Stream;
use crate::error::is_stage_error;
use flate2::read::{DeflateDecoder, ZlibDecoder};
use std::io::{self, Chain, Cursor, Read};

type Sniffed = Chain<Cursor<Vec<u8>>, Stream>;

enum Inflater {
    /// Header not inspected yet
    Pending(Stream),
    Zlib(ZlibDecoder<Sniffed>),
    Deflate(DeflateDecoder<Sniffed>),
    Done,
}

/// FlateDecode stage.
pub struct FlateStage {
    state: Inflater,
    produced: u64,
}

impl FlateStage {
    /// Inflate everything `upstream` yields.
    pub fn new(upstream: Stream) -> Self {
        Self {
            state: Inflater::Pending(upstream),
            produced: 0,
        }
    }

    fn start(&mut self) -> io::Result<()> {
        let mut upstream = match std::mem::replace(&mut self.state, Inflater::Done) {
            Inflater::Pending(upstream) => upstream,
            other => {
                self.state = other;
                return Ok(());
            },
        };

        let mut header = Vec::with_capacity(2);
        (&mut upstream).take(2).read_to_end(&mut header)?;
        let zlib = is_zlib_header(&header);
        let source = Cursor::new(header).chain(upstream);

        self.state = if zlib {
            Inflater::Zlib(ZlibDecoder::new(source))
        } else {
            log::info!("FlateDecode: no zlib header, inflating as raw deflate");
            Inflater::Deflate(DeflateDecoder::new(source))
        };
        Ok(())
    }
}

/// Zlib header check (RFC 1950): CM = 8 and the FCHECK multiple-of-31 rule.
fn is_zlib_header(header: &[u8]) -> bool {
    match header {
        [cmf, flg] => cmf & 0x0F == 8 && (u16::from(*cmf) * 256 + u16::from(*flg)) % 31 == 0,
        _ => false,
    }
}

impl Read for FlateStage {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.start()?;
        let result = match &mut self.state {
            Inflater::Zlib(d) => d.read(buf),
            Inflater::Deflate(d) => d.read(buf),
            Inflater::Pending(_) | Inflater::Done => return Ok(0),
        };

        match result {
            Ok(n) => {
                self.produced += n as u64;
                Ok(n)
            },
            // The upstream's own failure is not ours to recover from.
            Err(e) if is_stage_error(&e) => Err(e),
            Err(e) if self.produced > 0 => {
                log::warn!(
                    "FlateDecode partial recovery: keeping {} bytes before corruption: {}",
                    self.produced,
                    e
                );
                self.state = Inflater::Done;
                Ok(0)
            },
            Err(e) => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("FlateDecode decompression failed: {}", e),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoders::read_to_vec;
    use flate2::write::{DeflateEncoder, ZlibEncoder};
    use flate2::Compression;
    use std::io::Write;

    fn zlib(data: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn stage(data: Vec<u8>) -> FlateStage {
        FlateStage::new(Box::new(Cursor::new(data)))
    }

    #[test]
    fn test_flate_decode_simple() {
        let original = b"Hello, FlateDecode!";
        let decoded = read_to_vec(&mut stage(zlib(original))).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_flate_decode_large_data_in_small_reads() {
        let original = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ".repeat(1000);
        let mut s = stage(zlib(&original));
        let mut out = Vec::new();
        let mut chunk = [0u8; 7];
        loop {
            let n = s.read(&mut chunk).unwrap();
            if n == 0 {
                break;
            }
            out.extend_from_slice(&chunk[..n]);
        }
        assert_eq!(out, original);
    }

    #[test]
    fn test_flate_raw_deflate_fallback() {
        let original = b"raw deflate without zlib wrapper";
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(original).unwrap();
        let raw = encoder.finish().unwrap();

        assert_eq!(read_to_vec(&mut stage(raw)).unwrap(), original);
    }

    #[test]
    fn test_flate_truncated_keeps_prefix() {
        let original = (0..3000)
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(" ")
            .into_bytes();
        let mut compressed = zlib(&original);
        compressed.truncate(compressed.len() / 2);

        let decoded = read_to_vec(&mut stage(compressed)).unwrap();
        assert!(!decoded.is_empty());
        assert!(original.starts_with(&decoded));
    }

    #[test]
    fn test_flate_empty_input() {
        assert!(read_to_vec(&mut stage(Vec::new())).unwrap().is_empty());
    }

    #[test]
    fn test_zlib_header_check() {
        assert!(is_zlib_header(&[0x78, 0x9C]));
        assert!(is_zlib_header(&[0x78, 0x01]));
        assert!(!is_zlib_header(&[0x78, 0x00]));
        assert!(!is_zlib_header(b"ab"));
        assert!(!is_zlib_header(&[0x78]));
    }
}
