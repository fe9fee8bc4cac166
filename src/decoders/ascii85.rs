//! ASCII85Decode (Base85) implementation.
//!
//! Five characters in `!`..`u` encode four bytes; `z` stands for four zero
//! bytes; `~>` ends the data. An optional leading `<~` is tolerated.

use crate::decoders::ascii_hex::is_pdf_whitespace;
use crate::decoders::StreamDecoder;
use crate::error::{Error, Result};

/// ASCII85Decode filter implementation.
pub struct Ascii85Decoder;

impl StreamDecoder for Ascii85Decoder {
    fn decode(&self, input: &[u8]) -> Result<Vec<u8>> {
        let data = input.strip_prefix(b"<~").unwrap_or(input);
        let mut output = Vec::with_capacity(data.len() * 4 / 5);
        let mut acc: u64 = 0;
        let mut count = 0usize;

        for &c in data {
            match c {
                b'~' => break,
                b'z' if count == 0 => output.extend_from_slice(&[0; 4]),
                b'z' => {
                    return Err(Error::Decode(
                        "ASCII85Decode: 'z' inside a group".to_string(),
                    ));
                },
                b'!'..=b'u' => {
                    acc = acc * 85 + u64::from(c - b'!');
                    count += 1;
                    if count == 5 {
                        output.extend_from_slice(&group_bytes(acc)?);
                        acc = 0;
                        count = 0;
                    }
                },
                _ if is_pdf_whitespace(c) => {},
                _ => {
                    return Err(Error::Decode(format!(
                        "ASCII85Decode: invalid character '{}'",
                        c as char
                    )));
                },
            }
        }

        match count {
            0 => {},
            1 => {
                return Err(Error::Decode(
                    "ASCII85Decode: final group has a single character".to_string(),
                ));
            },
            n => {
                for _ in n..5 {
                    acc = acc * 85 + 84;
                }
                output.extend_from_slice(&group_bytes(acc)?[..n - 1]);
            },
        }

        Ok(output)
    }

    fn name(&self) -> &str {
        "ASCII85Decode"
    }
}

fn group_bytes(acc: u64) -> Result<[u8; 4]> {
    u32::try_from(acc)
        .map(u32::to_be_bytes)
        .map_err(|_| Error::Decode("ASCII85Decode: group value overflows".to_string()))
}
