//! RunLengthDecode implementation.
//!
//! - Length byte 0-127: copy the next N+1 bytes literally
//! - Length byte 128: end of data
//! - Length byte 129-255: repeat the next byte 257-N times
//!
//! Truncated input yields whatever was decoded before the cut.

use crate::decoders::StreamDecoder;
use crate::error::Result;

/// RunLengthDecode filter implementation.
pub struct RunLengthDecoder;

impl StreamDecoder for RunLengthDecoder {
    fn decode(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::with_capacity(input.len() * 2);
        let mut rest = input;

        while let Some((&length, tail)) = rest.split_first() {
            rest = tail;
            match length {
                0..=127 => {
                    let count = length as usize + 1;
                    if count > rest.len() {
                        log::warn!(
                            "RunLengthDecode: literal run wants {} bytes, {} left",
                            count,
                            rest.len()
                        );
                        output.extend_from_slice(rest);
                        break;
                    }
                    let (run, tail) = rest.split_at(count);
                    output.extend_from_slice(run);
                    rest = tail;
                },
                128 => break,
                129..=255 => {
                    let Some((&byte, tail)) = rest.split_first() else {
                        log::warn!("RunLengthDecode: missing byte for repeat run");
                        break;
                    };
                    rest = tail;
                    output.resize(output.len() + 257 - length as usize, byte);
                },
            }
        }

        Ok(output)
    }

    fn name(&self) -> &str {
        "RunLengthDecode"
    }
}
