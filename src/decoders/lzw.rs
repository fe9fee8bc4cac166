//! LZWDecode implementation for PDF.
//!
//! PDF's LZW (ISO 32000-1, 7.4.4):
//! - MSB-first bit ordering, 9-bit codes growing to 12
//! - Clear code is 256, EOD code is 257, first free code is 258
//! - `EarlyChange` (default 1) widens codes one entry early, TIFF style
//!
//! weezl does the work; a table-driven decoder handles the streams weezl
//! rejects (missing EOD, stray codes after a full table).

use crate::decoders::StreamDecoder;
use crate::error::{Error, Result};
use weezl::{decode::Decoder as WeezlDecoder, BitOrder};

/// LZWDecode filter implementation.
pub struct LzwDecoder {
    early_change: bool,
}

impl LzwDecoder {
    /// Create a decoder; any non-zero `EarlyChange` value means early change.
    pub fn new(early_change: i64) -> Self {
        Self {
            early_change: early_change != 0,
        }
    }
}

impl StreamDecoder for LzwDecoder {
    fn decode(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut decoder = if self.early_change {
            WeezlDecoder::with_tiff_size_switch(BitOrder::Msb, 8)
        } else {
            WeezlDecoder::new(BitOrder::Msb, 8)
        };

        match decoder.decode(input) {
            Ok(output) => Ok(output),
            Err(e) => {
                log::debug!("weezl LZW decode failed ({:?}), retrying with table decoder", e);
                decode_lzw_table(input, self.early_change)
            },
        }
    }

    fn name(&self) -> &str {
        "LZWDecode"
    }
}

/// Table-driven LZW decoder tolerant of truncated streams.
fn decode_lzw_table(input: &[u8], early_change: bool) -> Result<Vec<u8>> {
    const CLEAR_CODE: usize = 256;
    const EOD_CODE: usize = 257;
    const MAX_CODE_BITS: u8 = 12;
    const TABLE_SIZE: usize = 1 << MAX_CODE_BITS;

    let early = usize::from(early_change);
    let mut output = Vec::new();
    let mut table: Vec<Vec<u8>> = Vec::with_capacity(TABLE_SIZE);
    reset_table(&mut table);
    let mut code_bits = 9u8;
    let mut bits = BitReader::new(input);
    let mut prev: Option<usize> = None;

    while let Some(code) = bits.read_bits(code_bits) {
        let code = code as usize;
        if code == EOD_CODE {
            break;
        }
        if code == CLEAR_CODE {
            reset_table(&mut table);
            code_bits = 9;
            prev = None;
            continue;
        }

        let entry = match (table.get(code), prev) {
            (Some(entry), _) => entry.clone(),
            (None, Some(p)) if code == table.len() => {
                let mut s = table[p].clone();
                s.push(table[p][0]);
                s
            },
            _ => {
                return Err(Error::Decode(format!(
                    "LZWDecode: invalid code {} (next code {}, {} bits)",
                    code,
                    table.len(),
                    code_bits
                )));
            },
        };
        output.extend_from_slice(&entry);

        if let Some(p) = prev {
            if table.len() < TABLE_SIZE {
                let mut s = table[p].clone();
                s.push(entry[0]);
                table.push(s);
            }
        }
        prev = Some(code);

        if code_bits < MAX_CODE_BITS && table.len() + early >= (1 << code_bits) {
            code_bits += 1;
        }
    }

    Ok(output)
}

fn reset_table(table: &mut Vec<Vec<u8>>) {
    table.clear();
    table.extend((0..=255u8).map(|b| vec![b]));
    // Clear and EOD occupy 256 and 257; they never resolve to bytes.
    table.push(Vec::new());
    table.push(Vec::new());
}

/// Bit reader for MSB-first bit ordering.
struct BitReader<'a> {
    data: &'a [u8],
    bit_pos: usize,
}

impl<'a> BitReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, bit_pos: 0 }
    }

    fn read_bits(&mut self, n: u8) -> Option<u32> {
        let n = usize::from(n);
        if self.bit_pos + n > self.data.len() * 8 {
            return None;
        }
        let mut value = 0u32;
        for _ in 0..n {
            let byte = self.data[self.bit_pos / 8];
            let bit = (byte >> (7 - self.bit_pos % 8)) & 1;
            value = (value << 1) | u32::from(bit);
            self.bit_pos += 1;
        }
        Some(value)
    }
}
