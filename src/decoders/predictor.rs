//! Predictor post-stage for FlateDecode and LZWDecode.
//!
//! Predictors (ISO 32000-1, Table 8) store differences between neighbouring
//! samples; this stage undoes them:
//! - 1: none
//! - 2: TIFF Predictor 2 (difference from the sample to the left)
//! - 10-15: PNG filters, with a filter-type byte in front of every row

use crate::decoders::StreamDecoder;
use crate::error::{Error, Result};

/// Predictor parameters as they appear in a `DecodeParms` dictionary.
///
/// Absent entries are 0 here; [`PredictorDecoder::new`] applies the PDF
/// defaults (1 color, 8 bits, 1 column).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeParams {
    /// Predictor algorithm (1 = none, 2 = TIFF, 10-15 = PNG)
    pub predictor: i64,
    /// Number of samples per row
    pub columns: i64,
    /// Number of color components per sample
    pub colors: i64,
    /// Bits per component
    pub bits_per_component: i64,
}

/// Decoder that reverses a predictor, with validated dimensions.
#[derive(Debug, Clone, Copy)]
pub struct PredictorDecoder {
    predictor: i64,
    columns: usize,
    colors: usize,
    bpc: usize,
}

impl PredictorDecoder {
    /// Validate `params`, filling in defaults for zero entries.
    pub fn new(params: &DecodeParams) -> Result<Self> {
        let colors = if params.colors == 0 { 1 } else { params.colors };
        let bpc = if params.bits_per_component == 0 { 8 } else { params.bits_per_component };
        let columns = if params.columns == 0 { 1 } else { params.columns };

        if !(1..=32).contains(&colors) {
            return Err(Error::Decode(format!("predictor: invalid number of colors ({})", colors)));
        }
        if ![1, 2, 4, 8, 16].contains(&bpc) {
            return Err(Error::Decode(format!(
                "predictor: invalid bits per component ({})",
                bpc
            )));
        }
        if !(1..=1 << 24).contains(&columns) {
            return Err(Error::Decode(format!("predictor: invalid number of columns ({})", columns)));
        }

        let predictor = match params.predictor {
            p @ (1 | 2 | 10..=15) => p,
            other => {
                log::warn!("invalid predictor {}, assuming none", other);
                1
            },
        };

        Ok(Self {
            predictor,
            columns: columns as usize,
            colors: colors as usize,
            bpc: bpc as usize,
        })
    }

    /// Bytes of sample data per row (without the PNG filter-type byte).
    pub fn row_bytes(&self) -> usize {
        (self.columns * self.colors * self.bpc).div_ceil(8)
    }

    /// Distance in bytes to the corresponding byte of the previous pixel.
    fn bytes_per_pixel(&self) -> usize {
        (self.colors * self.bpc).div_ceil(8)
    }
}

impl StreamDecoder for PredictorDecoder {
    fn decode(&self, input: &[u8]) -> Result<Vec<u8>> {
        match self.predictor {
            2 => Ok(self.decode_tiff(input)),
            10..=15 => self.decode_png(input),
            _ => Ok(input.to_vec()),
        }
    }

    fn name(&self) -> &str {
        "Predictor"
    }
}

/// Reverse the predictor described by `params` on a whole buffer.
pub fn decode_predictor(data: &[u8], params: &DecodeParams) -> Result<Vec<u8>> {
    PredictorDecoder::new(params)?.decode(data)
}

impl PredictorDecoder {
    fn decode_tiff(&self, data: &[u8]) -> Vec<u8> {
        let stride = self.row_bytes();
        let mut output = data.to_vec();
        let samples = self.columns * self.colors;
        let mask = if self.bpc == 16 { 0xFFFF } else { (1u32 << self.bpc) - 1 };

        for row in output.chunks_mut(stride) {
            let available = (row.len() * 8 / self.bpc).min(samples);
            for i in self.colors..available {
                let left = read_sample(row, i - self.colors, self.bpc);
                let value = read_sample(row, i, self.bpc);
                write_sample(row, i, self.bpc, (value + left) & mask);
            }
        }
        output
    }

    fn decode_png(&self, data: &[u8]) -> Result<Vec<u8>> {
        let stride = self.row_bytes();
        let bpp = self.bytes_per_pixel();
        let mut output = Vec::with_capacity(data.len());
        let mut prior = vec![0u8; stride];

        for (row_idx, encoded) in data.chunks(stride + 1).enumerate() {
            let (&tag, pixels) = match encoded.split_first() {
                Some(split) => split,
                None => break,
            };
            if pixels.len() < stride {
                log::warn!(
                    "PNG predictor: row {} truncated ({} of {} bytes)",
                    row_idx,
                    pixels.len(),
                    stride
                );
            }

            let mut row = pixels.to_vec();
            for i in 0..row.len() {
                let left = if i >= bpp { row[i - bpp] } else { 0 };
                let up = prior[i];
                let up_left = if i >= bpp { prior[i - bpp] } else { 0 };
                let delta = match tag {
                    0 => 0,
                    1 => left,
                    2 => up,
                    3 => ((u16::from(left) + u16::from(up)) / 2) as u8,
                    4 => paeth_predictor(left, up, up_left),
                    other => {
                        return Err(Error::Decode(format!(
                            "PNG predictor: invalid filter type {} in row {}",
                            other, row_idx
                        )));
                    },
                };
                row[i] = row[i].wrapping_add(delta);
            }

            prior[..row.len()].copy_from_slice(&row);
            output.extend_from_slice(&row);
        }

        Ok(output)
    }
}

fn read_sample(row: &[u8], index: usize, bpc: usize) -> u32 {
    match bpc {
        8 => u32::from(row[index]),
        16 => u32::from(u16::from_be_bytes([row[index * 2], row[index * 2 + 1]])),
        _ => {
            let bit = index * bpc;
            let shift = 8 - bpc - bit % 8;
            u32::from(row[bit / 8] >> shift) & ((1 << bpc) - 1)
        },
    }
}

fn write_sample(row: &mut [u8], index: usize, bpc: usize, value: u32) {
    match bpc {
        8 => row[index] = value as u8,
        16 => row[index * 2..index * 2 + 2].copy_from_slice(&(value as u16).to_be_bytes()),
        _ => {
            let bit = index * bpc;
            let shift = 8 - bpc - bit % 8;
            let mask = (((1u32 << bpc) - 1) << shift) as u8;
            row[bit / 8] = (row[bit / 8] & !mask) | (((value << shift) as u8) & mask);
        },
    }
}

/// Paeth predictor function from the PNG specification.
fn paeth_predictor(a: u8, b: u8, c: u8) -> u8 {
    let (ia, ib, ic) = (i16::from(a), i16::from(b), i16::from(c));
    let p = ia + ib - ic;
    let pa = (p - ia).abs();
    let pb = (p - ib).abs();
    let pc = (p - ic).abs();

    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}
