//! Filter names and their resolved parameters.

use crate::decoders::{DecodeParams, FaxParams};
use crate::object::{dict_int, Dictionary, Object, ObjectRef};
use phf::phf_map;

/// The filters this crate knows by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    /// ASCIIHexDecode
    AsciiHex,
    /// ASCII85Decode
    Ascii85,
    /// CCITTFaxDecode
    CcittFax,
    /// DCTDecode
    Dct,
    /// RunLengthDecode
    RunLength,
    /// FlateDecode
    Flate,
    /// LZWDecode
    Lzw,
    /// JBIG2Decode
    Jbig2,
    /// JPXDecode
    Jpx,
    /// Crypt
    Crypt,
}

/// Filter names, including the abbreviations allowed in inline images.
static FILTER_NAMES: phf::Map<&'static str, FilterKind> = phf_map! {
    "ASCIIHexDecode" => FilterKind::AsciiHex,
    "AHx" => FilterKind::AsciiHex,
    "ASCII85Decode" => FilterKind::Ascii85,
    "A85" => FilterKind::Ascii85,
    "CCITTFaxDecode" => FilterKind::CcittFax,
    "CCF" => FilterKind::CcittFax,
    "DCTDecode" => FilterKind::Dct,
    "DCT" => FilterKind::Dct,
    "RunLengthDecode" => FilterKind::RunLength,
    "RL" => FilterKind::RunLength,
    "FlateDecode" => FilterKind::Flate,
    "Fl" => FilterKind::Flate,
    "LZWDecode" => FilterKind::Lzw,
    "LZW" => FilterKind::Lzw,
    "JBIG2Decode" => FilterKind::Jbig2,
    "JPXDecode" => FilterKind::Jpx,
    "Crypt" => FilterKind::Crypt,
};

impl FilterKind {
    /// Look up a filter by its full or abbreviated name.
    pub fn from_name(name: &str) -> Option<Self> {
        FILTER_NAMES.get(name).copied()
    }

    /// The full PDF name of the filter.
    pub fn name(&self) -> &'static str {
        match self {
            FilterKind::AsciiHex => "ASCIIHexDecode",
            FilterKind::Ascii85 => "ASCII85Decode",
            FilterKind::CcittFax => "CCITTFaxDecode",
            FilterKind::Dct => "DCTDecode",
            FilterKind::RunLength => "RunLengthDecode",
            FilterKind::Flate => "FlateDecode",
            FilterKind::Lzw => "LZWDecode",
            FilterKind::Jbig2 => "JBIG2Decode",
            FilterKind::Jpx => "JPXDecode",
            FilterKind::Crypt => "Crypt",
        }
    }

    /// Scale an encoded length by this filter's typical expansion.
    ///
    /// Only a buffer-sizing heuristic; the decoded length is whatever the
    /// stream yields.
    pub fn guess_length(&self, len: i64) -> i64 {
        match self {
            FilterKind::AsciiHex => len / 2,
            FilterKind::Ascii85 => len.saturating_mul(4) / 5,
            FilterKind::Flate | FilterKind::RunLength => len.saturating_mul(3),
            FilterKind::Lzw => len.saturating_mul(2),
            _ => len,
        }
    }
}

/// Scale `len` by the expansion of the filter called `name`; unknown names
/// leave it unchanged.
pub fn guess_filter_length(len: i64, name: &str) -> i64 {
    FilterKind::from_name(name).map_or(len, |kind| kind.guess_length(len))
}

/// Guessed decoded length of a stream declared as `len` bytes and encoded
/// with `filters` (a name, an array of names, or absent).
pub fn guess_chain_length(len: i64, filters: Option<&Object>) -> i64 {
    match filters {
        Some(Object::Name(name)) => guess_filter_length(len, name),
        Some(Object::Array(names)) => names.iter().fold(len, |len, f| {
            guess_filter_length(len, f.as_name().unwrap_or(""))
        }),
        _ => len,
    }
}

/// A filter with its parameters resolved and defaults applied.
///
/// Describes either what to build or, for a chain's last filter, what the
/// still-encoded data is.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FilterParams {
    /// Data is used as is (no filter, unknown filter, or a filter that was
    /// built rather than described)
    #[default]
    Raw,
    /// ASCIIHexDecode
    AsciiHex,
    /// ASCII85Decode
    Ascii85,
    /// CCITTFaxDecode
    CcittFax(FaxParams),
    /// DCTDecode
    Dct {
        /// `ColorTransform`, -1 when unspecified
        color_transform: i64,
    },
    /// RunLengthDecode
    RunLength,
    /// FlateDecode with its predictor parameters
    Flate(DecodeParams),
    /// LZWDecode
    Lzw {
        /// Predictor parameters
        params: DecodeParams,
        /// `EarlyChange`, 1 when unspecified
        early_change: i64,
    },
    /// JBIG2Decode
    Jbig2 {
        /// Indirect `JBIG2Globals` stream; inline globals are ignored
        globals: Option<ObjectRef>,
    },
    /// JPXDecode
    Jpx,
    /// Crypt
    Crypt {
        /// `Name` of the crypt filter to apply
        name: Option<String>,
    },
}

impl FilterParams {
    /// Resolve the parameters of a known filter from its `DecodeParms`.
    pub fn resolve(kind: FilterKind, params: Option<&Dictionary>) -> Self {
        let get = |key: &str| params.and_then(|p| p.get(key));
        let int_or = |key: &str, default: i64| get(key).and_then(Object::as_integer).unwrap_or(default);
        let bool_or = |key: &str, default: bool| get(key).and_then(Object::as_bool).unwrap_or(default);

        match kind {
            FilterKind::AsciiHex => FilterParams::AsciiHex,
            FilterKind::Ascii85 => FilterParams::Ascii85,
            FilterKind::CcittFax => {
                let defaults = FaxParams::default();
                FilterParams::CcittFax(FaxParams {
                    k: int_or("K", defaults.k),
                    end_of_line: bool_or("EndOfLine", defaults.end_of_line),
                    encoded_byte_align: bool_or("EncodedByteAlign", defaults.encoded_byte_align),
                    // A Columns entry of the wrong type still counts as present
                    columns: match get("Columns") {
                        Some(obj) => obj.as_integer().unwrap_or(0),
                        None => defaults.columns,
                    },
                    rows: int_or("Rows", defaults.rows),
                    end_of_block: bool_or("EndOfBlock", defaults.end_of_block),
                    black_is_1: bool_or("BlackIs1", defaults.black_is_1),
                })
            },
            FilterKind::Dct => FilterParams::Dct {
                color_transform: int_or("ColorTransform", -1),
            },
            FilterKind::RunLength => FilterParams::RunLength,
            FilterKind::Flate => FilterParams::Flate(predictor_params(params)),
            FilterKind::Lzw => FilterParams::Lzw {
                params: predictor_params(params),
                early_change: int_or("EarlyChange", 1),
            },
            FilterKind::Jbig2 => FilterParams::Jbig2 {
                globals: get("JBIG2Globals").and_then(Object::as_reference),
            },
            FilterKind::Jpx => FilterParams::Jpx,
            FilterKind::Crypt => FilterParams::Crypt {
                name: get("Name").and_then(Object::as_name).map(str::to_string),
            },
        }
    }

    /// Describe the filter called `name`. Unknown names describe as
    /// [`FilterParams::Raw`] with a warning.
    pub fn describe(name: &str, params: Option<&Dictionary>) -> Self {
        match FilterKind::from_name(name) {
            Some(kind) => Self::resolve(kind, params),
            None => {
                log::warn!("unknown filter name ({})", name);
                FilterParams::Raw
            },
        }
    }

    /// Whether a chain may stop before this filter and hand its still
    /// encoded data to an image decoder.
    pub fn is_shortstop(&self) -> bool {
        matches!(
            self,
            FilterParams::CcittFax(_)
                | FilterParams::Dct { .. }
                | FilterParams::RunLength
                | FilterParams::Flate(_)
                | FilterParams::Lzw { .. }
        )
    }
}

fn predictor_params(params: Option<&Dictionary>) -> DecodeParams {
    DecodeParams {
        predictor: dict_int(params, "Predictor"),
        columns: dict_int(params, "Columns"),
        colors: dict_int(params, "Colors"),
        bits_per_component: dict_int(params, "BitsPerComponent"),
    }
}
