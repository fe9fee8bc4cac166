//! Building decode stages from filter descriptions.
//!
//! Every builder takes ownership of the chain it extends. On success the
//! returned stream owns it; on failure it has been dropped before the error
//! is returned, together with any stage built on top of it. Nothing is ever
//! released twice and nothing outlives a failed build.

use super::params::{FilterKind, FilterParams};
use crate::decoders::{DecodeParams, Stream};
use crate::document::PdfDocument;
use crate::error::{Error, Result};
use crate::jbig2::Jbig2Globals;
use crate::object::{Dictionary, Object, ObjectRef};
use std::rc::Rc;

/// Where the stream being decoded comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Origin {
    /// An indirect stream object; named crypt filters are seeded with it
    Object(u32, u16),
    /// Inline data in a content stream; never touches encryption or the xref
    Inline,
}

/// Build one decode stage for `filter` on top of `chain`.
///
/// `num`/`gen` identify the stream for named crypt filters. When `terminal`
/// is given and the filter can be handed to an image decoder still encoded
/// (see [`FilterParams::is_shortstop`]), nothing is built: `chain` comes
/// back unchanged and `terminal` receives the description. Any other filter
/// is built and `terminal` is set to [`FilterParams::Raw`].
pub fn build_filter(
    doc: &PdfDocument,
    chain: Stream,
    filter: &Object,
    params: Option<&Dictionary>,
    num: u32,
    gen: u16,
    terminal: Option<&mut FilterParams>,
) -> Result<Stream> {
    build_one(doc, Origin::Object(num, gen), chain, filter, params, terminal)
}

/// Build a stage for every filter in `filters`, in order.
///
/// `params` is the parallel `DecodeParms` array; missing or non-dictionary
/// entries mean no parameters. Only the last filter is offered `terminal`.
pub fn build_filter_chain(
    doc: &PdfDocument,
    chain: Stream,
    filters: &[Object],
    params: Option<&Object>,
    num: u32,
    gen: u16,
    terminal: Option<&mut FilterParams>,
) -> Result<Stream> {
    build_list(doc, Origin::Object(num, gen), chain, filters, params, terminal)
}

/// Layer the filters named by a stream dictionary's `Filter` entry.
///
/// A single name builds one stage, a non-empty array builds a chain;
/// anything else leaves `chain` as is and describes it as raw.
pub(crate) fn build_filters(
    doc: &PdfDocument,
    origin: Origin,
    chain: Stream,
    filters: Option<&Object>,
    params: Option<&Object>,
    terminal: Option<&mut FilterParams>,
) -> Result<Stream> {
    match filters {
        Some(filter @ Object::Name(_)) => {
            let params = params.and_then(Object::as_dict);
            build_one(doc, origin, chain, filter, params, terminal)
        },
        Some(Object::Array(list)) if !list.is_empty() => {
            build_list(doc, origin, chain, list, params, terminal)
        },
        _ => {
            if let Some(slot) = terminal {
                *slot = FilterParams::Raw;
            }
            Ok(chain)
        },
    }
}

fn build_list(
    doc: &PdfDocument,
    origin: Origin,
    chain: Stream,
    filters: &[Object],
    params: Option<&Object>,
    mut terminal: Option<&mut FilterParams>,
) -> Result<Stream> {
    let last = filters.len().saturating_sub(1);
    let mut chain = chain;
    for (i, filter) in filters.iter().enumerate() {
        let p = params
            .and_then(|ps| ps.array_get(i))
            .and_then(Object::as_dict);
        let slot = if i == last { terminal.take() } else { None };
        chain = build_one(doc, origin, chain, filter, p, slot)?;
    }
    Ok(chain)
}

fn build_one(
    doc: &PdfDocument,
    origin: Origin,
    chain: Stream,
    filter: &Object,
    params: Option<&Dictionary>,
    terminal: Option<&mut FilterParams>,
) -> Result<Stream> {
    let name = filter.as_name().unwrap_or("");
    let kind = match FilterKind::from_name(name) {
        Some(kind) => kind,
        None if doc.options().strict => {
            return Err(Error::UnsupportedFilter(name.to_string()));
        },
        None => {
            log::warn!("unknown filter name ({})", name);
            if let Some(slot) = terminal {
                *slot = FilterParams::Raw;
            }
            return Ok(chain);
        },
    };

    let description = FilterParams::resolve(kind, params);
    if let Some(slot) = terminal {
        if description.is_shortstop() {
            *slot = description;
            return Ok(chain);
        }
        *slot = FilterParams::Raw;
    }

    open_filter(doc, origin, chain, description)
}

fn open_filter(
    doc: &PdfDocument,
    origin: Origin,
    chain: Stream,
    description: FilterParams,
) -> Result<Stream> {
    let codecs = doc.codecs();
    match description {
        FilterParams::Raw | FilterParams::Jpx => Ok(chain),
        FilterParams::AsciiHex => codecs.open_ascii_hex(chain),
        FilterParams::Ascii85 => codecs.open_ascii85(chain),
        FilterParams::CcittFax(fax) => codecs.open_fax(chain, &fax),
        FilterParams::Dct { color_transform } => codecs.open_dct(chain, color_transform),
        FilterParams::RunLength => codecs.open_run_length(chain),
        FilterParams::Flate(params) => {
            let chain = codecs.open_flate(chain)?;
            with_predictor(doc, chain, &params)
        },
        FilterParams::Lzw {
            params,
            early_change,
        } => {
            let chain = codecs.open_lzw(chain, early_change)?;
            with_predictor(doc, chain, &params)
        },
        FilterParams::Jbig2 { globals } => {
            let globals = match (globals, origin) {
                (Some(key), Origin::Object(..)) => Some(load_jbig2_globals(doc, key)?),
                (Some(key), Origin::Inline) => {
                    log::warn!("ignoring JBIG2 globals ({}) of inline image", key);
                    None
                },
                (None, _) => None,
            };
            codecs.open_jbig2(chain, globals)
        },
        FilterParams::Crypt { name } => match (origin, doc.crypt(), name) {
            (Origin::Inline, ..) => {
                log::warn!("ignoring crypt filter in inline stream");
                Ok(chain)
            },
            (_, None, _) => {
                log::warn!("crypt filter in unencrypted document");
                Ok(chain)
            },
            (Origin::Object(num, gen), Some(crypt), Some(name)) => {
                crypt.open_with_filter(chain, &name, num, gen)
            },
            // No Name means Identity.
            (_, Some(_), None) => Ok(chain),
        },
    }
}

fn with_predictor(doc: &PdfDocument, chain: Stream, params: &DecodeParams) -> Result<Stream> {
    if params.predictor > 1 {
        doc.codecs().open_predictor(chain, params)
    } else {
        Ok(chain)
    }
}

/// Load the JBIG2 globals stream `key`, through the document's cache.
pub fn load_jbig2_globals(doc: &PdfDocument, key: ObjectRef) -> Result<Rc<Jbig2Globals>> {
    doc.jbig2_globals().get_or_try_insert_with(key, || {
        let data = doc.load_stream(key.id, key.gen)?;
        Jbig2Globals::parse(data)
    })
}
