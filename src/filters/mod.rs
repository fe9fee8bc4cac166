//! Filter resolution and decode chain construction.
//!
//! A stream dictionary names its filters (`Filter`/`F`) and their
//! parameters (`DecodeParms`/`DP`). [`FilterParams`] resolves one name and
//! parameter dictionary into a typed description; [`build_filter`] and
//! [`build_filter_chain`] turn descriptions into decode stages.
//!
//! PDF Spec: ISO 32000-1:2008, Section 7.4 - Filters

mod build;
mod params;

pub(crate) use build::{build_filters, Origin};
pub use build::{build_filter, build_filter_chain, load_jbig2_globals};
pub use params::{guess_chain_length, guess_filter_length, FilterKind, FilterParams};
