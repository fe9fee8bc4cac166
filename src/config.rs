//! Options controlling how tolerant stream decoding is.
//!
//! # Example
//!
//! ```
//! use pdf_streams::config::StreamOptions;
//!
//! // Permissive decoding with decompression bomb protection (default)
//! let lenient = StreamOptions::lenient();
//!
//! // Unknown filters become hard errors
//! let strict = StreamOptions::strict();
//! assert!(strict.strict);
//! assert!(!lenient.strict);
//! ```

/// Default maximum decoded size of a loaded stream: 100 MB.
pub const DEFAULT_MAX_DECOMPRESSED_SIZE: usize = 100 * 1024 * 1024;

/// Default maximum decoded:declared length ratio of a loaded stream.
pub const DEFAULT_MAX_DECOMPRESSION_RATIO: u32 = 100;

/// Stream decoding options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamOptions {
    /// Reject unknown filter names instead of leaving the data encoded.
    pub strict: bool,

    /// Maximum bytes a buffer load may produce (0 = unlimited).
    ///
    /// Security: guards against decompression bombs; ISO 32000-1 sets no limit.
    pub max_decompressed_size: usize,

    /// Maximum ratio of decoded bytes to declared `Length` (0 = disabled).
    ///
    /// Only checked for filtered streams with a non-zero declared length.
    pub max_decompression_ratio: u32,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self::lenient()
    }
}

impl StreamOptions {
    /// Permissive decoding: unknown filters pass data through with a warning.
    pub fn lenient() -> Self {
        Self {
            strict: false,
            max_decompressed_size: DEFAULT_MAX_DECOMPRESSED_SIZE,
            max_decompression_ratio: DEFAULT_MAX_DECOMPRESSION_RATIO,
        }
    }

    /// Strict decoding: unknown filters are errors.
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::lenient()
        }
    }

    /// No size or ratio limits at all.
    pub fn unlimited() -> Self {
        Self {
            max_decompressed_size: 0,
            max_decompression_ratio: 0,
            ..Self::lenient()
        }
    }
}
