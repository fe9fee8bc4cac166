//! Error types for stream decoding.
//!
//! Structural failures (bad object id, not a stream, I/O) are fatal to the
//! operation that hit them. Unknown filters and stray crypt filters are not
//! errors at all: they are logged and decoding continues.

use std::io;

/// Result type alias for stream operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while opening or reading PDF streams.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Object number is zero or beyond the cross-reference table
    #[error("object id out of range ({0} {1} R)")]
    ObjectOutOfRange(u32, u16),

    /// Object exists but carries no stream data
    #[error("object is not a stream ({0} {1} R)")]
    NotAStream(u32, u16),

    /// Object has wrong type
    #[error("Invalid object type: expected {expected}, found {found}")]
    InvalidObjectType {
        /// Expected object type
        expected: String,
        /// Actual object type found
        found: String,
    },

    /// IO error from the underlying byte source or a decode stage
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Resource temporarily unavailable; the operation may succeed if retried.
    ///
    /// Never swallowed by tolerant code paths.
    #[error("resource temporarily unavailable: {0}")]
    TryLater(String),

    /// Stream decoding error
    #[error("Stream decoding error: {0}")]
    Decode(String),

    /// Unsupported stream filter (strict mode only)
    #[error("Unsupported filter: {0}")]
    UnsupportedFilter(String),

    /// Decryption error
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Malformed JBIG2 globals
    #[error("JBIG2 globals error: {0}")]
    Jbig2(String),

    /// Decoded output exceeded a configured limit
    #[error("Decompression limit exceeded: {reason}")]
    LimitExceeded {
        /// Which limit was hit and by how much
        reason: String,
    },
}

impl Error {
    /// Whether the failure is transient and must be propagated rather than
    /// skipped by tolerant callers.
    ///
    /// Looks through `io::Error` wrappers, since stage failures travel
    /// through `Read::read` as `io::Error`.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::TryLater(_) => true,
            Error::Io(e) => io_is_retryable(e),
            _ => false,
        }
    }

    /// Recover an `Error` that was carried across a `Read` boundary.
    ///
    /// Stages report failures as `io::Error::other(Error)`; this unwraps
    /// them again so callers see the original variant.
    pub fn from_io(err: io::Error) -> Self {
        if !err.get_ref().is_some_and(|inner| inner.is::<Error>()) {
            return Error::Io(err);
        }
        match err.into_inner().map(|inner| inner.downcast::<Error>()) {
            Some(Ok(e)) => *e,
            Some(Err(other)) => Error::Io(io::Error::other(other)),
            None => Error::Decode("stage failed without detail".to_string()),
        }
    }
}

fn io_is_retryable(err: &io::Error) -> bool {
    if err.kind() == io::ErrorKind::WouldBlock {
        return true;
    }
    err.get_ref()
        .and_then(|inner| inner.downcast_ref::<Error>())
        .is_some_and(Error::is_retryable)
}

/// Whether an `io::Error` is a failure reported by another stage (or a
/// retryable condition) rather than a codec's own complaint about its input.
pub(crate) fn is_stage_error(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::WouldBlock || err.get_ref().is_some_and(|inner| inner.is::<Error>())
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Io(e) => e,
            other => io::Error::other(other),
        }
    }
}
