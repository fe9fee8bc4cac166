//! Draining streams into memory.
//!
//! Two strategies: [`read_all`] fails on the first stage error, while
//! [`read_best`] keeps whatever arrived before a non-retryable error and
//! reports the result as truncated.

use crate::config::StreamOptions;
use crate::error::{Error, Result};
use std::io::{ErrorKind, Read};

/// Decoded sizes below this never trip the ratio check.
const MIN_BOMB: usize = 1024 * 1024;

/// Largest capacity reserved up front from a guessed length.
const MAX_INITIAL_CAPACITY: usize = 16 * 1024 * 1024;

const CHUNK: usize = 8192;

/// Size limits applied while loading one stream.
#[derive(Debug, Clone, Copy)]
pub struct LoadLimits {
    max_size: usize,
    max_ratio: u32,
    declared: u64,
}

impl LoadLimits {
    /// Limits from `options` for a stream declared as `declared` bytes.
    ///
    /// The ratio check only makes sense for filtered streams; pass
    /// `filtered = false` for raw loads.
    pub fn new(options: &StreamOptions, declared: u64, filtered: bool) -> Self {
        Self {
            max_size: options.max_decompressed_size,
            max_ratio: if filtered { options.max_decompression_ratio } else { 0 },
            declared,
        }
    }

    /// No limits.
    pub fn none() -> Self {
        Self {
            max_size: 0,
            max_ratio: 0,
            declared: 0,
        }
    }

    fn check(&self, len: usize) -> Result<()> {
        if self.max_size > 0 && len > self.max_size {
            return Err(Error::LimitExceeded {
                reason: format!("decoded size {} bytes exceeds limit {} bytes", len, self.max_size),
            });
        }
        if self.max_ratio > 0 && self.declared > 0 && len > MIN_BOMB {
            let ratio = len as u64 / self.declared;
            if ratio > u64::from(self.max_ratio) {
                return Err(Error::LimitExceeded {
                    reason: format!(
                        "decompression ratio {}:1 exceeds limit {}:1 ({} bytes from {})",
                        ratio, self.max_ratio, len, self.declared
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Read `stream` to the end. `initial` is a capacity hint.
pub fn read_all(stream: &mut dyn Read, initial: usize, limits: &LoadLimits) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(initial.min(MAX_INITIAL_CAPACITY));
    let mut chunk = [0u8; CHUNK];
    loop {
        let n = match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::from_io(e)),
        };
        buf.extend_from_slice(&chunk[..n]);
        limits.check(buf.len())?;
    }
    Ok(buf)
}

/// Read as much of `stream` as possible.
///
/// A stage error ends the read early with `truncated` set, unless it is
/// retryable, in which case it is returned. Limit violations are returned
/// too.
pub fn read_best(
    stream: &mut dyn Read,
    initial: usize,
    limits: &LoadLimits,
    truncated: &mut bool,
) -> Result<Vec<u8>> {
    *truncated = false;
    let mut buf = Vec::with_capacity(initial.min(MAX_INITIAL_CAPACITY));
    let mut chunk = [0u8; CHUNK];
    loop {
        let n = match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                let err = Error::from_io(e);
                if err.is_retryable() {
                    return Err(err);
                }
                log::warn!("read error; treating as end of file: {}", err);
                *truncated = true;
                break;
            },
        };
        buf.extend_from_slice(&chunk[..n]);
        limits.check(buf.len())?;
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor};

    /// Yields `data`, then fails with `err`.
    struct Failing {
        data: Cursor<Vec<u8>>,
        err: Option<Error>,
    }

    impl Read for Failing {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.data.read(buf)?;
            if n > 0 {
                return Ok(n);
            }
            match self.err.take() {
                Some(e) => Err(e.into()),
                None => Ok(0),
            }
        }
    }

    fn failing(data: &[u8], err: Error) -> Failing {
        Failing {
            data: Cursor::new(data.to_vec()),
            err: Some(err),
        }
    }

    #[test]
    fn test_read_all_complete() {
        let mut src = Cursor::new(b"complete".to_vec());
        assert_eq!(read_all(&mut src, 3, &LoadLimits::none()).unwrap(), b"complete");
    }

    #[test]
    fn test_read_all_propagates_stage_error() {
        let mut src = failing(b"part", Error::Decode("corrupt".to_string()));
        assert!(matches!(read_all(&mut src, 0, &LoadLimits::none()), Err(Error::Decode(_))));
    }

    #[test]
    fn test_read_best_truncates() {
        let mut src = failing(b"prefix", Error::Decode("corrupt".to_string()));
        let mut truncated = false;
        let data = read_best(&mut src, 0, &LoadLimits::none(), &mut truncated).unwrap();
        assert_eq!(data, b"prefix");
        assert!(truncated);
    }

    #[test]
    fn test_read_best_clean_read_not_truncated() {
        let mut src = Cursor::new(b"whole".to_vec());
        let mut truncated = true;
        let data = read_best(&mut src, 0, &LoadLimits::none(), &mut truncated).unwrap();
        assert_eq!(data, b"whole");
        assert!(!truncated);
    }

    #[test]
    fn test_read_best_propagates_retryable() {
        let mut src = failing(b"prefix", Error::TryLater("not loaded".to_string()));
        let mut truncated = false;
        let result = read_best(&mut src, 0, &LoadLimits::none(), &mut truncated);
        assert!(matches!(result, Err(Error::TryLater(_))));
    }

    #[test]
    fn test_size_limit() {
        let options = StreamOptions {
            max_decompressed_size: 10,
            ..StreamOptions::default()
        };
        let mut src = Cursor::new(vec![0u8; 100]);
        let result = read_all(&mut src, 0, &LoadLimits::new(&options, 100, false));
        assert!(matches!(result, Err(Error::LimitExceeded { .. })));
    }

    #[test]
    fn test_ratio_limit_only_for_filtered_streams() {
        let options = StreamOptions::default();
        let big = vec![0u8; 2 * MIN_BOMB];

        let filtered = LoadLimits::new(&options, 100, true);
        let result = read_all(&mut Cursor::new(big.clone()), 0, &filtered);
        assert!(matches!(result, Err(Error::LimitExceeded { .. })));

        let raw = LoadLimits::new(&options, 100, false);
        assert_eq!(read_all(&mut Cursor::new(big), 0, &raw).unwrap().len(), 2 * MIN_BOMB);
    }
}
