//! DCTDecode (JPEG) stage.
//!
//! JPEG data is handed through unchanged; `ColorTransform` is retained for
//! whoever decodes the image.

use crate::decoders::Stream;
use std::io::{self, Read};

/// DCTDecode stage.
pub struct DctStage {
    upstream: Stream,
    color_transform: i64,
}

impl DctStage {
    /// `color_transform` is -1 when the dictionary leaves it unspecified.
    pub fn new(upstream: Stream, color_transform: i64) -> Self {
        Self {
            upstream,
            color_transform,
        }
    }

    /// The `ColorTransform` value this stage was opened with.
    pub fn color_transform(&self) -> i64 {
        self.color_transform
    }
}

impl Read for DctStage {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.upstream.read(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoders::read_to_vec;
    use std::io::Cursor;

    #[test]
    fn test_dct_stage_passthrough() {
        let jpeg_data = b"\xFF\xD8\xFF\xE0\x00\x10JFIF".to_vec();
        let mut stage = DctStage::new(Box::new(Cursor::new(jpeg_data.clone())), -1);
        assert_eq!(stage.color_transform(), -1);
        assert_eq!(read_to_vec(&mut stage).unwrap(), jpeg_data);
    }
}
