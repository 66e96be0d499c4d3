//! Image format descriptors for magic-byte dispatch.

use core::fmt;
use std::io::Read;

use crate::{CodecError, ImageConfig, PixelBuffer};

/// JPEG start-of-image marker.
pub const JPEG_MAGIC: &[u8] = b"\xFF\xD8";

/// Full decode entry point of a format.
pub type DecodeFn = fn(&mut dyn Read) -> Result<PixelBuffer, CodecError>;

/// Header-only entry point of a format.
pub type DecodeConfigFn = fn(&mut dyn Read) -> Result<ImageConfig, CodecError>;

/// A decodable format: a name, its leading magic bytes, and its entry points.
///
/// In `magic`, `b'?'` matches any byte.
#[derive(Clone, Copy)]
pub struct Format {
    pub name: &'static str,
    pub magic: &'static [u8],
    pub decode: DecodeFn,
    pub decode_config: DecodeConfigFn,
}

impl Format {
    pub const fn new(
        name: &'static str,
        magic: &'static [u8],
        decode: DecodeFn,
        decode_config: DecodeConfigFn,
    ) -> Self {
        Self {
            name,
            magic,
            decode,
            decode_config,
        }
    }

    /// The TurboJPEG-backed JPEG format, named `"jpeg"`.
    pub const fn jpeg() -> Self {
        Self::new("jpeg", JPEG_MAGIC, decode_jpeg, decode_jpeg_config)
    }

    /// Whether `prefix` starts with this format's magic.
    pub fn matches(&self, prefix: &[u8]) -> bool {
        prefix.len() >= self.magic.len()
            && self
                .magic
                .iter()
                .zip(prefix)
                .all(|(&m, &b)| m == b'?' || m == b)
    }
}

impl fmt::Debug for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Format")
            .field("name", &self.name)
            .field("magic", &self.magic)
            .finish_non_exhaustive()
    }
}

fn decode_jpeg(reader: &mut dyn Read) -> Result<PixelBuffer, CodecError> {
    crate::decode(reader)
}

fn decode_jpeg_config(reader: &mut dyn Read) -> Result<ImageConfig, CodecError> {
    crate::decode_config(reader)
}
