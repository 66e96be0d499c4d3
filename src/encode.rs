//! Image encoding.

use std::io::Write;

use crate::codecs::jpeg::EncodeSettings;
use crate::{CodecError, PixelBuffer};

/// Quality used when none is set.
pub const DEFAULT_QUALITY: i32 = 75;

/// Encode `pixels` as JPEG and write the stream to `writer`.
///
/// `quality` is `1..=100`; `None` selects [`DEFAULT_QUALITY`].
pub fn encode<W: Write>(
    writer: W,
    pixels: &PixelBuffer,
    quality: Option<i32>,
) -> Result<(), CodecError> {
    request_for(quality).encode(pixels, writer)
}

/// Encode `pixels` as JPEG into a new vector.
pub fn encode_to_vec(pixels: &PixelBuffer, quality: Option<i32>) -> Result<Vec<u8>, CodecError> {
    request_for(quality).encode_to_vec(pixels)
}

fn request_for(quality: Option<i32>) -> EncodeRequest {
    let request = EncodeRequest::new();
    match quality {
        Some(q) => request.with_quality(q),
        None => request,
    }
}

/// Image encode request builder.
///
/// Layouts map to the native encoder as follows: gray is written as a
/// single-component JPEG, RGB/RGBA as 4:4:4 RGB (or YCbCr with
/// [`with_ycbcr_transform`](Self::with_ycbcr_transform)), CMYK as 4:4:4 YCCK,
/// and planar YCbCr with the image's own subsampling.
///
/// # Example
///
/// ```no_run
/// use zentj3::pixel::{ImgVec, RGBA8};
/// use zentj3::{EncodeRequest, PixelBuffer};
///
/// let pixels = PixelBuffer::Rgba(ImgVec::new(vec![RGBA8::new(0, 0, 0, 255); 100 * 100], 100, 100));
/// let jpeg = EncodeRequest::new()
///     .with_quality(90)
///     .with_progressive(true)
///     .encode_to_vec(&pixels)?;
/// # Ok::<(), zentj3::CodecError>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct EncodeRequest {
    quality: Option<i32>,
    progressive: bool,
    optimize: bool,
    ycbcr_transform: bool,
}

impl EncodeRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set quality (1-100). Anything else, including 0, fails at encode time.
    pub fn with_quality(mut self, quality: i32) -> Self {
        self.quality = Some(quality);
        self
    }

    /// Write a progressive JPEG.
    pub fn with_progressive(mut self, progressive: bool) -> Self {
        self.progressive = progressive;
        self
    }

    /// Compute optimal Huffman tables.
    pub fn with_optimize(mut self, optimize: bool) -> Self {
        self.optimize = optimize;
        self
    }

    /// Store RGB/RGBA input as YCbCr instead of RGB.
    ///
    /// Smaller files, but the stream then decodes to planar YCbCr.
    pub fn with_ycbcr_transform(mut self, ycbcr_transform: bool) -> Self {
        self.ycbcr_transform = ycbcr_transform;
        self
    }

    /// Effective quality: the default when unset, otherwise `1..=100`.
    pub fn quality(&self) -> Result<i32, CodecError> {
        match self.quality {
            None => Ok(DEFAULT_QUALITY),
            Some(q @ 1..=100) => Ok(q),
            Some(q) => Err(CodecError::InvalidQuality(q)),
        }
    }

    /// Encode and write the whole stream to `writer`.
    ///
    /// Writer errors are returned unchanged as [`CodecError::Io`].
    pub fn encode<W: Write>(&self, pixels: &PixelBuffer, mut writer: W) -> Result<(), CodecError> {
        let data = self.encode_to_vec(pixels)?;
        writer.write_all(&data)?;
        Ok(())
    }

    /// Encode into a new vector.
    pub fn encode_to_vec(&self, pixels: &PixelBuffer) -> Result<Vec<u8>, CodecError> {
        let settings = EncodeSettings {
            quality: self.quality()?,
            progressive: self.progressive,
            optimize: self.optimize,
            ycbcr_transform: self.ycbcr_transform,
        };
        crate::codecs::jpeg::encode(pixels, &settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::ImgVec;

    #[test]
    fn builder_pattern() {
        let request = EncodeRequest::new()
            .with_quality(85)
            .with_progressive(true)
            .with_optimize(true);

        assert_eq!(request.quality, Some(85));
        assert!(request.progressive);
        assert!(request.optimize);
        assert!(!request.ycbcr_transform);
    }

    #[test]
    fn quality_defaults_when_unset() {
        assert_eq!(EncodeRequest::new().quality().unwrap(), DEFAULT_QUALITY);
    }

    #[test]
    fn quality_bounds() {
        for q in [1, 50, 100] {
            assert_eq!(EncodeRequest::new().with_quality(q).quality().unwrap(), q);
        }
        for q in [0, -1, 101, i32::MIN, i32::MAX] {
            assert!(matches!(
                EncodeRequest::new().with_quality(q).quality(),
                Err(CodecError::InvalidQuality(v)) if v == q
            ));
        }
    }

    #[test]
    fn invalid_quality_writes_nothing() {
        let pixels = PixelBuffer::Gray(ImgVec::new(vec![0u8; 16], 4, 4));
        let mut out = Vec::new();
        let result = encode(&mut out, &pixels, Some(0));
        assert!(matches!(result, Err(CodecError::InvalidQuality(0))));
        assert!(out.is_empty());
    }
}
