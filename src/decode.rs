//! Image decoding.

use std::io::Read;

use crate::{CodecError, ImageConfig, Limits, PixelBuffer};

/// Bytes read by [`decode_config`] unless overridden.
pub const DEFAULT_HEADER_PROBE_LEN: usize = 4096;

/// Decode a complete JPEG stream.
///
/// Reads `reader` to the end. The returned layout follows the stream's
/// colorspace: gray → [`PixelBuffer::Gray`], RGB → [`PixelBuffer::Rgba`],
/// CMYK/YCCK → [`PixelBuffer::Cmyk`], YCbCr → [`PixelBuffer::YCbCr`].
pub fn decode<R: Read>(reader: R) -> Result<PixelBuffer, CodecError> {
    DecodeRequest::new().decode(reader)
}

/// Read width, height and color model from the first
/// [`DEFAULT_HEADER_PROBE_LEN`] bytes of a JPEG stream.
pub fn decode_config<R: Read>(reader: R) -> Result<ImageConfig, CodecError> {
    DecodeRequest::new().decode_config(reader)
}

/// Image decode request builder.
///
/// # Example
///
/// ```no_run
/// use zentj3::{DecodeRequest, Limits};
///
/// let limits = Limits {
///     max_pixels: Some(50_000_000),
///     ..Default::default()
/// };
/// let file = std::fs::File::open("photo.jpg")?;
/// let pixels = DecodeRequest::new().with_limits(&limits).decode(file)?;
/// println!("{}x{}", pixels.width(), pixels.height());
/// # Ok::<(), zentj3::CodecError>(())
/// ```
#[derive(Clone, Debug)]
pub struct DecodeRequest<'a> {
    limits: Option<&'a Limits>,
    header_probe_len: usize,
}

impl<'a> DecodeRequest<'a> {
    pub fn new() -> Self {
        Self {
            limits: None,
            header_probe_len: DEFAULT_HEADER_PROBE_LEN,
        }
    }

    /// Set resource limits.
    pub fn with_limits(mut self, limits: &'a Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    /// How many leading bytes [`decode_config`](Self::decode_config) reads.
    ///
    /// Streams with large APPn segments before the frame header need more than
    /// the default.
    pub fn with_header_probe_len(mut self, len: usize) -> Self {
        self.header_probe_len = len;
        self
    }

    /// Read `reader` to the end and decode it.
    pub fn decode<R: Read>(&self, mut reader: R) -> Result<PixelBuffer, CodecError> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        self.decode_bytes(&data)
    }

    /// Decode an in-memory JPEG stream.
    pub fn decode_bytes(&self, data: &[u8]) -> Result<PixelBuffer, CodecError> {
        crate::codecs::jpeg::decode(data, self.limits)
    }

    /// Read at most the header probe length from `reader` and parse the header.
    ///
    /// A stream shorter than the probe length is read in full. A prefix that
    /// ends before the frame header fails with [`CodecError::HeaderParse`].
    pub fn decode_config<R: Read>(&self, reader: R) -> Result<ImageConfig, CodecError> {
        // `take` enforces the bound; don't reserve it up front
        let mut prefix = Vec::with_capacity(self.header_probe_len.min(DEFAULT_HEADER_PROBE_LEN));
        reader
            .take(self.header_probe_len as u64)
            .read_to_end(&mut prefix)?;
        self.decode_config_bytes(&prefix)
    }

    /// Parse the header of an in-memory stream (or a prefix of one).
    pub fn decode_config_bytes(&self, data: &[u8]) -> Result<ImageConfig, CodecError> {
        crate::codecs::jpeg::probe(data)
    }
}

impl Default for DecodeRequest<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_pattern() {
        let limits = Limits {
            max_width: Some(10),
            ..Default::default()
        };
        let request = DecodeRequest::new()
            .with_limits(&limits)
            .with_header_probe_len(64);
        assert_eq!(request.header_probe_len, 64);
        assert_eq!(request.limits.and_then(|l| l.max_width), Some(10));
        assert_eq!(
            DecodeRequest::default().header_probe_len,
            DEFAULT_HEADER_PROBE_LEN
        );
    }

    #[test]
    fn empty_stream_is_a_header_error() {
        assert!(matches!(
            decode(&b""[..]),
            Err(CodecError::HeaderParse(_))
        ));
        assert!(matches!(
            decode_config(&b""[..]),
            Err(CodecError::HeaderParse(_))
        ));
    }

    #[test]
    fn garbage_is_a_header_error() {
        let data = b"definitely not a jpeg stream";
        assert!(matches!(
            decode(&data[..]),
            Err(CodecError::HeaderParse(_))
        ));
    }

    #[test]
    fn unbounded_probe_len_reads_short_stream() {
        use crate::pixel::ImgVec;

        let pixels = PixelBuffer::Gray(ImgVec::new(vec![128u8; 8 * 8], 8, 8));
        let jpeg = crate::encode_to_vec(&pixels, None).unwrap();
        let config = DecodeRequest::new()
            .with_header_probe_len(usize::MAX)
            .decode_config(&jpeg[..])
            .unwrap();
        assert_eq!((config.width, config.height), (8, 8));
    }
}
