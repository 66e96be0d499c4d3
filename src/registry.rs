//! Explicit format registry for magic-byte dispatch.

use std::io::{self, Read};

use log::debug;

use crate::format::Format;
use crate::{CodecError, ImageConfig, PixelBuffer};

/// Formats a host application has chosen to decode.
///
/// Nothing is registered implicitly: the host builds a registry at startup
/// and passes it to wherever generic decoding happens.
///
/// ```no_run
/// use zentj3::FormatRegistry;
///
/// let registry = FormatRegistry::with_defaults();
/// let file = std::fs::File::open("photo.jpg")?;
/// let (pixels, format) = registry.decode(file)?;
/// assert_eq!(format, "jpeg");
/// # Ok::<(), zentj3::CodecError>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct FormatRegistry {
    formats: Vec<Format>,
}

impl FormatRegistry {
    /// Empty registry; the caller opts in to each format.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every format this crate provides (JPEG).
    pub fn with_defaults() -> Self {
        Self::new().with_format(Format::jpeg())
    }

    /// Builder form of [`register`](Self::register).
    pub fn with_format(mut self, format: Format) -> Self {
        self.register(format);
        self
    }

    /// Add a format. A format with the same name is replaced in place, so
    /// sniffing order stays registration order.
    pub fn register(&mut self, format: Format) {
        match self.formats.iter_mut().find(|f| f.name == format.name) {
            Some(existing) => {
                debug!("replacing registered format {:?}", format.name);
                *existing = format;
            }
            None => self.formats.push(format),
        }
    }

    /// Registered formats in sniffing order.
    pub fn formats(&self) -> impl Iterator<Item = &Format> {
        self.formats.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }

    /// First registered format whose magic matches `prefix`.
    pub fn sniff(&self, prefix: &[u8]) -> Option<&Format> {
        self.formats.iter().find(|f| f.matches(prefix))
    }

    /// Identify the stream's format and decode it.
    ///
    /// Returns the pixels and the name of the format that decoded them.
    pub fn decode<R: Read>(&self, reader: R) -> Result<(PixelBuffer, &'static str), CodecError> {
        let (format, mut stream) = self.identify(reader)?;
        let pixels = (format.decode)(&mut stream)?;
        Ok((pixels, format.name))
    }

    /// Identify the stream's format and read its header.
    pub fn decode_config<R: Read>(
        &self,
        reader: R,
    ) -> Result<(ImageConfig, &'static str), CodecError> {
        let (format, mut stream) = self.identify(reader)?;
        let config = (format.decode_config)(&mut stream)?;
        Ok((config, format.name))
    }

    /// Peek enough bytes for the longest magic, pick a format, and hand back
    /// a reader that replays the peeked bytes before the rest of the stream.
    fn identify<R: Read>(
        &self,
        mut reader: R,
    ) -> Result<(&Format, io::Chain<io::Cursor<Vec<u8>>, R>), CodecError> {
        let peek_len = self.formats.iter().map(|f| f.magic.len()).max().unwrap_or(0);
        let mut prefix = Vec::with_capacity(peek_len);
        reader
            .by_ref()
            .take(peek_len as u64)
            .read_to_end(&mut prefix)?;

        let format = self.sniff(&prefix).ok_or(CodecError::UnrecognizedFormat)?;
        debug!("sniffed format {:?}", format.name);
        Ok((format, io::Cursor::new(prefix).chain(reader)))
    }
}
