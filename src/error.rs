//! Unified error type for encode/decode operations.

use std::io;

use thiserror::Error;

/// Error returned by every operation in this crate.
///
/// Messages reported by the native codec are carried verbatim in
/// [`HeaderParse`](CodecError::HeaderParse), [`Decode`](CodecError::Decode),
/// [`Encode`](CodecError::Encode) and [`ContextInit`](CodecError::ContextInit).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CodecError {
    /// The native codec session could not be created.
    #[error("codec context init failed: {0}")]
    ContextInit(String),
    /// The stream header is malformed or truncated.
    #[error("header parse failed: {0}")]
    HeaderParse(String),
    /// Sample precision other than 8 bits.
    #[error("unsupported sample precision: {0} bits")]
    UnsupportedPrecision(i32),
    /// Native colorspace that has no matching pixel layout.
    #[error("unsupported JPEG colorspace (TJCS {0})")]
    UnsupportedColorspace(i32),
    /// YCbCr stream with a chroma subsampling other than 4:2:0, 4:2:2 or 4:4:4.
    #[error("unsupported chroma subsampling (TJSAMP {0})")]
    UnsupportedSubsampling(i32),
    /// The native decompressor failed while filling pixels.
    #[error("decode failed: {0}")]
    Decode(String),
    /// The native compressor failed.
    #[error("encode failed: {0}")]
    Encode(String),
    /// Quality outside `1..=100`.
    #[error("invalid quality {0}, expected 1..=100")]
    InvalidQuality(i32),
    /// Input validation failed (buffer geometry, empty image, ...).
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Resource limit exceeded.
    #[error("limit exceeded: {0}")]
    LimitExceeded(&'static str),
    /// For host-provided [`Format`](crate::Format) entry points that cannot
    /// handle a stream. Nothing in this crate's JPEG path returns it.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
    /// No registered format matches the stream's magic bytes.
    #[error("unrecognized image format")]
    UnrecognizedFormat,
    /// Error from the caller's reader or writer, unchanged.
    #[error(transparent)]
    Io(#[from] io::Error),
}
