//! # zentj3
//!
//! JPEG encode and decode for typed pixel buffers, backed by libjpeg-turbo's
//! TurboJPEG 3 API.
//!
//! All codec work happens in the native library. This crate picks the pixel
//! layout that matches a stream's colorspace, marshals buffers and parameters
//! across the boundary, and reports native errors verbatim. Every call opens
//! its own short-lived codec session, so calls on different threads never
//! share state.
//!
//! Supported layouts ([`PixelBuffer`]): 8-bit gray, RGB, RGBA, CMYK, and
//! planar YCbCr at 4:2:0, 4:2:2 or 4:4:4.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use zentj3::{ColorModel, EncodeRequest};
//!
//! let data: &[u8] = &[]; // your JPEG bytes
//! let config = zentj3::decode_config(data)?;
//! if config.color_model == ColorModel::YCbCr {
//!     let pixels = zentj3::decode(data)?;
//!     let mut out = Vec::new();
//!     EncodeRequest::new().with_quality(85).encode(&pixels, &mut out)?;
//! }
//! # Ok::<(), zentj3::CodecError>(())
//! ```
//!
//! Generic loaders that dispatch on magic bytes use a [`FormatRegistry`]
//! built by the host application.

mod codecs;
mod context;
mod decode;
mod encode;
mod error;
mod format;
mod info;
mod limits;
pub mod pixel;
mod registry;

pub use decode::{DEFAULT_HEADER_PROBE_LEN, DecodeRequest, decode, decode_config};
pub use encode::{DEFAULT_QUALITY, EncodeRequest, encode, encode_to_vec};
pub use error::CodecError;
pub use format::{DecodeConfigFn, DecodeFn, Format, JPEG_MAGIC};
pub use info::ImageConfig;
pub use limits::Limits;
pub use pixel::{Cmyk, ColorModel, PixelBuffer, Subsampling, YCbCrImage};
pub use registry::FormatRegistry;
