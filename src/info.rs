//! Image metadata from header parsing.

use crate::pixel::{ColorModel, Subsampling};

/// Dimensions and color model of a JPEG stream, read without decoding pixels.
///
/// `color_model` is the layout [`decode`](crate::decode) would return for the
/// same stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageConfig {
    pub width: u32,
    pub height: u32,
    pub color_model: ColorModel,
    /// Chroma subsampling when `color_model` is [`ColorModel::YCbCr`].
    pub subsampling: Option<Subsampling>,
}
