//! Typed pixel buffers accepted by the encoder and produced by the decoder.
//!
//! Interleaved layouts use `imgref::ImgVec` with typed pixels from the `rgb`
//! crate (plus [`Cmyk`]). Strides are in pixels, as everywhere in imgref.

use bytemuck::{Pod, Zeroable};

use crate::CodecError;
use crate::context::Subsamp;

pub use imgref::{ImgRef, ImgRefMut, ImgVec};
pub use rgb::{RGB8, RGBA8};

/// One interleaved CMYK pixel, 8 bits per ink.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(C)]
pub struct Cmyk {
    pub c: u8,
    pub m: u8,
    pub y: u8,
    pub k: u8,
}

impl Cmyk {
    pub const fn new(c: u8, m: u8, y: u8, k: u8) -> Self {
        Self { c, m, y, k }
    }
}

/// Chroma subsampling of a planar YCbCr image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Subsampling {
    /// Chroma halved horizontally and vertically.
    S420,
    /// Chroma halved horizontally.
    S422,
    /// Full-resolution chroma.
    S444,
}

impl Subsampling {
    /// Size of each chroma plane for a `width` x `height` luma plane.
    ///
    /// Odd dimensions round up, so the last chroma sample covers a single luma
    /// column or row.
    pub const fn chroma_dimensions(self, width: usize, height: usize) -> (usize, usize) {
        match self {
            Subsampling::S420 => (width.div_ceil(2), height.div_ceil(2)),
            Subsampling::S422 => (width.div_ceil(2), height),
            Subsampling::S444 => (width, height),
        }
    }

    pub(crate) const fn to_native(self) -> Subsamp {
        match self {
            Subsampling::S420 => Subsamp::S420,
            Subsampling::S422 => Subsamp::S422,
            Subsampling::S444 => Subsamp::S444,
        }
    }

    /// Maps a `TJSAMP_*` value; anything other than 4:2:0, 4:2:2 or 4:4:4 is `None`.
    pub(crate) const fn from_native(value: i32) -> Option<Self> {
        match value {
            v if v == Subsamp::S420 as i32 => Some(Subsampling::S420),
            v if v == Subsamp::S422 as i32 => Some(Subsampling::S422),
            v if v == Subsamp::S444 as i32 => Some(Subsampling::S444),
            _ => None,
        }
    }
}

/// Color model of a pixel buffer or of a JPEG stream's decoded form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorModel {
    Gray,
    Rgb,
    Rgba,
    Cmyk,
    YCbCr,
}

/// Planar luma + two chroma planes.
///
/// Chroma planes always have the size given by
/// [`Subsampling::chroma_dimensions`] for the luma size; the constructors
/// enforce it and the plane accessors cannot change it.
#[derive(Clone, Debug)]
pub struct YCbCrImage {
    y: ImgVec<u8>,
    cb: ImgVec<u8>,
    cr: ImgVec<u8>,
    subsampling: Subsampling,
}

impl YCbCrImage {
    /// Zero-filled planes for a `width` x `height` image.
    pub fn new(width: usize, height: usize, subsampling: Subsampling) -> Self {
        let (cw, ch) = subsampling.chroma_dimensions(width, height);
        Self {
            y: ImgVec::new(vec![0; width * height], width, height),
            cb: ImgVec::new(vec![0; cw * ch], cw, ch),
            cr: ImgVec::new(vec![0; cw * ch], cw, ch),
            subsampling,
        }
    }

    /// Assemble from existing planes, checking chroma sizes against `subsampling`.
    pub fn from_planes(
        y: ImgVec<u8>,
        cb: ImgVec<u8>,
        cr: ImgVec<u8>,
        subsampling: Subsampling,
    ) -> Result<Self, CodecError> {
        let expected = subsampling.chroma_dimensions(y.width(), y.height());
        for (name, plane) in [("Cb", &cb), ("Cr", &cr)] {
            let actual = (plane.width(), plane.height());
            if actual != expected {
                return Err(CodecError::InvalidInput(format!(
                    "{name} plane is {}x{}, {subsampling:?} with {}x{} luma needs {}x{}",
                    actual.0,
                    actual.1,
                    y.width(),
                    y.height(),
                    expected.0,
                    expected.1
                )));
            }
        }
        Ok(Self {
            y,
            cb,
            cr,
            subsampling,
        })
    }

    pub fn width(&self) -> usize {
        self.y.width()
    }

    pub fn height(&self) -> usize {
        self.y.height()
    }

    pub fn subsampling(&self) -> Subsampling {
        self.subsampling
    }

    pub fn y(&self) -> ImgRef<'_, u8> {
        self.y.as_ref()
    }

    pub fn cb(&self) -> ImgRef<'_, u8> {
        self.cb.as_ref()
    }

    pub fn cr(&self) -> ImgRef<'_, u8> {
        self.cr.as_ref()
    }

    pub fn y_mut(&mut self) -> ImgRefMut<'_, u8> {
        self.y.as_mut()
    }

    pub fn cb_mut(&mut self) -> ImgRefMut<'_, u8> {
        self.cb.as_mut()
    }

    pub fn cr_mut(&mut self) -> ImgRefMut<'_, u8> {
        self.cr.as_mut()
    }

    /// Split into `(y, cb, cr)` planes.
    pub fn into_planes(self) -> (ImgVec<u8>, ImgVec<u8>, ImgVec<u8>) {
        (self.y, self.cb, self.cr)
    }

    pub(crate) fn strides(&self) -> [usize; 3] {
        [self.y.stride(), self.cb.stride(), self.cr.stride()]
    }

    pub(crate) fn planes(&self) -> (&[u8], &[u8], &[u8]) {
        (&self.y.buf()[..], &self.cb.buf()[..], &self.cr.buf()[..])
    }

    pub(crate) fn planes_mut(&mut self) -> (&mut [u8], &mut [u8], &mut [u8]) {
        (
            &mut self.y.buf_mut()[..],
            &mut self.cb.buf_mut()[..],
            &mut self.cr.buf_mut()[..],
        )
    }
}

/// A decoded image, or an image to encode, in one of five layouts.
#[derive(Clone, Debug)]
pub enum PixelBuffer {
    /// 8-bit luma.
    Gray(ImgVec<u8>),
    /// Interleaved RGB. Accepted by the encoder; the decoder yields `Rgba`.
    Rgb(ImgVec<RGB8>),
    /// Interleaved RGBA. Alpha is ignored on encode and 255 on decode.
    Rgba(ImgVec<RGBA8>),
    /// Interleaved CMYK.
    Cmyk(ImgVec<Cmyk>),
    /// Planar YCbCr.
    YCbCr(YCbCrImage),
}

impl PixelBuffer {
    pub fn width(&self) -> usize {
        match self {
            PixelBuffer::Gray(img) => img.width(),
            PixelBuffer::Rgb(img) => img.width(),
            PixelBuffer::Rgba(img) => img.width(),
            PixelBuffer::Cmyk(img) => img.width(),
            PixelBuffer::YCbCr(img) => img.width(),
        }
    }

    pub fn height(&self) -> usize {
        match self {
            PixelBuffer::Gray(img) => img.height(),
            PixelBuffer::Rgb(img) => img.height(),
            PixelBuffer::Rgba(img) => img.height(),
            PixelBuffer::Cmyk(img) => img.height(),
            PixelBuffer::YCbCr(img) => img.height(),
        }
    }

    pub fn color_model(&self) -> ColorModel {
        match self {
            PixelBuffer::Gray(_) => ColorModel::Gray,
            PixelBuffer::Rgb(_) => ColorModel::Rgb,
            PixelBuffer::Rgba(_) => ColorModel::Rgba,
            PixelBuffer::Cmyk(_) => ColorModel::Cmyk,
            PixelBuffer::YCbCr(_) => ColorModel::YCbCr,
        }
    }

    /// Chroma subsampling for planar YCbCr, `None` otherwise.
    pub fn subsampling(&self) -> Option<Subsampling> {
        match self {
            PixelBuffer::YCbCr(img) => Some(img.subsampling()),
            _ => None,
        }
    }
}
