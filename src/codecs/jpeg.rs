//! JPEG codec adapter over the TurboJPEG 3 session in [`crate::context`].
//!
//! Decoding maps the stream's native colorspace to a pixel layout; encoding
//! maps a pixel layout to the native pixel format, subsampling and colorspace.

use imgref::ImgVec;
use log::debug;
use rgb::{RGB8, RGBA8};

use crate::context::{self, Colorspace, Context, InitType, Param, PixelFormat, Subsamp};
use crate::pixel::{Cmyk, ColorModel, PixelBuffer, Subsampling, YCbCrImage};
use crate::{CodecError, ImageConfig, Limits};

/// Pixel layout a decoded stream maps to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Layout {
    Gray,
    Rgba,
    Cmyk,
    YCbCr(Subsampling),
}

#[derive(Clone, Copy, Debug)]
struct Header {
    width: usize,
    height: usize,
    layout: Layout,
}

impl Header {
    fn config(&self) -> ImageConfig {
        let (color_model, subsampling) = match self.layout {
            Layout::Gray => (ColorModel::Gray, None),
            Layout::Rgba => (ColorModel::Rgba, None),
            Layout::Cmyk => (ColorModel::Cmyk, None),
            Layout::YCbCr(s) => (ColorModel::YCbCr, Some(s)),
        };
        ImageConfig {
            // the JPEG frame header stores 16-bit dimensions
            width: self.width as u32,
            height: self.height as u32,
            color_model,
            subsampling,
        }
    }

    /// Bytes the decoded pixel buffer will occupy.
    fn output_bytes(&self) -> u64 {
        let luma = self.width as u64 * self.height as u64;
        match self.layout {
            Layout::Gray => luma,
            Layout::Rgba | Layout::Cmyk => luma * 4,
            Layout::YCbCr(s) => {
                let (cw, ch) = s.chroma_dimensions(self.width, self.height);
                luma + 2 * (cw as u64 * ch as u64)
            }
        }
    }
}

fn open(init: InitType) -> Result<Context, CodecError> {
    Context::new(init).map_err(CodecError::ContextInit)
}

/// Parse the header and classify the stream. Shared by probe and decode so
/// both accept and reject exactly the same streams.
fn read_header(ctx: &mut Context, data: &[u8]) -> Result<Header, CodecError> {
    ctx.decompress_header(data)
        .map_err(CodecError::HeaderParse)?;

    // A prefix that ends before the frame header parses as tables-only and
    // leaves the dimensions unset.
    let (width, height) = match (
        usize::try_from(ctx.get(Param::JpegWidth)),
        usize::try_from(ctx.get(Param::JpegHeight)),
    ) {
        (Ok(w), Ok(h)) if w > 0 && h > 0 => (w, h),
        _ => return Err(CodecError::HeaderParse("no frame header in stream".into())),
    };

    let precision = ctx.get(Param::Precision);
    if precision != 8 {
        return Err(CodecError::UnsupportedPrecision(precision));
    }

    let raw_colorspace = ctx.get(Param::Colorspace);
    let layout = match Colorspace::from_raw(raw_colorspace) {
        Some(Colorspace::Gray) => Layout::Gray,
        Some(Colorspace::Rgb) => Layout::Rgba,
        Some(Colorspace::Ycck | Colorspace::Cmyk) => Layout::Cmyk,
        Some(Colorspace::YCbCr) => {
            let raw_subsamp = ctx.get(Param::Subsamp);
            let subsampling = Subsampling::from_native(raw_subsamp)
                .ok_or(CodecError::UnsupportedSubsampling(raw_subsamp))?;
            Layout::YCbCr(subsampling)
        }
        None => return Err(CodecError::UnsupportedColorspace(raw_colorspace)),
    };

    debug!("jpeg header: {width}x{height} {layout:?}");
    Ok(Header {
        width,
        height,
        layout,
    })
}

/// Read dimensions and color model without decoding pixels.
pub(crate) fn probe(data: &[u8]) -> Result<ImageConfig, CodecError> {
    let mut ctx = open(InitType::Decompress)?;
    read_header(&mut ctx, data).map(|header| header.config())
}

/// Decode JPEG to the pixel layout implied by its colorspace.
pub(crate) fn decode(data: &[u8], limits: Option<&Limits>) -> Result<PixelBuffer, CodecError> {
    let mut ctx = open(InitType::Decompress)?;
    let header = read_header(&mut ctx, data)?;

    if let Some(lim) = limits {
        lim.check_dimensions(header.width as u64, header.height as u64)
            .map_err(CodecError::LimitExceeded)?;
        lim.check_memory(header.output_bytes())
            .map_err(CodecError::LimitExceeded)?;
        ctx.set(Param::MaxPixels, lim.native_max_pixels())
            .map_err(CodecError::Decode)?;
        ctx.set(Param::MaxMemory, lim.native_max_memory_mb())
            .map_err(CodecError::Decode)?;
    }

    let limited = limits.is_some();
    let fail = |msg: String| decode_failure(limited, msg);
    let (width, height) = (header.width, header.height);
    let pixels = match header.layout {
        Layout::Gray => {
            let mut img = ImgVec::new(vec![0u8; width * height], width, height);
            ctx.decompress8(data, img.buf_mut(), width, PixelFormat::Gray)
                .map_err(fail)?;
            PixelBuffer::Gray(img)
        }
        Layout::Rgba => {
            let mut img = ImgVec::new(vec![RGBA8::new(0, 0, 0, 0); width * height], width, height);
            let bytes: &mut [u8] = bytemuck::cast_slice_mut(&mut img.buf_mut()[..]);
            ctx.decompress8(data, bytes, width * 4, PixelFormat::Rgba)
                .map_err(fail)?;
            PixelBuffer::Rgba(img)
        }
        Layout::Cmyk => {
            let mut img = ImgVec::new(vec![Cmyk::default(); width * height], width, height);
            let bytes: &mut [u8] = bytemuck::cast_slice_mut(&mut img.buf_mut()[..]);
            ctx.decompress8(data, bytes, width * 4, PixelFormat::Cmyk)
                .map_err(fail)?;
            PixelBuffer::Cmyk(img)
        }
        Layout::YCbCr(subsampling) => {
            let mut img = YCbCrImage::new(width, height, subsampling);
            ctx.decompress_to_planes8(data, &mut img)
                .map_err(fail)?;
            PixelBuffer::YCbCr(img)
        }
    };

    Ok(pixels)
}

/// Native messages raised when `TJPARAM_MAXMEMORY` or `TJPARAM_MAXPIXELS`
/// trips inside the decompressor.
const NATIVE_LIMIT_MESSAGES: [&str; 3] = ["memory", "backing store", "too large"];

/// Classify a native decompress failure. With limits in effect, the native
/// memory and pixel caps surface as [`CodecError::LimitExceeded`].
fn decode_failure(limited: bool, msg: String) -> CodecError {
    let lower = msg.to_ascii_lowercase();
    if limited && NATIVE_LIMIT_MESSAGES.iter().any(|m| lower.contains(m)) {
        debug!("native decompressor hit a limit: {msg}");
        return CodecError::LimitExceeded("native decoder memory limit exceeded");
    }
    CodecError::Decode(msg)
}

/// Encoder settings after validation.
#[derive(Clone, Copy, Debug)]
pub(crate) struct EncodeSettings {
    pub quality: i32,
    pub progressive: bool,
    pub optimize: bool,
    pub ycbcr_transform: bool,
}

/// Encode any supported layout to a JPEG byte vector.
pub(crate) fn encode(pixels: &PixelBuffer, settings: &EncodeSettings) -> Result<Vec<u8>, CodecError> {
    let (width, height) = (pixels.width(), pixels.height());
    if width == 0 || height == 0 {
        return Err(CodecError::InvalidInput(format!(
            "cannot encode an empty {width}x{height} image"
        )));
    }

    let rgb_colorspace = if settings.ycbcr_transform {
        Colorspace::YCbCr
    } else {
        Colorspace::Rgb
    };
    let (subsamp, colorspace) = match pixels {
        PixelBuffer::Gray(_) => (Subsamp::Gray, Colorspace::Gray),
        PixelBuffer::Rgb(_) | PixelBuffer::Rgba(_) => (Subsamp::S444, rgb_colorspace),
        PixelBuffer::Cmyk(_) => (Subsamp::S444, Colorspace::Ycck),
        PixelBuffer::YCbCr(img) => (img.subsampling().to_native(), Colorspace::YCbCr),
    };

    let mut ctx = open(InitType::Compress)?;
    configure(&mut ctx, settings, subsamp, colorspace).map_err(CodecError::Encode)?;

    let capacity = context::jpeg_buf_size(width, height, subsamp).map_err(CodecError::Encode)?;
    let mut out = vec![0u8; capacity];

    let result = match pixels {
        PixelBuffer::Gray(img) => ctx.compress8(
            &img.buf()[..],
            width,
            img.stride(),
            height,
            PixelFormat::Gray,
            &mut out,
        ),
        PixelBuffer::Rgb(img) => ctx.compress8(
            bytemuck::cast_slice::<RGB8, u8>(&img.buf()[..]),
            width,
            img.stride() * 3,
            height,
            PixelFormat::Rgb,
            &mut out,
        ),
        PixelBuffer::Rgba(img) => ctx.compress8(
            bytemuck::cast_slice::<RGBA8, u8>(&img.buf()[..]),
            width,
            img.stride() * 4,
            height,
            PixelFormat::Rgba,
            &mut out,
        ),
        PixelBuffer::Cmyk(img) => ctx.compress8(
            bytemuck::cast_slice::<Cmyk, u8>(&img.buf()[..]),
            width,
            img.stride() * 4,
            height,
            PixelFormat::Cmyk,
            &mut out,
        ),
        PixelBuffer::YCbCr(img) => ctx.compress_from_planes8(img, &mut out),
    };
    result.map_err(CodecError::Encode)?;

    debug!(
        "jpeg encode: {width}x{height} {:?} q{} -> {} bytes (bound {capacity})",
        pixels.color_model(),
        settings.quality,
        out.len()
    );
    Ok(out)
}

fn configure(
    ctx: &mut Context,
    settings: &EncodeSettings,
    subsamp: Subsamp,
    colorspace: Colorspace,
) -> Result<(), String> {
    ctx.set(Param::NoRealloc, 1)?;
    ctx.set(Param::Quality, settings.quality)?;
    ctx.set(Param::Subsamp, subsamp as i32)?;
    ctx.set(Param::Colorspace, colorspace as i32)?;
    if settings.optimize {
        ctx.set(Param::Optimize, 1)?;
    }
    if settings.progressive {
        ctx.set(Param::Progressive, 1)?;
    }
    Ok(())
}
