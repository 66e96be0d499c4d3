//! Owned TurboJPEG 3 session.
//!
//! This is the only module that touches the native API. A [`Context`] owns one
//! `tjhandle` and destroys it on drop, so every early return in the codec layer
//! releases the session. Pixel and output buffers are passed as borrowed
//! slices; the borrow keeps them in place for the duration of each native call.
//!
//! Methods return the native error string on failure and leave it to the
//! caller to choose the [`CodecError`](crate::CodecError) variant.

use core::ffi::{CStr, c_char, c_int, c_void};
use core::ptr::{self, NonNull};

use log::trace;
use turbojpeg::raw;

use crate::pixel::YCbCrImage;

/// `TJINIT_*`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(i32)]
pub(crate) enum InitType {
    Compress = 0,
    Decompress = 1,
}

/// `TJPARAM_*` values used by this crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(i32)]
pub(crate) enum Param {
    NoRealloc = 2,
    Quality = 3,
    Subsamp = 4,
    JpegWidth = 5,
    JpegHeight = 6,
    Precision = 7,
    Colorspace = 8,
    Optimize = 11,
    Progressive = 12,
    MaxMemory = 23,
    MaxPixels = 24,
}

/// `TJPF_*` interleaved pixel formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(i32)]
pub(crate) enum PixelFormat {
    Rgb = 0,
    Gray = 6,
    Rgba = 7,
    Cmyk = 11,
}

impl PixelFormat {
    pub(crate) const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Gray => 1,
            PixelFormat::Rgb => 3,
            PixelFormat::Rgba | PixelFormat::Cmyk => 4,
        }
    }
}

/// `TJSAMP_*`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(i32)]
pub(crate) enum Subsamp {
    S444 = 0,
    S422 = 1,
    S420 = 2,
    Gray = 3,
}

/// `TJCS_*`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(i32)]
pub(crate) enum Colorspace {
    Rgb = 0,
    YCbCr = 1,
    Gray = 2,
    Cmyk = 3,
    Ycck = 4,
}

impl Colorspace {
    pub(crate) fn from_raw(value: c_int) -> Option<Self> {
        match value {
            0 => Some(Colorspace::Rgb),
            1 => Some(Colorspace::YCbCr),
            2 => Some(Colorspace::Gray),
            3 => Some(Colorspace::Cmyk),
            4 => Some(Colorspace::Ycck),
            _ => None,
        }
    }
}

/// One native compress or decompress session.
pub(crate) struct Context {
    handle: NonNull<c_void>,
    init: InitType,
}

impl Context {
    /// `tj3Init`. On failure the library's global error string is returned.
    pub(crate) fn new(init: InitType) -> Result<Self, String> {
        // SAFETY: tj3Init has no preconditions; a null return signals failure.
        let handle = unsafe { raw::tj3Init(init as c_int) };
        match NonNull::new(handle) {
            Some(handle) => {
                trace!("tj3 context created ({init:?})");
                Ok(Self { handle, init })
            }
            None => Err(global_error_string()),
        }
    }

    fn raw(&self) -> *mut c_void {
        self.handle.as_ptr()
    }

    /// `tj3Set`
    pub(crate) fn set(&mut self, param: Param, value: i32) -> Result<(), String> {
        // SAFETY: the handle is live for the lifetime of `self`.
        let ret = unsafe { raw::tj3Set(self.raw(), param as c_int, value) };
        if ret != 0 {
            return Err(self.error_string());
        }
        Ok(())
    }

    /// `tj3Get`. Returns -1 for parameters that have no value yet.
    pub(crate) fn get(&self, param: Param) -> i32 {
        // SAFETY: the handle is live for the lifetime of `self`.
        unsafe { raw::tj3Get(self.raw(), param as c_int) }
    }

    /// `tj3GetErrorStr` for this session.
    pub(crate) fn error_string(&self) -> String {
        // SAFETY: the handle is live; the returned string is owned by the
        // session and copied before any further native call.
        unsafe { c_string(raw::tj3GetErrorStr(self.raw())) }
    }

    /// `tj3DecompressHeader`. Afterwards the `JpegWidth`, `JpegHeight`,
    /// `Precision`, `Colorspace` and `Subsamp` parameters describe `jpeg`.
    pub(crate) fn decompress_header(&mut self, jpeg: &[u8]) -> Result<(), String> {
        if jpeg.is_empty() {
            return Err("empty JPEG stream".into());
        }
        let jpeg_len = to_size_t(jpeg.len())?;
        // SAFETY: `jpeg` is a live borrow of `jpeg.len()` readable bytes.
        let ret = unsafe { raw::tj3DecompressHeader(self.raw(), jpeg.as_ptr(), jpeg_len) };
        if ret != 0 {
            return Err(self.error_string());
        }
        Ok(())
    }

    /// Header dimensions as unsigned sizes.
    fn header_dimensions(&self) -> Result<(usize, usize), String> {
        let width = usize::try_from(self.get(Param::JpegWidth));
        let height = usize::try_from(self.get(Param::JpegHeight));
        match (width, height) {
            (Ok(w), Ok(h)) => Ok((w, h)),
            _ => Err("JPEG header has not been read".into()),
        }
    }

    /// `tj3Decompress8` into an interleaved buffer of `pitch` bytes per row.
    ///
    /// The header must have been read; `dst` must hold every row at `pitch`.
    pub(crate) fn decompress8(
        &mut self,
        jpeg: &[u8],
        dst: &mut [u8],
        pitch: usize,
        format: PixelFormat,
    ) -> Result<(), String> {
        debug_assert_eq!(self.init, InitType::Decompress);
        let (width, height) = self.header_dimensions()?;
        let row = width * format.bytes_per_pixel();
        if pitch < row || dst.len() < required_len(pitch, row, height) {
            return Err(format!(
                "destination buffer too small for {width}x{height} at pitch {pitch}"
            ));
        }
        let pitch = to_c_int(pitch)?;
        let jpeg_len = to_size_t(jpeg.len())?;

        // SAFETY: `dst` holds `height` rows of at least `row` bytes spaced
        // `pitch` apart, as checked above, and stays borrowed for the call.
        let ret = unsafe {
            raw::tj3Decompress8(
                self.raw(),
                jpeg.as_ptr(),
                jpeg_len,
                dst.as_mut_ptr(),
                pitch,
                format as c_int,
            )
        };
        if ret != 0 {
            return Err(self.error_string());
        }
        Ok(())
    }

    /// `tj3DecompressToYUVPlanes8` into the three planes of `image`.
    pub(crate) fn decompress_to_planes8(
        &mut self,
        jpeg: &[u8],
        image: &mut YCbCrImage,
    ) -> Result<(), String> {
        debug_assert_eq!(self.init, InitType::Decompress);
        let (width, height) = self.header_dimensions()?;
        if image.width() != width || image.height() != height {
            return Err(format!(
                "planar buffer is {}x{}, JPEG is {width}x{height}",
                image.width(),
                image.height()
            ));
        }
        let strides = image.strides();
        let mut strides = [
            to_c_int(strides[0])?,
            to_c_int(strides[1])?,
            to_c_int(strides[2])?,
        ];
        let jpeg_len = to_size_t(jpeg.len())?;
        let (y, cb, cr) = image.planes_mut();
        let mut planes = [y.as_mut_ptr(), cb.as_mut_ptr(), cr.as_mut_ptr()];

        // SAFETY: YCbCrImage guarantees each plane covers its subsampled
        // dimensions at its stride, and the dimensions match the header.
        let ret = unsafe {
            raw::tj3DecompressToYUVPlanes8(
                self.raw(),
                jpeg.as_ptr(),
                jpeg_len,
                planes.as_mut_ptr(),
                strides.as_mut_ptr(),
            )
        };
        if ret != 0 {
            return Err(self.error_string());
        }
        Ok(())
    }

    /// `tj3Compress8` from an interleaved buffer into `out`.
    ///
    /// `out` must already be sized with [`jpeg_buf_size`]; `NoRealloc` has to be
    /// set on the session. On success `out` is truncated to the JPEG length.
    pub(crate) fn compress8(
        &mut self,
        src: &[u8],
        width: usize,
        pitch: usize,
        height: usize,
        format: PixelFormat,
        out: &mut Vec<u8>,
    ) -> Result<(), String> {
        debug_assert_eq!(self.init, InitType::Compress);
        let row = width * format.bytes_per_pixel();
        if pitch < row || src.len() < required_len(pitch, row, height) {
            return Err(format!(
                "source buffer too small for {width}x{height} at pitch {pitch}"
            ));
        }
        let (c_width, c_pitch, c_height) = (to_c_int(width)?, to_c_int(pitch)?, to_c_int(height)?);

        let base = out.as_mut_ptr();
        let mut jpeg_buf = base;
        let mut jpeg_size = to_size_t(out.len())?;
        // SAFETY: `src` covers every source row as checked above. With
        // NoRealloc the library writes at most `jpeg_size` bytes into `out`.
        let ret = unsafe {
            raw::tj3Compress8(
                self.raw(),
                src.as_ptr(),
                c_width,
                c_pitch,
                c_height,
                format as c_int,
                &mut jpeg_buf,
                &mut jpeg_size,
            )
        };
        self.finish_compress(ret, base, jpeg_buf, jpeg_size, out)
    }

    /// `tj3CompressFromYUVPlanes8` from the planes of `image` into `out`.
    ///
    /// Same buffer contract as [`compress8`](Self::compress8). The `Subsamp`
    /// parameter must match `image`.
    pub(crate) fn compress_from_planes8(
        &mut self,
        image: &YCbCrImage,
        out: &mut Vec<u8>,
    ) -> Result<(), String> {
        debug_assert_eq!(self.init, InitType::Compress);
        let (c_width, c_height) = (to_c_int(image.width())?, to_c_int(image.height())?);
        let strides = image.strides();
        let strides = [
            to_c_int(strides[0])?,
            to_c_int(strides[1])?,
            to_c_int(strides[2])?,
        ];
        let (y, cb, cr) = image.planes();
        let planes = [y.as_ptr(), cb.as_ptr(), cr.as_ptr()];

        let base = out.as_mut_ptr();
        let mut jpeg_buf = base;
        let mut jpeg_size = to_size_t(out.len())?;
        // SAFETY: YCbCrImage guarantees each plane covers its subsampled
        // dimensions at its stride. NoRealloc bounds writes to `out`.
        let ret = unsafe {
            raw::tj3CompressFromYUVPlanes8(
                self.raw(),
                planes.as_ptr(),
                c_width,
                strides.as_ptr(),
                c_height,
                &mut jpeg_buf,
                &mut jpeg_size,
            )
        };
        self.finish_compress(ret, base, jpeg_buf, jpeg_size, out)
    }

    fn finish_compress(
        &self,
        ret: c_int,
        base: *mut u8,
        jpeg_buf: *mut u8,
        jpeg_size: raw::size_t,
        out: &mut Vec<u8>,
    ) -> Result<(), String> {
        if ret != 0 {
            return Err(self.error_string());
        }
        let jpeg_size = from_size_t(jpeg_size)?;
        if jpeg_buf != base || jpeg_size > out.len() {
            return Err("compressor did not write into the provided buffer".into());
        }
        out.truncate(jpeg_size);
        Ok(())
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        // SAFETY: the handle came from tj3Init and is destroyed exactly once.
        unsafe { raw::tj3Destroy(self.raw()) };
        trace!("tj3 context destroyed ({:?})", self.init);
    }
}

/// `tj3JPEGBufSize`: worst-case JPEG size for the given geometry.
pub(crate) fn jpeg_buf_size(width: usize, height: usize, subsamp: Subsamp) -> Result<usize, String> {
    let (width, height) = (to_c_int(width)?, to_c_int(height)?);
    // SAFETY: pure size computation, no pointers involved.
    let size = unsafe { raw::tj3JPEGBufSize(width, height, subsamp as c_int) };
    if size == 0 {
        return Err(global_error_string());
    }
    from_size_t(size)
}

/// Error string not tied to a session (e.g. after a failed `tj3Init`).
fn global_error_string() -> String {
    // SAFETY: a null handle selects the thread-local global error string.
    unsafe { c_string(raw::tj3GetErrorStr(ptr::null_mut())) }
}

/// Copies a NUL-terminated native string.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string that stays valid
/// for the duration of the call.
unsafe fn c_string(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::from("unknown TurboJPEG error");
    }
    // SAFETY: upheld by the caller.
    unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
}

/// Bytes spanned by `rows` rows of `row` bytes spaced `pitch` apart.
fn required_len(pitch: usize, row: usize, rows: usize) -> usize {
    match rows {
        0 => 0,
        n => pitch.saturating_mul(n - 1).saturating_add(row),
    }
}

fn to_c_int(value: usize) -> Result<c_int, String> {
    c_int::try_from(value).map_err(|_| format!("{value} exceeds the native integer range"))
}

fn to_size_t(value: usize) -> Result<raw::size_t, String> {
    raw::size_t::try_from(value).map_err(|_| format!("{value} exceeds the native size range"))
}

fn from_size_t(value: raw::size_t) -> Result<usize, String> {
    usize::try_from(value).map_err(|_| format!("native size {value} does not fit in memory"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_len_accounts_for_last_row() {
        assert_eq!(required_len(16, 12, 0), 0);
        assert_eq!(required_len(16, 12, 1), 12);
        assert_eq!(required_len(16, 12, 3), 44);
    }

    #[test]
    fn colorspace_from_raw() {
        assert_eq!(Colorspace::from_raw(2), Some(Colorspace::Gray));
        assert_eq!(Colorspace::from_raw(4), Some(Colorspace::Ycck));
        assert_eq!(Colorspace::from_raw(5), None);
        assert_eq!(Colorspace::from_raw(-1), None);
    }

    #[test]
    fn native_sizes_convert_both_ways() {
        assert_eq!(to_size_t(4096).unwrap(), 4096 as raw::size_t);
        assert_eq!(from_size_t(4096 as raw::size_t).unwrap(), 4096usize);
        assert_eq!(from_size_t(to_size_t(usize::MAX).unwrap()).unwrap(), usize::MAX);
    }

    #[test]
    fn buffer_bound_covers_pixels() {
        let size = jpeg_buf_size(320, 240, Subsamp::S420).unwrap();
        assert!(size >= 320 * 240);
        assert!(jpeg_buf_size(16, 16, Subsamp::Gray).unwrap() > 0);
    }

    #[test]
    fn oversized_dimensions_are_rejected_before_native_call() {
        assert!(to_c_int(usize::MAX).is_err());
        assert!(jpeg_buf_size(usize::MAX, 1, Subsamp::S444).is_err());
    }

    #[test]
    fn header_is_required_before_decompress() {
        let mut ctx = Context::new(InitType::Decompress).unwrap();
        let mut dst = [0u8; 16];
        assert!(ctx.decompress8(&[0xFF, 0xD8], &mut dst, 4, PixelFormat::Gray).is_err());
    }

    #[test]
    fn empty_header_input_is_rejected() {
        let mut ctx = Context::new(InitType::Decompress).unwrap();
        assert!(ctx.decompress_header(&[]).is_err());
    }
}
