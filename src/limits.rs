//! Resource limits for decode operations.

/// Resource limits applied when decoding.
///
/// Dimensions are checked right after the header is parsed, before any pixel
/// buffer is allocated. All limits are optional.
///
/// `max_memory_bytes` is enforced twice. The output buffer is checked against
/// it up front; the native decompressor then receives it (rounded up to whole
/// megabytes) as a cap on its own working memory, such as the whole-image
/// coefficient buffers of a progressive stream. Both report
/// [`CodecError::LimitExceeded`](crate::CodecError::LimitExceeded).
/// `max_pixels` is likewise passed to the decompressor.
#[derive(Clone, Debug, Default)]
pub struct Limits {
    /// Maximum image width in pixels.
    pub max_width: Option<u64>,
    /// Maximum image height in pixels.
    pub max_height: Option<u64>,
    /// Maximum total pixels (width × height).
    pub max_pixels: Option<u64>,
    /// Maximum memory allocation in bytes.
    pub max_memory_bytes: Option<u64>,
}

impl Limits {
    /// Create a new Limits with no restrictions.
    pub fn none() -> Self {
        Self::default()
    }

    /// Check if dimensions are within limits.
    ///
    /// Returns `Err` with a description if any limit is exceeded.
    pub fn check_dimensions(&self, width: u64, height: u64) -> Result<(), &'static str> {
        if let Some(max_width) = self.max_width {
            if width > max_width {
                return Err("width exceeds limit");
            }
        }

        if let Some(max_height) = self.max_height {
            if height > max_height {
                return Err("height exceeds limit");
            }
        }

        if let Some(max_pixels) = self.max_pixels {
            let pixels = width.saturating_mul(height);
            if pixels > max_pixels {
                return Err("pixel count exceeds limit");
            }
        }

        Ok(())
    }

    /// Check if a memory allocation is within limits.
    pub fn check_memory(&self, bytes: u64) -> Result<(), &'static str> {
        if let Some(max_memory) = self.max_memory_bytes {
            if bytes > max_memory {
                return Err("memory allocation exceeds limit");
            }
        }
        Ok(())
    }

    /// `TJPARAM_MAXPIXELS` value; 0 means unlimited.
    pub(crate) fn native_max_pixels(&self) -> i32 {
        self.max_pixels
            .map_or(0, |px| i32::try_from(px.max(1)).unwrap_or(i32::MAX))
    }

    /// `TJPARAM_MAXMEMORY` value in whole megabytes, rounded up; 0 means unlimited.
    pub(crate) fn native_max_memory_mb(&self) -> i32 {
        self.max_memory_bytes.map_or(0, |bytes| {
            let mb = bytes.div_ceil(1024 * 1024).max(1);
            i32::try_from(mb).unwrap_or(i32::MAX)
        })
    }
}
