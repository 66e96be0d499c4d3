#![allow(dead_code)]

use zentj3::pixel::{ImgVec, RGB8, RGBA8};
use zentj3::{Cmyk, Subsampling, YCbCrImage};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Smooth diagonal ramp; compresses with small error.
pub fn ramp(x: usize, y: usize) -> u8 {
    ((x + y) / 3).min(255) as u8
}

/// High-frequency pattern; large compressed output.
pub fn texture(x: usize, y: usize) -> u8 {
    ((x * 7 + y * 13) ^ (x * y)) as u8
}

pub fn gray(width: usize, height: usize, f: fn(usize, usize) -> u8) -> ImgVec<u8> {
    let buf = (0..height)
        .flat_map(|y| (0..width).map(move |x| f(x, y)))
        .collect();
    ImgVec::new(buf, width, height)
}

pub fn rgb(width: usize, height: usize) -> ImgVec<RGB8> {
    let buf = (0..height)
        .flat_map(|y| (0..width).map(move |x| RGB8::new(ramp(x, y), 128, 255 - ramp(x, y))))
        .collect();
    ImgVec::new(buf, width, height)
}

pub fn rgba(width: usize, height: usize) -> ImgVec<RGBA8> {
    let buf = (0..height)
        .flat_map(|y| {
            (0..width).map(move |x| RGBA8::new(ramp(x, y), 64, 255 - ramp(x, y), 255))
        })
        .collect();
    ImgVec::new(buf, width, height)
}

pub fn cmyk(width: usize, height: usize) -> ImgVec<Cmyk> {
    let buf = (0..height)
        .flat_map(|y| (0..width).map(move |x| Cmyk::new(ramp(x, y), 40, 200, 10)))
        .collect();
    ImgVec::new(buf, width, height)
}

pub fn ycbcr(width: usize, height: usize, subsampling: Subsampling) -> YCbCrImage {
    let mut img = YCbCrImage::new(width, height, subsampling);
    for (y, row) in img.y_mut().rows_mut().enumerate() {
        for (x, px) in row.iter_mut().enumerate() {
            *px = ramp(x, y);
        }
    }
    for px in img.cb_mut().pixels_mut() {
        *px = 100;
    }
    for px in img.cr_mut().pixels_mut() {
        *px = 150;
    }
    img
}

/// Mean absolute difference of two equally long sample sequences.
pub fn mean_abs_diff(a: impl IntoIterator<Item = u8>, b: impl IntoIterator<Item = u8>) -> f64 {
    let (mut sum, mut n) = (0u64, 0u64);
    for (x, y) in a.into_iter().zip(b) {
        sum += u64::from(x.abs_diff(y));
        n += 1;
    }
    assert!(n > 0, "no samples compared");
    sum as f64 / n as f64
}

/// Offset of the baseline (SOF0) frame header marker.
pub fn find_sof0(jpeg: &[u8]) -> usize {
    let mut pos = 2;
    while pos + 4 < jpeg.len() {
        assert_eq!(jpeg[pos], 0xFF, "lost marker sync at {pos}");
        let marker = jpeg[pos + 1];
        if marker == 0xC0 {
            return pos;
        }
        assert_ne!(marker, 0xDA, "reached scan without a frame header");
        let len = u16::from_be_bytes([jpeg[pos + 2], jpeg[pos + 3]]) as usize;
        pos += 2 + len;
    }
    panic!("no SOF0 marker");
}

/// Rewrite the frame header of `jpeg` to claim 12-bit samples.
pub fn patch_precision_to_12(jpeg: &mut [u8]) {
    let sof = find_sof0(jpeg);
    // extended sequential, so 12-bit is legal
    jpeg[sof + 1] = 0xC1;
    jpeg[sof + 4] = 12;
}

/// Overwrite the sampling factors of the first frame component.
pub fn patch_luma_sampling(jpeg: &mut [u8], h: u8, v: u8) {
    let sof = find_sof0(jpeg);
    assert_eq!(jpeg[sof + 9], 3, "expected a three-component frame");
    jpeg[sof + 11] = (h << 4) | v;
}
