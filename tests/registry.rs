//! Magic-byte dispatch and concurrent use from many threads.

mod common;

use std::io::Read;

use common::*;
use rayon::prelude::*;
use zentj3::{
    CodecError, ColorModel, Format, FormatRegistry, ImageConfig, PixelBuffer, Subsampling,
};

#[test]
fn registry_decodes_jpeg() {
    init_logging();
    let jpeg = zentj3::encode_to_vec(&PixelBuffer::Gray(gray(24, 16, ramp)), None).unwrap();
    let registry = FormatRegistry::with_defaults();

    let (config, name) = registry.decode_config(&jpeg[..]).unwrap();
    assert_eq!(name, "jpeg");
    assert_eq!((config.width, config.height), (24, 16));

    let (pixels, name) = registry.decode(&jpeg[..]).unwrap();
    assert_eq!(name, "jpeg");
    assert_eq!(pixels.color_model(), ColorModel::Gray);
}

#[test]
fn registry_without_jpeg_rejects_it() {
    fn unsupported(_: &mut dyn Read) -> Result<PixelBuffer, CodecError> {
        Err(CodecError::UnsupportedFormat("png decoding not registered".into()))
    }
    fn unsupported_config(_: &mut dyn Read) -> Result<ImageConfig, CodecError> {
        Err(CodecError::UnsupportedFormat("png decoding not registered".into()))
    }

    let jpeg = zentj3::encode_to_vec(&PixelBuffer::Gray(gray(8, 8, ramp)), None).unwrap();
    let registry = FormatRegistry::new().with_format(Format::new(
        "png",
        b"\x89PNG",
        unsupported,
        unsupported_config,
    ));

    let err = registry.decode(&jpeg[..]).unwrap_err();
    assert!(matches!(err, CodecError::UnrecognizedFormat), "{err:?}");

    let err = registry.decode(&b"\x89PNG\r\n\x1a\n"[..]).unwrap_err();
    assert!(matches!(err, CodecError::UnsupportedFormat(_)), "{err:?}");
}

#[test]
fn concurrent_encode_and_decode() {
    init_logging();
    let results: Vec<_> = (1..=32usize)
        .into_par_iter()
        .map(|i| {
            let subsampling = [Subsampling::S420, Subsampling::S422, Subsampling::S444][i % 3];
            let src = PixelBuffer::YCbCr(ycbcr(8 * i, 4 * i + 1, subsampling));
            let jpeg = zentj3::encode_to_vec(&src, Some(50 + i as i32)).unwrap();
            let decoded = zentj3::decode(&jpeg[..]).unwrap();
            (i, subsampling, decoded)
        })
        .collect();

    for (i, subsampling, decoded) in results {
        assert_eq!(decoded.width(), 8 * i);
        assert_eq!(decoded.height(), 4 * i + 1);
        assert_eq!(decoded.subsampling(), Some(subsampling));
    }
}

#[test]
fn concurrent_failures_do_not_leak_between_threads() {
    init_logging();
    let good = zentj3::encode_to_vec(&PixelBuffer::Rgba(rgba(20, 20)), None).unwrap();
    let bad = b"\xFF\xD8not really a jpeg".to_vec();

    (0..64usize).into_par_iter().for_each(|i| {
        if i % 2 == 0 {
            let pixels = zentj3::decode(&good[..]).unwrap();
            assert_eq!(pixels.color_model(), ColorModel::Rgba);
        } else {
            let err = zentj3::decode(&bad[..]).unwrap_err();
            assert!(matches!(err, CodecError::HeaderParse(_)), "{err:?}");
        }
    });
}
