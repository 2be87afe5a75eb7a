// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Raster persistence and image helpers.
//!
//! [`RasterIo`] is the seam between the codec and the filesystem.
//! [`ImageFileIo`] backs it with the `image` crate: JPEG for `.jpg`/`.jpeg`
//! paths (at the requested quality), format-by-extension otherwise.
//!
//! The free functions work on in-memory buffers. [`recompress_jpeg`] is the
//! transport simulation used by self-tests.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::RgbImage;

use crate::codec::error::Result;

/// Open and save rasters.
pub trait RasterIo {
    /// Decode the file at `path` to 8-bit RGB.
    fn open(&self, path: &Path) -> Result<RgbImage>;

    /// Write `raster` to `path`. `quality` applies to lossy formats only.
    fn save(&self, raster: &RgbImage, path: &Path, quality: u8) -> Result<()>;
}

/// [`RasterIo`] over image files.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageFileIo;

impl RasterIo for ImageFileIo {
    fn open(&self, path: &Path) -> Result<RgbImage> {
        Ok(image::open(path)?.to_rgb8())
    }

    fn save(&self, raster: &RgbImage, path: &Path, quality: u8) -> Result<()> {
        if is_jpeg_path(path) {
            let mut out = BufWriter::new(File::create(path)?);
            JpegEncoder::new_with_quality(&mut out, quality).encode_image(raster)?;
            out.flush()?;
        } else {
            raster.save(path)?;
        }
        Ok(())
    }
}

fn is_jpeg_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg"))
}

/// JPEG-encode `image` at `quality` (1..=100).
pub fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality).encode_image(image)?;
    Ok(buf)
}

/// Decode any supported image format to 8-bit RGB.
pub fn decode_image(bytes: &[u8]) -> Result<RgbImage> {
    Ok(image::load_from_memory(bytes)?.to_rgb8())
}

/// Round-trip `raster` through an in-memory JPEG at `quality`.
pub fn recompress_jpeg(raster: &RgbImage, quality: u8) -> Result<RgbImage> {
    decode_image(&encode_jpeg(raster, quality)?)
}

/// Scale both dimensions by `factor` (never below one pixel).
pub fn rescale(image: &RgbImage, factor: f32) -> RgbImage {
    let scale = |v: u32| ((v as f64 * factor as f64).round() as u32).max(1);
    let (width, height) = image.dimensions();
    let (w, h) = (scale(width), scale(height));
    if (w, h) == (width, height) {
        return image.clone();
    }
    image::imageops::resize(image, w, h, FilterType::Triangle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::symbol::Symbol;

    fn stripes() -> RgbImage {
        RgbImage::from_fn(32, 16, |x, _| {
            Symbol::from_sub_digit((x / 8) as u8).color()
        })
    }

    #[test]
    fn jpeg_buffer_roundtrip_keeps_dimensions() {
        let img = stripes();
        let bytes = encode_jpeg(&img, 90).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        let back = decode_image(&bytes).unwrap();
        assert_eq!(back.dimensions(), img.dimensions());
    }

    #[test]
    fn recompression_keeps_block_colors() {
        let img = stripes();
        let back = recompress_jpeg(&img, 95).unwrap();
        for stripe in 0..4u32 {
            let symbol = crate::raster::symbol::classify_block(&back, stripe * 8, 8, 8);
            assert_eq!(symbol, Symbol::from_sub_digit(stripe as u8));
        }
    }

    #[test]
    fn rescale_rounds_and_clamps() {
        let img = stripes();
        assert_eq!(rescale(&img, 0.5).dimensions(), (16, 8));
        assert_eq!(rescale(&img, 1.0).dimensions(), (32, 16));
        assert_eq!(rescale(&img, 0.001).dimensions(), (1, 1));
    }

    #[test]
    fn png_file_is_lossless() {
        let dir = std::env::temp_dir().join(format!("tessera-io-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("stripes.png");
        let img = stripes();
        ImageFileIo.save(&img, &path, 100).unwrap();
        assert_eq!(ImageFileIo.open(&path).unwrap(), img);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn jpeg_extension_detected() {
        assert!(is_jpeg_path(Path::new("out.JPG")));
        assert!(is_jpeg_path(Path::new("a/b.jpeg")));
        assert!(!is_jpeg_path(Path::new("out.png")));
        assert!(!is_jpeg_path(Path::new("jpg")));
    }
}
