// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Encode-time dimension fitting.
//!
//! A cleartext image is JPEG-compressed before encryption, and the raster
//! grows with the compressed size. When the prospective raster would exceed
//! the configured `max_dimension`, the cleartext is shrunk and re-measured:
//!
//! 1. Initial: scale by `rescale_factor`, encode at `cleartext_quality`.
//! 2. One re-quality pass at [`REQUALITY_QUALITY`].
//! 3. Rescale the original by `rescale_factor * (1 - RESCALE_STEP * k)`,
//!    `k = 1, 2, ...`, encoded at [`REQUALITY_QUALITY`].
//!
//! Measuring needs only the cleartext length, so nothing is encrypted until
//! a candidate fits.

use image::RgbImage;

use crate::codec::config::CodecConfig;
use crate::codec::error::{Error, Result};
use crate::raster::io::{encode_jpeg, rescale};
use crate::raster::layout::Layout;

/// JPEG quality used once fitting has to shrink the cleartext.
pub const REQUALITY_QUALITY: u8 = 77;
/// Per-attempt rescale decrement.
pub const RESCALE_STEP: f32 = 0.05;
/// Attempts before giving up with [`Error::DimensionLimit`].
pub const MAX_FIT_ATTEMPTS: usize = 20;

/// How a fitting attempt produced its cleartext.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FitStrategy {
    Initial { factor: f32, quality: u8 },
    Requality { quality: u8 },
    Rescale { factor: f32, quality: u8 },
}

/// One measured candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitAttempt {
    pub strategy: FitStrategy,
    pub image_width: u32,
    pub image_height: u32,
    pub cleartext_len: usize,
    pub raster_width: u32,
    pub raster_height: u32,
}

impl FitAttempt {
    fn fits(&self, max_dimension: u32) -> bool {
        self.raster_width <= max_dimension && self.raster_height <= max_dimension
    }
}

/// The cleartext that fits, plus every attempt that led to it.
#[derive(Debug, Clone)]
pub struct FittedCleartext {
    /// JPEG bytes to encrypt.
    pub jpeg: Vec<u8>,
    /// Width of the cleartext image; the raster's reference width.
    pub reference_width: u32,
    pub layout: Layout,
    pub attempts: Vec<FitAttempt>,
}

/// Shrink `image` until its raster fits `config.max_dimension`.
///
/// `prospective` maps `(cleartext_len, reference_width)` to the raster
/// layout the pipeline would produce.
///
/// # Errors
/// - [`Error::DimensionLimit`] after [`MAX_FIT_ATTEMPTS`] candidates.
/// - Image encoding errors and errors from `prospective`.
pub fn fit_cleartext<F>(
    image: &RgbImage,
    config: &CodecConfig,
    mut prospective: F,
) -> Result<FittedCleartext>
where
    F: FnMut(usize, u32) -> Result<Layout>,
{
    let mut attempts = Vec::new();
    let mut current = rescale(image, config.rescale_factor);
    let mut strategy = FitStrategy::Initial {
        factor: config.rescale_factor,
        quality: config.cleartext_quality,
    };
    let mut quality = config.cleartext_quality;
    let mut rescale_count = 0u32;
    let mut requalified = false;

    loop {
        let jpeg = encode_jpeg(&current, quality)?;
        let (image_width, image_height) = current.dimensions();
        let layout = prospective(jpeg.len(), image_width)?;
        let attempt = FitAttempt {
            strategy,
            image_width,
            image_height,
            cleartext_len: jpeg.len(),
            raster_width: layout.pixel_width(),
            raster_height: layout.pixel_height(),
        };
        attempts.push(attempt);

        if attempt.fits(config.max_dimension) {
            return Ok(FittedCleartext { jpeg, reference_width: image_width, layout, attempts });
        }
        if attempts.len() >= MAX_FIT_ATTEMPTS {
            return Err(Error::DimensionLimit {
                width: attempt.raster_width,
                height: attempt.raster_height,
                max_dimension: config.max_dimension,
                attempts: attempts.len(),
            });
        }

        quality = REQUALITY_QUALITY;
        if !requalified {
            requalified = true;
            strategy = FitStrategy::Requality { quality };
        } else {
            rescale_count += 1;
            let factor = config.rescale_factor * (1.0 - RESCALE_STEP * rescale_count as f32);
            current = rescale(image, factor);
            strategy = FitStrategy::Rescale { factor, quality };
        }
    }
}
