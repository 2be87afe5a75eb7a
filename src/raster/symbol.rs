// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Block symbols, the palette, and the block classifier.
//!
//! A block carries one base-4 sub-digit as a saturated color. Black is the
//! sentinel for unwritten raster area and never encodes data.

use image::{Rgb, RgbImage};

/// Channel average above which all three channels read as white.
pub const WHITE_THRESHOLD: f64 = 150.0;
/// Channel average below which all three channels read as black.
pub const BLACK_THRESHOLD: f64 = 50.0;
/// Only every `SAMPLE_STRIDE`-th pixel of a block is sampled.
pub const SAMPLE_STRIDE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Symbol {
    White = 0,
    Red = 1,
    Green = 2,
    Blue = 3,
    /// Sentinel: end of payload / unwritten fill.
    Black = 4,
}

impl Symbol {
    /// Symbol for a sub-digit in `[0, 3]`. Anything else maps to the sentinel.
    pub const fn from_sub_digit(value: u8) -> Self {
        match value {
            0 => Self::White,
            1 => Self::Red,
            2 => Self::Green,
            3 => Self::Blue,
            _ => Self::Black,
        }
    }

    pub const fn value(self) -> u8 {
        self as u8
    }

    pub const fn is_sentinel(self) -> bool {
        matches!(self, Self::Black)
    }

    /// Sub-digit value for digit arithmetic; the sentinel folds to 0.
    pub const fn sub_digit(self) -> u8 {
        match self {
            Self::Black => 0,
            other => other as u8,
        }
    }

    pub const fn color(self) -> Rgb<u8> {
        match self {
            Self::White => Rgb([255, 255, 255]),
            Self::Red => Rgb([255, 0, 0]),
            Self::Green => Rgb([0, 255, 0]),
            Self::Blue => Rgb([0, 0, 255]),
            Self::Black => Rgb([0, 0, 0]),
        }
    }

    /// Quantize mean channel values to a symbol.
    ///
    /// White if all channels exceed [`WHITE_THRESHOLD`], black if all fall
    /// below [`BLACK_THRESHOLD`], otherwise the strictly dominant channel.
    /// Ties fall back to white.
    pub fn from_means(r: f64, g: f64, b: f64) -> Self {
        if r > WHITE_THRESHOLD && g > WHITE_THRESHOLD && b > WHITE_THRESHOLD {
            return Self::White;
        }
        if r < BLACK_THRESHOLD && g < BLACK_THRESHOLD && b < BLACK_THRESHOLD {
            return Self::Black;
        }
        if r > g && r > b {
            Self::Red
        } else if g > r && g > b {
            Self::Green
        } else if b > r && b > g {
            Self::Blue
        } else {
            Self::White
        }
    }
}

/// Classify the `size`×`size` block with top-left corner `(x0, y0)`.
///
/// Averages every [`SAMPLE_STRIDE`]-th pixel in row-major order within the
/// block. Pixels outside the image are skipped; a block entirely outside
/// reads as the sentinel.
pub fn classify_block(raster: &RgbImage, x0: u32, y0: u32, size: u32) -> Symbol {
    let (width, height) = raster.dimensions();
    let side = size as usize;
    let mut sums = [0.0f64; 3];
    let mut count = 0usize;

    for i in (0..side * side).step_by(SAMPLE_STRIDE) {
        let x = x0 as u64 + (i % side) as u64;
        let y = y0 as u64 + (i / side) as u64;
        if x >= width as u64 || y >= height as u64 {
            continue;
        }
        let px = raster.get_pixel(x as u32, y as u32);
        for (sum, &channel) in sums.iter_mut().zip(px.0.iter()) {
            *sum += channel as f64;
        }
        count += 1;
    }

    if count == 0 {
        return Symbol::Black;
    }
    let n = count as f64;
    Symbol::from_means(sums[0] / n, sums[1] / n, sums[2] / n)
}
