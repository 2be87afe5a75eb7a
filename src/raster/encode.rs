// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Digit stream to block raster.

use image::RgbImage;

use crate::codec::error::LayoutError;
use crate::codec::hex::HexDigit;
use crate::raster::layout::Layout;
use crate::raster::symbol::Symbol;

/// An encoded raster and the geometry it was laid out with.
#[derive(Debug, Clone)]
pub struct EncodedRaster {
    pub raster: RgbImage,
    pub layout: Layout,
}

/// Paint `digits` as block pairs.
///
/// Digit `i` goes to pair `(i / pairs_per_row, i % pairs_per_row)`: its low
/// sub-digit in the left block, its high sub-digit in the right block.
/// Everything past the last digit stays sentinel black.
///
/// # Errors
/// Any [`LayoutError`] from [`Layout::new`]; nothing is allocated in that case.
pub fn encode(
    digits: &[HexDigit],
    block_size: u32,
    reference_width: u32,
) -> Result<EncodedRaster, LayoutError> {
    let layout = Layout::new(digits.len(), block_size, reference_width)?;
    let (width, height) = layout.pixel_dimensions();
    let mut raster = RgbImage::from_pixel(width, height, Symbol::Black.color());

    for (i, digit) in digits.iter().enumerate() {
        let Some((row, col)) = layout.cell(i) else { break };
        let (lo_at, hi_at) = layout.pair_origins(row, col);
        fill_block(&mut raster, lo_at, block_size, Symbol::from_sub_digit(digit.lo()));
        fill_block(&mut raster, hi_at, block_size, Symbol::from_sub_digit(digit.hi()));
    }

    Ok(EncodedRaster { raster, layout })
}

fn fill_block(raster: &mut RgbImage, (x0, y0): (u32, u32), size: u32, symbol: Symbol) {
    let color = symbol.color();
    for y in y0..y0 + size {
        for x in x0..x0 + size {
            raster.put_pixel(x, y, color);
        }
    }
}
