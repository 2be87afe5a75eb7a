// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Raster layout derivation.
//!
//! The raster is sized from the digit count and a reference width (usually
//! the width of the cleartext image):
//!
//! ```text
//! target_width  = 2^(ceil(log2(reference_width)) + 1)
//! raster_width  = floor(target_width / (2 * block_size))   block pairs per row
//! raster_height = ceil(digits / raster_width)              block rows
//! pixels        = (raster_width * 2 * block_size) x (raster_height * block_size)
//! ```
//!
//! The target is one power of two above the reference, which leaves headroom
//! for the pair layout.

use crate::codec::error::LayoutError;

/// Geometry of an encoded raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    block_size: u32,
    pairs_per_row: u32,
    rows: u32,
    digits: usize,
}

/// `2^(ceil(log2(reference_width)) + 1)`.
pub fn target_width(reference_width: u32) -> Result<u64, LayoutError> {
    if reference_width == 0 {
        return Err(LayoutError::ZeroReferenceWidth);
    }
    Ok((reference_width as u64).next_power_of_two() * 2)
}

impl Layout {
    /// Lay out `digits` hex digits.
    ///
    /// # Errors
    /// - [`LayoutError::ZeroReferenceWidth`] / [`LayoutError::ZeroBlockSize`].
    /// - [`LayoutError::NoPairsPerRow`] if a single block pair is wider than the target.
    /// - [`LayoutError::EmptyPayload`] if `digits == 0`.
    /// - [`LayoutError::Oversized`] if the pixel dimensions overflow `u32`.
    pub fn new(digits: usize, block_size: u32, reference_width: u32) -> Result<Self, LayoutError> {
        if block_size == 0 {
            return Err(LayoutError::ZeroBlockSize);
        }
        let target = target_width(reference_width)?;
        let pairs_per_row = target / (2 * block_size as u64);
        if pairs_per_row == 0 {
            return Err(LayoutError::NoPairsPerRow { target_width: target, block_size });
        }
        if digits == 0 {
            return Err(LayoutError::EmptyPayload);
        }
        let rows = (digits as u64).div_ceil(pairs_per_row);

        let width = pairs_per_row * 2 * block_size as u64;
        let height = rows * block_size as u64;
        let fits = width <= u32::MAX as u64
            && height <= u32::MAX as u64
            && width
                .checked_mul(height)
                .and_then(|px| px.checked_mul(3))
                .is_some_and(|bytes| bytes <= isize::MAX as u64);
        if !fits {
            return Err(LayoutError::Oversized { width, height });
        }

        Ok(Self {
            block_size,
            pairs_per_row: pairs_per_row as u32,
            rows: rows as u32,
            digits,
        })
    }

    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    /// Block pairs per row (`raster_width`).
    pub fn pairs_per_row(&self) -> u32 {
        self.pairs_per_row
    }

    /// Block rows (`raster_height`).
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of digits laid out.
    pub fn digits(&self) -> usize {
        self.digits
    }

    /// Pair slots in the raster, written or not.
    pub fn capacity(&self) -> usize {
        self.pairs_per_row as usize * self.rows as usize
    }

    pub fn pixel_width(&self) -> u32 {
        self.pairs_per_row * 2 * self.block_size
    }

    pub fn pixel_height(&self) -> u32 {
        self.rows * self.block_size
    }

    pub fn pixel_dimensions(&self) -> (u32, u32) {
        (self.pixel_width(), self.pixel_height())
    }

    /// `(row, col)` of digit `index`, if it is part of the payload.
    pub fn cell(&self, index: usize) -> Option<(u32, u32)> {
        if index >= self.digits {
            return None;
        }
        let per_row = self.pairs_per_row as usize;
        Some(((index / per_row) as u32, (index % per_row) as u32))
    }

    /// Digit index stored at `(row, col)`, if any.
    pub fn index(&self, row: u32, col: u32) -> Option<usize> {
        if col >= self.pairs_per_row {
            return None;
        }
        let index = row as usize * self.pairs_per_row as usize + col as usize;
        (index < self.digits).then_some(index)
    }

    /// Pixel origins of the `lo` and `hi` blocks of pair `(row, col)`.
    pub fn pair_origins(&self, row: u32, col: u32) -> ((u32, u32), (u32, u32)) {
        let x = col * self.block_size * 2;
        let y = row * self.block_size;
        ((x, y), (x + self.block_size, y))
    }
}
