// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Block raster to digit stream.
//!
//! Decoding scans every complete block pair row-major, classifies both
//! halves, and then cuts the stream after the last pair in which neither
//! half reads as the black sentinel. Everything after that point is fill.
//! Black halves before it are classification ambiguities: they are counted
//! as sub-digit 0 and their pair indices are reported, or rejected outright
//! in strict mode.

use image::RgbImage;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::codec::error::{Error, LayoutError, Result};
use crate::codec::hex::HexDigit;
use crate::raster::symbol::{classify_block, Symbol};

/// Digits read from a raster plus what the scan saw along the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RasterScan {
    pub digits: Vec<HexDigit>,
    /// Complete block pairs in the raster.
    pub pairs_scanned: usize,
    /// Pair indices inside the payload with a black half.
    pub ambiguous_pairs: Vec<usize>,
}

/// Classify the `lo` and `hi` halves of every complete block pair.
///
/// Partial pairs at the right and bottom margins are skipped.
pub fn classify_pairs(raster: &RgbImage, block_size: u32) -> Result<Vec<(Symbol, Symbol)>> {
    if block_size == 0 {
        return Err(LayoutError::ZeroBlockSize.into());
    }
    let (width, height) = raster.dimensions();
    let pair_width = block_size as u64 * 2;
    let per_row = (width as u64 / pair_width) as usize;
    let rows = (height / block_size) as usize;
    let total = per_row * rows;
    if total == 0 {
        return Ok(Vec::new());
    }

    let classify = |i: usize| {
        let x = ((i % per_row) as u64 * pair_width) as u32;
        let y = (i / per_row) as u32 * block_size;
        (
            classify_block(raster, x, y, block_size),
            classify_block(raster, x + block_size, y, block_size),
        )
    };

    #[cfg(feature = "parallel")]
    let pairs = (0..total).into_par_iter().map(classify).collect();
    #[cfg(not(feature = "parallel"))]
    let pairs = (0..total).map(classify).collect();

    Ok(pairs)
}

/// Read the digit stream from `raster`.
///
/// # Errors
/// - [`LayoutError::ZeroBlockSize`] if `block_size == 0`.
/// - [`Error::ClassificationAmbiguous`] for the first ambiguous pair when
///   `strict` is set.
pub fn decode(raster: &RgbImage, block_size: u32, strict: bool) -> Result<RasterScan> {
    let pairs = classify_pairs(raster, block_size)?;
    let pairs_scanned = pairs.len();

    let end = pairs
        .iter()
        .rposition(|(lo, hi)| !lo.is_sentinel() && !hi.is_sentinel())
        .map_or(0, |i| i + 1);

    let mut digits = Vec::with_capacity(end);
    let mut ambiguous_pairs = Vec::new();
    for (pair, &(lo, hi)) in pairs[..end].iter().enumerate() {
        if lo.is_sentinel() || hi.is_sentinel() {
            if strict {
                return Err(Error::ClassificationAmbiguous { pair });
            }
            ambiguous_pairs.push(pair);
        }
        digits.push(HexDigit::from_sub_digits(lo.sub_digit(), hi.sub_digit()));
    }

    Ok(RasterScan { digits, pairs_scanned, ambiguous_pairs })
}

/// Positional differences over the common prefix plus the length difference.
pub fn count_mismatches(expected: &[HexDigit], actual: &[HexDigit]) -> usize {
    let differing = expected.iter().zip(actual).filter(|(a, b)| a != b).count();
    differing + expected.len().abs_diff(actual.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::hex::to_hex;
    use crate::raster::encode::encode;

    fn paint(raster: &mut RgbImage, x0: u32, y0: u32, size: u32, symbol: Symbol) {
        for y in y0..y0 + size {
            for x in x0..x0 + size {
                raster.put_pixel(x, y, symbol.color());
            }
        }
    }

    #[test]
    fn noiseless_roundtrip_all_block_sizes() {
        let data: Vec<u8> = (0..=255u8).collect();
        let digits = to_hex(&data);
        for bs in [1, 2, 3, 5, 8] {
            let enc = encode(&digits, bs, 300).unwrap();
            let scan = decode(&enc.raster, bs, true).unwrap();
            assert_eq!(scan.digits, digits, "block size {bs}");
            assert!(scan.ambiguous_pairs.is_empty());
            assert_eq!(scan.pairs_scanned, enc.layout.capacity());
        }
    }

    #[test]
    fn sentinel_inside_payload_is_ambiguous() {
        let digits = to_hex(&[0x12, 0x34, 0x56]);
        let mut enc = encode(&digits, 2, 64).unwrap();
        let ((x, y), _) = enc.layout.pair_origins(0, 2);
        paint(&mut enc.raster, x, y, 2, Symbol::Black);

        let scan = decode(&enc.raster, 2, false).unwrap();
        assert_eq!(scan.digits.len(), digits.len());
        assert_eq!(scan.ambiguous_pairs, vec![2]);
        // 0x3 = lo 3, hi 0; the black lo folds to 0
        assert_eq!(scan.digits[2], HexDigit::ZERO);
        assert_eq!(count_mismatches(&digits, &scan.digits), 1);

        assert!(matches!(
            decode(&enc.raster, 2, true),
            Err(Error::ClassificationAmbiguous { pair: 2 })
        ));
    }

    #[test]
    fn black_tail_pair_terminates() {
        let digits = to_hex(&[0xAB, 0xCD]);
        let mut enc = encode(&digits, 2, 64).unwrap();
        let (_, (x, y)) = enc.layout.pair_origins(0, 3);
        paint(&mut enc.raster, x, y, 2, Symbol::Black);

        let scan = decode(&enc.raster, 2, true).unwrap();
        assert_eq!(scan.digits, digits[..3].to_vec());
        assert!(scan.ambiguous_pairs.is_empty());
    }

    #[test]
    fn partial_margin_pairs_ignored() {
        let digits = to_hex(b"margin");
        let enc = encode(&digits, 4, 100).unwrap();
        let (w, h) = enc.raster.dimensions();
        let mut padded = RgbImage::from_pixel(w + 5, h + 3, Symbol::White.color());
        image::imageops::replace(&mut padded, &enc.raster, 0, 0);

        let scan = decode(&padded, 4, true).unwrap();
        assert_eq!(scan.pairs_scanned, enc.layout.capacity());
        assert_eq!(scan.digits, digits);
    }

    #[test]
    fn all_black_reads_nothing() {
        let img = RgbImage::from_pixel(16, 4, Symbol::Black.color());
        let scan = decode(&img, 2, true).unwrap();
        assert!(scan.digits.is_empty());
        assert_eq!(scan.pairs_scanned, 8);
    }

    #[test]
    fn zero_block_size_rejected() {
        let img = RgbImage::new(4, 4);
        assert!(matches!(
            decode(&img, 0, false),
            Err(Error::Layout(LayoutError::ZeroBlockSize))
        ));
    }

    #[test]
    fn mismatch_counts_length_difference() {
        let a = to_hex(b"abcd");
        let mut b = a.clone();
        b.truncate(5);
        assert_eq!(count_mismatches(&a, &b), 3);
        assert_eq!(count_mismatches(&a, &a), 0);
        b[0] = HexDigit::masked(b[0].value() + 1);
        assert_eq!(count_mismatches(&a, &b), 4);
    }
}
