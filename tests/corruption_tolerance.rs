// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Symbol corruption against the RS(255, 239) erasure coder.
//!
//! Byte `j` of the coded buffer is drawn by pairs `2j` (high nibble) and
//! `2j + 1` (low nibble). Repainting one block of pair `2j` corrupts exactly
//! one byte, i.e. one RS symbol of the chunk containing `j`.

use tessera_core::{CodecConfig, Encoded, Error, ErasureCoding, Pipeline, Stage, Symbol};

const BLOCK: u32 = 3;

fn pipeline() -> Pipeline {
    let config = CodecConfig::new("corruption")
        .with_block_size(BLOCK)
        .with_erasure_coding(ErasureCoding::Enabled);
    Pipeline::new(config).unwrap()
}

/// Change the `lo` sub-digit of the pair carrying byte `byte`'s high nibble.
fn corrupt_byte(encoded: &mut Encoded, byte: usize) {
    let pair = 2 * byte;
    let digit = encoded.digits[pair];
    let replacement = Symbol::from_sub_digit((digit.lo() + 1) % 4);
    let (row, col) = encoded.layout.cell(pair).unwrap();
    let ((x0, y0), _) = encoded.layout.pair_origins(row, col);
    for y in y0..y0 + BLOCK {
        for x in x0..x0 + BLOCK {
            encoded.raster.put_pixel(x, y, replacement.color());
        }
    }
}

#[test]
fn flips_within_capacity_decode_exactly() {
    let mut p = pipeline();
    let cleartext = b"eight symbol errors per codeword are still correctable".to_vec();
    let mut encoded = p.encode(&cleartext, 512).unwrap();

    // Eight errors in chunk 0, spread out.
    for byte in (0..8).map(|i| i * 29 + 3) {
        corrupt_byte(&mut encoded, byte);
    }

    let decoded = p.decode(&encoded.raster, Some(&encoded.digits)).unwrap();
    assert_eq!(decoded.payload, cleartext);
    assert_eq!(decoded.report.mismatches, Some(8));
    let stats = decoded.report.erasure.as_ref().unwrap();
    assert_eq!(stats.corrected_symbols, 8);
    assert_eq!(stats.max_chunk_errors, 8);
    assert_eq!(stats.capacity, 8);
    assert_eq!(decoded.report.integrity_percent(), 0);
}

#[test]
fn flips_spread_over_chunks_decode_exactly() {
    let mut p = pipeline();
    let cleartext: Vec<u8> = (0..600u32).map(|i| (i % 253) as u8).collect();
    let mut encoded = p.encode(&cleartext, 512).unwrap();
    let chunks = encoded.digits.len() / (2 * 255);
    assert_eq!(chunks, 3);

    // Five errors in every chunk.
    for chunk in 0..chunks {
        for i in 0..5 {
            corrupt_byte(&mut encoded, chunk * 255 + i * 40 + 1);
        }
    }

    let decoded = p.decode(&encoded.raster, Some(&encoded.digits)).unwrap();
    assert_eq!(decoded.payload, cleartext);
    let stats = decoded.report.erasure.as_ref().unwrap();
    assert_eq!(stats.chunks, 3);
    assert_eq!(stats.corrected_symbols, 15);
    assert_eq!(stats.max_chunk_errors, 5);
    assert_eq!(stats.capacity, 24);
}

#[test]
fn flips_beyond_capacity_are_uncorrectable() {
    let mut p = pipeline();
    let mut encoded = p.encode(b"too much damage", 512).unwrap();

    for byte in 0..40 {
        corrupt_byte(&mut encoded, byte * 6);
    }

    let err = p.decode(&encoded.raster, None).unwrap_err();
    assert_eq!(err.stage, Stage::ErasureCoding);
    assert!(matches!(err.source, Error::Uncorrectable { chunk: 0 }));
}

#[test]
fn without_ecc_a_single_flip_is_fatal() {
    let config = CodecConfig::new("corruption").with_block_size(BLOCK);
    let mut p = Pipeline::new(config).unwrap();
    let mut encoded = p.encode(b"fragile", 512).unwrap();
    // Byte 10 lies inside the ciphertext body.
    corrupt_byte(&mut encoded, 10);

    let err = p.decode(&encoded.raster, None).unwrap_err();
    assert_eq!(err.stage, Stage::Framing);
    assert!(matches!(err.source, Error::FrameCorrupted));
}
