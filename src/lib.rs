// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! # tessera-core
//!
//! Visual codec that turns an encrypted payload into a raster of solid color
//! blocks and reads it back from a possibly degraded copy of that raster.
//!
//! Every hex digit of the payload becomes a pair of square blocks, one per
//! base-4 sub-digit, drawn in white, red, green or blue. Black marks the
//! unwritten area after the payload. Decoding samples each block, quantizes
//! its mean color, and reassembles the digits.
//!
//! The payload chain is AES-256-GCM-SIV (Argon2id key) → CRC-32 frame →
//! optional chunked Reed-Solomon RS(255, 239) → hex digits → raster.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use tessera_core::{CodecConfig, Pipeline};
//!
//! let mut pipeline = Pipeline::new(CodecConfig::new("helloworld")).unwrap();
//! let encoded = pipeline.encode(b"0123456789", 800).unwrap();
//! let decoded = pipeline.decode(&encoded.raster, Some(&encoded.digits)).unwrap();
//! assert_eq!(decoded.payload, b"0123456789");
//! assert_eq!(decoded.report.mismatches, Some(0));
//! ```

pub mod codec;
pub mod raster;

pub use codec::error::{ConfigError, Error, FormatError, LayoutError, PipelineError, Result, Stage};
pub use codec::{
    AesGcmSivCipher, ChunkedCoder, CodecConfig, DecodeReport, Decoded, Encoded, ErasureCoder,
    ErasureCoding, ErasureStats, HexDigit, ImageEncoded, PayloadCipher, Pipeline, PipelineState,
    ReedSolomon, RoundTrip,
};
pub use codec::fit::{FitAttempt, FitStrategy};
pub use codec::hex::{from_hex, from_hex_str, to_hex, to_hex_string};
pub use codec::progress::{self as progress, Progress};
pub use raster::{count_mismatches, ImageFileIo, Layout, RasterIo, RasterScan, Symbol};
