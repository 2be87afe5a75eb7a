// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Everything around the raster core: the payload chain (cipher, frame,
//! erasure coding, hex packing), configuration, fitting, progress and the
//! pipeline that ties them together.

pub mod chunk;
pub mod config;
pub mod crypto;
pub mod ecc;
pub mod error;
pub mod fit;
pub mod frame;
pub mod hex;
pub mod pipeline;
pub mod progress;

pub use chunk::{ChunkedCoder, ErasureStats, PAD_BYTE};
pub use config::{CodecConfig, ErasureCoding};
pub use crypto::{AesGcmSivCipher, PayloadCipher};
pub use ecc::{ErasureCoder, ReedSolomon};
pub use error::{ConfigError, Error, FormatError, LayoutError, PipelineError, Result, Stage};
pub use hex::HexDigit;
pub use pipeline::{DecodeReport, Decoded, Encoded, ImageEncoded, Pipeline, PipelineState, RoundTrip};
