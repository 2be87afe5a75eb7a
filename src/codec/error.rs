// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Error types for the block-raster codec and its pipeline.
//!
//! [`Error`] covers every failure mode from cipher through raster I/O.
//! [`PipelineError`] wraps an [`Error`] with the [`Stage`] that produced it so
//! callers can report which step of a run failed.

use core::fmt;

/// Malformed digit streams and chunk boundaries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// Hex digits pair up into bytes, so the count must be even.
    #[error("odd hex digit count: {len}")]
    OddLength { len: usize },
    /// A character outside `[0-9a-fA-F]` in a textual hex stream.
    #[error("invalid hex character {found:?} at offset {offset}")]
    InvalidDigit { offset: usize, found: char },
    /// Erasure-coded data must be a whole number of codewords.
    #[error("{len} bytes is not a multiple of the {codeword_len}-byte codeword length")]
    ChunkBoundary { len: usize, codeword_len: usize },
}

/// Raster geometry that cannot be laid out.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("reference width must be positive")]
    ZeroReferenceWidth,
    #[error("block size must be positive")]
    ZeroBlockSize,
    /// The target width is narrower than a single block pair.
    #[error("target width {target_width}px cannot hold a {block_size}px block pair")]
    NoPairsPerRow { target_width: u64, block_size: u32 },
    #[error("nothing to encode: empty digit stream")]
    EmptyPayload,
    #[error("raster of {width}x{height}px exceeds addressable size")]
    Oversized { width: u64, height: u64 },
}

/// Invalid [`CodecConfig`](crate::codec::config::CodecConfig) values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("password must not be empty")]
    EmptyPassword,
    #[error("block size must be at least 1")]
    ZeroBlockSize,
    #[error("{name} quality {value} outside 1..=100")]
    Quality { name: &'static str, value: u8 },
    #[error("rescale factor {0} outside (0, 1]")]
    RescaleFactor(f32),
    #[error("max dimension must be positive")]
    ZeroMaxDimension,
    #[error("erasure code ({codeword_len}, {message_len}) is invalid")]
    ErasureCode { codeword_len: usize, message_len: usize },
}

/// Errors that can occur while encoding or decoding a block raster.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("format error: {0}")]
    Format(#[from] FormatError),
    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// The erasure coder could not correct a chunk. No partial result is kept.
    #[error("erasure coding: chunk {chunk} has too many errors to correct")]
    Uncorrectable { chunk: usize },
    /// Wrong password or corrupted ciphertext.
    #[error("decryption failed (wrong password or corrupted ciphertext)")]
    Cipher,
    /// Length or CRC check of the payload frame failed.
    #[error("payload frame corrupted")]
    FrameCorrupted,
    /// A sentinel block appeared before the end of the payload and strict
    /// classification is enabled.
    #[error("sentinel block inside payload at pair {pair}")]
    ClassificationAmbiguous { pair: usize },
    /// Encode-time fitting could not bring the raster under the limit.
    #[error("raster {width}x{height}px still exceeds {max_dimension}px after {attempts} attempts")]
    DimensionLimit {
        width: u32,
        height: u32,
        max_dimension: u32,
        attempts: usize,
    },
    #[error("image codec: {0}")]
    Image(#[from] image::ImageError),
    #[error("i/o: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline step, used to attribute failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Fitting,
    Cipher,
    Framing,
    ErasureCoding,
    HexPacking,
    RasterEncode,
    RasterDecode,
    RasterIo,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fitting => "dimension fitting",
            Self::Cipher => "cipher",
            Self::Framing => "framing",
            Self::ErasureCoding => "erasure coding",
            Self::HexPacking => "hex packing",
            Self::RasterEncode => "raster encode",
            Self::RasterDecode => "raster decode",
            Self::RasterIo => "raster i/o",
        };
        f.write_str(name)
    }
}

/// An [`Error`] tagged with the pipeline stage that raised it.
#[derive(Debug, thiserror::Error)]
#[error("{stage} failed: {source}")]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub source: Error,
}

impl PipelineError {
    pub fn new(stage: Stage, source: Error) -> Self {
        Self { stage, source }
    }
}

/// Attach a [`Stage`] to a fallible step.
pub(crate) trait AtStage<T> {
    fn at(self, stage: Stage) -> std::result::Result<T, PipelineError>;
}

impl<T, E: Into<Error>> AtStage<T> for std::result::Result<T, E> {
    fn at(self, stage: Stage) -> std::result::Result<T, PipelineError> {
        self.map_err(|e| PipelineError::new(stage, e.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_error_names_stage() {
        let err = PipelineError::new(Stage::ErasureCoding, Error::Uncorrectable { chunk: 3 });
        let msg = err.to_string();
        assert!(msg.starts_with("erasure coding failed"), "{msg}");
        assert!(msg.contains("chunk 3"), "{msg}");
    }

    #[test]
    fn sub_errors_convert() {
        let e: Error = FormatError::OddLength { len: 7 }.into();
        assert!(matches!(e, Error::Format(FormatError::OddLength { len: 7 })));
        let e: Error = LayoutError::ZeroReferenceWidth.into();
        assert!(matches!(e, Error::Layout(LayoutError::ZeroReferenceWidth)));
    }

    #[test]
    fn at_stage_wraps() {
        let r: std::result::Result<(), FormatError> = Err(FormatError::OddLength { len: 1 });
        let err = r.at(Stage::HexPacking).unwrap_err();
        assert_eq!(err.stage, Stage::HexPacking);
        assert!(matches!(err.source, Error::Format(_)));
    }
}
