// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Pipeline configuration.

use crate::codec::ecc::{ECC_K, ECC_N};
use crate::codec::error::ConfigError;

/// Default block edge in pixels.
pub const DEFAULT_BLOCK_SIZE: u32 = 2;

/// Default raster dimension ceiling for encode-time fitting.
pub const DEFAULT_MAX_DIMENSION: u32 = 2048;

/// Whether the frame is protected by chunked Reed-Solomon coding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErasureCoding {
    #[default]
    Disabled,
    /// RS([`ECC_N`], [`ECC_K`]).
    Enabled,
}

impl ErasureCoding {
    /// `(codeword_length, message_length)` when enabled.
    pub fn parameters(self) -> Option<(usize, usize)> {
        match self {
            Self::Disabled => None,
            Self::Enabled => Some((ECC_N, ECC_K)),
        }
    }

    pub fn is_enabled(self) -> bool {
        self == Self::Enabled
    }
}

/// Every option of an encode/decode run.
#[derive(Debug, Clone, PartialEq)]
pub struct CodecConfig {
    pub password: String,
    /// Pixels per block edge.
    pub block_size: u32,
    pub erasure_coding: ErasureCoding,
    /// Downscale applied to the cleartext image before encryption, in `(0, 1]`.
    pub rescale_factor: f32,
    /// JPEG quality of the cleartext image that gets encrypted.
    pub cleartext_quality: u8,
    /// JPEG quality of the saved raster.
    pub encoded_image_quality: u8,
    /// Raster width/height ceiling for [`Pipeline::encode_image`](crate::Pipeline::encode_image).
    pub max_dimension: u32,
    /// Fail on sentinel blocks inside the payload instead of folding them to 0.
    pub strict_classification: bool,
}

impl CodecConfig {
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
            block_size: DEFAULT_BLOCK_SIZE,
            erasure_coding: ErasureCoding::Disabled,
            rescale_factor: 1.0,
            cleartext_quality: 95,
            encoded_image_quality: 100,
            max_dimension: DEFAULT_MAX_DIMENSION,
            strict_classification: false,
        }
    }

    pub fn with_block_size(mut self, block_size: u32) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn with_erasure_coding(mut self, erasure_coding: ErasureCoding) -> Self {
        self.erasure_coding = erasure_coding;
        self
    }

    pub fn with_rescale_factor(mut self, rescale_factor: f32) -> Self {
        self.rescale_factor = rescale_factor;
        self
    }

    pub fn with_cleartext_quality(mut self, quality: u8) -> Self {
        self.cleartext_quality = quality;
        self
    }

    pub fn with_encoded_image_quality(mut self, quality: u8) -> Self {
        self.encoded_image_quality = quality;
        self
    }

    pub fn with_max_dimension(mut self, max_dimension: u32) -> Self {
        self.max_dimension = max_dimension;
        self
    }

    pub fn with_strict_classification(mut self, strict: bool) -> Self {
        self.strict_classification = strict;
        self
    }

    /// Check every option.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.password.is_empty() {
            return Err(ConfigError::EmptyPassword);
        }
        if self.block_size == 0 {
            return Err(ConfigError::ZeroBlockSize);
        }
        for (name, value) in [
            ("cleartext", self.cleartext_quality),
            ("encoded image", self.encoded_image_quality),
        ] {
            if !(1..=100).contains(&value) {
                return Err(ConfigError::Quality { name, value });
            }
        }
        if !(self.rescale_factor > 0.0 && self.rescale_factor <= 1.0) {
            return Err(ConfigError::RescaleFactor(self.rescale_factor));
        }
        if self.max_dimension == 0 {
            return Err(ConfigError::ZeroMaxDimension);
        }
        Ok(())
    }
}
