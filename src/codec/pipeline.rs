// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Encode/decode orchestration.
//!
//! Encode: cleartext → cipher → frame → erasure coding (optional) → hex
//! packing → raster. Decode runs the exact inverse. Each step is tagged with
//! a [`Stage`] so a failure reports where it happened, and every step is
//! announced to the pipeline's [`Progress`].
//!
//! A failed run leaves the pipeline [`PipelineState::Idle`]; there is no
//! partial or resumable state.

use std::path::Path;
use std::sync::Arc;

use image::RgbImage;

use crate::codec::chunk::{ChunkedCoder, ErasureStats};
use crate::codec::config::CodecConfig;
use crate::codec::crypto::{AesGcmSivCipher, PayloadCipher};
use crate::codec::ecc::{ErasureCoder, ReedSolomon};
use crate::codec::error::{AtStage, PipelineError, Result, Stage};
use crate::codec::fit::{fit_cleartext, FitAttempt};
use crate::codec::frame::{build_frame, parse_frame, FRAME_OVERHEAD};
use crate::codec::hex::{from_hex, to_hex, HexDigit};
use crate::codec::progress::Progress;
use crate::raster::decode::{self, count_mismatches};
use crate::raster::encode;
use crate::raster::io::RasterIo;
use crate::raster::layout::Layout;

type PipelineResult<T> = std::result::Result<T, PipelineError>;

/// Lifecycle of a [`Pipeline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineState {
    #[default]
    Idle,
    Encoding,
    Encoded,
    Decoding,
    Decoded,
}

/// Output of an encode run.
#[derive(Debug, Clone)]
pub struct Encoded {
    pub raster: RgbImage,
    pub layout: Layout,
    /// The digit stream painted into the raster, kept for self-tests.
    pub digits: Vec<HexDigit>,
}

/// Output of [`Pipeline::encode_image`].
#[derive(Debug, Clone)]
pub struct ImageEncoded {
    pub encoded: Encoded,
    /// JPEG bytes of the fitted image; what a decode should return.
    pub cleartext: Vec<u8>,
    /// Width of the cleartext image that was finally encrypted.
    pub reference_width: u32,
    /// Every fitting candidate, the accepted one last.
    pub attempts: Vec<FitAttempt>,
}

/// Advisory statistics from a decode run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeReport {
    pub digits_read: usize,
    /// Complete block pairs in the raster.
    pub pairs_scanned: usize,
    /// Pairs inside the payload that had a black half.
    pub ambiguous_pairs: Vec<usize>,
    /// Digit mismatches against the encoded stream, when it is known.
    pub mismatches: Option<usize>,
    /// Present when erasure coding is enabled.
    pub erasure: Option<ErasureStats>,
}

impl DecodeReport {
    /// 100 = pristine, 0 = every correctable symbol was spent.
    ///
    /// Without erasure coding a successful decode is always 100.
    pub fn integrity_percent(&self) -> u8 {
        match &self.erasure {
            Some(stats) if stats.capacity > 0 => {
                let ratio = stats.corrected_symbols as f64 / stats.capacity as f64;
                ((1.0 - ratio) * 100.0).round().clamp(0.0, 100.0) as u8
            }
            _ => 100,
        }
    }
}

/// Output of a decode run.
#[derive(Debug, Clone)]
pub struct Decoded {
    pub payload: Vec<u8>,
    pub report: DecodeReport,
}

/// Encode followed by decode of the (optionally transported) raster.
#[derive(Debug, Clone)]
pub struct RoundTrip {
    pub encoded: Encoded,
    pub decoded: Decoded,
}

/// Block-raster encoder/decoder for one configuration.
///
/// Runs are synchronous. Independent runs on separate pipelines share no
/// state.
pub struct Pipeline<C = AesGcmSivCipher, E = ReedSolomon> {
    config: CodecConfig,
    cipher: C,
    coder: Option<ChunkedCoder<E>>,
    state: PipelineState,
    progress: Arc<Progress>,
}

impl Pipeline {
    /// Pipeline with the default cipher and RS(255, 239).
    ///
    /// # Errors
    /// [`Error::Config`](crate::Error::Config) if `config` does not validate.
    pub fn new(config: CodecConfig) -> Result<Self> {
        Self::with_components(config, AesGcmSivCipher, ReedSolomon::standard())
    }
}

impl<C: PayloadCipher, E: ErasureCoder> Pipeline<C, E> {
    /// Pipeline with a custom cipher and erasure coder.
    ///
    /// `coder` is only used when `config.erasure_coding` is enabled.
    pub fn with_components(config: CodecConfig, cipher: C, coder: E) -> Result<Self> {
        config.validate()?;
        let coder = config.erasure_coding.is_enabled().then(|| ChunkedCoder::new(coder));
        Ok(Self {
            config,
            cipher,
            coder,
            state: PipelineState::Idle,
            progress: Arc::new(Progress::new()),
        })
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Shared progress tracker; poll it from another thread or install an
    /// observer on it.
    pub fn progress(&self) -> Arc<Progress> {
        Arc::clone(&self.progress)
    }

    fn steps(&self) -> u32 {
        if self.coder.is_some() { 5 } else { 4 }
    }

    /// Raster layout for a `cleartext_len`-byte cleartext, without encrypting.
    pub fn prospective_layout(&self, cleartext_len: usize, reference_width: u32) -> Result<Layout> {
        let framed = self.cipher.ciphertext_len(cleartext_len) + FRAME_OVERHEAD;
        let coded = self.coder.as_ref().map_or(framed, |c| c.encoded_len(framed));
        Ok(Layout::new(coded * 2, self.config.block_size, reference_width)?)
    }

    /// Encrypt `cleartext` and paint it into a raster sized from `reference_width`.
    pub fn encode(&mut self, cleartext: &[u8], reference_width: u32) -> PipelineResult<Encoded> {
        self.progress.init(self.steps());
        self.state = PipelineState::Encoding;
        let result = self.encode_steps(cleartext, reference_width);
        self.settle(result, PipelineState::Encoded)
    }

    /// Fit `image` under `max_dimension`, then encode its JPEG bytes.
    ///
    /// The reference width is the width of the fitted cleartext image.
    pub fn encode_image(&mut self, image: &RgbImage) -> PipelineResult<ImageEncoded> {
        self.progress.init(self.steps() + 1);
        self.state = PipelineState::Encoding;
        let result = self.encode_image_steps(image);
        self.settle(result, PipelineState::Encoded)
    }

    /// Read the payload back from `raster`.
    ///
    /// `expected` is the digit stream that was encoded, if known; it only
    /// feeds [`DecodeReport::mismatches`].
    pub fn decode(
        &mut self,
        raster: &RgbImage,
        expected: Option<&[HexDigit]>,
    ) -> PipelineResult<Decoded> {
        self.progress.init(self.steps());
        self.state = PipelineState::Decoding;
        let result = self.decode_steps(raster, expected);
        self.settle(result, PipelineState::Decoded)
    }

    /// Encode then decode in-process, reporting digit mismatches.
    pub fn round_trip(&mut self, cleartext: &[u8], reference_width: u32) -> PipelineResult<RoundTrip> {
        let encoded = self.encode(cleartext, reference_width)?;
        let decoded = self.decode(&encoded.raster, Some(&encoded.digits))?;
        Ok(RoundTrip { encoded, decoded })
    }

    /// Like [`round_trip`](Self::round_trip), passing the raster through
    /// `transport` (e.g. JPEG recompression) before decoding.
    pub fn round_trip_with<T>(
        &mut self,
        cleartext: &[u8],
        reference_width: u32,
        transport: T,
    ) -> PipelineResult<RoundTrip>
    where
        T: FnOnce(&RgbImage) -> Result<RgbImage>,
    {
        let encoded = self.encode(cleartext, reference_width)?;
        let received = transport(&encoded.raster).at(Stage::RasterIo).inspect_err(|_| {
            self.state = PipelineState::Idle;
        })?;
        let decoded = self.decode(&received, Some(&encoded.digits))?;
        Ok(RoundTrip { encoded, decoded })
    }

    /// Save `raster` at the configured encoded-image quality.
    pub fn save_raster<R: RasterIo>(&self, io: &R, raster: &RgbImage, path: &Path) -> PipelineResult<()> {
        self.progress.enter(Stage::RasterIo);
        io.save(raster, path, self.config.encoded_image_quality).at(Stage::RasterIo)
    }

    pub fn open_raster<R: RasterIo>(&self, io: &R, path: &Path) -> PipelineResult<RgbImage> {
        self.progress.enter(Stage::RasterIo);
        io.open(path).at(Stage::RasterIo)
    }

    fn settle<T>(&mut self, result: PipelineResult<T>, done: PipelineState) -> PipelineResult<T> {
        match result {
            Ok(out) => {
                self.progress.finish();
                self.state = done;
                Ok(out)
            }
            Err(e) => {
                self.state = PipelineState::Idle;
                Err(e)
            }
        }
    }

    fn encode_steps(&self, cleartext: &[u8], reference_width: u32) -> PipelineResult<Encoded> {
        // Reject impossible geometry before paying for key derivation.
        self.prospective_layout(cleartext.len(), reference_width)
            .at(Stage::RasterEncode)?;

        self.progress.enter(Stage::Cipher);
        let ciphertext = self
            .cipher
            .encrypt(&self.config.password, cleartext)
            .at(Stage::Cipher)?;

        self.progress.enter(Stage::Framing);
        let mut bytes = build_frame(&ciphertext).at(Stage::Framing)?;

        if let Some(coder) = &self.coder {
            self.progress.enter(Stage::ErasureCoding);
            bytes = coder.encode(&bytes);
        }

        self.progress.enter(Stage::HexPacking);
        let digits = to_hex(&bytes);

        self.progress.enter(Stage::RasterEncode);
        let painted = encode::encode(&digits, self.config.block_size, reference_width)
            .at(Stage::RasterEncode)?;

        Ok(Encoded { raster: painted.raster, layout: painted.layout, digits })
    }

    fn encode_image_steps(&self, image: &RgbImage) -> PipelineResult<ImageEncoded> {
        self.progress.enter(Stage::Fitting);
        let fitted = fit_cleartext(image, &self.config, |len, width| {
            self.prospective_layout(len, width)
        })
        .at(Stage::Fitting)?;

        let encoded = self.encode_steps(&fitted.jpeg, fitted.reference_width)?;
        Ok(ImageEncoded {
            encoded,
            cleartext: fitted.jpeg,
            reference_width: fitted.reference_width,
            attempts: fitted.attempts,
        })
    }

    fn decode_steps(
        &self,
        raster: &RgbImage,
        expected: Option<&[HexDigit]>,
    ) -> PipelineResult<Decoded> {
        self.progress.enter(Stage::RasterDecode);
        let scan = decode::decode(raster, self.config.block_size, self.config.strict_classification)
            .at(Stage::RasterDecode)?;

        let mut report = DecodeReport {
            digits_read: scan.digits.len(),
            pairs_scanned: scan.pairs_scanned,
            ambiguous_pairs: scan.ambiguous_pairs,
            mismatches: expected.map(|e| count_mismatches(e, &scan.digits)),
            erasure: None,
        };

        self.progress.enter(Stage::HexPacking);
        // A stray non-black fill pair right after the payload leaves an odd
        // digit; the frame length covers everything that matters.
        let usable = scan.digits.len() & !1;
        let mut bytes = from_hex(&scan.digits[..usable]).at(Stage::HexPacking)?;

        if let Some(coder) = &self.coder {
            self.progress.enter(Stage::ErasureCoding);
            // Digits read from the fill past the last codeword are dropped.
            let whole = bytes.len() - bytes.len() % coder.coder().codeword_len();
            bytes.truncate(whole);
            let (decoded, stats) = coder.decode(&bytes).at(Stage::ErasureCoding)?;
            bytes = decoded;
            report.erasure = Some(stats);
        }

        self.progress.enter(Stage::Framing);
        let ciphertext = parse_frame(&bytes).at(Stage::Framing)?;

        self.progress.enter(Stage::Cipher);
        let payload = self
            .cipher
            .decrypt(&self.config.password, &ciphertext)
            .at(Stage::Cipher)?;

        Ok(Decoded { payload, report })
    }
}
