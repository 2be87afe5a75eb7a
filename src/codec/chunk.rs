// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Chunked erasure coding of an arbitrarily long byte buffer.
//!
//! The buffer is split into `message_len` chunks, the short final chunk is
//! right-padded with [`PAD_BYTE`], and every chunk is encoded independently.
//! A buffer that is an exact multiple of `message_len` gets no padding chunk.

use crate::codec::ecc::ErasureCoder;
use crate::codec::error::{Error, FormatError, Result};

/// Reserved pad byte for the final chunk (`'}'`).
pub const PAD_BYTE: u8 = 0x7D;

/// Statistics from decoding every chunk of a buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErasureStats {
    /// Number of codewords decoded.
    pub chunks: usize,
    /// Total symbol errors corrected across all chunks.
    pub corrected_symbols: usize,
    /// Maximum errors found in any single chunk.
    pub max_chunk_errors: usize,
    /// Correctable errors per chunk times the number of chunks.
    pub capacity: usize,
}

/// Applies an [`ErasureCoder`] chunk by chunk.
#[derive(Debug, Clone)]
pub struct ChunkedCoder<E> {
    coder: E,
}

impl<E: ErasureCoder> ChunkedCoder<E> {
    pub fn new(coder: E) -> Self {
        Self { coder }
    }

    pub fn coder(&self) -> &E {
        &self.coder
    }

    /// Encoded length of a `data_len`-byte buffer.
    pub fn encoded_len(&self, data_len: usize) -> usize {
        data_len.div_ceil(self.coder.message_len()) * self.coder.codeword_len()
    }

    /// Pad and encode `payload`, one codeword per `message_len` chunk.
    pub fn encode(&self, payload: &[u8]) -> Vec<u8> {
        let k = self.coder.message_len();
        let mut encoded = Vec::with_capacity(self.encoded_len(payload.len()));
        let mut chunk_buf = Vec::with_capacity(k);
        for chunk in payload.chunks(k) {
            chunk_buf.clear();
            chunk_buf.extend_from_slice(chunk);
            chunk_buf.resize(k, PAD_BYTE);
            encoded.extend_from_slice(&self.coder.encode_block(&chunk_buf));
        }
        encoded
    }

    /// Decode every codeword and strip the final chunk's trailing padding.
    ///
    /// Only the final chunk can carry padding, since every earlier chunk is
    /// full-length. A payload whose last bytes happen to equal [`PAD_BYTE`]
    /// loses them here; the payload frame restores them from its length field.
    ///
    /// # Errors
    /// - [`FormatError::ChunkBoundary`] if `encoded` is not a whole number of codewords.
    /// - [`Error::Uncorrectable`] for the first chunk the coder cannot correct.
    pub fn decode(&self, encoded: &[u8]) -> Result<(Vec<u8>, ErasureStats)> {
        let n = self.coder.codeword_len();
        if encoded.len() % n != 0 {
            return Err(FormatError::ChunkBoundary { len: encoded.len(), codeword_len: n }.into());
        }

        let mut decoded = Vec::with_capacity(encoded.len() / n * self.coder.message_len());
        let mut stats = ErasureStats::default();

        for (chunk, codeword) in encoded.chunks_exact(n).enumerate() {
            let (data, errors) = self
                .coder
                .decode_block(codeword)
                .map_err(|_| Error::Uncorrectable { chunk })?;
            decoded.extend_from_slice(&data);

            stats.chunks += 1;
            stats.corrected_symbols += errors;
            stats.max_chunk_errors = stats.max_chunk_errors.max(errors);
        }

        let kept = decoded.iter().rposition(|&b| b != PAD_BYTE).map_or(0, |i| i + 1);
        let last_chunk_start = decoded.len().saturating_sub(self.coder.message_len());
        decoded.truncate(kept.max(last_chunk_start));

        stats.capacity = stats.chunks * self.coder.correction_capacity();
        Ok((decoded, stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ecc::ReedSolomon;

    fn coder() -> ChunkedCoder<ReedSolomon> {
        ChunkedCoder::new(ReedSolomon::standard())
    }

    #[test]
    fn short_message_roundtrip() {
        let c = coder();
        let msg = b"short message".to_vec();
        let encoded = c.encode(&msg);
        assert_eq!(encoded.len(), 255);
        let (decoded, stats) = c.decode(&encoded).unwrap();
        assert_eq!(decoded, msg);
        assert_eq!(stats.chunks, 1);
        assert_eq!(stats.corrected_symbols, 0);
    }

    #[test]
    fn exact_multiple_has_no_padding_chunk() {
        let c = coder();
        let msg: Vec<u8> = (0..239 * 3).map(|i| (i % 251) as u8).collect();
        let encoded = c.encode(&msg);
        assert_eq!(encoded.len(), 3 * 255);
        assert_eq!(c.encoded_len(msg.len()), 3 * 255);
        let (decoded, stats) = c.decode(&encoded).unwrap();
        assert_eq!(decoded, msg);
        assert_eq!(stats.chunks, 3);
        assert_eq!(stats.capacity, 24);
    }

    #[test]
    fn one_byte_over_adds_chunk() {
        let c = coder();
        assert_eq!(c.encoded_len(240), 2 * 255);
        assert_eq!(c.encoded_len(0), 0);
    }

    #[test]
    fn corrupted_chunks_are_corrected() {
        let c = coder();
        let msg: Vec<u8> = (0..500).map(|i| (i % 200) as u8).collect();
        let mut encoded = c.encode(&msg);
        encoded[3] ^= 0xFF;
        encoded[255 + 100] ^= 0x0F;
        encoded[255 + 101] ^= 0xF0;
        let (decoded, stats) = c.decode(&encoded).unwrap();
        assert_eq!(decoded, msg);
        assert_eq!(stats.corrected_symbols, 3);
        assert_eq!(stats.max_chunk_errors, 2);
    }

    #[test]
    fn uncorrectable_chunk_reports_index() {
        let c = coder();
        let msg = vec![0x11u8; 300];
        let mut encoded = c.encode(&msg);
        for v in encoded[255..255 + 40].iter_mut() {
            *v ^= 0xA5;
        }
        assert!(matches!(c.decode(&encoded), Err(Error::Uncorrectable { chunk: 1 })));
    }

    #[test]
    fn ragged_input_rejected() {
        let c = coder();
        let err = c.decode(&[0u8; 300]).unwrap_err();
        assert!(matches!(
            err,
            Error::Format(FormatError::ChunkBoundary { len: 300, codeword_len: 255 })
        ));
    }

    #[test]
    fn pad_bytes_in_full_chunks_survive() {
        let c = coder();
        let mut msg = vec![1u8; 239 * 2];
        msg[238] = PAD_BYTE;
        let (decoded, _) = c.decode(&c.encode(&msg)).unwrap();
        assert_eq!(decoded, msg);
    }
}
