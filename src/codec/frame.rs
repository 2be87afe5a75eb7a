// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Payload frame construction and parsing.
//!
//! The frame wraps the ciphertext before erasure coding and hex packing:
//!
//! ```text
//! [4 bytes ] body length (big-endian u32)
//! [N bytes ] body (cipher output)
//! [4 bytes ] CRC-32 of everything above
//! ```
//!
//! The declared length lets the decoder ignore junk digits read past the end
//! of the payload and put back trailing pad-valued bytes that chunk decoding
//! stripped.

use crate::codec::chunk::PAD_BYTE;
use crate::codec::error::{Error, Result};

/// length(4) + crc(4).
pub const FRAME_OVERHEAD: usize = 8;

/// Build a frame around `body`.
pub fn build_frame(body: &[u8]) -> Result<Vec<u8>> {
    let len = u32::try_from(body.len()).map_err(|_| Error::FrameCorrupted)?;

    let mut frame = Vec::with_capacity(body.len() + FRAME_OVERHEAD);
    frame.extend_from_slice(&len.to_be_bytes());
    frame.extend_from_slice(body);

    let crc = crc32fast::hash(&frame);
    frame.extend_from_slice(&crc.to_be_bytes());
    Ok(frame)
}

/// Parse a frame, verifying the CRC, and return its body.
///
/// `data` may be longer than the frame (trailing junk is ignored) or short by
/// a run of [`PAD_BYTE`]s at the tail (restored before the CRC check).
///
/// # Errors
/// [`Error::FrameCorrupted`] if the header is missing, the declared length is
/// impossible, or the CRC does not match.
pub fn parse_frame(data: &[u8]) -> Result<Vec<u8>> {
    if data.len() < 4 {
        return Err(Error::FrameCorrupted);
    }
    let body_len = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;
    let total = body_len.checked_add(FRAME_OVERHEAD).ok_or(Error::FrameCorrupted)?;

    let mut frame = data[..data.len().min(total)].to_vec();
    if frame.len() < total {
        // Chunk decoding strips at most one chunk's worth of pad bytes; a
        // larger gap is a corrupted length field.
        let missing = total - frame.len();
        if missing > u8::MAX as usize {
            return Err(Error::FrameCorrupted);
        }
        frame.resize(total, PAD_BYTE);
    }

    let (payload, crc_bytes) = frame.split_at(total - 4);
    let stored = u32::from_be_bytes([crc_bytes[0], crc_bytes[1], crc_bytes[2], crc_bytes[3]]);
    if stored != crc32fast::hash(payload) {
        return Err(Error::FrameCorrupted);
    }

    Ok(payload[4..].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let body = b"ciphertext bytes".to_vec();
        let frame = build_frame(&body).unwrap();
        assert_eq!(frame.len(), body.len() + FRAME_OVERHEAD);
        assert_eq!(parse_frame(&frame).unwrap(), body);
    }

    #[test]
    fn empty_body() {
        let frame = build_frame(&[]).unwrap();
        assert_eq!(parse_frame(&frame).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn trailing_junk_ignored() {
        let body = vec![3u8; 40];
        let mut frame = build_frame(&body).unwrap();
        frame.extend_from_slice(&[0xEE; 13]);
        assert_eq!(parse_frame(&frame).unwrap(), body);
    }

    #[test]
    fn stripped_pad_tail_restored() {
        // Find a body whose CRC ends in the pad byte, then strip it.
        let (body, frame) = (0u32..)
            .map(|i| {
                let body = i.to_le_bytes().to_vec();
                let frame = build_frame(&body).unwrap();
                (body, frame)
            })
            .find(|(_, f)| *f.last().unwrap() == PAD_BYTE)
            .unwrap();
        let stripped = &frame[..frame.len() - 1];
        assert_eq!(parse_frame(stripped).unwrap(), body);
    }

    #[test]
    fn crc_mismatch_detected() {
        let mut frame = build_frame(b"payload").unwrap();
        frame[6] ^= 0x40;
        assert!(matches!(parse_frame(&frame), Err(Error::FrameCorrupted)));
    }

    #[test]
    fn truncated_frame_detected() {
        let frame = build_frame(&[0xAB; 600]).unwrap();
        assert!(matches!(parse_frame(&frame[..300]), Err(Error::FrameCorrupted)));
        assert!(matches!(parse_frame(&frame[..2]), Err(Error::FrameCorrupted)));
    }
}
