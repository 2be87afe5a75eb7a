// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Hex packing: bytes to hexadecimal digits and back.
//!
//! The raster codec works on [`HexDigit`]s, each of which splits into two
//! base-4 sub-digits (`lo = d % 4`, `hi = d / 4`) drawn as a block pair.
//! Bytes are packed high nibble first.

use core::fmt;

use crate::codec::error::FormatError;

/// A hexadecimal digit in `[0, 16)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HexDigit(u8);

impl HexDigit {
    pub const ZERO: HexDigit = HexDigit(0);

    /// Returns `None` if `value >= 16`.
    pub const fn new(value: u8) -> Option<Self> {
        if value < 16 {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Keep the low four bits of `value`.
    pub const fn masked(value: u8) -> Self {
        Self(value & 0x0F)
    }

    pub const fn value(self) -> u8 {
        self.0
    }

    /// Low base-4 sub-digit, `d % 4`.
    pub const fn lo(self) -> u8 {
        self.0 % 4
    }

    /// High base-4 sub-digit, `d / 4`.
    pub const fn hi(self) -> u8 {
        self.0 / 4
    }

    /// Recompose `(lo + hi * 4) mod 16`.
    pub const fn from_sub_digits(lo: u8, hi: u8) -> Self {
        Self::masked(lo.wrapping_add(hi.wrapping_mul(4)))
    }

    /// Lowercase ASCII character for this digit.
    pub const fn to_char(self) -> char {
        let c = if self.0 < 10 { b'0' + self.0 } else { b'a' + self.0 - 10 };
        c as char
    }

    pub fn from_char(c: char) -> Option<Self> {
        c.to_digit(16).map(|v| Self(v as u8))
    }
}

impl fmt::Display for HexDigit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// Pack bytes into `2 * bytes.len()` digits, high nibble first.
pub fn to_hex(bytes: &[u8]) -> Vec<HexDigit> {
    let mut digits = Vec::with_capacity(bytes.len() * 2);
    for &b in bytes {
        digits.push(HexDigit(b >> 4));
        digits.push(HexDigit(b & 0x0F));
    }
    digits
}

/// Unpack digits into bytes.
///
/// # Errors
/// [`FormatError::OddLength`] if the digit count is odd.
pub fn from_hex(digits: &[HexDigit]) -> Result<Vec<u8>, FormatError> {
    if digits.len() % 2 != 0 {
        return Err(FormatError::OddLength { len: digits.len() });
    }
    Ok(digits
        .chunks_exact(2)
        .map(|pair| (pair[0].0 << 4) | pair[1].0)
        .collect())
}

/// Lowercase textual form of a digit stream.
pub fn to_hex_string(digits: &[HexDigit]) -> String {
    digits.iter().map(|d| d.to_char()).collect()
}

/// Parse a textual digit stream (either case).
pub fn parse_hex_str(text: &str) -> Result<Vec<HexDigit>, FormatError> {
    text.chars()
        .enumerate()
        .map(|(offset, c)| HexDigit::from_char(c).ok_or(FormatError::InvalidDigit { offset, found: c }))
        .collect()
}

/// Parse a textual digit stream straight to bytes.
pub fn from_hex_str(text: &str) -> Result<Vec<u8>, FormatError> {
    from_hex(&parse_hex_str(text)?)
}
