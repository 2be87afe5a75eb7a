// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Reed-Solomon error correction over GF(2^8).
//!
//! Implements RS(n, k) with the primitive polynomial 0x11D (x^8+x^4+x^3+x^2+1).
//! Systematic encoding; Berlekamp-Massey decoding with Chien search and the
//! Forney algorithm. Codes with `n < 255` are shortened codes: the codeword
//! is conceptually zero-padded at the front to 255 symbols.
//!
//! The pipeline only needs the [`ErasureCoder`] contract; [`ReedSolomon`] is
//! the implementation it ships with.

use crate::codec::error::ConfigError;

/// Primitive polynomial for GF(2^8): x^8 + x^4 + x^3 + x^2 + 1 = 0x11D.
const PRIM_POLY: u16 = 0x11D;

/// Maximum RS block size.
pub const N_MAX: usize = 255;

/// Codeword length used when erasure coding is enabled.
pub const ECC_N: usize = 255;
/// Message length used when erasure coding is enabled.
pub const ECC_K: usize = 239;

/// Error returned when a codeword has more errors than the code can correct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RsDecodeError;

impl core::fmt::Display for RsDecodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Reed-Solomon: too many errors to correct")
    }
}

impl std::error::Error for RsDecodeError {}

/// Fixed-size block forward error correction.
///
/// `encode` maps exactly `message_len()` bytes to exactly `codeword_len()`
/// bytes; `decode` inverts it, correcting what it can.
pub trait ErasureCoder {
    fn codeword_len(&self) -> usize;
    fn message_len(&self) -> usize;

    /// Encode one full message chunk.
    ///
    /// Callers pass exactly `message_len()` bytes.
    fn encode_block(&self, message: &[u8]) -> Vec<u8>;

    /// Decode one codeword, returning the message and the number of symbol
    /// errors corrected.
    ///
    /// Callers pass exactly `codeword_len()` bytes.
    fn decode_block(&self, codeword: &[u8]) -> Result<(Vec<u8>, usize), RsDecodeError>;

    /// Symbol errors correctable per codeword.
    fn correction_capacity(&self) -> usize;
}

// --- GF(2^8) Arithmetic ---

/// Precomputed log and exp tables for GF(2^8).
struct GfTables {
    exp: [u8; 512],
    log: [u8; 256],
}

fn build_gf_tables() -> GfTables {
    let mut exp = [0u8; 512];
    let mut log = [0u8; 256];

    let mut x: u16 = 1;
    for i in 0..255u16 {
        exp[i as usize] = x as u8;
        exp[(i + 255) as usize] = x as u8; // wrap-around for easy modular access
        log[x as usize] = i as u8;
        x <<= 1;
        if x & 0x100 != 0 {
            x ^= PRIM_POLY;
        }
    }
    // log[0] is undefined, left as 0
    exp[510] = exp[0];
    exp[511] = exp[1];

    GfTables { exp, log }
}

fn gf_tables() -> &'static GfTables {
    use std::sync::OnceLock;
    static TABLES: OnceLock<GfTables> = OnceLock::new();
    TABLES.get_or_init(build_gf_tables)
}

fn gf_mul(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        return 0;
    }
    let t = gf_tables();
    let log_sum = t.log[a as usize] as usize + t.log[b as usize] as usize;
    t.exp[log_sum]
}

fn gf_add(a: u8, b: u8) -> u8 {
    a ^ b
}

/// GF(2^8) multiplicative inverse. `a` must be non-zero.
fn gf_inv(a: u8) -> u8 {
    debug_assert_ne!(a, 0, "cannot invert zero in GF(2^8)");
    let t = gf_tables();
    t.exp[255 - t.log[a as usize] as usize]
}

#[cfg(test)]
fn gf_pow(a: u8, n: u32) -> u8 {
    if a == 0 {
        return if n == 0 { 1 } else { 0 };
    }
    let t = gf_tables();
    let log_a = t.log[a as usize] as u32;
    t.exp[((log_a * n) % 255) as usize]
}

/// Evaluate polynomial at x. poly[0] is the highest-degree coefficient.
fn poly_eval(poly: &[u8], x: u8) -> u8 {
    let mut result = 0u8;
    for &coeff in poly {
        result = gf_add(gf_mul(result, x), coeff);
    }
    result
}

/// Multiply two polynomials. poly[0] is highest-degree coefficient.
fn poly_mul(a: &[u8], b: &[u8]) -> Vec<u8> {
    let mut result = vec![0u8; a.len() + b.len() - 1];
    for (i, &ac) in a.iter().enumerate() {
        for (j, &bc) in b.iter().enumerate() {
            result[i + j] = gf_add(result[i + j], gf_mul(ac, bc));
        }
    }
    result
}

/// Evaluate polynomial in ascending power format at x.
fn eval_asc(poly: &[u8], x: u8) -> u8 {
    let mut result = 0u8;
    let mut x_pow = 1u8;
    for &coeff in poly {
        result = gf_add(result, gf_mul(coeff, x_pow));
        x_pow = gf_mul(x_pow, x);
    }
    result
}

/// g(x) = prod_{i=0}^{parity_len-1} (x - alpha^i), highest degree first.
fn build_gen_poly(parity_len: usize) -> Vec<u8> {
    let t = gf_tables();
    let mut gpoly = vec![1u8];
    for i in 0..parity_len {
        gpoly = poly_mul(&gpoly, &[1, t.exp[i]]);
    }
    gpoly
}

/// Berlekamp-Massey. Returns sigma(x) in ascending power, sigma[0] = 1.
fn berlekamp_massey(syndromes: &[u8]) -> Vec<u8> {
    let n = syndromes.len();

    let mut c = vec![0u8; n + 1];
    c[0] = 1;
    let mut c_len = 1usize;

    let mut b = vec![0u8; n + 1];
    b[0] = 1;
    let mut b_len = 1usize;

    let mut ell = 0usize;
    let mut bval = 1u8;
    let mut m = 1usize;

    for r in 0..n {
        let mut delta = syndromes[r];
        for i in 1..c_len {
            delta = gf_add(delta, gf_mul(c[i], syndromes[r - i]));
        }

        if delta == 0 {
            m += 1;
            continue;
        }

        let factor = gf_mul(delta, gf_inv(bval));

        if 2 * ell <= r {
            let old_c = c.clone();
            let old_c_len = c_len;

            c_len = (b_len + m).max(c_len);
            for j in 0..b_len {
                if j + m < c.len() {
                    c[j + m] = gf_add(c[j + m], gf_mul(factor, b[j]));
                }
            }

            b[..old_c_len].copy_from_slice(&old_c[..old_c_len]);
            for v in b.iter_mut().skip(old_c_len) {
                *v = 0;
            }
            b_len = old_c_len;
            ell = r + 1 - ell;
            bval = delta;
            m = 1;
        } else {
            c_len = (b_len + m).max(c_len);
            for j in 0..b_len {
                if j + m < c.len() {
                    c[j + m] = gf_add(c[j + m], gf_mul(factor, b[j]));
                }
            }
            m += 1;
        }
    }

    c_len = c_len.min(c.len());
    c[..c_len].to_vec()
}

/// Chien search over a full 255-symbol block.
///
/// An error at array index k sits at GF position n-1-k; sigma has roots at
/// alpha^{-p}. Returns (gf_pos, array_pos) pairs, or `None` when the root
/// count does not match the locator degree.
fn chien_search(sigma_asc: &[u8], n: usize) -> Option<Vec<(usize, usize)>> {
    let tab = gf_tables();
    let num_errors = sigma_asc.len() - 1;
    let mut found = Vec::with_capacity(num_errors);

    for p in 0..n {
        let x = if p == 0 { 1u8 } else { tab.exp[(255 - (p % 255)) % 255] };
        if eval_asc(sigma_asc, x) == 0 {
            found.push((p, n - 1 - p));
        }
    }

    if found.len() != num_errors {
        return None;
    }
    Some(found)
}

/// Forney with FCR=0: e_l = X_l * Omega(X_l^{-1}) / Sigma'(X_l^{-1}).
fn forney(sigma_asc: &[u8], syndromes: &[u8], found: &[(usize, usize)]) -> Vec<u8> {
    let tab = gf_tables();
    let two_t = syndromes.len();

    // Omega(x) = S(x) * Sigma(x) mod x^{2t}
    let mut omega = vec![0u8; two_t];
    for i in 0..sigma_asc.len().min(two_t) {
        for j in 0..two_t - i {
            omega[i + j] = gf_add(omega[i + j], gf_mul(sigma_asc[i], syndromes[j]));
        }
    }

    // Formal derivative: only odd powers survive in characteristic 2.
    let mut sigma_prime = vec![0u8; sigma_asc.len().saturating_sub(1)];
    for i in (1..sigma_asc.len()).step_by(2) {
        sigma_prime[i - 1] = sigma_asc[i];
    }

    found
        .iter()
        .map(|&(gf_pos, _)| {
            let x_val = tab.exp[gf_pos % 255];
            let x_inv = tab.exp[(255 - (gf_pos % 255)) % 255];
            let sp_val = eval_asc(&sigma_prime, x_inv);
            if sp_val == 0 {
                return 0;
            }
            let omega_val = eval_asc(&omega, x_inv);
            gf_mul(x_val, gf_mul(omega_val, gf_inv(sp_val)))
        })
        .collect()
}

/// Systematic RS(n, k) code.
#[derive(Debug, Clone)]
pub struct ReedSolomon {
    n: usize,
    k: usize,
    gen: Vec<u8>,
}

impl ReedSolomon {
    /// Build an RS(n, k) code.
    ///
    /// # Errors
    /// [`ConfigError::ErasureCode`] unless `0 < k < n <= 255`.
    pub fn new(n: usize, k: usize) -> Result<Self, ConfigError> {
        if k == 0 || k >= n || n > N_MAX {
            return Err(ConfigError::ErasureCode { codeword_len: n, message_len: k });
        }
        Ok(Self { n, k, gen: build_gen_poly(n - k) })
    }

    /// The fixed RS(255, 239) code used by the pipeline.
    pub fn standard() -> Self {
        Self { n: ECC_N, k: ECC_K, gen: build_gen_poly(ECC_N - ECC_K) }
    }

    fn parity_len(&self) -> usize {
        self.n - self.k
    }

    fn syndromes(&self, full_block: &[u8]) -> Vec<u8> {
        let tab = gf_tables();
        (0..self.parity_len()).map(|i| poly_eval(full_block, tab.exp[i])).collect()
    }
}

impl ErasureCoder for ReedSolomon {
    fn codeword_len(&self) -> usize {
        self.n
    }

    fn message_len(&self) -> usize {
        self.k
    }

    fn correction_capacity(&self) -> usize {
        self.parity_len() / 2
    }

    fn encode_block(&self, message: &[u8]) -> Vec<u8> {
        debug_assert_eq!(message.len(), self.k, "message chunk length");
        let parity_len = self.parity_len();
        let gpoly = &self.gen;
        let mut shift_reg = vec![0u8; parity_len];

        for &byte in message {
            let feedback = gf_add(byte, shift_reg[0]);
            for j in 0..parity_len - 1 {
                shift_reg[j] = gf_add(shift_reg[j + 1], gf_mul(feedback, gpoly[j + 1]));
            }
            shift_reg[parity_len - 1] = gf_mul(feedback, gpoly[parity_len]);
        }

        let mut encoded = Vec::with_capacity(self.n);
        encoded.extend_from_slice(message);
        encoded.extend_from_slice(&shift_reg);
        encoded
    }

    fn decode_block(&self, received: &[u8]) -> Result<(Vec<u8>, usize), RsDecodeError> {
        if received.len() != self.n {
            return Err(RsDecodeError);
        }

        // Shortened codes: prepend zeros to a full 255-symbol block
        let padding = N_MAX - self.n;
        let mut full_block = vec![0u8; N_MAX];
        full_block[padding..].copy_from_slice(received);

        let syndromes = self.syndromes(&full_block);
        if syndromes.iter().all(|&s| s == 0) {
            return Ok((received[..self.k].to_vec(), 0));
        }

        let mut sigma_asc = berlekamp_massey(&syndromes);
        while sigma_asc.len() > 1 && sigma_asc.last() == Some(&0) {
            sigma_asc.pop();
        }
        let num_errors = sigma_asc.len() - 1;
        if num_errors > self.correction_capacity() {
            return Err(RsDecodeError);
        }

        let found = chien_search(&sigma_asc, N_MAX).ok_or(RsDecodeError)?;
        let magnitudes = forney(&sigma_asc, &syndromes, &found);

        let mut corrected = full_block;
        for (&(_, array_pos), &magnitude) in found.iter().zip(&magnitudes) {
            // Errors in the virtual zero region mean the locator is wrong
            if array_pos < padding {
                return Err(RsDecodeError);
            }
            corrected[array_pos] = gf_add(corrected[array_pos], magnitude);
        }

        if !self.syndromes(&corrected).iter().all(|&s| s == 0) {
            return Err(RsDecodeError);
        }

        Ok((corrected[padding..padding + self.k].to_vec(), num_errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 7 % 256) as u8).collect()
    }

    #[test]
    fn gf_mul_identity_and_zero() {
        for a in 0..=255u16 {
            assert_eq!(gf_mul(a as u8, 1), a as u8);
            assert_eq!(gf_mul(a as u8, 0), 0);
        }
    }

    #[test]
    fn gf_inverse_roundtrip() {
        for a in 1..=255u16 {
            assert_eq!(gf_mul(a as u8, gf_inv(a as u8)), 1, "a={a}");
        }
    }

    #[test]
    fn gf_pow_fermat() {
        for a in 1..=255u16 {
            assert_eq!(gf_pow(a as u8, 255), 1, "a={a}");
        }
    }

    #[test]
    fn generator_roots() {
        let rs = ReedSolomon::standard();
        assert_eq!(rs.gen.len(), 17);
        assert_eq!(rs.gen[0], 1);
        let t = gf_tables();
        for i in 0..16 {
            assert_eq!(poly_eval(&rs.gen, t.exp[i]), 0, "root alpha^{i}");
        }
    }

    #[test]
    fn standard_parameters() {
        let rs = ReedSolomon::standard();
        assert_eq!(rs.codeword_len(), 255);
        assert_eq!(rs.message_len(), 239);
        assert_eq!(rs.correction_capacity(), 8);
    }

    #[test]
    fn clean_codeword_decodes() {
        let rs = ReedSolomon::standard();
        let msg = sample(239);
        let cw = rs.encode_block(&msg);
        assert_eq!(cw.len(), 255);
        assert_eq!(&cw[..239], &msg[..]);
        assert_eq!(rs.decode_block(&cw).unwrap(), (msg, 0));
    }

    #[test]
    fn corrects_up_to_capacity() {
        let rs = ReedSolomon::standard();
        let msg = sample(239);
        let mut cw = rs.encode_block(&msg);
        for i in 0..8 {
            cw[i * 31] ^= 0x5A;
        }
        let (decoded, errors) = rs.decode_block(&cw).unwrap();
        assert_eq!(decoded, msg);
        assert_eq!(errors, 8);
    }

    #[test]
    fn errors_in_parity_are_corrected() {
        let rs = ReedSolomon::standard();
        let msg = sample(239);
        let mut cw = rs.encode_block(&msg);
        cw[240] ^= 0xFF;
        cw[254] ^= 0x01;
        let (decoded, errors) = rs.decode_block(&cw).unwrap();
        assert_eq!(decoded, msg);
        assert_eq!(errors, 2);
    }

    #[test]
    fn too_many_errors_fails() {
        let rs = ReedSolomon::standard();
        let msg = vec![0u8; 239];
        let mut cw = rs.encode_block(&msg);
        for v in cw.iter_mut().take(30) {
            *v ^= 0xFF;
        }
        assert_eq!(rs.decode_block(&cw), Err(RsDecodeError));
    }

    #[test]
    fn wrong_length_fails() {
        let rs = ReedSolomon::standard();
        assert_eq!(rs.decode_block(&[0u8; 100]), Err(RsDecodeError));
    }

    #[test]
    fn shortened_code_roundtrip() {
        let rs = ReedSolomon::new(64, 48).unwrap();
        let msg = sample(48);
        let mut cw = rs.encode_block(&msg);
        cw[3] ^= 0x11;
        cw[50] ^= 0x22;
        let (decoded, errors) = rs.decode_block(&cw).unwrap();
        assert_eq!(decoded, msg);
        assert_eq!(errors, 2);
    }

    #[test]
    fn invalid_parameters_rejected() {
        assert!(ReedSolomon::new(256, 239).is_err());
        assert!(ReedSolomon::new(255, 255).is_err());
        assert!(ReedSolomon::new(255, 0).is_err());
        assert!(ReedSolomon::new(255, 239).is_ok());
    }
}
