// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Payload encryption.
//!
//! The pipeline consumes encryption through [`PayloadCipher`]. The default
//! implementation, [`AesGcmSivCipher`], derives an AES-256 key from the
//! password and a random salt with Argon2id and seals the payload with
//! AES-256-GCM-SIV under a random nonce. Salt and nonce travel in front of
//! the ciphertext:
//!
//! ```text
//! [16 bytes] Argon2 salt
//! [12 bytes] AES-GCM-SIV nonce
//! [N bytes ] ciphertext (plaintext_len + 16 bytes auth tag)
//! ```

use aes_gcm_siv::aead::Aead;
use aes_gcm_siv::{Aes256GcmSiv, KeyInit, Nonce};
use argon2::Argon2;
use zeroize::Zeroizing;

use crate::codec::error::{Error, Result};

/// AES-GCM-SIV nonce length in bytes.
pub const NONCE_LEN: usize = 12;
/// Argon2 salt length in bytes.
pub const SALT_LEN: usize = 16;
/// AES-GCM-SIV authentication tag length in bytes.
pub const TAG_LEN: usize = 16;
/// Bytes added to the plaintext by [`AesGcmSivCipher`].
pub const CIPHER_OVERHEAD: usize = SALT_LEN + NONCE_LEN + TAG_LEN;

/// Password-based symmetric encryption of a byte buffer.
pub trait PayloadCipher {
    fn encrypt(&self, password: &str, plaintext: &[u8]) -> Result<Vec<u8>>;

    /// # Errors
    /// [`Error::Cipher`] on a wrong password or corrupted ciphertext.
    fn decrypt(&self, password: &str, ciphertext: &[u8]) -> Result<Vec<u8>>;

    /// Ciphertext length for a `plaintext_len`-byte input.
    fn ciphertext_len(&self, plaintext_len: usize) -> usize;
}

/// Derive the AES-256 key from password + salt.
pub fn derive_key(password: &str, salt: &[u8]) -> Result<Zeroizing<[u8; 32]>> {
    let mut key = Zeroizing::new([0u8; 32]);
    Argon2::default()
        .hash_password_into(password.as_bytes(), salt, &mut *key)
        .map_err(|_| Error::Cipher)?;
    Ok(key)
}

/// Argon2id + AES-256-GCM-SIV.
#[derive(Debug, Clone, Copy, Default)]
pub struct AesGcmSivCipher;

impl AesGcmSivCipher {
    /// Encrypt with caller-provided salt and nonce.
    pub fn encrypt_with(
        &self,
        password: &str,
        plaintext: &[u8],
        salt: &[u8; SALT_LEN],
        nonce_bytes: &[u8; NONCE_LEN],
    ) -> Result<Vec<u8>> {
        let key = derive_key(password, salt)?;
        let cipher = Aes256GcmSiv::new_from_slice(&*key).map_err(|_| Error::Cipher)?;
        let sealed = cipher
            .encrypt(Nonce::from_slice(nonce_bytes), plaintext)
            .map_err(|_| Error::Cipher)?;

        let mut out = Vec::with_capacity(SALT_LEN + NONCE_LEN + sealed.len());
        out.extend_from_slice(salt);
        out.extend_from_slice(nonce_bytes);
        out.extend_from_slice(&sealed);
        Ok(out)
    }
}

impl PayloadCipher for AesGcmSivCipher {
    fn encrypt(&self, password: &str, plaintext: &[u8]) -> Result<Vec<u8>> {
        use rand::RngCore;
        let mut rng = rand::thread_rng();

        let mut salt = [0u8; SALT_LEN];
        rng.fill_bytes(&mut salt);
        let mut nonce = [0u8; NONCE_LEN];
        rng.fill_bytes(&mut nonce);

        self.encrypt_with(password, plaintext, &salt, &nonce)
    }

    fn decrypt(&self, password: &str, ciphertext: &[u8]) -> Result<Vec<u8>> {
        if ciphertext.len() < CIPHER_OVERHEAD {
            return Err(Error::Cipher);
        }
        let (salt, rest) = ciphertext.split_at(SALT_LEN);
        let (nonce, sealed) = rest.split_at(NONCE_LEN);

        let key = derive_key(password, salt)?;
        let cipher = Aes256GcmSiv::new_from_slice(&*key).map_err(|_| Error::Cipher)?;
        cipher
            .decrypt(Nonce::from_slice(nonce), sealed)
            .map_err(|_| Error::Cipher)
    }

    fn ciphertext_len(&self, plaintext_len: usize) -> usize {
        plaintext_len + CIPHER_OVERHEAD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let c = AesGcmSivCipher;
        let msg = b"Hello, block raster!";
        let ct = c.encrypt("secret123", msg).unwrap();
        assert_eq!(ct.len(), c.ciphertext_len(msg.len()));
        assert_eq!(c.decrypt("secret123", &ct).unwrap(), msg);
    }

    #[test]
    fn wrong_password_fails() {
        let c = AesGcmSivCipher;
        let ct = c.encrypt("correct", b"secret message").unwrap();
        assert!(matches!(c.decrypt("wrong", &ct), Err(Error::Cipher)));
    }

    #[test]
    fn empty_message_works() {
        let c = AesGcmSivCipher;
        let ct = c.encrypt("pass", b"").unwrap();
        assert_eq!(ct.len(), CIPHER_OVERHEAD);
        assert!(c.decrypt("pass", &ct).unwrap().is_empty());
    }

    #[test]
    fn truncated_ciphertext_fails() {
        let c = AesGcmSivCipher;
        assert!(matches!(c.decrypt("pass", &[0u8; 20]), Err(Error::Cipher)));
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let c = AesGcmSivCipher;
        let mut ct = c.encrypt("pass", b"tamper me").unwrap();
        let last = ct.len() - 1;
        ct[last] ^= 0x01;
        assert!(matches!(c.decrypt("pass", &ct), Err(Error::Cipher)));
    }

    #[test]
    fn fixed_salt_and_nonce_are_deterministic() {
        let c = AesGcmSivCipher;
        let a = c.encrypt_with("pw", b"same", &[7u8; SALT_LEN], &[9u8; NONCE_LEN]).unwrap();
        let b = c.encrypt_with("pw", b"same", &[7u8; SALT_LEN], &[9u8; NONCE_LEN]).unwrap();
        assert_eq!(a, b);
        assert_eq!(&a[..SALT_LEN], &[7u8; SALT_LEN]);
    }

    #[test]
    fn ciphertext_differs_per_encryption() {
        let c = AesGcmSivCipher;
        let a = c.encrypt("pass", b"same message").unwrap();
        let b = c.encrypt("pass", b"same message").unwrap();
        assert_ne!(a, b, "random salt and nonce per encryption");
    }
}
