//! Sensitive information encryption
//!
//! Identity numbers, bank card numbers and similar fields travel encrypted
//! inside `bizContent`. The key is the first 128 bits of
//! `SHA-1(SHA-1(app_secret_key))`, matching the output of a `SHA1PRNG`
//! seeded with the secret. Encryption is AES-ECB with PKCS#7 padding and the
//! result is sent as upper-case hex.

use crate::{AllinpayError, Result};
use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyInit};
use aes::{Aes128, Aes192, Aes256};
use sha1::{Digest, Sha1};

/// AES block size in bytes
pub const BLOCK_SIZE: usize = 16;

/// Key length used for sensitive fields
pub const SENSITIVE_KEY_BITS: usize = 128;

/// Derive a symmetric key from a shared secret
///
/// Returns the first `bit_length / 8` bytes of `SHA-1(SHA-1(secret))`.
pub fn derive_key(secret: &[u8], bit_length: usize) -> Result<Vec<u8>> {
    let digest = Sha1::digest(Sha1::digest(secret));
    if bit_length > digest.len() * 8 {
        return Err(AllinpayError::KeyDerivation {
            requested: bit_length.div_ceil(8),
            available: digest.len(),
        });
    }
    Ok(digest[..bit_length / 8].to_vec())
}

fn invalid_key(len: usize) -> AllinpayError {
    AllinpayError::encryption(format!(
        "AES key must be 16, 24 or 32 bytes, got {}",
        len
    ))
}

/// AES-ECB encrypt with PKCS#7 padding
///
/// The AES variant follows the key length. Block-aligned input still gains
/// a full block of padding.
pub fn ecb_encrypt(plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    let ciphertext = match key.len() {
        16 => ecb::Encryptor::<Aes128>::new_from_slice(key)
            .map(|c| c.encrypt_padded_vec_mut::<Pkcs7>(plaintext)),
        24 => ecb::Encryptor::<Aes192>::new_from_slice(key)
            .map(|c| c.encrypt_padded_vec_mut::<Pkcs7>(plaintext)),
        32 => ecb::Encryptor::<Aes256>::new_from_slice(key)
            .map(|c| c.encrypt_padded_vec_mut::<Pkcs7>(plaintext)),
        len => return Err(invalid_key(len)),
    };
    ciphertext.map_err(|_| invalid_key(key.len()))
}

/// AES-ECB decrypt and strip PKCS#7 padding
pub fn ecb_decrypt(ciphertext: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
        return Err(AllinpayError::encryption(format!(
            "Ciphertext length {} is not a positive multiple of {}",
            ciphertext.len(),
            BLOCK_SIZE
        )));
    }

    let plaintext = match key.len() {
        16 => ecb::Decryptor::<Aes128>::new_from_slice(key)
            .map(|c| c.decrypt_padded_vec_mut::<Pkcs7>(ciphertext)),
        24 => ecb::Decryptor::<Aes192>::new_from_slice(key)
            .map(|c| c.decrypt_padded_vec_mut::<Pkcs7>(ciphertext)),
        32 => ecb::Decryptor::<Aes256>::new_from_slice(key)
            .map(|c| c.decrypt_padded_vec_mut::<Pkcs7>(ciphertext)),
        len => return Err(invalid_key(len)),
    };

    plaintext
        .map_err(|_| invalid_key(key.len()))?
        .map_err(|_| AllinpayError::encryption("Invalid padding"))
}

/// Encrypts sensitive fields with a key derived from the app secret
#[derive(Clone)]
pub struct SensitiveInfoCipher {
    key: Vec<u8>,
}

impl std::fmt::Debug for SensitiveInfoCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SensitiveInfoCipher")
            .field("key", &"<redacted>")
            .finish()
    }
}

impl SensitiveInfoCipher {
    /// Derive the 128-bit field key from the app secret
    pub fn from_secret(secret: &str) -> Result<Self> {
        Ok(Self {
            key: derive_key(secret.as_bytes(), SENSITIVE_KEY_BITS)?,
        })
    }

    /// Encrypt raw bytes
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        ecb_encrypt(plaintext, &self.key)
    }

    /// Decrypt raw bytes
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        ecb_decrypt(ciphertext, &self.key)
    }

    /// Encrypt a field into the upper-case hex form the gateway expects
    pub fn encrypt_to_hex(&self, information: &str) -> Result<String> {
        Ok(hex::encode_upper(self.encrypt(information.as_bytes())?))
    }

    /// Decrypt a hex-encoded field (either case)
    pub fn decrypt_hex(&self, encrypted: &str) -> Result<String> {
        let ciphertext = hex::decode(encrypted)
            .map_err(|e| AllinpayError::encryption(format!("Invalid hex: {}", e)))?;
        String::from_utf8(self.decrypt(&ciphertext)?)
            .map_err(|_| AllinpayError::encryption("Decrypted field is not UTF-8"))
    }
}
