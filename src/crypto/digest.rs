//! Digest chain and request signing
//!
//! The gateway never signs the canonical bytes directly. It signs
//! `SHA-256(base64(MD5(canonical)))`, with the base64 text itself being the
//! input of the second hash. The RSA signature is PKCS#1 v1.5 over that
//! SHA-256 value.

use super::canonical::canonicalize;
use crate::types::{fields, ParameterSet, SignedEnvelope};
use crate::{AllinpayError, Result};
use base64::{engine::general_purpose, Engine as _};
use md5::{Digest, Md5};
use rand::rngs::OsRng;
use rsa::{Pkcs1v15Sign, RsaPrivateKey};
use sha2::Sha256;

/// First stage: base64 of the MD5 of the canonical bytes
pub fn content_digest(canonical: &[u8]) -> String {
    general_purpose::STANDARD.encode(Md5::digest(canonical))
}

/// Second stage: SHA-256 of the first stage's base64 text
pub fn signing_hash(canonical: &[u8]) -> [u8; 32] {
    Sha256::digest(content_digest(canonical).as_bytes()).into()
}

/// Sign arbitrary bytes with the digest chain, returning base64
pub fn sign_bytes(canonical: &[u8], private_key: &RsaPrivateKey) -> Result<String> {
    let hashed = signing_hash(canonical);
    let signature = private_key
        .sign_with_rng(&mut OsRng, Pkcs1v15Sign::new::<Sha256>(), &hashed)
        .map_err(|e| AllinpayError::sign(format!("RSA signing failed: {}", e)))?;
    Ok(general_purpose::STANDARD.encode(signature))
}

/// Sign a parameter set
///
/// `signType` is not part of the signed content even when present, and
/// `sign` is dropped by canonicalization.
pub fn sign(params: &ParameterSet, private_key: &RsaPrivateKey) -> Result<String> {
    let mut unsigned = params.clone();
    unsigned.remove(fields::SIGN_TYPE);
    sign_bytes(&canonicalize(&unsigned), private_key)
}

/// Sign a finished parameter set and freeze it into an envelope
pub fn sign_envelope(mut params: ParameterSet, private_key: &RsaPrivateKey) -> Result<SignedEnvelope> {
    params.remove(fields::SIGN);
    params.remove(fields::SIGN_TYPE);
    let signature = sign(&params, private_key)?;
    Ok(SignedEnvelope::new(params, signature))
}
