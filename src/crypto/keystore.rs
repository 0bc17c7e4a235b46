//! Key material loading
//!
//! The merchant private key ships inside a password-protected PKCS#12
//! container; the gateway's public key ships as a PEM certificate.

use crate::{AllinpayError, Result};
use p12::{AlgorithmIdentifier, CertBag, SafeBagKind, PFX};
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::path::Path;
use x509_cert::der::{DecodePem, Encode};
use x509_cert::Certificate;

/// Block type of a private key
pub const PRIVATE_KEY_LABEL: &str = "PRIVATE KEY";
/// Block type of a certificate
pub const CERTIFICATE_LABEL: &str = "CERTIFICATE";

/// Number of blocks a merchant key container must hold
const EXPECTED_BLOCKS: usize = 2;

/// One piece of key material unpacked from a key container
#[derive(Clone, PartialEq, Eq)]
pub struct KeyBlock {
    /// Declared block type, e.g. `PRIVATE KEY` or `CERTIFICATE`
    pub label: String,
    /// DER contents
    pub der: Vec<u8>,
}

impl KeyBlock {
    /// Create a new block
    pub fn new(label: impl Into<String>, der: impl Into<Vec<u8>>) -> Self {
        Self {
            label: label.into(),
            der: der.into(),
        }
    }

    fn is_private_key(&self) -> bool {
        self.label.eq_ignore_ascii_case(PRIVATE_KEY_LABEL)
    }
}

impl std::fmt::Debug for KeyBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyBlock")
            .field("label", &self.label)
            .field("der", &format_args!("<{} bytes>", self.der.len()))
            .finish()
    }
}

/// Decrypt a PKCS#12 container into its key material blocks
///
/// Blocks are returned in the order their bags appear in the container.
/// Only SHA-1 MACs are supported.
pub fn decode_container(container: &[u8], password: &str) -> Result<Vec<KeyBlock>> {
    let pfx = PFX::parse(container).map_err(|e| {
        AllinpayError::key_extraction(format!("Malformed key container: {:?}", e))
    })?;

    if let Some(mac_data) = &pfx.mac_data {
        if !matches!(mac_data.mac.digest_algorithm, AlgorithmIdentifier::Sha1) {
            return Err(AllinpayError::key_extraction(format!(
                "Unsupported key container MAC algorithm: {}",
                algorithm_name(&mac_data.mac.digest_algorithm)
            )));
        }
    }

    if !pfx.verify_mac(password) {
        return Err(AllinpayError::key_extraction(
            "Key container MAC check failed, wrong password?",
        ));
    }

    let bags = pfx.bags(password).map_err(|e| {
        AllinpayError::key_extraction(format!("Failed to decrypt key container: {:?}", e))
    })?;

    let bmp_password = bmp_string(password);
    bags.iter()
        .map(|safe_bag| match &safe_bag.bag {
            SafeBagKind::CertBag(CertBag::X509(der)) => {
                Ok(KeyBlock::new(CERTIFICATE_LABEL, der.clone()))
            }
            SafeBagKind::Pkcs8ShroudedKeyBag(_) => safe_bag
                .bag
                .get_key(&bmp_password)
                .map(|der| KeyBlock::new(PRIVATE_KEY_LABEL, der))
                .ok_or_else(|| AllinpayError::key_extraction("Failed to decrypt private key bag")),
            other => Err(AllinpayError::key_extraction(format!(
                "Unsupported key container bag {}",
                other.oid()
            ))),
        })
        .collect()
}

fn algorithm_name(algorithm: &AlgorithmIdentifier) -> String {
    match algorithm {
        AlgorithmIdentifier::OtherAlg(other) => other.algorithm_type.to_string(),
        other => format!("{:?}", other),
    }
}

/// Container passwords are NUL-terminated UTF-16BE
fn bmp_string(password: &str) -> Vec<u8> {
    password
        .encode_utf16()
        .chain(std::iter::once(0))
        .flat_map(u16::to_be_bytes)
        .collect()
}

/// Pick the RSA private key out of a two-block container
///
/// Container tools disagree on block order, so the block typed
/// `PRIVATE KEY` wins wherever it sits; without one the first block is used.
pub fn select_private_key(blocks: &[KeyBlock]) -> Result<RsaPrivateKey> {
    if blocks.len() != EXPECTED_BLOCKS {
        return Err(AllinpayError::key_extraction(format!(
            "Key container must hold exactly {} blocks, found {}",
            EXPECTED_BLOCKS,
            blocks.len()
        )));
    }

    let block = blocks
        .iter()
        .find(|block| block.is_private_key())
        .unwrap_or(&blocks[0]);

    parse_private_key(&block.der).ok_or_else(|| {
        AllinpayError::key_extraction(format!(
            "Block '{}' does not hold an RSA private key",
            block.label
        ))
    })
}

/// Accepts PKCS#8 and bare PKCS#1 encodings
fn parse_private_key(der: &[u8]) -> Option<RsaPrivateKey> {
    RsaPrivateKey::from_pkcs8_der(der)
        .or_else(|_| RsaPrivateKey::from_pkcs1_der(der))
        .ok()
}

/// Extract the RSA private key from a password-protected key container
pub fn load_private_key(container: &[u8], password: &str) -> Result<RsaPrivateKey> {
    let blocks = decode_container(container, password)?;
    select_private_key(&blocks)
}

/// Extract the RSA public key from a PEM-encoded X.509 certificate
pub fn load_public_key(cert_pem: &[u8]) -> Result<RsaPublicKey> {
    let cert = Certificate::from_pem(cert_pem)
        .map_err(|e| AllinpayError::certificate(format!("Invalid PEM certificate: {}", e)))?;

    let spki = cert
        .tbs_certificate
        .subject_public_key_info
        .to_der()
        .map_err(|e| AllinpayError::certificate(format!("Invalid public key info: {}", e)))?;

    RsaPublicKey::from_public_key_der(&spki)
        .map_err(|e| AllinpayError::certificate(format!("Certificate key is not RSA: {}", e)))
}

/// The merchant signing key and the gateway verification key
///
/// Read-only after construction, so one store can back any number of
/// concurrent requests.
#[derive(Clone)]
pub struct KeyStore {
    private_key: RsaPrivateKey,
    public_key: RsaPublicKey,
}

impl std::fmt::Debug for KeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyStore")
            .field("private_key", &"<redacted>")
            .field("public_key", &self.public_key)
            .finish()
    }
}

impl KeyStore {
    /// Create a key store from already-parsed keys
    pub fn new(private_key: RsaPrivateKey, public_key: RsaPublicKey) -> Self {
        Self {
            private_key,
            public_key,
        }
    }

    /// Load both keys from in-memory container and certificate bytes
    pub fn from_bytes(container: &[u8], password: &str, cert_pem: &[u8]) -> Result<Self> {
        Ok(Self::new(
            load_private_key(container, password)?,
            load_public_key(cert_pem)?,
        ))
    }

    /// Load both keys from files
    pub fn from_files(
        pfx_path: impl AsRef<Path>,
        password: &str,
        cert_path: impl AsRef<Path>,
    ) -> Result<Self> {
        let pfx_path = pfx_path.as_ref();
        let container = std::fs::read(pfx_path).map_err(|e| {
            AllinpayError::key_extraction(format!(
                "Failed to read key container {}: {}",
                pfx_path.display(),
                e
            ))
        })?;

        let cert_path = cert_path.as_ref();
        let cert = std::fs::read(cert_path).map_err(|e| {
            AllinpayError::certificate(format!(
                "Failed to read certificate {}: {}",
                cert_path.display(),
                e
            ))
        })?;

        Self::from_bytes(&container, password, &cert)
    }

    /// Merchant private key used to sign requests
    pub fn private_key(&self) -> &RsaPrivateKey {
        &self.private_key
    }

    /// Gateway public key used to verify responses
    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public_key
    }
}
