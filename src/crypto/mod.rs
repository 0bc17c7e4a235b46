//! Cryptographic core of the Allinpay signing protocol
//!
//! Every request and response is signed with the gateway's own dialect:
//! canonical `k=v&k=v` serialization, an MD5 → base64 → SHA-256 digest chain,
//! and RSA PKCS#1 v1.5 signatures. Deviating from any step makes every
//! signature fail on the other side, so none of it is configurable.
//!
//! # Architecture
//!
//! The crypto module is organized as follows:
//! - [`keystore`] - Private key extraction from PKCS#12 and certificate loading
//! - [`canonical`] - Canonical parameter serialization
//! - [`digest`] - The two-stage digest chain and request signing
//! - [`encoding`] - Gateway JSON encoding of response records
//! - [`verify`] - Response and parameter signature verification
//! - [`cipher`] - AES-ECB encryption of sensitive fields
//!
//! # Examples
//!
//! ## Signing Parameters
//!
//! ```no_run
//! use rust_allinpay::crypto::{self, KeyStore};
//! use rust_allinpay::types::ParameterSet;
//!
//! # fn example() -> rust_allinpay::Result<()> {
//! let keys = KeyStore::from_files("user-rsa.pfx", "123456", "public-rsa.cer")?;
//!
//! let params = ParameterSet::new()
//!     .with("bizUserId", "rust-test-1")
//!     .with("memberType", "3");
//! let signature = crypto::sign(&params, keys.private_key())?;
//! println!("sign={}", signature);
//! # Ok(())
//! # }
//! ```
//!
//! ## Verifying a Response
//!
//! ```no_run
//! use rust_allinpay::crypto::{self, KeyStore};
//!
//! # fn example(keys: KeyStore, body: &str) -> rust_allinpay::Result<()> {
//! let response = crypto::verify_response(body, keys.public_key())?;
//! println!("code={:?}", response.code());
//! # Ok(())
//! # }
//! ```
//!
//! ## Encrypting Sensitive Fields
//!
//! ```
//! use rust_allinpay::crypto::SensitiveInfoCipher;
//!
//! # fn example() -> rust_allinpay::Result<()> {
//! let cipher = SensitiveInfoCipher::from_secret("WaHVZNHZYX3v4si1bBTVseIwEMPMcKzz")?;
//! let encrypted = cipher.encrypt_to_hex("320721199408140000")?;
//! assert_eq!(
//!     encrypted,
//!     "92F647AC47B4F65382929373B00BEF7DC95B60519796541505716B22E62FEDBA"
//! );
//! # Ok(())
//! # }
//! ```

pub mod canonical;
pub mod cipher;
pub mod digest;
pub mod encoding;
pub mod keystore;
pub mod verify;


// Re-export commonly used items
pub use canonical::canonicalize;
pub use cipher::{derive_key, ecb_decrypt, ecb_encrypt, SensitiveInfoCipher};
pub use digest::{content_digest, sign, sign_bytes, sign_envelope, signing_hash};
pub use encoding::{marshal_record, GatewayFormatter};
pub use keystore::{
    decode_container, load_private_key, load_public_key, select_private_key, KeyBlock, KeyStore,
};
pub use verify::{verify_bytes, verify_params, verify_response};
