//! # Allinpay Rust Client
//!
//! A **type-safe** Rust client for the Allinpay cloud gateway signing protocol.
//!
//! ## Features
//!
//! - 🔏 **Request signing**: Canonical parameter sets signed with SHA256WithRSA
//! - ✅ **Response verification**: Gateway replies are checked before any field is exposed
//! - 🔑 **Key loading**: PKCS#12 key containers and PEM gateway certificates
//! - 🔒 **Sensitive fields**: AES-ECB encryption with a key derived from the app secret
//! - 🌐 **Pluggable transport**: Pooled `reqwest` client by default, any [`Transport`] in tests
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rust_allinpay::{AllinpayClient, ClientConfig};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::new("10000", "user-rsa.pfx", "123456", "public-rsa.cer")
//!         .with_app_secret_key("WaHVZNHZYX3v4si1bBTVseIwEMPMcKzz")
//!         .with_production(false);
//!     let client = AllinpayClient::new(config)?;
//!
//!     let response = client
//!         .request(
//!             "allinpay.yunst.memberService.createMember",
//!             &json!({"bizUserId": "rust-test-1", "memberType": 3, "source": 1}),
//!         )
//!         .await?;
//!
//!     println!("{}", response.body());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **`types`**: Parameter sets, signed envelopes, responses, and configuration
//! - **`crypto`**: Canonicalization, signing, verification, key loading, and field encryption
//! - **`transport`**: HTTP transport abstraction
//! - **`client`**: Gateway client tying the pieces together
//! - **`error`**: Error handling

pub mod client;
pub mod crypto;
pub mod error;
pub mod transport;
pub mod types;

// Re-exports for convenience
pub use client::AllinpayClient;
pub use crypto::{KeyStore, SensitiveInfoCipher};
pub use error::{AllinpayError, Result};
pub use transport::{HttpTransport, Transport, TransportResponse};
pub use types::*;

/// Current version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_constant() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_environment_gateways() {
        assert_eq!(
            Environment::Test.gateway_url(),
            "http://test.allinpay.com/op/gateway"
        );
        assert_eq!(
            Environment::Production.gateway_url(),
            "https://cloud.allinpay.com/gateway"
        );
        assert_eq!(Environment::default(), Environment::Test);
    }

    #[test]
    fn test_protocol_values() {
        assert_eq!(fields::SIGN, "sign");
        assert_eq!(fields::SIGN_TYPE, "signType");
        assert_eq!(values::SIGN_TYPE_SHA256_RSA, "SHA256WithRSA");
        assert_eq!(values::DEFAULT_VERSION, "1.0");
        assert_eq!(values::SUCCESS_CODE, "10000");
    }
}
