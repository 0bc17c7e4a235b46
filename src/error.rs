//! Error types for the Allinpay client
//!
//! Every failure is tagged with the protocol stage it came from so callers can
//! tell a bad key container apart from a forged gateway response.

use thiserror::Error;

/// Result type alias for Allinpay operations
pub type Result<T> = std::result::Result<T, AllinpayError>;

/// Errors produced while signing, sending, or verifying gateway requests
#[derive(Error, Debug)]
pub enum AllinpayError {
    /// Client configuration is incomplete or malformed
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The business payload could not be serialized to JSON
    #[error("Payload serialization error: {message}")]
    PayloadSerialization { message: String },

    /// The private key could not be extracted from the key container
    #[error("Key extraction error: {message}")]
    KeyExtraction { message: String },

    /// The trusted certificate could not be loaded
    #[error("Certificate error: {message}")]
    Certificate { message: String },

    /// Signing the request failed
    #[error("Sign error: {message}")]
    Sign { message: String },

    /// The gateway response failed signature verification
    #[error("Verification error: {message}")]
    Verification { message: String },

    /// The requested key is longer than the derivation can produce
    #[error("Key derivation error: requested {requested} bytes, at most {available} available")]
    KeyDerivation { requested: usize, available: usize },

    /// Symmetric encryption or decryption of a sensitive field failed
    #[error("Encryption error: {message}")]
    Encryption { message: String },

    /// Network or I/O failure talking to the gateway
    #[error("Transport error: {message}")]
    Transport { message: String },
}

impl AllinpayError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a payload serialization error
    pub fn payload_serialization(message: impl Into<String>) -> Self {
        Self::PayloadSerialization {
            message: message.into(),
        }
    }

    /// Create a key extraction error
    pub fn key_extraction(message: impl Into<String>) -> Self {
        Self::KeyExtraction {
            message: message.into(),
        }
    }

    /// Create a certificate error
    pub fn certificate(message: impl Into<String>) -> Self {
        Self::Certificate {
            message: message.into(),
        }
    }

    /// Create a signing error
    pub fn sign(message: impl Into<String>) -> Self {
        Self::Sign {
            message: message.into(),
        }
    }

    /// Create a verification error
    pub fn verification(message: impl Into<String>) -> Self {
        Self::Verification {
            message: message.into(),
        }
    }

    /// Create an encryption error
    pub fn encryption(message: impl Into<String>) -> Self {
        Self::Encryption {
            message: message.into(),
        }
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for AllinpayError {
    fn from(err: reqwest::Error) -> Self {
        Self::transport(err.to_string())
    }
}

impl From<serde_json::Error> for AllinpayError {
    fn from(err: serde_json::Error) -> Self {
        Self::payload_serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_derivation_message() {
        let err = AllinpayError::KeyDerivation {
            requested: 32,
            available: 20,
        };
        assert_eq!(
            err.to_string(),
            "Key derivation error: requested 32 bytes, at most 20 available"
        );
    }

    #[test]
    fn test_json_error_maps_to_payload_serialization() {
        let err: AllinpayError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, AllinpayError::PayloadSerialization { .. }));
    }
}
