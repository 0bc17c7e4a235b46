//! Core types for the Allinpay gateway protocol
//!
//! This module defines the data structures shared by the signing, transport,
//! and client layers: the outbound parameter set, the signed envelope, the
//! verified response, and the client configuration.
//!
//! # Architecture
//!
//! The types module is organized as follows:
//! - [`params`] - Outbound parameter set and signed envelope
//! - [`response`] - Verified gateway responses
//! - [`config`] - Client configuration and gateway environments
//! - [`constants`] - Protocol constants (field names, fixed values, endpoints)
//!
//! # Examples
//!
//! ## Building a Parameter Set
//!
//! ```
//! use rust_allinpay::types::{fields, ParameterSet};
//!
//! let params = ParameterSet::new()
//!     .with(fields::APP_ID, "10000")
//!     .with(fields::METHOD, "allinpay.yunst.memberService.createMember")
//!     .with(fields::NOTIFY_URL, "");
//!
//! // Empty values never reach the wire
//! assert_eq!(
//!     params.to_form_body(),
//!     "appId=10000&method=allinpay.yunst.memberService.createMember"
//! );
//! ```
//!
//! ## Client Configuration
//!
//! ```
//! use rust_allinpay::types::{ClientConfig, Environment};
//! use std::time::Duration;
//!
//! # fn example() -> rust_allinpay::Result<()> {
//! let config = ClientConfig::new("10000", "user-rsa.pfx", "123456", "public-rsa.cer")
//!     .with_environment(Environment::Production)
//!     .with_timeout(Duration::from_secs(30));
//!
//! config.validate()?;
//! assert_eq!(config.service_url(), "https://cloud.allinpay.com/gateway");
//! # Ok(())
//! # }
//! ```
//!
//! # Type Categories
//!
//! ## Request Types
//! - [`ParameterSet`] - Ordered string map of request fields
//! - [`SignedEnvelope`] - Parameter set plus its signature
//!
//! ## Response Types
//! - [`VerifiedResponse`] - Gateway response whose signature checked out
//! - [`ResponseRecord`] - Decoded JSON fields of a response
//!
//! ## Configuration Types
//! - [`ClientConfig`] - Credentials, key paths, and gateway selection
//! - [`Environment`] - Test or production gateway

pub mod config;
pub mod constants;
pub mod params;
pub mod response;

// Re-export commonly used types
pub use config::{ClientConfig, Environment};
pub use constants::{env_vars, fields, gateways, values};
pub use params::{ParameterSet, SignedEnvelope};
pub use response::{ResponseRecord, VerifiedResponse};
