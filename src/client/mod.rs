//! Allinpay gateway client
//!
//! This module ties the protocol pieces together: it assembles the request
//! envelope, signs it, posts it through a [`Transport`], and verifies the
//! gateway's reply before handing anything back.
//!
//! # Examples
//!
//! ## Basic Usage
//!
//! ```no_run
//! use rust_allinpay::{AllinpayClient, ClientConfig};
//! use serde_json::json;
//!
//! # async fn example() -> rust_allinpay::Result<()> {
//! let config = ClientConfig::new("10000", "user-rsa.pfx", "123456", "public-rsa.cer")
//!     .with_app_secret_key("WaHVZNHZYX3v4si1bBTVseIwEMPMcKzz");
//! let client = AllinpayClient::new(config)?;
//!
//! let response = client
//!     .request(
//!         "allinpay.yunst.memberService.createMember",
//!         &json!({"bizUserId": "rust-test-1", "memberType": 3, "source": 1}),
//!     )
//!     .await?;
//!
//! if response.is_success() {
//!     println!("Member created: {:?}", response.data());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Encrypting Sensitive Fields
//!
//! ```no_run
//! use rust_allinpay::{AllinpayClient, ClientConfig};
//! use serde_json::json;
//!
//! # async fn example(client: AllinpayClient) -> rust_allinpay::Result<()> {
//! let identity_no = client.encrypt_sensitive("320721199408140000")?;
//! let _response = client
//!     .request(
//!         "allinpay.yunst.memberService.setRealName",
//!         &json!({"bizUserId": "rust-test-1", "name": "张三", "identityType": 1, "identityNo": identity_no}),
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```

use crate::crypto::{self, KeyStore, SensitiveInfoCipher};
use crate::transport::{HttpTransport, Transport};
use crate::types::{fields, values, ClientConfig, ParameterSet, SignedEnvelope, VerifiedResponse};
use crate::{AllinpayError, Result};
use serde::Serialize;
use std::sync::Arc;

#[cfg(test)]
mod tests;

/// Client for the Allinpay cloud gateway
///
/// Key material and credentials are fixed at construction. Clones share the
/// same keys and transport, so a client can serve concurrent requests.
pub struct AllinpayClient<T: Transport = HttpTransport> {
    app_id: String,
    app_account_id: String,
    notify_url: String,
    version: String,
    service_url: String,
    keys: Arc<KeyStore>,
    cipher: SensitiveInfoCipher,
    transport: Arc<T>,
}

impl<T: Transport> Clone for AllinpayClient<T> {
    fn clone(&self) -> Self {
        Self {
            app_id: self.app_id.clone(),
            app_account_id: self.app_account_id.clone(),
            notify_url: self.notify_url.clone(),
            version: self.version.clone(),
            service_url: self.service_url.clone(),
            keys: Arc::clone(&self.keys),
            cipher: self.cipher.clone(),
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: Transport> std::fmt::Debug for AllinpayClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AllinpayClient")
            .field("app_id", &self.app_id)
            .field("app_account_id", &self.app_account_id)
            .field("service_url", &self.service_url)
            .field("version", &self.version)
            .field("keys", &self.keys)
            .field("transport", &"<transport>")
            .finish()
    }
}

impl AllinpayClient<HttpTransport> {
    /// Create a client, loading key material from the configured files
    ///
    /// Fails if the key container or certificate cannot be read and parsed.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let keys = KeyStore::from_files(
            &config.pfx_path,
            &config.pfx_password,
            &config.tl_cert_path,
        )?;
        let transport = HttpTransport::new(config.timeout)?;

        Self::with_transport(config, keys, transport)
    }
}

impl<T: Transport> AllinpayClient<T> {
    /// Create a client from loaded keys and a custom transport
    pub fn with_transport(config: ClientConfig, keys: KeyStore, transport: T) -> Result<Self> {
        if config.app_id.is_empty() {
            return Err(AllinpayError::config("App ID cannot be empty"));
        }

        let cipher = SensitiveInfoCipher::from_secret(&config.app_secret_key)?;

        tracing::info!(
            "Allinpay client ready: app_id={}, environment={}, gateway={}",
            config.app_id,
            config.environment.as_str(),
            config.service_url()
        );

        Ok(Self {
            version: config.version().to_string(),
            service_url: config.service_url().to_string(),
            app_id: config.app_id,
            app_account_id: config.app_account_id,
            notify_url: config.notify_url,
            keys: Arc::new(keys),
            cipher,
            transport: Arc::new(transport),
        })
    }

    /// Build and sign the outbound parameter set for a gateway method
    ///
    /// The timestamp is taken now, in local time.
    pub fn bind_params<C>(&self, method: &str, content: &C) -> Result<SignedEnvelope>
    where
        C: Serialize + ?Sized,
    {
        let timestamp = chrono::Local::now()
            .format(values::TIMESTAMP_FORMAT)
            .to_string();
        self.bind_params_at(method, content, &timestamp)
    }

    pub(crate) fn bind_params_at<C>(
        &self,
        method: &str,
        content: &C,
        timestamp: &str,
    ) -> Result<SignedEnvelope>
    where
        C: Serialize + ?Sized,
    {
        let biz_content = serde_json::to_string(content).map_err(|e| {
            AllinpayError::payload_serialization(format!(
                "Failed to serialize business content for {}: {}",
                method, e
            ))
        })?;

        let params = ParameterSet::new()
            .with(fields::APP_ID, self.app_id.as_str())
            .with(fields::NOTIFY_URL, self.notify_url.as_str())
            .with(fields::METHOD, method)
            .with(fields::CHARSET, values::CHARSET_UTF8)
            .with(fields::FORMAT, values::FORMAT_JSON)
            .with(fields::TIMESTAMP, timestamp)
            .with(fields::VERSION, self.version.as_str())
            .with(fields::BIZ_CONTENT, biz_content);

        crypto::sign_envelope(params, self.keys.private_key())
    }

    /// Call a gateway method and return its verified response
    ///
    /// A response whose signature does not check out is an error; none of its
    /// content is returned.
    pub async fn request<C>(&self, method: &str, content: &C) -> Result<VerifiedResponse>
    where
        C: Serialize + ?Sized,
    {
        let envelope = self.bind_params(method, content)?;

        tracing::debug!(
            "Gateway request {}: {}",
            method,
            serde_json::to_string(envelope.params()).unwrap_or_default()
        );

        let response = self
            .transport
            .post(
                &self.service_url,
                values::FORM_CONTENT_TYPE,
                envelope.to_form_body(),
            )
            .await?;

        if !response.is_success() {
            tracing::warn!(
                "Gateway returned status {} for {}: {}",
                response.status,
                method,
                String::from_utf8_lossy(&response.body)
            );
            return Err(AllinpayError::transport(format!(
                "Gateway returned status {} for {}",
                response.status, method
            )));
        }

        let body = String::from_utf8(response.body)
            .map_err(|_| AllinpayError::verification("Response body is not UTF-8"))?;
        tracing::debug!("Gateway response {}: {}", method, body);

        crypto::verify_response(&body, self.keys.public_key()).map_err(|e| {
            tracing::warn!("Discarding unverifiable response for {}: {}", method, e);
            e
        })
    }

    /// Encrypt a sensitive field (identity number, card number, ...)
    ///
    /// Returns upper-case hex ready to place in the business content.
    pub fn encrypt_sensitive(&self, information: &str) -> Result<String> {
        self.cipher.encrypt_to_hex(information)
    }

    /// Decrypt a hex-encoded sensitive field returned by the gateway
    pub fn decrypt_sensitive(&self, encrypted: &str) -> Result<String> {
        self.cipher.decrypt_hex(encrypted)
    }

    /// Application identifier
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Application account identifier
    pub fn app_account_id(&self) -> &str {
        &self.app_account_id
    }

    /// Gateway URL requests are posted to
    pub fn service_url(&self) -> &str {
        &self.service_url
    }

    /// Loaded key material
    pub fn keys(&self) -> &KeyStore {
        &self.keys
    }
}
