//! Client configuration

use super::constants::{env_vars, gateways, values};
use crate::{AllinpayError, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Gateway environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    /// Allinpay test gateway
    #[default]
    Test,
    /// Allinpay production gateway
    Production,
}

impl Environment {
    /// Gateway URL for this environment
    pub fn gateway_url(&self) -> &'static str {
        match self {
            Environment::Test => gateways::TEST,
            Environment::Production => gateways::PRODUCTION,
        }
    }

    /// Get the environment name
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Test => "test",
            Environment::Production => "production",
        }
    }
}

/// Configuration for [`crate::AllinpayClient`]
#[derive(Clone, Default)]
pub struct ClientConfig {
    /// Application identifier issued by Allinpay
    pub app_id: String,
    /// Shared secret used to encrypt sensitive fields
    pub app_secret_key: String,
    /// Application account identifier
    pub app_account_id: String,
    /// Path to the password-protected PKCS#12 key container
    pub pfx_path: PathBuf,
    /// Password of the key container
    pub pfx_password: String,
    /// Path to the gateway's PEM certificate
    pub tl_cert_path: PathBuf,
    /// Gateway environment
    pub environment: Environment,
    /// Explicit gateway URL, overriding the environment's
    pub service_url: Option<String>,
    /// Interface version; empty means `1.0`
    pub version: String,
    /// Asynchronous notification URL; may be empty
    pub notify_url: String,
    /// Request timeout
    pub timeout: Option<Duration>,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("app_id", &self.app_id)
            .field("app_secret_key", &"<redacted>")
            .field("app_account_id", &self.app_account_id)
            .field("pfx_path", &self.pfx_path)
            .field("pfx_password", &"<redacted>")
            .field("tl_cert_path", &self.tl_cert_path)
            .field("environment", &self.environment)
            .field("service_url", &self.service_url)
            .field("version", &self.version)
            .field("notify_url", &self.notify_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ClientConfig {
    /// Create a new client config
    pub fn new(
        app_id: impl Into<String>,
        pfx_path: impl Into<PathBuf>,
        pfx_password: impl Into<String>,
        tl_cert_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            app_id: app_id.into(),
            pfx_path: pfx_path.into(),
            pfx_password: pfx_password.into(),
            tl_cert_path: tl_cert_path.into(),
            ..Default::default()
        }
    }

    /// Load the configuration from `ALLINPAY_*` environment variables
    pub fn from_env() -> Result<Self> {
        let var = |name: &str| env::var(name).unwrap_or_default();

        let environment = match var(env_vars::PRODUCTION).to_ascii_lowercase().as_str() {
            "" | "0" | "false" | "no" => Environment::Test,
            "1" | "true" | "yes" => Environment::Production,
            other => {
                return Err(AllinpayError::config(format!(
                    "{} must be a boolean, got '{}'",
                    env_vars::PRODUCTION,
                    other
                )))
            }
        };

        let timeout = match env::var(env_vars::TIMEOUT_SECS) {
            Ok(secs) => Some(Duration::from_secs(secs.parse().map_err(|_| {
                AllinpayError::config(format!(
                    "{} must be a whole number of seconds",
                    env_vars::TIMEOUT_SECS
                ))
            })?)),
            Err(_) => None,
        };

        let service_url = Some(var(env_vars::SERVICE_URL)).filter(|url| !url.is_empty());

        Ok(Self {
            app_id: var(env_vars::APP_ID),
            app_secret_key: var(env_vars::APP_SECRET_KEY),
            app_account_id: var(env_vars::APP_ACCOUNT_ID),
            pfx_path: var(env_vars::PFX_PATH).into(),
            pfx_password: var(env_vars::PFX_PASSWORD),
            tl_cert_path: var(env_vars::TL_CERT_PATH).into(),
            environment,
            service_url,
            version: var(env_vars::VERSION),
            notify_url: var(env_vars::NOTIFY_URL),
            timeout,
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.app_id.is_empty() {
            return Err(AllinpayError::config("App ID cannot be empty"));
        }

        if self.pfx_path.as_os_str().is_empty() {
            return Err(AllinpayError::config("Key container path cannot be empty"));
        }

        if self.tl_cert_path.as_os_str().is_empty() {
            return Err(AllinpayError::config("Certificate path cannot be empty"));
        }

        let url = self.service_url();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(AllinpayError::config(
                "Gateway URL must start with http:// or https://",
            ));
        }

        Ok(())
    }

    /// Set the shared secret key
    pub fn with_app_secret_key(mut self, app_secret_key: impl Into<String>) -> Self {
        self.app_secret_key = app_secret_key.into();
        self
    }

    /// Set the application account id
    pub fn with_app_account_id(mut self, app_account_id: impl Into<String>) -> Self {
        self.app_account_id = app_account_id.into();
        self
    }

    /// Set the gateway environment
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Target the production gateway
    pub fn with_production(self, production: bool) -> Self {
        self.with_environment(if production {
            Environment::Production
        } else {
            Environment::Test
        })
    }

    /// Override the gateway URL
    pub fn with_service_url(mut self, url: impl Into<String>) -> Self {
        self.service_url = Some(url.into());
        self
    }

    /// Set the interface version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Set the notification URL
    pub fn with_notify_url(mut self, notify_url: impl Into<String>) -> Self {
        self.notify_url = notify_url.into();
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Gateway URL requests are posted to
    pub fn service_url(&self) -> &str {
        self.service_url
            .as_deref()
            .unwrap_or_else(|| self.environment.gateway_url())
    }

    /// Interface version, falling back to `1.0`
    pub fn version(&self) -> &str {
        if self.version.is_empty() {
            values::DEFAULT_VERSION
        } else {
            &self.version
        }
    }
}
