//! Protocol constants: field names, fixed values, and gateway endpoints

/// Names of the fields in the outbound request envelope
pub mod fields {
    /// Application identifier
    pub const APP_ID: &str = "appId";
    /// Asynchronous notification URL
    pub const NOTIFY_URL: &str = "notifyUrl";
    /// Gateway method name
    pub const METHOD: &str = "method";
    /// Character set of the request
    pub const CHARSET: &str = "charset";
    /// Payload format
    pub const FORMAT: &str = "format";
    /// Send time, `YYYY-MM-DD HH:MM:SS`
    pub const TIMESTAMP: &str = "timestamp";
    /// Interface version
    pub const VERSION: &str = "version";
    /// JSON-serialized business payload
    pub const BIZ_CONTENT: &str = "bizContent";
    /// Signature field, present in both requests and responses
    pub const SIGN: &str = "sign";
    /// Signature algorithm tag
    pub const SIGN_TYPE: &str = "signType";
}

/// Fixed values carried by every request
pub mod values {
    /// Request charset
    pub const CHARSET_UTF8: &str = "utf-8";
    /// Request payload format
    pub const FORMAT_JSON: &str = "JSON";
    /// Signature algorithm tag sent as `signType`
    pub const SIGN_TYPE_SHA256_RSA: &str = "SHA256WithRSA";
    /// Interface version used when none is configured
    pub const DEFAULT_VERSION: &str = "1.0";
    /// `chrono` format of the `timestamp` field
    pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
    /// Content type of the outbound form body
    pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded;charset=utf-8";
    /// Response `code` of a successful call
    pub const SUCCESS_CODE: &str = "10000";
}

/// Gateway endpoints
pub mod gateways {
    /// Test environment gateway
    pub const TEST: &str = "http://test.allinpay.com/op/gateway";
    /// Production gateway
    pub const PRODUCTION: &str = "https://cloud.allinpay.com/gateway";
}

/// Environment variables read by `ClientConfig::from_env`
pub mod env_vars {
    pub const APP_ID: &str = "ALLINPAY_APP_ID";
    pub const APP_SECRET_KEY: &str = "ALLINPAY_APP_SECRET_KEY";
    pub const APP_ACCOUNT_ID: &str = "ALLINPAY_APP_ACCOUNT_ID";
    pub const PFX_PATH: &str = "ALLINPAY_PFX_PATH";
    pub const PFX_PASSWORD: &str = "ALLINPAY_PFX_PASSWORD";
    pub const TL_CERT_PATH: &str = "ALLINPAY_TL_CERT_PATH";
    pub const PRODUCTION: &str = "ALLINPAY_PRODUCTION";
    pub const VERSION: &str = "ALLINPAY_VERSION";
    pub const NOTIFY_URL: &str = "ALLINPAY_NOTIFY_URL";
    pub const SERVICE_URL: &str = "ALLINPAY_SERVICE_URL";
    pub const TIMEOUT_SECS: &str = "ALLINPAY_TIMEOUT_SECS";
}
