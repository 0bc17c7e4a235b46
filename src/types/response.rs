//! Gateway response types

use super::constants::values;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Raw field map of a gateway response
pub type ResponseRecord = Map<String, Value>;

/// A gateway response whose signature has been checked
///
/// Only [`crate::crypto::verify`] creates these, so holding one means the
/// fields came from the holder of the trusted certificate's key.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedResponse {
    fields: ResponseRecord,
    body: String,
}

impl VerifiedResponse {
    pub(crate) fn new(fields: ResponseRecord, body: String) -> Self {
        Self { fields, body }
    }

    /// Get a field by name (`sign` has already been removed)
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// All verified fields
    pub fn fields(&self) -> &ResponseRecord {
        &self.fields
    }

    /// The response body exactly as received
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Gateway result code
    pub fn code(&self) -> Option<&str> {
        self.get("code").and_then(Value::as_str)
    }

    /// Gateway result message
    pub fn msg(&self) -> Option<&str> {
        self.get("msg").and_then(Value::as_str)
    }

    /// Business sub code
    pub fn sub_code(&self) -> Option<&str> {
        self.get("subCode").and_then(Value::as_str)
    }

    /// Business sub message
    pub fn sub_msg(&self) -> Option<&str> {
        self.get("subMsg").and_then(Value::as_str)
    }

    /// Whether the gateway accepted the call
    pub fn is_success(&self) -> bool {
        self.code() == Some(values::SUCCESS_CODE)
    }

    /// The business `data` object, if any
    pub fn data(&self) -> Option<&Value> {
        self.get("data")
    }

    /// Deserialize the business `data` object
    pub fn deserialize_data<T: DeserializeOwned>(&self) -> crate::Result<T> {
        let data = self.data().cloned().unwrap_or(Value::Null);
        Ok(serde_json::from_value(data)?)
    }

    /// Take ownership of the verified fields
    pub fn into_fields(self) -> ResponseRecord {
        self.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    fn response(value: Value) -> VerifiedResponse {
        let body = value.to_string();
        match value {
            Value::Object(fields) => VerifiedResponse::new(fields, body),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_accessors() {
        let resp = response(json!({
            "code": "10000",
            "msg": "ok",
            "subCode": "OK",
            "data": {"bizUserId": "u-1"}
        }));
        assert!(resp.is_success());
        assert_eq!(resp.msg(), Some("ok"));
        assert_eq!(resp.sub_code(), Some("OK"));
        assert_eq!(resp.sub_msg(), None);
        assert_eq!(resp.data().unwrap()["bizUserId"], "u-1");
    }

    #[test]
    fn test_deserialize_data() {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Member {
            biz_user_id: String,
        }

        let resp = response(json!({"code": "10000", "data": {"bizUserId": "u-1"}}));
        let member: Member = resp.deserialize_data().unwrap();
        assert_eq!(member.biz_user_id, "u-1");
    }

    #[test]
    fn test_failure_code() {
        let resp = response(json!({"code": "40000", "msg": "invalid"}));
        assert!(!resp.is_success());
        assert!(resp.deserialize_data::<Vec<String>>().is_err());
    }
}
