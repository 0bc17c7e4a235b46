//! Request parameter types

use super::constants::{fields, values};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// String-keyed request parameters
///
/// Keys are case-sensitive and unique. Iteration is always in ascending
/// byte-wise key order, which is the order the gateway canonicalizes in.
/// Empty values may be stored but are never signed or transmitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSet(BTreeMap<String, String>);

impl ParameterSet {
    /// Create an empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, returning the previous value if the key was present
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Get a field value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Remove a field
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    /// Check whether a field is present (even if empty)
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of fields, including empty ones
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set has no fields at all
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over all fields in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Iterate over fields with a non-empty value, in key order
    pub fn non_empty(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter().filter(|(_, v)| !v.is_empty())
    }

    /// Encode as an `application/x-www-form-urlencoded` body, omitting empty values
    pub fn to_form_body(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in self.non_empty() {
            serializer.append_pair(key, value);
        }
        serializer.finish()
    }
}

impl<K, V> FromIterator<(K, V)> for ParameterSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A parameter set together with the signature computed over it
///
/// The signed fields are frozen once the envelope exists. Changing a request
/// means building a new parameter set and signing it again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedEnvelope {
    params: ParameterSet,
    signature: String,
}

impl SignedEnvelope {
    pub(crate) fn new(params: ParameterSet, signature: String) -> Self {
        Self { params, signature }
    }

    /// The fields covered by the signature
    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    /// Base64 signature
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// The full outbound field set: signed fields plus `sign` and `signType`
    pub fn to_parameter_set(&self) -> ParameterSet {
        let mut params = self.params.clone();
        params.insert(fields::SIGN, self.signature.clone());
        params.insert(fields::SIGN_TYPE, values::SIGN_TYPE_SHA256_RSA);
        params
    }

    /// Encode the full outbound field set as a form body
    pub fn to_form_body(&self) -> String {
        self.to_parameter_set().to_form_body()
    }
}
