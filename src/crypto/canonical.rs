//! Canonical parameter serialization
//!
//! The gateway rebuilds this exact byte string to check a signature: fields
//! sorted byte-wise by key, joined as `k1=v1&k2=v2`, no trailing `&`, no URL
//! encoding. Empty values and the `sign` field are left out.

use crate::types::{fields, ParameterSet};

/// Serialize a parameter set into its canonical signing string
pub fn canonicalize(params: &ParameterSet) -> Vec<u8> {
    let mut out = Vec::new();
    for (key, value) in params.non_empty().filter(|(key, _)| *key != fields::SIGN) {
        if !out.is_empty() {
            out.push(b'&');
        }
        out.extend_from_slice(key.as_bytes());
        out.push(b'=');
        out.extend_from_slice(value.as_bytes());
    }
    out
}
