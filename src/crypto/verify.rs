//! Response signature verification

use super::canonical::canonicalize;
use super::digest::signing_hash;
use super::encoding::marshal_record;
use crate::types::{fields, ParameterSet, ResponseRecord, VerifiedResponse};
use crate::{AllinpayError, Result};
use base64::{engine::general_purpose, Engine as _};
use rsa::{Pkcs1v15Sign, RsaPublicKey};
use serde_json::Value;
use sha2::Sha256;

/// Check a base64 signature over bytes using the digest chain
pub fn verify_bytes(content: &[u8], signature: &str, public_key: &RsaPublicKey) -> Result<()> {
    let signature = general_purpose::STANDARD
        .decode(signature)
        .map_err(|e| AllinpayError::verification(format!("Signature is not base64: {}", e)))?;

    public_key
        .verify(
            Pkcs1v15Sign::new::<Sha256>(),
            &signing_hash(content),
            &signature,
        )
        .map_err(|_| AllinpayError::verification("Signature does not match content"))
}

/// Remove and return the `sign` field of a response record
pub fn take_signature(record: &mut ResponseRecord) -> Result<String> {
    match record.remove(fields::SIGN) {
        Some(Value::String(signature)) => Ok(signature),
        Some(_) => Err(AllinpayError::verification("Response sign field is not a string")),
        None => Err(AllinpayError::verification("Response has no sign field")),
    }
}

/// Verify a raw gateway response body
///
/// The `sign` field is removed, the remaining fields are re-serialized with
/// [`marshal_record`], and the signature is checked against that text. Nothing from the body is returned unless the check passes.
pub fn verify_response(body: &str, public_key: &RsaPublicKey) -> Result<VerifiedResponse> {
    let mut record = match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(record)) => record,
        Ok(_) => {
            return Err(AllinpayError::verification(
                "Response body is not a JSON object",
            ))
        }
        Err(e) => {
            return Err(AllinpayError::verification(format!(
                "Response body is not valid JSON: {}",
                e
            )))
        }
    };

    let signature = take_signature(&mut record)?;
    let content = marshal_record(&record)?;

    verify_bytes(content.as_bytes(), &signature, public_key)?;

    Ok(VerifiedResponse::new(record, body.to_string()))
}

/// Verify a parameter set that carries its own `sign` field
pub fn verify_params(params: &ParameterSet, public_key: &RsaPublicKey) -> Result<()> {
    let signature = params
        .get(fields::SIGN)
        .filter(|signature| !signature.is_empty())
        .ok_or_else(|| AllinpayError::verification("Parameters have no sign field"))?;

    let mut unsigned = params.clone();
    unsigned.remove(fields::SIGN_TYPE);
    verify_bytes(&canonicalize(&unsigned), signature, public_key)
}
