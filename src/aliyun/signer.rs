//! ACS3-HMAC-SHA256 request signing
//!
//! The canonical request is
//!
//! ```text
//! METHOD\n
//! /\n
//! canonical query\n
//! name:value\n ... (signed headers, lowercase, sorted)\n
//! signed header names joined by ';'\n
//! hex(sha256(body))
//! ```
//!
//! and the signature is `hex(hmac_sha256(secret, "ACS3-HMAC-SHA256\n" + hex(sha256(canonical))))`.

use super::error::EcsError;
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

pub const SIGNATURE_ALGORITHM: &str = "ACS3-HMAC-SHA256";

/// RFC 3986 unreserved characters stay literal; everything else is escaped
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

pub fn percent_encode(s: &str) -> String {
    utf8_percent_encode(s, UNRESERVED).to_string()
}

/// Encode parameters as a sorted `k=v&k=v` query string
pub fn canonical_query(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Hex-encoded SHA-256 of the request body
pub fn hash_payload(payload: &[u8]) -> String {
    hex::encode(Sha256::digest(payload))
}

/// The parts of a request that the signature covers
pub struct SigningRequest<'a> {
    pub method: &'a str,
    pub canonical_query: &'a str,
    /// Lowercase header names to values; every entry is signed
    pub headers: &'a BTreeMap<String, String>,
    pub payload_hash: &'a str,
}

impl SigningRequest<'_> {
    pub fn signed_headers(&self) -> String {
        self.headers
            .keys()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(";")
    }

    pub fn canonical_request(&self) -> String {
        let canonical_headers: String = self
            .headers
            .iter()
            .map(|(name, value)| format!("{}:{}\n", name, value.trim()))
            .collect();

        format!(
            "{}\n/\n{}\n{}\n{}\n{}",
            self.method,
            self.canonical_query,
            canonical_headers,
            self.signed_headers(),
            self.payload_hash
        )
    }

    pub fn string_to_sign(&self) -> String {
        format!(
            "{}\n{}",
            SIGNATURE_ALGORITHM,
            hash_payload(self.canonical_request().as_bytes())
        )
    }

    /// Build the `Authorization` header value
    pub fn authorization(&self, key_id: &str, secret: &str) -> Result<String, EcsError> {
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .map_err(|e| EcsError::InvalidRequest(format!("bad signing key: {}", e)))?;
        mac.update(self.string_to_sign().as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());

        Ok(format!(
            "{} Credential={},SignedHeaders={},Signature={}",
            SIGNATURE_ALGORITHM,
            key_id,
            self.signed_headers(),
            signature
        ))
    }
}
