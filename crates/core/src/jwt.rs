//! JSON Web Token decoding and HMAC verification
//!
//! Only the symmetric HS256/HS384/HS512 algorithms can be verified or signed;
//! any token can still be decoded.

use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Sha256, Sha384, Sha512};
use subtle::ConstantTimeEq;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Malformed token: expected 3 segments separated by '.', found {0}")]
    Malformed(usize),

    #[error("Invalid base64url in {segment}: {message}")]
    Base64 {
        segment: &'static str,
        message: String,
    },

    #[error("Invalid JSON in {segment}: {message}")]
    Json {
        segment: &'static str,
        message: String,
    },

    #[error("The {0} is not a JSON object")]
    NotAnObject(&'static str),

    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Invalid signing key: {0}")]
    InvalidKey(String),
}

/// HMAC algorithms supported for verification and signing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Algorithm {
    HS256,
    HS384,
    HS512,
}

impl Algorithm {
    /// Parse a user-supplied algorithm name, ignoring case.
    pub fn parse(name: &str) -> Result<Self, JwtError> {
        let trimmed = name.trim();
        Self::from_header(&trimmed.to_ascii_uppercase())
            .map_err(|_| JwtError::UnsupportedAlgorithm(trimmed.to_string()))
    }

    /// Match a header `alg` value exactly; JWS algorithm names are case-sensitive.
    pub fn from_header(alg: &str) -> Result<Self, JwtError> {
        match alg {
            "HS256" => Ok(Algorithm::HS256),
            "HS384" => Ok(Algorithm::HS384),
            "HS512" => Ok(Algorithm::HS512),
            other => Err(JwtError::UnsupportedAlgorithm(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::HS256 => "HS256",
            Algorithm::HS384 => "HS384",
            Algorithm::HS512 => "HS512",
        }
    }
}

/// A decoded, unverified token
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedJwt {
    pub header: Value,
    pub payload: Value,
    /// Signature segment as it appeared in the token
    pub signature: String,
}

impl DecodedJwt {
    /// The `alg` header value, if present
    pub fn algorithm(&self) -> Option<&str> {
        self.header.get("alg").and_then(Value::as_str)
    }
}

/// Registered time claims, rendered for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClaimTimes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_before: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    pub expired: bool,
    pub not_yet_valid: bool,
}

struct Segments<'a> {
    header: &'a str,
    payload: &'a str,
    signature: &'a str,
}

fn split(token: &str) -> Result<Segments<'_>, JwtError> {
    let parts: Vec<&str> = token.trim().split('.').collect();
    match parts.as_slice() {
        [header, payload, signature] => Ok(Segments {
            header,
            payload,
            signature,
        }),
        _ => Err(JwtError::Malformed(parts.len())),
    }
}

/// Decode one base64url segment, with or without padding.
fn decode_segment(segment: &str, name: &'static str) -> Result<Vec<u8>, JwtError> {
    let mut normalized = segment.trim().to_string();
    let rem = normalized.len() % 4;
    if rem != 0 {
        normalized.extend(std::iter::repeat_n('=', 4 - rem));
    }

    URL_SAFE
        .decode(normalized.as_bytes())
        .map_err(|e| JwtError::Base64 {
            segment: name,
            message: e.to_string(),
        })
}

fn decode_object(segment: &str, name: &'static str) -> Result<Value, JwtError> {
    let bytes = decode_segment(segment, name)?;
    let value: Value = serde_json::from_slice(&bytes).map_err(|e| JwtError::Json {
        segment: name,
        message: e.to_string(),
    })?;

    if !value.is_object() {
        return Err(JwtError::NotAnObject(name));
    }

    Ok(value)
}

/// Decode header and payload without checking the signature.
pub fn decode(token: &str) -> Result<DecodedJwt, JwtError> {
    let segments = split(token)?;

    Ok(DecodedJwt {
        header: decode_object(segments.header, "header")?,
        payload: decode_object(segments.payload, "payload")?,
        signature: segments.signature.to_string(),
    })
}

fn mac_bytes(algorithm: Algorithm, secret: &[u8], input: &[u8]) -> Result<Vec<u8>, JwtError> {
    let invalid_key = |e: hmac::digest::InvalidLength| JwtError::InvalidKey(e.to_string());

    let bytes = match algorithm {
        Algorithm::HS256 => {
            let mut mac = Hmac::<Sha256>::new_from_slice(secret).map_err(invalid_key)?;
            mac.update(input);
            mac.finalize().into_bytes().to_vec()
        }
        Algorithm::HS384 => {
            let mut mac = Hmac::<Sha384>::new_from_slice(secret).map_err(invalid_key)?;
            mac.update(input);
            mac.finalize().into_bytes().to_vec()
        }
        Algorithm::HS512 => {
            let mut mac = Hmac::<Sha512>::new_from_slice(secret).map_err(invalid_key)?;
            mac.update(input);
            mac.finalize().into_bytes().to_vec()
        }
    };

    Ok(bytes)
}

/// Check the token's HMAC signature against `secret`.
///
/// The algorithm comes from the header `alg` field. Returns `Ok(false)` for
/// a well-formed token whose signature does not match.
pub fn verify(token: &str, secret: &[u8]) -> Result<bool, JwtError> {
    let decoded = decode(token)?;
    let algorithm = Algorithm::from_header(decoded.algorithm().unwrap_or("none"))?;
    let segments = split(token)?;

    let signature = match decode_segment(segments.signature, "signature") {
        Ok(bytes) => bytes,
        Err(_) => return Ok(false),
    };

    let signing_input = format!("{}.{}", segments.header, segments.payload);
    let expected = mac_bytes(algorithm, secret, signing_input.as_bytes())?;

    Ok(expected.as_slice().ct_eq(signature.as_slice()).into())
}

/// Build a signed token from a payload object.
///
/// The header is `{"alg": <algorithm>, "typ": "JWT"}`.
pub fn sign(payload: &Value, secret: &[u8], algorithm: Algorithm) -> Result<String, JwtError> {
    if !payload.is_object() {
        return Err(JwtError::NotAnObject("payload"));
    }

    let mut header = Map::new();
    header.insert("alg".to_string(), Value::from(algorithm.as_str()));
    header.insert("typ".to_string(), Value::from("JWT"));

    let header_json = Value::Object(header).to_string();
    let payload_json = payload.to_string();

    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header_json.as_bytes()),
        URL_SAFE_NO_PAD.encode(payload_json.as_bytes())
    );
    let signature = mac_bytes(algorithm, secret, signing_input.as_bytes())?;

    Ok(format!(
        "{signing_input}.{}",
        URL_SAFE_NO_PAD.encode(signature)
    ))
}

fn timestamp_claim(payload: &Value, claim: &str) -> Option<i64> {
    payload.get(claim).and_then(|v| {
        v.as_i64()
            .or_else(|| v.as_f64().map(|f| f as i64))
    })
}

fn to_rfc3339(seconds: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp(seconds, 0).map(|dt| dt.to_rfc3339())
}

/// Interpret `iat`, `nbf` and `exp` relative to `now`.
pub fn claim_times(payload: &Value, now: DateTime<Utc>) -> ClaimTimes {
    let iat = timestamp_claim(payload, "iat");
    let nbf = timestamp_claim(payload, "nbf");
    let exp = timestamp_claim(payload, "exp");
    let now = now.timestamp();

    ClaimTimes {
        issued_at: iat.and_then(to_rfc3339),
        not_before: nbf.and_then(to_rfc3339),
        expires_at: exp.and_then(to_rfc3339),
        expired: exp.is_some_and(|exp| now >= exp),
        not_yet_valid: nbf.is_some_and(|nbf| now < nbf),
    }
}
