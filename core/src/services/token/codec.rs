//! Compact JWT encoding and parsing
//!
//! Signing happens over the exact `b64url(header) "." b64url(claims)` bytes
//! produced here, and verification happens over the bytes as received, so a
//! token never needs to be re-serialized to be checked.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::{Map, Value};

use crate::domain::entities::{Claims, SigningKey, Token, TokenHeader};
use crate::errors::{SigningFailure, VerificationFailure};

/// Longest token the parser accepts
pub const MAX_TOKEN_BYTES: usize = 8 * 1024;

/// Longest `kid` header value the parser accepts
pub const MAX_KID_BYTES: usize = 256;

/// A structurally valid token whose signature has not been checked yet
#[derive(Debug, Clone)]
pub struct DecodedToken {
    pub header: TokenHeader,
    /// Key identifier from the header; always present
    pub kid: String,
    /// Raw claims object
    pub claims: Map<String, Value>,
    /// `header.claims` exactly as received
    pub signing_input: String,
    /// base64url signature segment
    pub signature: String,
}

/// Owns the compact serialization of tokens
pub struct TokenCodec;

impl TokenCodec {
    /// Sign `claims` with `key`, writing the key's algorithm and `kid` into the header
    pub fn sign(claims: &Claims, key: &SigningKey) -> Result<Token, SigningFailure> {
        let header = TokenHeader::new(key.algorithm().as_str(), key.kid());
        Self::encode(&header, claims, key)
    }

    /// Encode `header` and `claims` and sign them with `key` as given
    pub fn encode(
        header: &TokenHeader,
        claims: &Claims,
        key: &SigningKey,
    ) -> Result<Token, SigningFailure> {
        let header_json = serde_json::to_vec(header).map_err(|e| SigningFailure::Crypto {
            message: format!("Failed to serialize header: {}", e),
        })?;
        let claims_json = serde_json::to_vec(claims).map_err(|e| SigningFailure::Crypto {
            message: format!("Failed to serialize claims: {}", e),
        })?;

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header_json),
            URL_SAFE_NO_PAD.encode(claims_json)
        );

        let encoding_key = key.encoding_key()?;
        let signature = jsonwebtoken::crypto::sign(
            signing_input.as_bytes(),
            &encoding_key,
            key.algorithm().jwt_algorithm(),
        )
        .map_err(|e| SigningFailure::Crypto {
            message: format!("Failed to sign token with key {}: {}", key.kid(), e),
        })?;

        let encoded = format!("{}.{}", signing_input, signature);
        Ok(Token::new(header.clone(), claims.clone(), signature, encoded))
    }

    /// Split and decode a compact token without checking its signature
    pub fn decode_unverified(token: &str) -> Result<DecodedToken, VerificationFailure> {
        if token.is_empty() || token.len() > MAX_TOKEN_BYTES {
            return Err(VerificationFailure::MalformedToken);
        }

        let mut segments = token.split('.');
        let (header_b64, claims_b64, signature) =
            match (segments.next(), segments.next(), segments.next(), segments.next()) {
                (Some(h), Some(c), Some(s), None) if !h.is_empty() && !c.is_empty() && !s.is_empty() => {
                    (h, c, s)
                }
                _ => return Err(VerificationFailure::MalformedToken),
            };

        let header_json = decode_segment(header_b64)?;
        let claims_json = decode_segment(claims_b64)?;
        decode_segment(signature)?;

        let header: TokenHeader =
            serde_json::from_slice(&header_json).map_err(|_| VerificationFailure::MalformedToken)?;
        let claims = match serde_json::from_slice::<Value>(&claims_json) {
            Ok(Value::Object(claims)) => claims,
            _ => return Err(VerificationFailure::MalformedToken),
        };

        let kid = match header.kid.as_deref() {
            Some(kid) if !kid.is_empty() && kid.len() <= MAX_KID_BYTES => kid.to_string(),
            _ => return Err(VerificationFailure::MalformedToken),
        };

        Ok(DecodedToken {
            header,
            kid,
            claims,
            signing_input: token[..header_b64.len() + 1 + claims_b64.len()].to_string(),
            signature: signature.to_string(),
        })
    }
}

fn decode_segment(segment: &str) -> Result<Vec<u8>, VerificationFailure> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| VerificationFailure::MalformedToken)
}
