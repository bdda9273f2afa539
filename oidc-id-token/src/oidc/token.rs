//! Compact JWT parsing and claims extraction.
//!
//! Parsing only checks structure: three base64url segments, a JSON header
//! with an algorithm, and a JSON payload carrying the required ID token
//! claims. Nothing here looks at signatures or clocks.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// One of the three dot-separated parts of a compact token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Header,
    Payload,
    Signature,
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Segment::Header => "header",
            Segment::Payload => "payload",
            Segment::Signature => "signature",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token must have three parts; found {0}")]
    SegmentCount(usize),

    #[error("failed to decode JWT {segment}: {reason}")]
    Base64 { segment: Segment, reason: String },

    #[error("unable to unmarshal JWT {segment}: {reason}")]
    Json { segment: Segment, reason: String },
}

impl TokenError {
    /// The segment that failed to decode, if the failure is tied to one.
    pub fn segment(&self) -> Option<Segment> {
        match self {
            TokenError::SegmentCount(_) => None,
            TokenError::Base64 { segment, .. } | TokenError::Json { segment, .. } => {
                Some(*segment)
            }
        }
    }
}

/// Decoded JOSE header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtHeader {
    /// Signing algorithm identifier, e.g. `RS256`
    pub alg: String,

    /// Media type, usually `JWT`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,

    /// Key identifier; empty when the header omits it
    #[serde(default)]
    pub kid: String,
}

/// Claims of a decoded ID token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdTokenClaims {
    /// Issuer
    pub iss: String,

    /// Audience (the client id the token was minted for)
    pub aud: String,

    /// Expiration time, seconds since the epoch
    pub exp: i64,

    /// Issued at, seconds since the epoch
    pub iat: i64,

    /// Subject
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Every claim in the payload, including the ones above
    #[serde(skip)]
    pub raw_claims: serde_json::Map<String, serde_json::Value>,
}

impl IdTokenClaims {
    /// Look up an arbitrary claim from the payload.
    pub fn claim(&self, name: &str) -> Option<&serde_json::Value> {
        self.raw_claims.get(name)
    }
}

/// A token split into its segments with every segment decoded.
#[derive(Debug, Clone)]
pub struct ParsedToken {
    header_segment: String,
    payload_segment: String,
    signature_segment: String,
    pub header: JwtHeader,
    pub claims: IdTokenClaims,
    pub signature: Vec<u8>,
}

impl ParsedToken {
    pub fn header_segment(&self) -> &str {
        &self.header_segment
    }

    pub fn payload_segment(&self) -> &str {
        &self.payload_segment
    }

    pub fn signature_segment(&self) -> &str {
        &self.signature_segment
    }

    /// The exact bytes the issuer signed: `header.payload` as transmitted.
    pub fn signed_content(&self) -> String {
        format!("{}.{}", self.header_segment, self.payload_segment)
    }

    pub fn into_claims(self) -> IdTokenClaims {
        self.claims
    }
}

/// Split and decode a compact-serialized token.
pub fn parse_token(token: &str) -> Result<ParsedToken, TokenError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(TokenError::SegmentCount(parts.len()));
    }

    let header = parse_header(parts[0])?;
    let claims = parse_claims(parts[1])?;
    let signature = decode_segment(parts[2], Segment::Signature)?;

    Ok(ParsedToken {
        header_segment: parts[0].to_string(),
        payload_segment: parts[1].to_string(),
        signature_segment: parts[2].to_string(),
        header,
        claims,
        signature,
    })
}

fn parse_header(segment: &str) -> Result<JwtHeader, TokenError> {
    let decoded = decode_segment(segment, Segment::Header)?;
    serde_json::from_slice(&decoded).map_err(|e| TokenError::Json {
        segment: Segment::Header,
        reason: e.to_string(),
    })
}

fn parse_claims(segment: &str) -> Result<IdTokenClaims, TokenError> {
    let decoded = decode_segment(segment, Segment::Payload)?;
    let json_error = |e: serde_json::Error| TokenError::Json {
        segment: Segment::Payload,
        reason: e.to_string(),
    };

    let raw_claims: serde_json::Map<String, serde_json::Value> =
        serde_json::from_slice(&decoded).map_err(json_error)?;
    let mut claims: IdTokenClaims =
        serde_json::from_value(serde_json::Value::Object(raw_claims.clone()))
            .map_err(json_error)?;
    claims.raw_claims = raw_claims;

    Ok(claims)
}

fn decode_segment(segment: &str, which: Segment) -> Result<Vec<u8>, TokenError> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| TokenError::Base64 {
            segment: which,
            reason: e.to_string(),
        })
}
