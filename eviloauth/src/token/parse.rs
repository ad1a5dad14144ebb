use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use super::errors::TokenError;
use super::types::{SHORT_ID_LEN, Token, TokenKind};
use crate::utils::base64url_decode;

/// Claims probed for the principal, in order.
const PRINCIPAL_CLAIMS: [&str; 3] = ["upn", "unique_name", "preferred_username"];

impl Token {
    /// Classify a raw bearer string.
    ///
    /// A string with exactly three dot-separated segments whose middle segment is a
    /// base64url-encoded JSON object becomes a JWT. Every other non-empty string is an
    /// opaque token; failing to decode is not an error.
    ///
    /// The signature is never verified.
    pub fn parse(raw: &str) -> Result<Self, TokenError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(TokenError::EmptyToken);
        }

        let mut token = Token {
            raw: raw.to_string(),
            kind: TokenKind::Opaque,
            principal: None,
            scope: None,
            issued_at: Utc::now(),
            expires_at: None,
            short_id: short_id(raw),
            algorithm: None,
            refresh_token: None,
        };

        if let Some(claims) = decode_claims(raw) {
            token.kind = TokenKind::Jwt;
            token.principal = PRINCIPAL_CLAIMS
                .iter()
                .find_map(|name| string_claim(&claims, name));
            token.scope = string_claim(&claims, "scp");
            token.expires_at = claims.get("exp").and_then(epoch_claim);
            // The header is informational only; a JWT with a garbage header still classifies
            token.algorithm = jsonwebtoken::decode_header(raw)
                .ok()
                .map(|header| format!("{:?}", header.alg));
        }

        tracing::debug!(
            kind = %token.kind,
            short_id = %token.short_id,
            "Parsed captured token"
        );

        Ok(token)
    }
}

fn short_id(raw: &str) -> String {
    let count = raw.chars().count();
    raw.chars().skip(count.saturating_sub(SHORT_ID_LEN)).collect()
}

fn decode_claims(raw: &str) -> Option<Map<String, Value>> {
    let segments: Vec<&str> = raw.split('.').collect();
    if segments.len() != 3 {
        return None;
    }

    let payload = base64url_decode(segments[1]).ok()?;
    match serde_json::from_slice::<Value>(&payload).ok()? {
        Value::Object(claims) => Some(claims),
        _ => None,
    }
}

fn string_claim(claims: &Map<String, Value>, name: &str) -> Option<String> {
    claims
        .get(name)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn epoch_claim(value: &Value) -> Option<DateTime<Utc>> {
    let secs = value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))?;
    DateTime::from_timestamp(secs, 0)
}
