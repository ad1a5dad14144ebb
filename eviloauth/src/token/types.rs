use chrono::{DateTime, Duration, Utc};
use std::fmt;

use super::errors::TokenError;

/// Number of trailing characters of the raw string used to identify an opaque token.
pub(crate) const SHORT_ID_LEN: usize = 10;

pub(crate) const JWT_KEY_PREFIX: &str = "JWT-";
pub(crate) const OPAQUE_KEY_PREFIX: &str = "OAT-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Jwt,
    Opaque,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jwt => "JWT",
            Self::Opaque => "Opaque",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One captured credential.
///
/// Built only through [`Token::parse`], so every instance carries a non-empty raw value.
/// Fields decoded from a JWT are fixed after parsing; on opaque tokens the operator
/// may fill in principal, scope and expiry by hand.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub(super) raw: String,
    pub(super) kind: TokenKind,
    pub(super) principal: Option<String>,
    pub(super) scope: Option<String>,
    pub(super) issued_at: DateTime<Utc>,
    pub(super) expires_at: Option<DateTime<Utc>>,
    pub(super) short_id: String,
    pub(super) algorithm: Option<String>,
    pub(super) refresh_token: Option<String>,
}

impl Token {
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn is_jwt(&self) -> bool {
        self.kind == TokenKind::Jwt
    }

    pub fn principal(&self) -> Option<&str> {
        self.principal.as_deref()
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn short_id(&self) -> &str {
        &self.short_id
    }

    /// Signing algorithm named in the JWT header, when the header decodes.
    pub fn algorithm(&self) -> Option<&str> {
        self.algorithm.as_deref()
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    pub fn with_refresh_token(mut self, refresh_token: Option<String>) -> Self {
        self.refresh_token = refresh_token.filter(|t| !t.trim().is_empty());
        self
    }

    /// Stable identity of the token inside the store.
    ///
    /// - JWT: `JWT-<principal>`, or `JWT-<short id>` when no principal claim was found
    /// - Opaque: `OAT-<principal>` once the operator assigned one, otherwise `OAT-<short id>`
    ///
    /// Whitespace in the suffix becomes `_` so the key stays one console word.
    pub fn key(&self) -> String {
        let suffix: String = self
            .principal
            .as_deref()
            .unwrap_or(&self.short_id)
            .chars()
            .map(|c| if c.is_whitespace() { '_' } else { c })
            .collect();
        match self.kind {
            TokenKind::Jwt => format!("{JWT_KEY_PREFIX}{suffix}"),
            TokenKind::Opaque => format!("{OPAQUE_KEY_PREFIX}{suffix}"),
        }
    }

    pub fn set_principal(&mut self, principal: &str) -> Result<(), TokenError> {
        self.ensure_editable("upn")?;
        let principal = principal.trim();
        if principal.chars().any(char::is_whitespace) {
            return Err(TokenError::InvalidPrincipal(principal.to_string()));
        }
        if principal.is_empty() {
            self.principal = None;
        } else {
            self.principal = Some(principal.to_string());
        }
        Ok(())
    }

    pub fn set_scope(&mut self, scope: &str) -> Result<(), TokenError> {
        self.ensure_editable("scope")?;
        let scope = scope.trim();
        self.scope = (!scope.is_empty()).then(|| scope.to_string());
        Ok(())
    }

    /// Set the expiry to `now + delta`.
    pub fn set_expiry(&mut self, delta: Duration) -> Result<(), TokenError> {
        self.ensure_editable("expiry")?;
        let expires_at = Utc::now()
            .checked_add_signed(delta)
            .ok_or(TokenError::ExpiryOutOfRange(delta.num_seconds()))?;
        self.expires_at = Some(expires_at);
        Ok(())
    }

    pub fn time_until_expiry(&self) -> Expiry {
        self.time_until_expiry_at(Utc::now())
    }

    pub(crate) fn time_until_expiry_at(&self, now: DateTime<Utc>) -> Expiry {
        match self.expires_at {
            None => Expiry::NotApplicable,
            Some(expires_at) if now >= expires_at => Expiry::Expired,
            Some(expires_at) => Expiry::Remaining(expires_at - now),
        }
    }

    fn ensure_editable(&self, field: &'static str) -> Result<(), TokenError> {
        match self.kind {
            TokenKind::Jwt => Err(TokenError::NotApplicable {
                field,
                kind: self.kind.as_str(),
            }),
            TokenKind::Opaque => Ok(()),
        }
    }
}

/// Remaining lifetime of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    Remaining(Duration),
    Expired,
    NotApplicable,
}

impl fmt::Display for Expiry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remaining(remaining) => {
                let secs = remaining.num_seconds().max(0);
                write!(
                    f,
                    "{:02}:{:02}:{:02}",
                    secs / 3600,
                    (secs % 3600) / 60,
                    secs % 60
                )
            }
            Self::Expired => f.write_str("Expired"),
            Self::NotApplicable => f.write_str("N/A"),
        }
    }
}

/// Parse an `HHMM` expiry string into a duration.
pub fn parse_expiry_hhmm(value: &str) -> Result<Duration, TokenError> {
    let value = value.trim();
    let invalid = || TokenError::InvalidExpiry(value.to_string());

    if value.len() != 4 || !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let hours: i64 = value[..2].parse().map_err(|_| invalid())?;
    let minutes: i64 = value[2..].parse().map_err(|_| invalid())?;
    if minutes >= 60 {
        return Err(invalid());
    }

    Ok(Duration::hours(hours) + Duration::minutes(minutes))
}
