//! Session token handling
//!
//! The token is only inspected, never verified: the server remains the
//! authority. Claims decide whether admin views are offered.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};

use buysearch_types::TokenClaims;

/// Admin view gate. Views render nothing while `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdminGate {
    #[default]
    Pending,
    Allowed,
    Denied,
}

impl AdminGate {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AdminGate::Allowed)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    token: Option<String>,
}

impl Session {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn set_token(&mut self, token: Option<String>) {
        *self = Self::new(token);
    }

    pub fn clear(&mut self) {
        self.token = None;
    }

    /// Presence of a token is all a logged-in check requires.
    pub fn is_logged_in(&self) -> bool {
        self.token.is_some()
    }

    /// Decode the JWT payload segment. `None` for anything malformed.
    pub fn claims(&self) -> Option<TokenClaims> {
        decode_claims(self.token.as_deref()?)
    }

    /// Tokens without an `exp` claim never expire client-side.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.claims().and_then(|c| c.exp) {
            Some(exp) => now.timestamp() >= exp,
            None => false,
        }
    }

    /// Resolve the admin gate once the token is known.
    pub fn admin_gate(&self, now: DateTime<Utc>) -> AdminGate {
        if !self.is_logged_in() || self.is_expired(now) {
            return AdminGate::Denied;
        }
        match self.claims() {
            Some(claims) if claims.grants_admin() => AdminGate::Allowed,
            _ => AdminGate::Denied,
        }
    }
}

fn decode_claims(token: &str) -> Option<TokenClaims> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    match serde_json::from_slice(&bytes) {
        Ok(claims) => Some(claims),
        Err(e) => {
            tracing::debug!(error = %e, "token payload is not valid claims json");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn token(payload: &str) -> String {
        format!(
            "{}.{}.signature",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256"}"#),
            URL_SAFE_NO_PAD.encode(payload)
        )
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_admin_claim() {
        let session = Session::new(Some(token(r#"{"sub":"1","role":"admin","exp":2000}"#)));
        assert!(session.is_logged_in());
        assert_eq!(session.admin_gate(at(1000)), AdminGate::Allowed);
        assert_eq!(session.admin_gate(at(2000)), AdminGate::Denied);
    }

    #[test]
    fn test_regular_user_denied() {
        let session = Session::new(Some(token(r#"{"sub":"2","role":"user"}"#)));
        assert!(!session.is_expired(at(i64::from(i32::MAX))));
        assert_eq!(session.admin_gate(at(0)), AdminGate::Denied);
    }

    #[test]
    fn test_malformed_tokens() {
        let session = Session::new(Some("not-a-jwt".into()));
        assert!(session.is_logged_in());
        assert_eq!(session.claims(), None);
        assert_eq!(session.admin_gate(at(0)), AdminGate::Denied);

        assert!(!Session::new(Some("  ".into())).is_logged_in());
        assert_eq!(Session::default().admin_gate(at(0)), AdminGate::Denied);
    }
}
