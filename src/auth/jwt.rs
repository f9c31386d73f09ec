//! HS256 access tokens.
//!
//! Tokens are stateless: validity is signature + wall clock at verification.
//! No revocation list, no refresh.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token signing failed: {0}")]
    Signing(String),
}

/// Claims carried by an access token. `sub` is optional on the way in so a
/// token without it is reported as invalid rather than as a decode failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    default_ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("default_ttl", &self.default_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: &[u8], default_ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub fn issue(&self, subject: &str) -> Result<String, TokenError> {
        self.issue_with_ttl(subject, self.default_ttl)
    }

    /// `exp = now + ttl`. A zero or negative ttl yields an already-expired token.
    pub fn issue_with_ttl(&self, subject: &str, ttl: Duration) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: Some(subject.to_string()),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Returns the subject claim of a valid token.
    pub fn verify(&self, token: &str) -> Result<String, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            let reason = match e.kind() {
                ErrorKind::ExpiredSignature => "token expired".to_string(),
                ErrorKind::InvalidSignature => "signature mismatch".to_string(),
                _ => format!("malformed token: {e}"),
            };
            TokenError::InvalidToken(reason)
        })?;

        // The library only rejects exp < now; a token expiring this second is
        // already dead.
        if data.claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::InvalidToken("token expired".into()));
        }

        match data.claims.sub {
            Some(sub) if !sub.is_empty() => Ok(sub),
            _ => Err(TokenError::InvalidToken("missing subject claim".into())),
        }
    }

    /// Extract the token part of an `Authorization: Bearer <token>` value.
    pub fn extract_from_header(header: &str) -> Option<&str> {
        let (scheme, token) = header.trim().split_once(' ')?;
        let token = token.trim();
        (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret-that-is-long-enough-for-hs256";

    fn service() -> TokenService {
        TokenService::new(SECRET, Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES))
    }

    #[test]
    fn test_issue_then_verify_returns_subject() {
        let svc = service();
        let token = svc.issue("alice").unwrap();
        assert_eq!(svc.verify(&token).unwrap(), "alice");
    }

    #[test]
    fn test_zero_ttl_is_expired() {
        let svc = service();
        let token = svc.issue_with_ttl("alice", Duration::zero()).unwrap();
        assert!(matches!(svc.verify(&token), Err(TokenError::InvalidToken(_))));
    }

    #[test]
    fn test_past_expiry_is_rejected() {
        let svc = service();
        let token = svc.issue_with_ttl("alice", Duration::minutes(-5)).unwrap();
        assert_eq!(
            svc.verify(&token),
            Err(TokenError::InvalidToken("token expired".into()))
        );
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = service().issue("alice").unwrap();
        let other = TokenService::new(b"a-completely-different-signing-secret", Duration::minutes(5));
        assert_eq!(
            other.verify(&token),
            Err(TokenError::InvalidToken("signature mismatch".into()))
        );
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let svc = service();
        let token = svc.issue("alice").unwrap();
        let forged = svc.issue("mallory").unwrap();

        // Splice mallory's payload onto alice's signature.
        let parts: Vec<&str> = token.split('.').collect();
        let forged_parts: Vec<&str> = forged.split('.').collect();
        let spliced = format!("{}.{}.{}", parts[0], forged_parts[1], parts[2]);
        assert!(svc.verify(&spliced).is_err());
    }

    #[test]
    fn test_garbage_is_rejected() {
        let svc = service();
        for bad in ["", "not-a-jwt", "a.b.c"] {
            assert!(matches!(svc.verify(bad), Err(TokenError::InvalidToken(_))), "{bad}");
        }
    }

    #[test]
    fn test_missing_subject_is_rejected() {
        let svc = service();
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: None,
            iat: now,
            exp: now + 600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();
        assert_eq!(
            svc.verify(&token),
            Err(TokenError::InvalidToken("missing subject claim".into()))
        );
    }

    #[test]
    fn test_extract_from_header() {
        assert_eq!(TokenService::extract_from_header("Bearer abc.def"), Some("abc.def"));
        assert_eq!(TokenService::extract_from_header("bearer   xyz "), Some("xyz"));
        assert_eq!(TokenService::extract_from_header("Basic abc"), None);
        assert_eq!(TokenService::extract_from_header("Bearer "), None);
        assert_eq!(TokenService::extract_from_header("Bearer"), None);
    }
}
