// [library] JOSE kit - JSON Web Signature and JWT implementation for Rust
use josekit::{
    jws::{JwsHeader, HS256, HS384, HS512},
    jwt::{self, JwtPayload},
    JoseError,
};

// [library] Secrecy - keeps the signing key out of Debug output and logs
use secrecy::{ExposeSecret, Secret};

use serde::Serialize;
use serde_json::Value;
use std::{fmt, str::FromStr};
use thiserror::Error;

// [library] Time handling for token expiration and timestamps
use time::{Duration, OffsetDateTime};

/// Token type tag returned to clients alongside every access token.
pub const TOKEN_TYPE: &str = "bearer";

/// Default access token lifetime.
pub const DEFAULT_ACCESS_TTL_MINS: i64 = 60;

// [security] HMAC algorithms accepted for the process-wide signing secret
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JwtAlgorithm {
    HS256,
    HS384,
    HS512,
}

impl JwtAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            JwtAlgorithm::HS256 => "HS256",
            JwtAlgorithm::HS384 => "HS384",
            JwtAlgorithm::HS512 => "HS512",
        }
    }

    /// Shortest secret accepted for the algorithm: the digest size in bytes.
    pub fn min_key_len(&self) -> usize {
        match self {
            JwtAlgorithm::HS256 => 32,
            JwtAlgorithm::HS384 => 48,
            JwtAlgorithm::HS512 => 64,
        }
    }
}

impl fmt::Display for JwtAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for JwtAlgorithm {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HS256" => Ok(JwtAlgorithm::HS256),
            "HS384" => Ok(JwtAlgorithm::HS384),
            "HS512" => Ok(JwtAlgorithm::HS512),
            other => Err(TokenError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("token signing failed: {0}")]
    Signing(JoseError),

    #[error("token rejected: {0}")]
    Rejected(JoseError),

    #[error("missing or invalid 'sub' claim")]
    MissingSubject,

    #[error("missing or invalid 'exp' claim")]
    MissingExpiry,

    #[error("token has expired")]
    Expired,
}

// [business] Claims carried by an access token - nothing beyond subject and expiry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessClaims {
    pub sub: String, // [business] Worker id as a string
    pub exp: i64,    // [security] Unix timestamp after which the token is dead
}

/// Issues and verifies worker access tokens with the configured HMAC secret.
#[derive(Clone)]
pub struct JwtSigner {
    secret: Secret<String>,
    algorithm: JwtAlgorithm,
    ttl: Duration,
}

// [security] Manual Debug so the secret can never reach a log line
impl fmt::Debug for JwtSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtSigner")
            .field("algorithm", &self.algorithm)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl JwtSigner {
    pub fn new(secret: Secret<String>, algorithm: JwtAlgorithm, ttl: Duration) -> Self {
        Self {
            secret,
            algorithm,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    // [business] Create an access token for a worker, expiring `ttl` from now
    pub fn create_access_token(&self, subject: &str) -> Result<String, TokenError> {
        self.create_access_token_at(subject, OffsetDateTime::now_utc())
    }

    pub fn create_access_token_at(
        &self,
        subject: &str,
        now: OffsetDateTime,
    ) -> Result<String, TokenError> {
        let claims = AccessClaims {
            sub: subject.to_string(),
            exp: (now + self.ttl).unix_timestamp(),
        };

        self.sign_jwt(&claims)
    }

    // [security] Sign claims with the configured HMAC algorithm
    fn sign_jwt(&self, claims: &AccessClaims) -> Result<String, TokenError> {
        let mut header = JwsHeader::new();
        header.set_token_type("JWT");

        let mut payload = JwtPayload::new();
        payload.set_subject(&claims.sub);
        payload
            .set_claim("exp", Some(Value::from(claims.exp)))
            .map_err(TokenError::Signing)?;

        let key = self.secret.expose_secret().as_bytes();
        let jwt = match self.algorithm {
            JwtAlgorithm::HS256 => {
                let signer = HS256.signer_from_bytes(key).map_err(TokenError::Signing)?;
                jwt::encode_with_signer(&payload, &header, &signer)
            }
            JwtAlgorithm::HS384 => {
                let signer = HS384.signer_from_bytes(key).map_err(TokenError::Signing)?;
                jwt::encode_with_signer(&payload, &header, &signer)
            }
            JwtAlgorithm::HS512 => {
                let signer = HS512.signer_from_bytes(key).map_err(TokenError::Signing)?;
                jwt::encode_with_signer(&payload, &header, &signer)
            }
        }
        .map_err(TokenError::Signing)?;

        Ok(jwt)
    }

    /// Verify signature and expiry, returning the subject (worker id).
    pub fn verify_access_token(&self, token: &str) -> Result<String, TokenError> {
        self.verify_access_token_at(token, OffsetDateTime::now_utc())
    }

    pub fn verify_access_token_at(
        &self,
        token: &str,
        now: OffsetDateTime,
    ) -> Result<String, TokenError> {
        let claims = self.verify_jwt(token)?;

        // [security] No leeway: the token is dead from the `exp` instant on
        if claims.exp <= now.unix_timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(claims.sub)
    }

    // [security] Signature check; the verifier also rejects a header `alg` different from ours
    fn verify_jwt(&self, token: &str) -> Result<AccessClaims, TokenError> {
        let key = self.secret.expose_secret().as_bytes();
        let (payload, _header) = match self.algorithm {
            JwtAlgorithm::HS256 => {
                let verifier = HS256.verifier_from_bytes(key).map_err(TokenError::Rejected)?;
                jwt::decode_with_verifier(token, &verifier)
            }
            JwtAlgorithm::HS384 => {
                let verifier = HS384.verifier_from_bytes(key).map_err(TokenError::Rejected)?;
                jwt::decode_with_verifier(token, &verifier)
            }
            JwtAlgorithm::HS512 => {
                let verifier = HS512.verifier_from_bytes(key).map_err(TokenError::Rejected)?;
                jwt::decode_with_verifier(token, &verifier)
            }
        }
        .map_err(TokenError::Rejected)?;

        extract_claims(&payload)
    }
}

fn extract_claims(payload: &JwtPayload) -> Result<AccessClaims, TokenError> {
    let sub = payload
        .claim("sub")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .ok_or(TokenError::MissingSubject)?
        .to_string();

    let exp = payload
        .claim("exp")
        .and_then(|v| v.as_i64())
        .ok_or(TokenError::MissingExpiry)?;

    Ok(AccessClaims { sub, exp })
}

// [rust] Unit tests for JWT functionality and security properties
#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};

    const SECRET: &str = "test-secret-key-with-enough-entropy-for-hs512-0123456789abcdefghij";

    fn signer() -> JwtSigner {
        JwtSigner::new(
            Secret::new(SECRET.to_string()),
            JwtAlgorithm::HS256,
            Duration::minutes(DEFAULT_ACCESS_TTL_MINS),
        )
    }

    // Sign an arbitrary payload with the test secret, bypassing AccessClaims
    fn sign_raw(claims: serde_json::Map<String, Value>) -> String {
        let payload = JwtPayload::from_map(claims).unwrap();
        let signer = HS256.signer_from_bytes(SECRET.as_bytes()).unwrap();
        jwt::encode_with_signer(&payload, &JwsHeader::new(), &signer).unwrap()
    }

    #[test]
    fn test_issue_then_verify_returns_subject() {
        let now = OffsetDateTime::now_utc();
        let token = signer().create_access_token_at("42", now).unwrap();

        let subject = signer().verify_access_token_at(&token, now).unwrap();
        assert_eq!(subject, "42");
    }

    #[test]
    fn test_payload_contains_only_sub_and_exp() {
        let now = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        let token = signer().create_access_token_at("42", now).unwrap();

        let parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3);
        let payload: Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(parts[1]).unwrap()).unwrap();

        assert_eq!(
            payload,
            serde_json::json!({"sub": "42", "exp": 1_700_000_000 + 3600})
        );
    }

    #[test]
    fn test_token_expires_after_ttl() {
        let issued = OffsetDateTime::now_utc();
        let token = signer().create_access_token_at("42", issued).unwrap();

        let almost = issued + Duration::minutes(59);
        assert!(signer().verify_access_token_at(&token, almost).is_ok());

        let later = issued + Duration::minutes(61);
        assert!(matches!(
            signer().verify_access_token_at(&token, later),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = signer().create_access_token("42").unwrap();
        let other = JwtSigner::new(
            Secret::new("a-completely-different-secret-value-of-sufficient-length".to_string()),
            JwtAlgorithm::HS256,
            Duration::minutes(60),
        );

        assert!(matches!(
            other.verify_access_token(&token),
            Err(TokenError::Rejected(_))
        ));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let token = signer().create_access_token("42").unwrap();
        let parts: Vec<&str> = token.split('.').collect();

        let forged_payload = URL_SAFE_NO_PAD.encode(
            serde_json::json!({"sub": "1", "exp": i64::MAX / 2}).to_string(),
        );
        let forged = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);

        assert!(signer().verify_access_token(&forged).is_err());
    }

    #[test]
    fn test_algorithm_mismatch_rejected() {
        let hs512 = JwtSigner::new(
            Secret::new(SECRET.to_string()),
            JwtAlgorithm::HS512,
            Duration::minutes(60),
        );
        let token = hs512.create_access_token("42").unwrap();

        assert!(signer().verify_access_token(&token).is_err());
        assert_eq!(hs512.verify_access_token(&token).unwrap(), "42");
    }

    #[test]
    fn test_missing_subject_rejected() {
        let mut claims = serde_json::Map::new();
        claims.insert(
            "exp".to_string(),
            Value::from(OffsetDateTime::now_utc().unix_timestamp() + 600),
        );
        let token = sign_raw(claims);

        assert!(matches!(
            signer().verify_access_token(&token),
            Err(TokenError::MissingSubject)
        ));
    }

    #[test]
    fn test_missing_expiry_rejected() {
        let mut claims = serde_json::Map::new();
        claims.insert("sub".to_string(), Value::from("42"));
        let token = sign_raw(claims);

        assert!(matches!(
            signer().verify_access_token(&token),
            Err(TokenError::MissingExpiry)
        ));
    }

    #[test]
    fn test_malformed_tokens_rejected() {
        for token in ["", "not-a-jwt", "a.b.c", "a.b", "....."] {
            assert!(
                signer().verify_access_token(token).is_err(),
                "Malformed token accepted: {:?}",
                token
            );
        }
    }

    #[test]
    fn test_algorithm_parsing() {
        assert_eq!("HS256".parse::<JwtAlgorithm>().unwrap(), JwtAlgorithm::HS256);
        assert_eq!("hs384".parse::<JwtAlgorithm>().unwrap(), JwtAlgorithm::HS384);
        assert_eq!(" HS512 ".parse::<JwtAlgorithm>().unwrap(), JwtAlgorithm::HS512);
        assert!("RS256".parse::<JwtAlgorithm>().is_err());
        assert!("none".parse::<JwtAlgorithm>().is_err());
    }

    #[test]
    fn test_min_key_len_matches_digest_size() {
        assert!(SECRET.len() >= JwtAlgorithm::HS512.min_key_len());
        assert_eq!(JwtAlgorithm::HS256.min_key_len(), 32);
        assert_eq!(JwtAlgorithm::HS384.min_key_len(), 48);
    }

    #[test]
    fn test_debug_does_not_leak_secret() {
        let rendered = format!("{:?}", signer());
        assert!(!rendered.contains(SECRET));
    }
}
