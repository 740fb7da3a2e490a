//! Signed bearer-token codec.
//!
//! Claims are serialized as a standard compact JWT signed with a
//! process-wide HMAC secret, so any off-the-shelf verifier holding the same
//! secret can check tokens issued here. Expiry is evaluated against the
//! caller-supplied clock: validity of a token is a pure function of
//! (signature, `now`, revocation), never of hidden library state.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::auth::AuthError;
use crate::config::AuthConfig;

/// Claims carried inside an issued token.
///
/// Immutable once issued: the role set is a snapshot taken at issuance time
/// and is not refreshed when the stored identity changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject identifier of the authenticated identity.
    pub sub: String,
    /// Role snapshot at issuance time.
    pub roles: Vec<String>,
    /// Absolute expiry as a Unix timestamp (seconds).
    pub exp: u64,
}

/// Encodes and decodes signed, time-bound bearer tokens.
pub struct TokenCodec {
    header: Header,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenCodec {
    /// Build a codec from the process-wide signing configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(config.algorithm);
        // Expiry is checked explicitly in decode() against the caller's
        // clock; the library must not consult the wall clock itself.
        validation.validate_exp = false;
        validation.set_required_spec_claims::<&str>(&[]);

        Self {
            header: Header::new(config.algorithm),
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            ttl: Duration::minutes(config.ttl_minutes),
        }
    }

    /// Configured default token lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `subject` expiring after the default TTL.
    pub fn issue(
        &self,
        subject: &str,
        roles: &[String],
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        self.issue_with_ttl(subject, roles, now, self.ttl)
    }

    /// Issue a token with an explicit validity window.
    pub fn issue_with_ttl(
        &self,
        subject: &str,
        roles: &[String],
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<String, AuthError> {
        let claims = Claims {
            sub: subject.to_string(),
            roles: roles.to_vec(),
            exp: (now + ttl).timestamp().max(0) as u64,
        };

        encode(&self.header, &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("token signing failed: {e}")))
    }

    /// Decode and verify a token at the given instant.
    ///
    /// Signature and structure are checked first (`Malformed`), then expiry
    /// against `now` (`Expired` iff `exp <= now`).
    pub fn decode(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|_| AuthError::Malformed)?;

        let claims = data.claims;
        if claims.exp <= now.timestamp().max(0) as u64 {
            return Err(AuthError::Expired);
        }
        Ok(claims)
    }
}
