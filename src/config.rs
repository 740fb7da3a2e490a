//! Token-signing configuration.
//!
//! The signing secret is process-wide and loaded once at startup. A missing
//! secret is a startup failure, not a per-request one: the server refuses to
//! run with an undefined secret unless the operator explicitly opts into the
//! development fallback.

use anyhow::{Context, Result, bail};
use jsonwebtoken::Algorithm;
use std::env;

/// Well-known fallback secret for local development.
///
/// Only ever used when `--allow-dev-secret` is passed; never treat a
/// deployment signed with this value as secure.
pub const DEV_SECRET: &str = "dev-secret-change-me";

/// Default access-token lifetime in minutes.
pub const DEFAULT_TTL_MINUTES: i64 = 60;

/// Signing configuration for issued bearer tokens.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC signing secret.
    pub secret: String,
    /// Signing algorithm (HMAC family only).
    pub algorithm: Algorithm,
    /// Access-token lifetime in minutes.
    pub ttl_minutes: i64,
    /// Whether the insecure development fallback secret is in use.
    pub using_dev_secret: bool,
}

impl AuthConfig {
    /// Build a config from explicit parts.
    pub fn new(secret: impl Into<String>, algorithm: Algorithm, ttl_minutes: i64) -> Self {
        let secret = secret.into();
        let using_dev_secret = secret == DEV_SECRET;
        Self {
            secret,
            algorithm,
            ttl_minutes,
            using_dev_secret,
        }
    }

    /// Load the signing configuration from the environment.
    ///
    /// Reads `STOCKROOM_JWT_SECRET`, `STOCKROOM_JWT_ALGORITHM` (default
    /// `HS256`) and `STOCKROOM_TOKEN_TTL_MINUTES` (default 60). When the
    /// secret is absent, startup fails unless `allow_dev_secret` is set, in
    /// which case the documented [`DEV_SECRET`] is used and a warning is
    /// logged.
    pub fn from_env(allow_dev_secret: bool) -> Result<Self> {
        let secret = match env::var("STOCKROOM_JWT_SECRET") {
            Ok(s) if !s.is_empty() => s,
            _ if allow_dev_secret => {
                tracing::warn!(
                    "STOCKROOM_JWT_SECRET is not set; falling back to the insecure \
                     development secret. Do not run this configuration in production."
                );
                DEV_SECRET.to_string()
            }
            _ => bail!(
                "STOCKROOM_JWT_SECRET is not set; refusing to start without a signing \
                 secret (pass --allow-dev-secret for local development)"
            ),
        };

        let algorithm = match env::var("STOCKROOM_JWT_ALGORITHM") {
            Ok(raw) => parse_hmac_algorithm(&raw)?,
            Err(_) => Algorithm::HS256,
        };

        let ttl_minutes = match env::var("STOCKROOM_TOKEN_TTL_MINUTES") {
            Ok(raw) => raw
                .parse::<i64>()
                .context("STOCKROOM_TOKEN_TTL_MINUTES must be an integer number of minutes")?,
            Err(_) => DEFAULT_TTL_MINUTES,
        };
        if ttl_minutes <= 0 {
            bail!("STOCKROOM_TOKEN_TTL_MINUTES must be positive, got {ttl_minutes}");
        }

        Ok(Self::new(secret, algorithm, ttl_minutes))
    }
}

/// Parse an algorithm name, restricted to the HMAC family.
///
/// The signing key is a shared secret, so asymmetric algorithms are not
/// valid here even though the token library supports them.
fn parse_hmac_algorithm(raw: &str) -> Result<Algorithm> {
    let algorithm: Algorithm = raw
        .parse()
        .map_err(|_| anyhow::anyhow!("unknown JWT algorithm: {raw}"))?;
    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
        other => bail!("JWT algorithm {other:?} is not usable with a shared secret"),
    }
}
