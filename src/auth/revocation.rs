//! In-memory revocation registry for issued bearer tokens.
//!
//! Tokens are stateless, so logout cannot invalidate them cryptographically;
//! instead revoked tokens are remembered here and rejected at resolution
//! time. Entries live for the lifetime of the process and are not shared
//! across instances. Growth is bounded in practice by token TTL times the
//! logout rate; a TTL-pruned or externally shared denylist is the upgrade
//! path if that stops holding.

use std::collections::HashSet;
use tokio::sync::RwLock;

/// Process-lifetime set of revoked bearer tokens.
///
/// All mutation goes through the internal lock, so a `revoke` that has
/// completed is visible to every subsequent `is_revoked` call without any
/// caller-side synchronization.
#[derive(Debug, Default)]
pub struct RevocationRegistry {
    revoked: RwLock<HashSet<String>>,
}

impl RevocationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a token as no longer trusted. Idempotent.
    pub async fn revoke(&self, token: &str) {
        self.revoked.write().await.insert(token.to_string());
    }

    /// Whether a token has been revoked.
    pub async fn is_revoked(&self, token: &str) -> bool {
        self.revoked.read().await.contains(token)
    }
}
