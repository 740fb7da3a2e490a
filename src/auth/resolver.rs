//! Bearer-token resolution into an authenticated principal.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use crate::auth::identity::IdentityStore;
use crate::auth::revocation::RevocationRegistry;
use crate::auth::token::TokenCodec;
use crate::auth::AuthError;
use crate::db::schema::IdentityRecord;
use crate::types::SubjectId;

/// Implicit role assigned when a stored identity has none.
pub const DEFAULT_ROLE: &str = "user";

/// The authenticated identity for the duration of one request.
///
/// Constructed fresh from a successful token resolution on every protected
/// call; never cached across requests and never carrying the stored
/// credential digest.
#[derive(Debug, Clone, Serialize)]
pub struct Principal {
    pub subject_id: SubjectId,
    pub name: String,
    pub email: String,
    pub roles: Vec<String>,
    pub status: String,
}

impl Principal {
    /// Build a principal from a stored identity.
    ///
    /// Takes the record by value and keeps only the public fields; the
    /// credential digest is dropped here and cannot reach callers.
    pub fn from_identity(identity: IdentityRecord) -> Self {
        let roles = if identity.roles.is_empty() {
            vec![DEFAULT_ROLE.to_string()]
        } else {
            identity.roles
        };

        Self {
            subject_id: SubjectId::new(identity.subject_id),
            name: identity.name,
            email: identity.email,
            roles,
            status: identity.status,
        }
    }
}

/// Resolves raw bearer tokens into principals.
pub struct PrincipalResolver {
    codec: Arc<TokenCodec>,
    revocations: Arc<RevocationRegistry>,
    identities: Arc<IdentityStore>,
}

impl PrincipalResolver {
    pub fn new(
        codec: Arc<TokenCodec>,
        revocations: Arc<RevocationRegistry>,
        identities: Arc<IdentityStore>,
    ) -> Self {
        Self {
            codec,
            revocations,
            identities,
        }
    }

    /// Resolve a bearer token into a [`Principal`].
    ///
    /// Checks, in order: revocation (before any signature work), signature
    /// and structure, expiry, then the identity lookup. A subject that
    /// decodes cleanly but no longer exists in the store is an
    /// authentication failure, not a server fault.
    pub async fn resolve(&self, token: &str) -> Result<Principal, AuthError> {
        if self.revocations.is_revoked(token).await {
            return Err(AuthError::Revoked);
        }

        let claims = self.codec.decode(token, Utc::now())?;

        let identity = self
            .identities
            .find_by_subject_id(&claims.sub)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .ok_or_else(|| AuthError::SubjectNotFound(claims.sub.clone()))?;

        Ok(Principal::from_identity(identity))
    }
}
