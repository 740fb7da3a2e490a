//! Authentication and authorization core.
//!
//! This module owns everything security-relevant in the service:
//!
//! - **Password hashing**: salted Argon2 digests for stored credentials
//! - **Token codec**: signed, time-bound bearer tokens (compact JWT)
//! - **Revocation registry**: process-lifetime denylist for logged-out tokens
//! - **Principal resolver**: bearer token -> authenticated [`Principal`]
//! - **Authorization gate**: role check applied to routes that declare one
//!
//! ## Security model
//!
//! - Tokens are stateless; a token is trusted iff its signature verifies,
//!   it has not expired, and it is not in the revocation registry
//! - The revocation check runs before any signature work
//! - Resolved principals never carry the stored credential digest
//! - Authentication failures and authorization denials are distinct
//!   outcomes (401 vs 403 at the HTTP layer)

mod gate;
mod identity;
mod password;
mod resolver;
mod revocation;
mod token;

pub use gate::authorize;
pub use identity::{IdentityFilters, IdentityStore, IdentityUpdate};
pub use password::{hash_password, verify_password};
pub use resolver::{DEFAULT_ROLE, Principal, PrincipalResolver};
pub use revocation::RevocationRegistry;
pub use token::{Claims, TokenCodec};

use std::fmt;

/// Authentication and authorization failures.
///
/// Everything except `Forbidden` is an authentication-class failure and maps
/// to 401 externally; `Forbidden` is an authorization denial and maps to 403.
#[derive(Debug, Clone)]
pub enum AuthError {
    /// No bearer token was presented.
    Unauthenticated,
    /// Structurally invalid token or signature mismatch.
    Malformed,
    /// Token expiry has passed.
    Expired,
    /// Token was revoked (logout) before its natural expiry.
    Revoked,
    /// Token decoded cleanly but its subject has no stored identity.
    SubjectNotFound(String),
    /// Authenticated, but the principal lacks every required role.
    Forbidden,
    /// Infrastructure failure while authenticating (identity store, signer).
    Internal(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "authentication required"),
            Self::Malformed => write!(f, "invalid token"),
            Self::Expired => write!(f, "token has expired"),
            Self::Revoked => write!(f, "token has been revoked"),
            Self::SubjectNotFound(sub) => write!(f, "no identity for subject {}", sub),
            Self::Forbidden => write!(f, "insufficient role"),
            Self::Internal(msg) => write!(f, "internal auth error: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}
