//! Role-based authorization gate.

use crate::auth::AuthError;
use crate::auth::resolver::Principal;

/// Check a principal against a required role set.
///
/// "Any of" semantics: the principal passes when at least one of its roles
/// appears in `required`. Changing this to "all of" would silently flip
/// authorization outcomes for multi-role gates, so the union semantics are
/// load-bearing.
///
/// Routes that declare no requirement never call this; an empty `required`
/// set here denies everyone.
pub fn authorize(principal: &Principal, required: &[&str]) -> Result<(), AuthError> {
    if required
        .iter()
        .any(|r| principal.roles.iter().any(|have| have == r))
    {
        Ok(())
    } else {
        Err(AuthError::Forbidden)
    }
}
