//! Authentication hooks for route handlers.
//!
//! Two ways for a route to consume the auth core:
//!
//! - the [`Principal`] extractor: any handler taking `Principal` requires a
//!   valid bearer token and receives the resolved identity
//! - [`guard_roles`] middleware, parameterized with a required role list via
//!   [`RouteGate`]: composes resolution with the authorization gate and
//!   stashes the principal in request extensions so the handler's extractor
//!   does not resolve twice

use axum::extract::{FromRequestParts, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use http::header::{AUTHORIZATION, HeaderMap};
use http::request::Parts;

use crate::api::AppState;
use crate::auth::{self, AuthError, Principal};
use crate::context::RequestContext;

/// Pull the bearer token out of the `Authorization` header.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Stamp the resolved principal onto the request context and span.
fn note_resolved(extensions: &http::Extensions, principal: &Principal) {
    if let Some(ctx) = extensions.get::<RequestContext>() {
        ctx.set_principal(principal.subject_id.as_str());
    }
    tracing::Span::current().record(
        "user_id",
        tracing::field::display(&principal.subject_id),
    );
}

impl FromRequestParts<AppState> for Principal {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // A role-gated route already resolved the principal in middleware.
        if let Some(principal) = parts.extensions.get::<Principal>() {
            return Ok(principal.clone());
        }

        let token = bearer_token(&parts.headers).ok_or(AuthError::Unauthenticated)?;
        let principal = state.resolver().resolve(token).await?;
        note_resolved(&parts.extensions, &principal);
        parts.extensions.insert(principal.clone());
        Ok(principal)
    }
}

/// Raw bearer token, for routes that operate on the token itself (logout).
pub struct BearerToken(pub String);

impl<S: Send + Sync> FromRequestParts<S> for BearerToken {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        bearer_token(&parts.headers)
            .map(|token| Self(token.to_string()))
            .ok_or(AuthError::Unauthenticated)
    }
}

/// State for a role-gated route: shared app state plus the declared roles.
#[derive(Clone)]
pub struct RouteGate {
    state: AppState,
    required: &'static [&'static str],
}

impl RouteGate {
    pub fn new(state: AppState, required: &'static [&'static str]) -> Self {
        Self { state, required }
    }
}

/// Middleware enforcing a declared role requirement on a route.
///
/// Authentication failures surface as 401, a role mismatch as 403.
pub async fn guard_roles(
    State(gate): State<RouteGate>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = bearer_token(request.headers()).ok_or(AuthError::Unauthenticated)?;
    let principal = gate.state.resolver().resolve(token).await?;
    auth::authorize(&principal, gate.required)?;

    note_resolved(request.extensions(), &principal);
    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}
