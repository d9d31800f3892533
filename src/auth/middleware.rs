//! Authentication middleware for Axum

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

use super::{CookieCodec, Principal, TokenService, TokenType};
use crate::error::ApiError;
use crate::routes::AppState;

/// Resolve the principal carried by the access cookie.
///
/// No cookie is not an error: the request proceeds anonymously and the
/// route policy decides. A cookie that is present but fails validation is
/// rejected outright, even on routes that would admit anonymous callers.
pub fn authenticate(
    jar: &CookieJar,
    tokens: &TokenService,
    cookies: &CookieCodec,
) -> Result<Option<Principal>, ApiError> {
    let Some(token) = cookies.access_token(jar) else {
        return Ok(None);
    };

    match tokens.validate(token, TokenType::Access) {
        Ok(principal) => Ok(Some(principal)),
        Err(e) => {
            debug!(error = %e, "rejected access token");
            Err(ApiError::InvalidToken)
        }
    }
}

/// Authentication middleware that extracts the JWT from the access cookie
pub async fn auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(principal) = authenticate(&jar, &state.tokens, &state.cookies)? {
        debug!(principal_id = principal.id, role = %principal.role, "request authenticated");
        request.extensions_mut().insert(principal);
    }

    Ok(next.run(request).await)
}

/// Extractor for handlers that need a principal. Rejects anonymous requests.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Principal);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(AuthUser)
            .ok_or(ApiError::NotAuthenticated)
    }
}

/// Extractor for handlers that also serve anonymous callers.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<Principal>);

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuthUser(parts.extensions.get::<Principal>().cloned()))
    }
}
