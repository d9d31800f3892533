use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use super::AppState;
use crate::auth::{self, AuthUser, Principal, TokenType};
use crate::error::ApiError;

#[derive(Deserialize, Default)]
pub struct LoginInput {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// POST /login
///
/// A missing or unreadable body is treated as empty credentials, so every
/// failure answers with the same 401.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginInput>, JsonRejection>,
) -> Result<(CookieJar, Json<Value>), ApiError> {
    let input = payload.map(|Json(input)| input).unwrap_or_default();

    let Some(user) = state
        .user_command
        .verify_credentials(&input.username, &input.password)
        .await?
    else {
        info!(reason = "invalid_credentials", "login rejected");
        return Err(ApiError::InvalidCredentials);
    };

    let principal = Principal::from(&user);
    let pair = state
        .tokens
        .issue(&principal)
        .map_err(|e| ApiError::Internal(e.into()))?;

    info!(principal_id = principal.id, role = %principal.role, "login succeeded");

    let access = pair.access.token.clone();
    let jar = state.cookies.set_session(jar, &pair);

    Ok((
        jar,
        Json(json!({ "message": "Login successful", "access": access })),
    ))
}

/// POST /refresh
///
/// Mints a new access token for the identity carried by the refresh cookie.
/// The refresh token itself is neither rotated nor revoked.
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<Value>), ApiError> {
    let Some(token) = state.cookies.refresh_token(&jar) else {
        return Err(ApiError::MissingRefreshToken);
    };

    let principal = state
        .tokens
        .validate(token, TokenType::Refresh)
        .map_err(|e| {
            warn!(reason = %e, "refresh rejected");
            ApiError::InvalidRefreshToken
        })?;

    let access = state
        .tokens
        .issue_access(&principal)
        .map_err(|e| ApiError::Internal(e.into()))?;

    info!(principal_id = principal.id, "access token refreshed");

    let jar = state.cookies.set_access(jar, &access);

    Ok((jar, Json(json!({ "access": access.token }))))
}

/// POST /logout
///
/// Requires a valid access cookie, but both cookies are cleared on every
/// response, including the 401.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Result<Json<Value>, ApiError>) {
    let outcome = auth::authenticate(&jar, &state.tokens, &state.cookies);
    let jar = state.cookies.clear(jar);

    let body = match outcome {
        Ok(Some(principal)) => {
            info!(principal_id = principal.id, "logged out");
            Ok(Json(json!({ "message": "Logged out successfully" })))
        }
        Ok(None) => Err(ApiError::NotAuthenticated),
        Err(e) => Err(e),
    };

    (jar, body)
}

/// GET /protected
pub async fn protected(AuthUser(principal): AuthUser) -> Json<Value> {
    Json(json!({
        "authenticated": true,
        "user": {
            "username": principal.username,
            "user_role": principal.role,
        },
    }))
}
