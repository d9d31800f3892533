use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use imbds_shared::user::{Role, Status};
use imbds_user::{RegisterInput, UpdateInput, UpdateOutcome, UserView};
use serde::Deserialize;
use serde_json::json;

use super::AppState;
use crate::auth::{AuthUser, MaybeAuthUser};
use crate::error::ApiError;
use crate::policy::Policy;

/// Field names mirror [`UserView`]; `role` is accepted as an alias.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateUserInput {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default, alias = "role")]
    pub user_role: Role,
}

/// Body of both PUT and PATCH. Absent fields are left untouched.
#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserInput {
    /// Echoed by clients that send back a full record. Ignored.
    pub user_id: Option<i64>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(alias = "role")]
    pub user_role: Option<Role>,
    #[serde(alias = "status")]
    pub user_status: Option<Status>,
}

impl From<UpdateUserInput> for UpdateInput {
    fn from(input: UpdateUserInput) -> Self {
        Self {
            username: input.username,
            email: input.email,
            password: input.password,
            first_name: input.first_name,
            last_name: input.last_name,
            role: input.user_role,
            status: input.user_status,
        }
    }
}

/// GET /users
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<UserView>>, ApiError> {
    Ok(Json(state.user_command.list().await?))
}

/// GET /users/{id}
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<UserView>, ApiError> {
    let Some(user) = state.user_command.find(id).await? else {
        return Err(ApiError::NotFound("User".to_string()));
    };

    Ok(Json(user))
}

/// POST /users
///
/// Only an Admin may hand out the Admin role, even when registration is open.
pub async fn create(
    State(state): State<AppState>,
    MaybeAuthUser(caller): MaybeAuthUser,
    Json(input): Json<CreateUserInput>,
) -> Result<(StatusCode, Json<UserView>), ApiError> {
    let caller_is_admin = caller.as_ref().is_some_and(|p| p.is_admin());
    if input.user_role.is_admin() && !caller_is_admin {
        return Err(match caller {
            Some(_) => ApiError::Forbidden,
            None => ApiError::NotAuthenticated,
        });
    }

    let id = state
        .user_command
        .register(RegisterInput {
            username: input.username,
            email: input.email,
            password: input.password,
            first_name: input.first_name,
            last_name: input.last_name,
            role: input.user_role,
        })
        .await?;

    let Some(user) = state.user_command.find(id).await? else {
        return Err(ApiError::Internal(anyhow::anyhow!(
            "user {id} missing after registration"
        )));
    };

    Ok((StatusCode::CREATED, Json(user)))
}

/// PUT/PATCH /users/{id}
///
/// A body that changes nothing answers `{"message": "No changes made"}`.
pub async fn update(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<i64>,
    Json(input): Json<UpdateUserInput>,
) -> Result<Response, ApiError> {
    Policy::SelfOrAdmin.enforce_object(&principal, id)?;

    let Some(current) = state.user_command.find(id).await? else {
        return Err(ApiError::NotFound("User".to_string()));
    };

    let input = UpdateInput::from(input);
    if input.changes_privileges(&current) && !principal.is_admin() {
        return Err(ApiError::Forbidden);
    }

    let response = match state.user_command.update(id, input).await? {
        UpdateOutcome::Unchanged(_) => {
            Json(json!({ "message": "No changes made" })).into_response()
        }
        UpdateOutcome::Updated(user) => Json(user).into_response(),
    };

    Ok(response)
}
