use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{MethodRouter, get, post, put},
};
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

use crate::auth::{CookieCodec, TokenService, auth_middleware};
use crate::catalogue::{Catalogue, Operation, Resource};
use crate::config::Config;
use crate::error::ApiError;
use crate::policy::{Policy, guard};

mod health;
mod session;
mod users;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub user_command: imbds_user::Command,
    pub tokens: Arc<TokenService>,
    pub cookies: Arc<CookieCodec>,
    pub catalogue: Catalogue,
    pub pool: SqlitePool,
}

impl AppState {
    pub fn new(config: Config, pool: SqlitePool) -> Self {
        Self {
            user_command: imbds_user::Command::new(pool.clone(), pool.clone()),
            tokens: Arc::new(TokenService::new(&config.auth)),
            cookies: Arc::new(CookieCodec::new(&config.cookie)),
            catalogue: Catalogue::new(&config.auth),
            config,
            pool,
        }
    }
}

pub async fn fallback() -> ApiError {
    ApiError::NotFound("Route".to_string())
}

/// Route `route` under the catalogue policy for `operation` on `resource`.
/// Operations the catalogue does not declare are left unrouted.
fn declared(
    catalogue: &Catalogue,
    resource: Resource,
    operation: Operation,
    route: MethodRouter<AppState>,
) -> MethodRouter<AppState> {
    match catalogue.policy(resource, operation) {
        Some(policy) => guard(policy, route),
        None => MethodRouter::new(),
    }
}

pub fn router(app_state: AppState) -> Router {
    let catalogue = app_state.catalogue;

    // Everything here sees the principal resolved from the access cookie.
    let authenticated = Router::new()
        .route(
            "/protected",
            guard(Policy::AuthenticatedOnly, get(session::protected)),
        )
        .route(
            "/users",
            declared(&catalogue, Resource::User, Operation::List, get(users::list)).merge(
                declared(&catalogue, Resource::User, Operation::Create, post(users::create)),
            ),
        )
        .route(
            "/users/{id}",
            declared(&catalogue, Resource::User, Operation::Retrieve, get(users::detail)).merge(
                declared(
                    &catalogue,
                    Resource::User,
                    Operation::Update,
                    put(users::update).patch(users::update),
                ),
            ),
        )
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    Router::new()
        // Health check endpoints (no auth required)
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .with_state(app_state.pool.clone())
        // Session endpoints resolve cookies themselves so a stale access
        // cookie never blocks login or refresh.
        .route("/login", post(session::login))
        .route("/refresh", post(session::refresh))
        .route("/logout", post(session::logout))
        .merge(authenticated)
        .fallback(fallback)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
