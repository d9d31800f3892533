//! Access policies
//!
//! Every route picks exactly one [`Policy`]. The request-level check runs as
//! a route layer after authentication; [`Policy::SelfOrAdmin`] also has an
//! object-level check the handler performs once it knows the target.

use axum::{
    extract::{Request, State},
    http::Method,
    middleware::{self, Next},
    response::Response,
    routing::MethodRouter,
};

use crate::auth::Principal;
use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Anyone, authenticated or not.
    Public,
    /// Any authenticated principal, any method.
    AuthenticatedOnly,
    AdminOnly,
    /// Authenticated Admin or Employee, any method.
    AdminOrEmployee,
    /// Admins may do anything; Employees only read.
    AdminWriteEmployeeRead,
    /// Authenticated at request level; at object level only the owner or an Admin.
    SelfOrAdmin,
}

/// Methods that never modify state.
pub fn is_safe_method(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// Request-level decision for `policy`.
pub fn check(principal: Option<&Principal>, method: &Method, policy: Policy) -> bool {
    policy.allows(principal, method)
}

impl Policy {
    pub fn allows(&self, principal: Option<&Principal>, method: &Method) -> bool {
        let Some(principal) = principal else {
            return *self == Policy::Public;
        };

        match self {
            Policy::Public | Policy::AuthenticatedOnly | Policy::SelfOrAdmin => true,
            Policy::AdminOnly => principal.is_admin(),
            // Every current role qualifies; roles added later must be listed here.
            Policy::AdminOrEmployee => true,
            Policy::AdminWriteEmployeeRead => principal.is_admin() || is_safe_method(method),
        }
    }

    /// Like [`Policy::allows`], but reports 401 for anonymous callers and 403
    /// for authenticated ones.
    pub fn enforce(&self, principal: Option<&Principal>, method: &Method) -> Result<(), ApiError> {
        if self.allows(principal, method) {
            return Ok(());
        }

        match principal {
            None => Err(ApiError::NotAuthenticated),
            Some(_) => Err(ApiError::Forbidden),
        }
    }

    /// Object-level decision. Only [`Policy::SelfOrAdmin`] restricts here.
    pub fn check_object(&self, principal: &Principal, owner_id: i64) -> bool {
        match self {
            Policy::SelfOrAdmin => principal.is_admin() || principal.id == owner_id,
            _ => true,
        }
    }

    pub fn enforce_object(&self, principal: &Principal, owner_id: i64) -> Result<(), ApiError> {
        if self.check_object(principal, owner_id) {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }
}

/// Route layer applying a policy to the principal left by the auth middleware.
pub async fn enforce_policy(
    State(policy): State<Policy>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let principal = request.extensions().get::<Principal>();

    if let Err(e) = policy.enforce(principal, request.method()) {
        tracing::debug!(
            ?policy,
            method = %request.method(),
            path = %request.uri().path(),
            principal_id = principal.map(|p| p.id),
            "request denied by policy"
        );
        return Err(e);
    }

    Ok(next.run(request).await)
}

/// Attach `policy` to the methods of `route`.
pub fn guard<S>(policy: Policy, route: MethodRouter<S>) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    route.route_layer(middleware::from_fn_with_state(policy, enforce_policy))
}
