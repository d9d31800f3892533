//! Cookie-carried JWT authentication
//!
//! Tokens are issued by [`TokenService`], carried in cookies written by
//! [`CookieCodec`], and resolved back into a [`Principal`] by
//! [`authenticate`] on every request.

mod cookie;
mod middleware;
mod token;

use imbds_shared::user::Role;
use imbds_user::UserView;

pub use cookie::CookieCodec;
pub use middleware::{AuthUser, MaybeAuthUser, auth_middleware, authenticate};
pub use token::{Claims, IssuedToken, TokenError, TokenPair, TokenService, TokenType};

/// The identity a request acts as.
///
/// Built from token claims alone; the database is not consulted once a
/// token has been issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl From<&UserView> for Principal {
    fn from(user: &UserView) -> Self {
        Self {
            id: user.user_id,
            username: user.username.clone(),
            role: user.user_role,
        }
    }
}
