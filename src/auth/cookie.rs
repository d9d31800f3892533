use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::{Duration, OffsetDateTime};

use super::{IssuedToken, TokenPair};
use crate::config::{CookieConfig, REFRESH_COOKIE_NAME, SameSitePolicy};

/// Writes and reads the two session cookies.
///
/// Both cookies share the configured attributes; only name, value and max-age
/// differ between them.
#[derive(Debug, Clone)]
pub struct CookieCodec {
    access_name: String,
    http_only: bool,
    secure: bool,
    same_site: SameSite,
    path: String,
}

impl CookieCodec {
    pub fn new(config: &CookieConfig) -> Self {
        let same_site = match config.same_site {
            SameSitePolicy::Lax => SameSite::Lax,
            SameSitePolicy::Strict => SameSite::Strict,
            SameSitePolicy::None => SameSite::None,
        };

        Self {
            access_name: config.access_name.clone(),
            http_only: config.http_only,
            secure: config.secure,
            same_site,
            path: config.path.clone(),
        }
    }

    pub fn access_name(&self) -> &str {
        &self.access_name
    }

    /// Build a session cookie with the configured attributes.
    pub fn build(&self, name: &str, value: String, max_age: Duration) -> Cookie<'static> {
        Cookie::build((name.to_owned(), value))
            .path(self.path.clone())
            .http_only(self.http_only)
            .secure(self.secure)
            .same_site(self.same_site)
            .max_age(max_age)
            .build()
    }

    /// Set both cookies after a successful login.
    pub fn set_session(&self, jar: CookieJar, pair: &TokenPair) -> CookieJar {
        let jar = self.set_access(jar, &pair.access);

        jar.add(self.build(
            REFRESH_COOKIE_NAME,
            pair.refresh.token.clone(),
            Duration::seconds(pair.refresh.ttl),
        ))
    }

    /// Replace the access cookie, leaving the refresh cookie untouched.
    pub fn set_access(&self, jar: CookieJar, access: &IssuedToken) -> CookieJar {
        jar.add(self.build(
            &self.access_name,
            access.token.clone(),
            Duration::seconds(access.ttl),
        ))
    }

    /// Expire both cookies.
    ///
    /// Emits the same two `Set-Cookie` headers whether or not the request
    /// carried the cookies, so repeated logouts produce identical responses.
    pub fn clear(&self, jar: CookieJar) -> CookieJar {
        let jar = jar.add(self.expired(&self.access_name));

        jar.add(self.expired(REFRESH_COOKIE_NAME))
    }

    fn expired(&self, name: &str) -> Cookie<'static> {
        let mut cookie = self.build(name, String::new(), Duration::ZERO);
        cookie.set_expires(OffsetDateTime::UNIX_EPOCH);
        cookie
    }

    /// The access token carried by the request. Empty values count as absent.
    pub fn access_token<'a>(&self, jar: &'a CookieJar) -> Option<&'a str> {
        non_empty(jar, &self.access_name)
    }

    pub fn refresh_token<'a>(&self, jar: &'a CookieJar) -> Option<&'a str> {
        non_empty(jar, REFRESH_COOKIE_NAME)
    }
}

fn non_empty<'a>(jar: &'a CookieJar, name: &str) -> Option<&'a str> {
    jar.get(name)
        .map(|cookie| cookie.value())
        .filter(|value| !value.is_empty())
}
